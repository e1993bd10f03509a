//! Open commands - open links as tabs, then close them on request.

use std::path::Path;

use anyhow::Result;
use linkopener_core::{BatchEvent, CloseReport, DriverFactory, LinkOpener};

use super::wait_for_enter;
use crate::progress::percent_bar;

/// Open every link of `file`, wait for Enter, then close the opened tabs.
pub fn open<F: DriverFactory>(opener: &mut LinkOpener<F>, file: &Path) -> Result<()> {
    let count = opener.load_document(file)?.len();
    println!("Opening {} link(s) from {}", count, file.display());

    let rt = tokio::runtime::Runtime::new()?;
    let (opened, failed) = rt.block_on(run_batch(opener))?;
    println!("Opened {} tab(s), {} failed", opened, failed);

    if opened > 0 {
        wait_for_enter("Press Enter to close the opened tabs...")?;
        report_close(opener.close_all()?);
    }
    Ok(())
}

/// Open one URL, wait for Enter, then close its tab.
pub fn open_url<F: DriverFactory>(opener: &LinkOpener<F>, url: &str) -> Result<()> {
    let tab = opener.open_one(url)?;
    println!("Opened {} in tab {}", url.trim(), tab);

    wait_for_enter("Press Enter to close the tab...")?;
    report_close(opener.close_all()?);
    Ok(())
}

async fn run_batch<F: DriverFactory>(opener: &LinkOpener<F>) -> Result<(usize, usize)> {
    let mut handle = opener.start_batch()?;
    let pb = percent_bar(&format!("Opening {} links", handle.total()));
    let mut counts = (0, 0);

    while let Some(event) = handle.next_event().await {
        match event {
            BatchEvent::Processing { url, .. } => pb.set_message(url),
            BatchEvent::Failed { index, message } => {
                pb.println(format!("Link {} failed: {}", index + 1, message));
            }
            BatchEvent::Progress { percent } => pb.set_position(u64::from(percent)),
            BatchEvent::Completed { opened, failed } => counts = (opened, failed),
            BatchEvent::Started { .. } | BatchEvent::Opened { .. } => {}
        }
    }
    pb.finish_and_clear();

    let summary = handle.wait().await?;
    tracing::debug!(batch_id = %summary.batch_id, "Batch finished");
    Ok(counts)
}

fn report_close(report: CloseReport) {
    if report.failed > 0 {
        println!(
            "Closed {} of {} tab(s), {} could not be closed",
            report.closed,
            report.total(),
            report.failed
        );
    } else {
        println!("Closed {} tab(s)", report.closed);
    }
}
