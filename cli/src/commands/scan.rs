//! Scan command - list the links of a document.

use std::path::Path;

use anyhow::Result;
use linkopener_core::{DriverFactory, LinkOpener};

/// Load `file` and print its links, numbered from 1.
pub fn scan<F: DriverFactory>(opener: &mut LinkOpener<F>, file: &Path) -> Result<()> {
    let links = opener.load_document(file)?;

    if links.is_empty() {
        println!("No links found in {}", file.display());
        return Ok(());
    }

    print!("{}", links.to_export_text());
    println!("{} link(s) found", links.len());
    Ok(())
}
