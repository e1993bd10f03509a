//! Export command - write the links of a document to a text file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use linkopener_core::{DriverFactory, LinkOpener};

/// Load `file` and write its numbered links to `output`, or to
/// `<name>_links.txt` beside it. Returns the path written.
pub fn export<F: DriverFactory>(
    opener: &mut LinkOpener<F>,
    file: &Path,
    output: Option<&Path>,
    force: bool,
) -> Result<PathBuf> {
    let count = opener.load_document(file)?.len();
    if count == 0 {
        bail!("No links found in {}", file.display());
    }

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => opener
            .default_export_path()
            .context("Cannot derive an export path")?,
    };
    if target.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }

    std::fs::write(&target, opener.export_text())
        .with_context(|| format!("Failed to write {}", target.display()))?;

    tracing::info!(path = %target.display(), links = count, "Exported links");
    println!("Exported {} link(s) to {}", count, target.display());
    Ok(target)
}
