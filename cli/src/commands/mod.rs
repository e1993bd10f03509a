//! CLI command implementations.

pub mod export;
pub mod open;
pub mod scan;

pub use export::export;
pub use open::{open, open_url};
pub use scan::scan;

/// Block until the user presses Enter
pub(crate) fn wait_for_enter(prompt: &str) -> std::io::Result<()> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(())
}
