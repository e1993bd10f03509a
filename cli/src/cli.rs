//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Open every link of a document in its own browser tab.
#[derive(Parser, Debug)]
#[command(name = "linkopener")]
#[command(version)]
#[command(about = "Find the links in a document and open them as browser tabs")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the chromedriver executable.
    #[arg(long, global = true, env = "LINKOPENER_CHROMEDRIVER")]
    pub driver: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the links found in a document.
    Scan {
        /// Document to scan.
        file: PathBuf,
    },

    /// Write the links of a document to a numbered text file.
    ///
    /// Defaults to `<name>_links.txt` next to the document.
    Export {
        /// Document to scan.
        file: PathBuf,

        /// Output path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing output file.
        #[arg(long)]
        force: bool,
    },

    /// Open every link of a document, one tab each.
    ///
    /// The tabs stay open until Enter is pressed, then only they are closed.
    Open {
        /// Document to scan.
        file: PathBuf,
    },

    /// Open a single URL.
    OpenUrl {
        /// The http(s) URL to open.
        url: String,
    },
}
