// crates/darkcut-cli/src/cli.rs
//
// Positional command line:
//   darkcut <input_video_path> <output_video_prefix> <threshold>
//
// Exactly three positionals. Anything else prints the one-line usage to
// stdout and exits non-zero; --help / --version print and exit 0. The
// threshold is kept as text here and validated in config.rs, so a bad
// number gets our diagnostic instead of clap's.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "darkcut",
    version,
    about = "Export every run of dark frames in a video as its own clip"
)]
pub struct Cli {
    /// Video to scan
    pub input: PathBuf,

    /// Output prefix; files are written as <prefix>_segment<N>.<ext>
    pub output_prefix: PathBuf,

    /// Mean luma cut-off on a 0-255 scale; frames at or below it are dark
    #[arg(allow_negative_numbers = true)]
    pub threshold: String,
}

#[derive(Debug, PartialEq)]
pub enum Rejected {
    /// --help or --version: print the text, exit 0.
    Info(String),
    /// Wrong shape: print usage, exit 1.
    Usage,
}

pub fn parse_from<I, T>(args: I) -> Result<Cli, Rejected>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Rejected::Info(e.to_string()),
        _ => Rejected::Usage,
    })
}

pub fn usage(program: &str) -> String {
    format!("Usage: {program} <input_video_path> <output_video_prefix> <threshold>")
}
