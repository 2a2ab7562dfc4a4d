// crates/darkcut-cli/src/main.rs
//
// Exit status:
//   0 — run completed (individual segments may have been skipped)
//   1 — bad arguments or configuration, nothing was opened
//   2 — input could not be opened or scanned

mod cli;
mod config;
mod logging;
mod run;

use std::ffi::OsString;
use std::process::ExitCode;

use crate::cli::Rejected;
use crate::config::Config;

/// How a run ends, before it is turned into output and a status code.
#[derive(Debug, PartialEq)]
enum Exit {
    Completed,
    /// --help / --version text.
    Info(String),
    /// Wrong argument count, or a value that does not parse.
    Usage(Option<String>),
    /// FFmpeg init, open, or scan failed.
    Fatal,
}

impl Exit {
    fn code(&self) -> u8 {
        match self {
            Exit::Completed | Exit::Info(_) => 0,
            Exit::Usage(_) => 1,
            Exit::Fatal => 2,
        }
    }
}

fn configure<I, T, E>(args: I, env: E) -> Result<Config, Exit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    E: Fn(&str) -> Option<String>,
{
    let args = match cli::parse_from(args) {
        Ok(args) => args,
        Err(Rejected::Info(text)) => return Err(Exit::Info(text)),
        Err(Rejected::Usage) => return Err(Exit::Usage(None)),
    };
    Config::resolve(args, env).map_err(|e| Exit::Usage(Some(e.to_string())))
}

fn execute(cfg: &Config) -> Exit {
    if let Err(e) = ffmpeg_the_third::init() {
        log::error!("FFmpeg init failed: {e}");
        return Exit::Fatal;
    }
    match run::run(cfg) {
        Ok(_) => Exit::Completed,
        Err(e) => {
            log::error!("{e:#}");
            Exit::Fatal
        }
    }
}

fn main() -> ExitCode {
    let program = std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| "darkcut".to_string());

    let exit = match configure(std::env::args_os(), |key| std::env::var(key).ok()) {
        Ok(cfg) => {
            logging::init();
            execute(&cfg)
        }
        Err(exit) => exit,
    };

    match &exit {
        Exit::Info(text) => print!("{text}"),
        Exit::Usage(reason) => {
            if let Some(reason) = reason {
                println!("error: {reason}");
            }
            println!("{}", cli::usage(&program));
        }
        Exit::Completed | Exit::Fatal => {}
    }
    ExitCode::from(exit.code())
}
