// crates/darkcut-cli/src/logging.rs
//
// env_logger setup. Default level is info so progress and per-segment
// results show without configuration; RUST_LOG=debug adds segment open/seal
// and writer details.

use env_logger::Env;

/// Never panics: a second call (or a logger installed by a test harness)
/// is ignored.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
