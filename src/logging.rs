use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install the global logger.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between debug and info.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let env = Env::default().default_filter_or(level.to_string());
    // A second call (tests, embedders) keeps the logger that is already set.
    let _ = Builder::from_env(env).format_timestamp_millis().try_init();
}
