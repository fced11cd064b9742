pub mod app;
pub mod domain;
pub mod infra;
pub mod ui;

use tracing::Level;

/// Install the global log subscriber. Output goes to stderr so it never mixes with reports on
/// stdout.
pub fn init(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
