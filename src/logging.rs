// File: ./src/logging.rs
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Terminal logger for the binary. Only this crate's records are shown,
/// the HTTP stack stays quiet.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("plancal")
        .set_time_level(LevelFilter::Off)
        .build();

    // Fails only if a logger is already installed.
    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}
