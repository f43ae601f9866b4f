use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Install the process logger on stderr so stdout stays free for panels.
/// Repeated `-v` raises the level.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto);
}
