use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Installs a terminal logger at `level`. A second call keeps the first logger and returns
/// false.
pub fn init_logging(level: LevelFilter) -> bool {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Error)
        .build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto).is_ok()
}

/// `error`, `warn`, `info`, `debug` or `trace`; anything else is `info`
pub fn level_from_str(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(level_from_str("DEBUG"), LevelFilter::Debug);
        assert_eq!(level_from_str("warn"), LevelFilter::Warn);
        assert_eq!(level_from_str("verbose"), LevelFilter::Info);
    }

    #[test]
    fn test_second_init_is_refused() {
        init_logging(LevelFilter::Warn);
        assert!(!init_logging(LevelFilter::Warn));
    }
}
