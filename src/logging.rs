//! Console logging setup for programs driving the attacks.
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging config: {0}")]
    Config(String),
    #[error(transparent)]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Installs a stderr logger at `level`.
///
/// # Errors
/// `AlreadyInitialized` if another logger has been installed first.
pub fn init(level: LevelFilter) -> Result<Handle, LoggingError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| LoggingError::Config(e.to_string()))?;
    Ok(log4rs::init_config(config)?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        // Other tests in the process may have installed a logger already.
        let _ = init(LevelFilter::Warn);
        assert!(matches!(
            init(LevelFilter::Debug),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}
