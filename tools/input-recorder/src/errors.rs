use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cli error: {0}")]
    Cli(String),
    #[error("script error: {0}")]
    Script(String),
    #[error("illegal transition: {0}")]
    Transition(String),
    #[error("terminal error: {0}")]
    Terminal(String),
}
