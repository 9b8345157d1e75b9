use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("domain error: {0}")]
    Domain(String),
    #[error("t={time_sec}s is outside the propagation window: {reason}")]
    OutOfRange { time_sec: f64, reason: String },
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        Error::Domain(msg.into())
    }
}

impl From<sgp4::TleError> for Error {
    fn from(err: sgp4::TleError) -> Self {
        Error::Configuration(format!("invalid tle: {}", err))
    }
}

impl From<sgp4::ElementsError> for Error {
    fn from(err: sgp4::ElementsError) -> Self {
        Error::Configuration(format!("elements error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
