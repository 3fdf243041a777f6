use std::fmt;

#[derive(Debug)]
pub enum Error {
    InvalidMode(String),
    InvalidFanRate(String),
    InvalidPollInterval(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMode(name) => write!(f, "invalid mode: {name}"),
            Error::InvalidFanRate(name) => write!(f, "invalid fan rate: {name}"),
            Error::InvalidPollInterval(minutes) => {
                write!(f, "invalid poll interval: {minutes} minutes")
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
