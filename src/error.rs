use std::fmt;

use crate::types::Axis;

/// Boxed error returned by a [`Transport`](crate::Transport) implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum Error {
    /// The axis has no datapoint or scheme configured. Hosts should hide the control.
    UnsupportedAxis(Axis),
    /// The requested value has no raw encoding in the configured scheme.
    UnknownValue { axis: Axis, value: String },
    /// No snapshot has been received from the device yet.
    StaleSnapshot,
    Config(String),
    Transport(TransportError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAxis(axis) => write!(f, "unsupported axis: {axis}"),
            Error::UnknownValue { axis, value } => {
                write!(f, "no raw encoding for {axis} value: {value}")
            }
            Error::StaleSnapshot => write!(f, "no snapshot received yet"),
            Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Error::Transport(e) => write!(f, "transport error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e.as_ref()),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
