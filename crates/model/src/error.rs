use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The provider rejected the configured credential.
    InvalidCredential,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::InvalidCredential => write!(f, "Invalid credential"),
            ErrorKind::Other => write!(f, "Other"),
        }
    }
}
