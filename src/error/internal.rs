use std::error;
use std::fmt;
use std::io;

use backtrace::Backtrace;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    Yaml(serde_yaml::Error),
    // Missing, unknown, expired or revoked credential.
    Unauthenticated(String),
    // Wrong password, unknown email or wrong sign-in area.
    InvalidCredentials,
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Config(String),
    PasswordHash(String),
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::Yaml(err) => err.fmt(f),
            ErrorKind::Unauthenticated(reason) => write!(f, "unauthenticated: {}", reason),
            ErrorKind::InvalidCredentials => write!(f, "invalid credentials"),
            ErrorKind::Forbidden(reason) => write!(f, "forbidden: {}", reason),
            ErrorKind::NotFound(what) => write!(f, "{} not found", what),
            ErrorKind::BadRequest(description) => write!(f, "bad request. {}", description),
            ErrorKind::Config(description) => write!(f, "invalid configuration. {}", description),
            ErrorKind::PasswordHash(description) => {
                write!(f, "password hash error. {}", description)
            }
            ErrorKind::Internal(description) => write!(f, "internal error. {}", description),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from(ErrorKind::Io(err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::from(ErrorKind::Yaml(err))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    // Whether the error is the caller's fault rather than the server's.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Unauthenticated(_)
                | ErrorKind::InvalidCredentials
                | ErrorKind::Forbidden(_)
                | ErrorKind::NotFound(_)
                | ErrorKind::BadRequest(_)
        )
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl error::Error for Error {}
