pub(crate) mod internal;

use std::fmt;
use std::io;

use crate::error::internal::ErrorKind;

#[derive(Debug)]
pub enum HrGateError {
    // Credential missing, rejected or no longer valid (HTTP 401).
    Unauthenticated { message: Option<String> },
    // Authenticated, but the role or scope does not permit the request (HTTP 403).
    Forbidden { message: Option<String> },
    NotFound { message: Option<String> },
    // Role value outside the closed role set.
    InvalidRole(String),
    // Any other non-success response from the api.
    Api { status: u16, message: Option<String> },
    Http(reqwest::Error),
    Io(io::Error),
    Yaml(serde_yaml::Error),
    Internal(internal::Error),
}

impl HrGateError {
    /// Human readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            HrGateError::Unauthenticated { message }
            | HrGateError::Forbidden { message }
            | HrGateError::NotFound { message }
            | HrGateError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, HrGateError::Unauthenticated { .. })
    }
}

impl fmt::Display for HrGateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HrGateError::Unauthenticated { message } => {
                write!(f, "unauthenticated")?;
                write_message(f, message)
            }
            HrGateError::Forbidden { message } => {
                write!(f, "forbidden")?;
                write_message(f, message)
            }
            HrGateError::NotFound { message } => {
                write!(f, "not found")?;
                write_message(f, message)
            }
            HrGateError::InvalidRole(role) => write!(f, "invalid role {:?}", role),
            HrGateError::Api { status, message } => {
                write!(f, "api error status={}", status)?;
                write_message(f, message)
            }
            HrGateError::Http(err) => err.fmt(f),
            HrGateError::Io(err) => err.fmt(f),
            HrGateError::Yaml(err) => err.fmt(f),
            HrGateError::Internal(err) => err.fmt(f),
        }
    }
}

fn write_message(f: &mut fmt::Formatter, message: &Option<String>) -> fmt::Result {
    match message {
        Some(message) => write!(f, ": {}", message),
        None => Ok(()),
    }
}

impl std::error::Error for HrGateError {}

impl From<internal::Error> for HrGateError {
    fn from(err: internal::Error) -> Self {
        let message = Some(err.to_string());
        match err.into_kind() {
            ErrorKind::Unauthenticated(_) | ErrorKind::InvalidCredentials => {
                HrGateError::Unauthenticated { message }
            }
            ErrorKind::Forbidden(_) => HrGateError::Forbidden { message },
            ErrorKind::NotFound(_) => HrGateError::NotFound { message },
            ErrorKind::Io(err) => HrGateError::Io(err),
            ErrorKind::Yaml(err) => HrGateError::Yaml(err),
            kind => HrGateError::Internal(internal::Error::from(kind)),
        }
    }
}

impl From<reqwest::Error> for HrGateError {
    fn from(err: reqwest::Error) -> Self {
        HrGateError::Http(err)
    }
}

impl From<io::Error> for HrGateError {
    fn from(err: io::Error) -> Self {
        HrGateError::Io(err)
    }
}

impl From<serde_yaml::Error> for HrGateError {
    fn from(err: serde_yaml::Error) -> Self {
        HrGateError::Yaml(err)
    }
}
