#![allow(clippy::module_inception)]

pub mod server;

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod protocol;

pub use crate::error::HrGateError;
pub type Result<T, E = crate::error::HrGateError> = std::result::Result<T, E>;

pub use identity::{Employee, Principal, PrincipalPayload, Role, RoleSet, SignInArea};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::internal::Error> = std::result::Result<T, E>;

    pub(crate) type Error = crate::error::internal::Error;
    pub(crate) type ErrorKind = crate::error::internal::ErrorKind;

    pub(crate) type Time = chrono::DateTime<chrono::Utc>;

    pub use tracing::{debug, error, info, warn};
}
