mod gatekeeper;
pub(crate) use self::gatekeeper::Builder;

mod config;
pub use self::config::{Config, UserEntry};

mod credential;
pub use self::credential::{hash_password, HashParams};

mod directory;
pub(crate) use self::directory::Directory;

mod session;
pub(crate) use self::session::SessionManager;

mod policy;
pub(crate) use self::policy::AccessPolicy;

mod store;
pub(crate) use self::store::Store;

mod uow;
pub(crate) use self::uow::{Caller, UnitOfWork};

mod middleware;
