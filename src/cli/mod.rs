//! Command line interface of the hrgate binary.

mod root;
pub use root::{parse, ClientOptions, Command, HrGateCommand};

pub mod employees;
pub mod hash;
pub mod route;
pub mod server;
pub mod signin;
