//! Identity types shared by the portal client and the gatekeeper server.

mod role;
pub use self::role::{Role, RoleSet};

mod principal;
pub use self::principal::{Principal, PrincipalPayload};

mod employee;
pub use self::employee::Employee;

mod area;
pub use self::area::SignInArea;
