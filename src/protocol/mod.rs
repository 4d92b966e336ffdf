//! Wire contract between the portal client and the gatekeeper http api.

mod message;
pub use self::message::{
    ChangeRoleRequest, ErrorBody, SignInRequest, SignInResponse, SignOutResponse,
};

pub mod path {
    use crate::identity::SignInArea;

    pub const HEALTH: &str = "/health";
    pub const SIGN_IN_ADMIN: &str = "/api/auth/signin/admin";
    pub const SIGN_IN_USER: &str = "/api/auth/signin/user";
    pub const SIGN_OUT: &str = "/api/auth/signout";
    pub const ME: &str = "/api/auth/me";
    pub const EMPLOYEES: &str = "/api/employees";
    // axum path templates.
    pub const EMPLOYEE: &str = "/api/employees/{id}";
    pub const EMPLOYEE_ROLE: &str = "/api/employees/{id}/role";

    pub fn sign_in(area: SignInArea) -> &'static str {
        match area {
            SignInArea::Admin => SIGN_IN_ADMIN,
            SignInArea::User => SIGN_IN_USER,
        }
    }

    pub fn employee(id: u64) -> String {
        format!("{}/{}", EMPLOYEES, id)
    }

    pub fn employee_role(id: u64) -> String {
        format!("{}/{}/role", EMPLOYEES, id)
    }
}
