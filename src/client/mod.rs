//! Portal client: session store, route guard and api access.

use async_trait::async_trait;

use crate::identity::{Employee, PrincipalPayload, Role, SignInArea};
use crate::protocol::{SignInRequest, SignInResponse};
use crate::Result;

pub mod guard;
pub mod http;
pub mod notification;
pub mod route;

mod session;
pub use self::session::{Attempt, Session, SessionStore};

mod portal;
pub use self::portal::{Navigation, Portal};

pub use self::guard::{authorize, Area, Decision, GuardRule, GuardTable};

/// Gatekeeper api as seen by the portal.
#[async_trait]
pub trait Api {
    async fn sign_in(&mut self, area: SignInArea, request: SignInRequest)
        -> Result<SignInResponse>;
    async fn sign_out(&mut self) -> Result<()>;
    async fn me(&mut self) -> Result<PrincipalPayload>;
    async fn list_employees(&mut self) -> Result<Vec<Employee>>;
    async fn get_employee(&mut self, id: u64) -> Result<Employee>;
    async fn change_role(&mut self, id: u64, role: Role) -> Result<Employee>;

    /// Credential attached to authenticated requests.
    fn credential(&self) -> Option<String>;
    fn set_credential(&mut self, credential: Option<String>);
}
