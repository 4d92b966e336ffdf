use async_trait::async_trait;

use crate::common::{info, Error, ErrorKind, Result};
use crate::core::middleware::Middleware;
use crate::core::policy;
use crate::core::{Store, UnitOfWork};
use crate::identity::PrincipalPayload;
use crate::protocol::SignOutResponse;

/// Executes requests that made it through authentication and authorization.
pub(crate) struct Dispatcher {}

impl Dispatcher {
    pub(crate) fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Middleware for Dispatcher {
    async fn apply(&mut self, store: &mut Store, uow: UnitOfWork) -> Result<()> {
        let Some(caller) = uow.caller().employee().cloned() else {
            return uow.reject(ErrorKind::Internal("dispatch without caller".to_owned()).into());
        };

        match uow {
            UnitOfWork::SignOut(mut work) => {
                let revoked = work
                    .caller
                    .token()
                    .map(|token| store.sessions.revoke(token))
                    .unwrap_or(false);
                info!(user_id = caller.id, revoked, "Signed out");
                work.send_response(Ok(SignOutResponse { revoked }))
            }
            UnitOfWork::Me(mut work) => work.send_response(Ok(PrincipalPayload::from(&caller))),
            UnitOfWork::ListEmployees(mut work) => {
                let employees = store
                    .directory
                    .iter()
                    .map(|account| &account.employee)
                    .filter(|employee| policy::within_scope(&caller, employee))
                    .cloned()
                    .collect();
                work.send_response(Ok(employees))
            }
            UnitOfWork::GetEmployee(mut work) => {
                let response = store
                    .directory
                    .get(work.request)
                    .map(|account| account.employee.clone())
                    .ok_or_else(|| Error::from(ErrorKind::NotFound(format!("employee {}", work.request))));
                work.send_response(response)
            }
            UnitOfWork::ChangeRole(mut work) => {
                let employee_id = work.request.employee_id;
                let role = work.request.role;
                let response = store
                    .directory
                    .set_role(employee_id, role)
                    .map(|account| account.employee.clone());
                if response.is_ok() {
                    // Tokens carry no role, but the employee must sign in again to see it.
                    let revoked = store.sessions.revoke_user(employee_id);
                    info!(by = caller.id, employee_id, %role, revoked, "Role changed");
                }
                work.send_response(response)
            }
            uow @ UnitOfWork::SignIn(_) => {
                uow.reject(ErrorKind::Internal("sign in reached dispatcher".to_owned()).into())
            }
        }
    }
}
