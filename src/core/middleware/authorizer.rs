use async_trait::async_trait;

use crate::common::{warn, ErrorKind, Result};
use crate::core::middleware::Middleware;
use crate::core::policy::{self, Reach};
use crate::core::{AccessPolicy, Store, UnitOfWork};
use crate::identity::Employee;

/// Checks the operation table and the caller's scope before dispatching.
pub(crate) struct Authorizer<MW> {
    policy: AccessPolicy,
    next: MW,
}

impl<MW> Authorizer<MW> {
    pub(crate) fn new(policy: AccessPolicy, next: MW) -> Self {
        Self { policy, next }
    }

    fn authorize(&self, store: &Store, caller: &Employee, uow: &UnitOfWork) -> Result<()> {
        if let Some(operation) = uow.operation() {
            self.policy.check(operation, caller)?;
        }

        let Some(target_id) = uow.target() else {
            return Ok(());
        };
        let target = match store.directory.get(target_id) {
            Some(account) => &account.employee,
            // Only callers who see everything learn that an id does not exist.
            None if policy::reach(caller) == Reach::Everything => {
                return Err(ErrorKind::NotFound(format!("employee {}", target_id)).into())
            }
            None => {
                return Err(ErrorKind::Forbidden(format!(
                    "employee {} is outside of scope",
                    target_id
                ))
                .into())
            }
        };

        match uow {
            UnitOfWork::ChangeRole(work) => {
                policy::check_role_change(caller, target, work.request.role)
            }
            _ => policy::check_scope(caller, target),
        }
    }
}

#[async_trait]
impl<MW> Middleware for Authorizer<MW>
where
    MW: Middleware + Send + 'static,
{
    async fn apply(&mut self, store: &mut Store, uow: UnitOfWork) -> Result<()> {
        let Some(caller) = uow.caller().employee() else {
            return uow.reject(ErrorKind::Unauthenticated("not authenticated".to_owned()).into());
        };

        match self.authorize(store, caller, &uow) {
            Ok(()) => self.next.apply(store, uow).await,
            Err(err) => {
                warn!(caller = caller.id, role=%caller.role, ?uow, "{}", err);
                uow.reject(err)
            }
        }
    }
}
