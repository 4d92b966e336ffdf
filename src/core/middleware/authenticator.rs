use async_trait::async_trait;
use chrono::Utc;

use crate::common::{info, warn, ErrorKind, Result, Time};
use crate::core::middleware::Middleware;
use crate::core::uow::SignIn;
use crate::core::{Caller, Store, UnitOfWork};
use crate::identity::PrincipalPayload;
use crate::protocol::SignInResponse;

/// Verifies credentials on sign in and resolves bearer tokens on everything else.
pub(crate) struct Authenticator<MW> {
    next: MW,
}

impl<MW> Authenticator<MW> {
    pub(crate) fn new(next: MW) -> Self {
        Self { next }
    }

    fn sign_in(&self, store: &mut Store, sign_in: &SignIn, now: Time) -> Result<SignInResponse> {
        let SignIn { area, request } = sign_in;

        let account = match store.directory.authenticate(&request.email, &request.password) {
            Some(account) => account,
            None => {
                info!(email=%request.email, %area, "Invalid credentials");
                return Err(ErrorKind::InvalidCredentials.into());
            }
        };
        // Wrong area answers like a wrong password.
        if !area.admits(account.role()) {
            warn!(user_id = account.id(), role=%account.role(), %area, "Sign in from wrong area");
            return Err(ErrorKind::InvalidCredentials.into());
        }

        let principal = PrincipalPayload::from(&account.employee);
        let grant = store.sessions.issue(account.id(), now);
        info!(user_id = principal.id, %area, "Signed in");

        Ok(SignInResponse {
            token: grant.token,
            expires_at: grant.expires_at,
            principal,
        })
    }

    // Resolve the caller of `uow` to an employee in the directory.
    fn authenticate(&self, store: &mut Store, caller: &Caller, now: Time) -> Result<Caller> {
        let token = caller
            .token()
            .ok_or_else(|| ErrorKind::Unauthenticated("missing bearer token".to_owned()))?;

        let user_id = store
            .sessions
            .validate(token, now)
            .ok_or_else(|| ErrorKind::Unauthenticated("invalid or expired token".to_owned()))?;

        match store.directory.get(user_id) {
            Some(account) => Ok(Caller::Authenticated {
                token: token.to_owned(),
                employee: account.employee.clone(),
            }),
            None => {
                warn!(user_id, "Session of unknown user");
                store.sessions.revoke_user(user_id);
                Err(ErrorKind::Unauthenticated("invalid or expired token".to_owned()).into())
            }
        }
    }
}

#[async_trait]
impl<MW> Middleware for Authenticator<MW>
where
    MW: Middleware + Send + 'static,
{
    async fn apply(&mut self, store: &mut Store, uow: UnitOfWork) -> Result<()> {
        let now = Utc::now();

        match uow {
            UnitOfWork::SignIn(mut work) => {
                let response = self.sign_in(store, &work.request, now);
                work.send_response(response)
            }
            mut uow => match self.authenticate(store, uow.caller(), now) {
                Ok(caller) => {
                    uow.set_caller(caller);
                    self.next.apply(store, uow).await
                }
                Err(err) => uow.reject(err),
            },
        }
    }
}
