use crate::client::notification::{Level, Notifications, SIGN_IN_FAILED};
use crate::client::route::{landing_route, sign_in_route};
use crate::client::{Api, Attempt, Decision, GuardTable, Session, SessionStore};
use crate::common::{debug, info, warn};
use crate::identity::{Employee, Principal, Role, SignInArea};
use crate::protocol::SignInRequest;
use crate::Result;

/// Outcome of a navigation or of an action that ends in one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(String),
    Redirect(String),
}

impl Navigation {
    pub fn route(&self) -> &str {
        match self {
            Navigation::Render(route) | Navigation::Redirect(route) => route,
        }
    }
}

/// Top-level client state container.
///
/// Owns the session store exclusively. Views read the session through it and
/// every api call goes through it so that a rejected credential signs the
/// user out locally.
pub struct Portal<A> {
    api: A,
    store: SessionStore,
    guards: GuardTable,
    notifications: Notifications,
    // Credential the current session was established with.
    credential: Option<String>,
}

impl<A: Api> Portal<A> {
    pub fn new(api: A) -> Self {
        Portal::with_guards(api, GuardTable::default())
    }

    pub fn with_guards(api: A, guards: GuardTable) -> Self {
        Self {
            credential: api.credential(),
            api,
            store: SessionStore::new(),
            guards,
            notifications: Notifications::new(),
        }
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn dismiss(&mut self, notification_id: u64) -> bool {
        self.notifications.dismiss(notification_id)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolve navigation to `path` against the guard table.
    pub fn navigate(&self, path: &str) -> Navigation {
        match self.guards.evaluate(self.store.session(), path) {
            Decision::Allow => Navigation::Render(path.to_owned()),
            Decision::Redirect(target) => {
                debug!(path, %target, "Navigation redirected");
                Navigation::Redirect(target)
            }
        }
    }

    pub async fn sign_in(&mut self, area: SignInArea, request: SignInRequest) -> Navigation {
        let attempt = self.store.sign_in_start();
        info!(%area, email = %request.email, "Sign in");

        let result = self.api.sign_in(area, request).await.and_then(|signed_in| {
            signed_in
                .principal
                .into_principal(area.default_role())
        });

        self.complete_sign_in(attempt, area, result)
    }

    /// Apply the outcome of a sign-in attempt started with `sign_in_start`.
    ///
    /// Unless the attempt is accepted, the api goes back to the credential of
    /// the session that is still shown.
    pub fn complete_sign_in(
        &mut self,
        attempt: Attempt,
        area: SignInArea,
        result: Result<Principal>,
    ) -> Navigation {
        match result {
            Ok(principal) => {
                let role = principal.role;
                if self.store.sign_in_success(attempt, principal) {
                    info!(%role, "Signed in");
                    self.credential = self.api.credential();
                    return Navigation::Redirect(landing_route(role));
                }
                debug!(%role, "Superseded sign in discarded");
            }
            Err(err) => {
                let message = err
                    .server_message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| SIGN_IN_FAILED.to_owned());
                warn!(%err, "Sign in failed");

                if self.store.sign_in_failure(attempt, message.clone()) {
                    self.notifications.push(Level::Error, message);
                }
            }
        }

        self.api.set_credential(self.credential.clone());
        Navigation::Render(sign_in_route(area).to_owned())
    }

    pub async fn sign_out(&mut self) -> Navigation {
        let area = self
            .store
            .principal()
            .map(|principal| SignInArea::for_role(principal.role))
            .unwrap_or(SignInArea::User);

        if self.store.session().is_authenticated() {
            if let Err(err) = self.api.sign_out().await {
                warn!(%err, "Server side sign out failed");
            }
        }
        self.end_session();

        Navigation::Redirect(sign_in_route(area).to_owned())
    }

    /// Restore a session from a credential the api already holds, e.g. a saved token.
    ///
    /// Runs as a sign-in attempt, so a concurrent sign in or sign out wins.
    pub async fn resume(&mut self) -> Result<&Session> {
        let attempt = self.store.sign_in_start();

        let payload = self.api.me().await;
        let result = self
            .observe(payload)
            .and_then(|payload| payload.into_principal(SignInArea::User.default_role()));

        match result {
            Ok(principal) => {
                if self.store.sign_in_success(attempt, principal) {
                    self.credential = self.api.credential();
                }
                Ok(self.store.session())
            }
            Err(err) => {
                self.store.sign_in_failure(attempt, err.to_string());
                Err(err)
            }
        }
    }

    /// Re-read the principal from the server and pick up role or scope changes.
    pub async fn refresh(&mut self) -> Result<&Session> {
        let area = self
            .store
            .principal()
            .map(|principal| SignInArea::for_role(principal.role))
            .unwrap_or(SignInArea::User);

        let payload = self.api.me().await;
        let principal = self
            .observe(payload)?
            .into_principal(area.default_role());

        match principal {
            Ok(principal) => {
                self.store.replace_principal(principal);
            }
            Err(err) => {
                // A role we cannot interpret must not keep the old one alive.
                warn!(%err, "Refreshed principal rejected");
                self.end_session();
                return Err(err);
            }
        }
        Ok(self.store.session())
    }

    pub async fn employees(&mut self) -> Result<Vec<Employee>> {
        let result = self.api.list_employees().await;
        self.observe(result)
    }

    pub async fn employee(&mut self, id: u64) -> Result<Employee> {
        let result = self.api.get_employee(id).await;
        self.observe(result)
    }

    pub async fn change_role(&mut self, id: u64, role: Role) -> Result<Employee> {
        let result = self.api.change_role(id, role).await;
        self.observe(result)
    }

    // The server no longer accepts our credential, so the session is over.
    fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_unauthenticated() && self.store.session().is_authenticated() {
                info!("Session rejected by server, signing out");
                self.end_session();
            }
        }
        result
    }

    fn end_session(&mut self) {
        self.store.sign_out();
        self.credential = None;
        self.api.set_credential(None);
    }
}
