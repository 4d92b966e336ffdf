use crate::common::debug;
use crate::identity::Principal;

/// Who is currently signed in, if anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    principal: Option<Principal>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { principal: None }
    }

    pub fn signed_in(principal: Principal) -> Self {
        Session {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// Tag of a single sign-in attempt.
///
/// Completions carrying a tag other than the latest one are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attempt(u64);

/// Owner of the client session and of the sign-in progress around it.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: Session,
    loading: bool,
    error: Option<String>,
    // Tag handed out by the most recent sign_in_start.
    latest: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.session.principal()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn sign_in_start(&mut self) -> Attempt {
        self.latest += 1;
        self.loading = true;
        Attempt(self.latest)
    }

    /// Store the principal. Returns false when the attempt was superseded.
    pub fn sign_in_success(&mut self, attempt: Attempt, principal: Principal) -> bool {
        if !self.is_current(attempt) {
            debug!(?attempt, "Discard stale sign in success");
            return false;
        }
        self.session = Session::signed_in(principal);
        self.loading = false;
        self.error = None;
        true
    }

    /// Record a failed attempt. Any previous principal is kept.
    pub fn sign_in_failure(&mut self, attempt: Attempt, message: impl Into<String>) -> bool {
        if !self.is_current(attempt) {
            debug!(?attempt, "Discard stale sign in failure");
            return false;
        }
        self.loading = false;
        self.error = Some(message.into());
        true
    }

    /// Forget the principal and every in-flight attempt.
    pub fn sign_out(&mut self) {
        self.latest += 1;
        self.session = Session::anonymous();
        self.loading = false;
        self.error = None;
    }

    /// Swap in refreshed principal data, e.g. after a role change.
    ///
    /// Ignored while signed out so that a late refresh cannot sign anyone in.
    pub fn replace_principal(&mut self, principal: Principal) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }
        self.session = Session::signed_in(principal);
        true
    }

    fn is_current(&self, attempt: Attempt) -> bool {
        self.loading && attempt.0 == self.latest
    }
}
