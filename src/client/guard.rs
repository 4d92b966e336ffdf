//! Route guard.
//!
//! Every protected area of the portal is described by a [`GuardRule`] in one
//! [`GuardTable`]. Evaluation is a pure function of the session and the rule:
//! it never fails, never mutates and always answers with a [`Decision`].
//!
//! The guard only decides what to render. Access to data is enforced again by
//! the gatekeeper on every api request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::route::{self, ADMIN_SIGN_IN, USER_SIGN_IN};
use crate::client::Session;
use crate::identity::{Role, RoleSet};

/// Role scoped section of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Admin,
    Hr,
    Manager,
    Employee,
}

impl Area {
    pub const ALL: [Area; 4] = [Area::Admin, Area::Hr, Area::Manager, Area::Employee];

    pub fn prefix(&self) -> &'static str {
        match self {
            Area::Admin => "/admin",
            Area::Hr => "/hr",
            Area::Manager => "/manager",
            Area::Employee => "/employee",
        }
    }

    /// Area a path belongs to. `None` for public paths.
    ///
    /// The path is normalized first, so every spelling of a protected path
    /// lands in its area.
    pub fn for_path(path: &str) -> Option<Area> {
        let path = route::normalize(path);
        Area::ALL
            .iter()
            .copied()
            .find(|area| route::is_under(&path, area.prefix()))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.prefix()[1..])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardRule {
    pub allowed_roles: RoleSet,
    pub redirect_target: String,
}

impl GuardRule {
    pub fn new(allowed_roles: impl Into<RoleSet>, redirect_target: impl Into<String>) -> Self {
        Self {
            allowed_roles: allowed_roles.into(),
            redirect_target: redirect_target.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Redirect(String),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `session` may enter the view tree guarded by `rule`.
pub fn authorize(session: &Session, rule: &GuardRule) -> Decision {
    match session.principal() {
        Some(principal) if rule.allowed_roles.contains(principal.role) => Decision::Allow,
        _ => Decision::Redirect(rule.redirect_target.clone()),
    }
}

/// Guard configuration for all areas.
///
/// An area without a rule is treated as closed to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuardTable {
    rules: BTreeMap<Area, GuardRule>,
}

impl Default for GuardTable {
    fn default() -> Self {
        GuardTable::empty()
            .with_rule(
                Area::Admin,
                GuardRule::new([Role::SuperAdmin, Role::Admin], ADMIN_SIGN_IN),
            )
            .with_rule(Area::Hr, GuardRule::new([Role::Hr], USER_SIGN_IN))
            .with_rule(Area::Manager, GuardRule::new([Role::Manager], USER_SIGN_IN))
            .with_rule(Area::Employee, GuardRule::new([Role::Employee], USER_SIGN_IN))
    }
}

impl GuardTable {
    pub fn empty() -> Self {
        GuardTable {
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, area: Area, rule: GuardRule) -> Self {
        self.rules.insert(area, rule);
        self
    }

    pub fn rule(&self, area: Area) -> Option<&GuardRule> {
        self.rules.get(&area)
    }

    pub fn evaluate_area(&self, session: &Session, area: Area) -> Decision {
        match self.rule(area) {
            Some(rule) => authorize(session, rule),
            None => Decision::Redirect(USER_SIGN_IN.to_owned()),
        }
    }

    /// Decide navigation to `path`. Paths outside every area are public.
    pub fn evaluate(&self, session: &Session, path: &str) -> Decision {
        match Area::for_path(path) {
            Some(area) => self.evaluate_area(session, area),
            None => Decision::Allow,
        }
    }
}
