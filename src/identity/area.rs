use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::Role;

/// Where a principal signs in from.
///
/// The administration area serves super admins and admins, every other role
/// signs in through the user area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SignInArea {
    Admin,
    User,
}

impl SignInArea {
    pub fn for_role(role: Role) -> Self {
        if role.is_administrative() {
            SignInArea::Admin
        } else {
            SignInArea::User
        }
    }

    /// Role assumed when a sign-in response omits it.
    pub fn default_role(&self) -> Role {
        match self {
            SignInArea::Admin => Role::Admin,
            SignInArea::User => Role::Employee,
        }
    }

    pub fn admits(&self, role: Role) -> bool {
        SignInArea::for_role(role) == *self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignInArea::Admin => "admin",
            SignInArea::User => "user",
        }
    }
}

impl fmt::Display for SignInArea {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission() {
        assert!(SignInArea::Admin.admits(Role::SuperAdmin));
        assert!(SignInArea::Admin.admits(Role::Admin));
        assert!(!SignInArea::Admin.admits(Role::Hr));

        for role in [Role::Hr, Role::Manager, Role::Employee] {
            assert!(SignInArea::User.admits(role));
            assert!(!SignInArea::Admin.admits(role));
        }
        assert!(!SignInArea::User.admits(Role::Admin));
    }

    #[test]
    fn defaults() {
        assert_eq!(SignInArea::Admin.default_role(), Role::Admin);
        assert_eq!(SignInArea::User.default_role(), Role::Employee);
    }
}
