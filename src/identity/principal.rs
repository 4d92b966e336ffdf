use serde::{Deserialize, Serialize};

use crate::identity::Role;
use crate::Result;

/// The authenticated identity held by a client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: u64,
    pub role: Role,
    pub organization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub name: String,
    pub email: String,
}

/// Principal as it arrives from a sign-in or `me` response.
///
/// `role` stays a raw string here; it only becomes a [`Role`] through
/// [`PrincipalPayload::into_principal`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalPayload {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub organization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl PrincipalPayload {
    /// Convert into a principal.
    ///
    /// An absent role falls back to `default_role`. A present role that is not
    /// one of the known roles is an error.
    pub fn into_principal(self, default_role: Role) -> Result<Principal> {
        let role = match self.role.as_deref() {
            None => default_role,
            Some(raw) => raw.parse()?,
        };

        Ok(Principal {
            id: self.id,
            role,
            organization_id: self.organization_id,
            department_id: self.department_id,
            team_id: self.team_id,
            name: self.name,
            email: self.email,
        })
    }
}

impl From<Principal> for PrincipalPayload {
    fn from(principal: Principal) -> Self {
        PrincipalPayload {
            id: principal.id,
            role: Some(principal.role.as_str().to_owned()),
            organization_id: principal.organization_id,
            department_id: principal.department_id,
            team_id: principal.team_id,
            name: principal.name,
            email: principal.email,
        }
    }
}
