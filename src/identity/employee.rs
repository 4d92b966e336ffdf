use serde::{Deserialize, Serialize};

use crate::identity::{PrincipalPayload, Role};

/// Employee record as served by the directory api.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
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

impl From<&Employee> for PrincipalPayload {
    fn from(employee: &Employee) -> Self {
        PrincipalPayload {
            id: employee.id,
            role: Some(employee.role.as_str().to_owned()),
            organization_id: employee.organization_id.clone(),
            department_id: employee.department_id.clone(),
            team_id: employee.team_id.clone(),
            name: employee.name.clone(),
            email: employee.email.clone(),
        }
    }
}
