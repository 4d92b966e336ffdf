use std::collections::BTreeMap;
use std::fmt;

use crate::common::{ErrorKind, Result};
use crate::identity::{Employee, Role, RoleSet};

/// Operations the api exposes to authenticated callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Operation {
    SignOut,
    Me,
    ListEmployees,
    ReadEmployee,
    ChangeRole,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Operation::SignOut => "sign out",
            Operation::Me => "me",
            Operation::ListEmployees => "list employees",
            Operation::ReadEmployee => "read employee",
            Operation::ChangeRole => "change role",
        };
        f.write_str(name)
    }
}

/// Which roles may invoke which operation.
#[derive(Debug, Clone)]
pub(crate) struct AccessPolicy {
    rules: BTreeMap<Operation, RoleSet>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(Operation::SignOut, RoleSet::all());
        rules.insert(Operation::Me, RoleSet::all());
        rules.insert(Operation::ListEmployees, RoleSet::all());
        rules.insert(Operation::ReadEmployee, RoleSet::all());
        rules.insert(
            Operation::ChangeRole,
            RoleSet::from([Role::SuperAdmin, Role::Admin]),
        );
        Self { rules }
    }
}

impl AccessPolicy {
    pub(crate) fn permits(&self, operation: Operation, role: Role) -> bool {
        self.rules
            .get(&operation)
            .map(|roles| roles.contains(role))
            .unwrap_or(false)
    }

    pub(crate) fn check(&self, operation: Operation, caller: &Employee) -> Result<()> {
        if self.permits(operation, caller.role) {
            Ok(())
        } else {
            Err(ErrorKind::Forbidden(format!("{} may not {}", caller.role, operation)).into())
        }
    }
}

/// How far a caller can see into the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reach {
    Everything,
    Organization,
    Department,
    Team,
    Own,
}

pub(crate) fn reach(caller: &Employee) -> Reach {
    match caller.role {
        Role::SuperAdmin => Reach::Everything,
        Role::Admin | Role::Hr => Reach::Organization,
        Role::Manager if caller.department_id.is_some() => Reach::Department,
        Role::Manager if caller.team_id.is_some() => Reach::Team,
        Role::Manager | Role::Employee => Reach::Own,
    }
}

/// Whether `target` lies inside the caller's scope. Callers always see themselves.
pub(crate) fn within_scope(caller: &Employee, target: &Employee) -> bool {
    if caller.id == target.id {
        return true;
    }
    let same_organization = caller.organization_id == target.organization_id;

    match reach(caller) {
        Reach::Everything => true,
        Reach::Organization => same_organization,
        Reach::Department => same_organization && caller.department_id == target.department_id,
        Reach::Team => same_organization && caller.team_id == target.team_id,
        Reach::Own => false,
    }
}

pub(crate) fn check_scope(caller: &Employee, target: &Employee) -> Result<()> {
    if within_scope(caller, target) {
        Ok(())
    } else {
        Err(ErrorKind::Forbidden(format!("employee {} is outside of scope", target.id)).into())
    }
}

/// Extra constraints of a role change on top of the operation table.
pub(crate) fn check_role_change(caller: &Employee, target: &Employee, role: Role) -> Result<()> {
    check_scope(caller, target)?;

    let touches_super_admin = role == Role::SuperAdmin || target.role == Role::SuperAdmin;
    if touches_super_admin && caller.role != Role::SuperAdmin {
        return Err(ErrorKind::Forbidden("only a super admin may grant or revoke super admin".into()).into());
    }
    Ok(())
}
