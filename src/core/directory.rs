use std::collections::{BTreeMap, HashMap};

use crate::common::{ErrorKind, Result};
use crate::core::{credential, UserEntry};
use crate::identity::{Employee, Role};

/// Employee account known to the gatekeeper.
#[derive(Clone)]
pub(crate) struct Account {
    pub(crate) employee: Employee,
    password_hash: String,
}

impl Account {
    pub(crate) fn id(&self) -> u64 {
        self.employee.id
    }

    pub(crate) fn role(&self) -> Role {
        self.employee.role
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.employee.id)
            .field("role", &self.employee.role)
            .finish_non_exhaustive()
    }
}

/// In-memory employee directory, the source of truth for roles and scope.
#[derive(Debug, Default)]
pub(crate) struct Directory {
    accounts: BTreeMap<u64, Account>,
    // Normalized email to id.
    by_email: HashMap<String, u64>,
    // Stands in for the password hash of unknown emails.
    decoy_hash: String,
}

impl Directory {
    pub(crate) fn from_entries(entries: Vec<UserEntry>) -> Result<Self> {
        let mut directory = Directory::default();

        for entry in entries {
            credential::validate_hash(&entry.password_hash).map_err(|err| {
                ErrorKind::Config(format!("user {} has unusable password hash: {}", entry.id, err))
            })?;

            let email = normalize_email(&entry.email);
            if directory.accounts.contains_key(&entry.id) {
                return Err(ErrorKind::Config(format!("duplicate user id {}", entry.id)).into());
            }
            if directory.by_email.contains_key(&email) {
                return Err(ErrorKind::Config(format!("duplicate user email {}", entry.email)).into());
            }

            let account = Account {
                employee: Employee {
                    id: entry.id,
                    role: entry.role,
                    organization_id: entry.organization_id,
                    department_id: entry.department_id,
                    team_id: entry.team_id,
                    name: entry.name,
                    email: entry.email,
                },
                password_hash: entry.password_hash,
            };
            directory.by_email.insert(email, account.id());
            directory.accounts.insert(account.id(), account);
        }

        let reference = directory
            .accounts
            .values()
            .next()
            .map(|account| account.password_hash.as_str());
        directory.decoy_hash = credential::decoy_hash(reference)?;

        Ok(directory)
    }

    pub(crate) fn get(&self, id: u64) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub(crate) fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.by_email
            .get(&normalize_email(email))
            .and_then(|id| self.accounts.get(id))
    }

    /// Account owning `email` if `password` matches.
    ///
    /// Exactly one password verification runs whether or not the email is known.
    pub(crate) fn authenticate(&self, email: &str, password: &str) -> Option<&Account> {
        let (account, phc) = self.stored_hash(email);
        let verified = credential::verify_password(phc, password);
        account.filter(|_| verified)
    }

    fn stored_hash(&self, email: &str) -> (Option<&Account>, &str) {
        match self.find_by_email(email) {
            Some(account) => (Some(account), account.password_hash.as_str()),
            None => (None, self.decoy_hash.as_str()),
        }
    }

    /// Accounts in id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.len()
    }

    pub(crate) fn set_role(&mut self, id: u64, role: Role) -> Result<&Account> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| ErrorKind::NotFound(format!("employee {}", id)))?;
        account.employee.role = role;
        Ok(account)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use crate::core::credential::{hash_password, light_params};

    pub(crate) const PASSWORD: &str = "secret";

    pub(crate) fn entry(
        id: u64,
        role: Role,
        organization_id: &str,
        department_id: Option<&str>,
        team_id: Option<&str>,
    ) -> UserEntry {
        UserEntry {
            id,
            name: format!("user{}", id),
            email: format!("user{}@{}.test", id, organization_id),
            password_hash: hash_password(PASSWORD, &light_params()).unwrap(),
            role,
            organization_id: organization_id.to_owned(),
            department_id: department_id.map(str::to_owned),
            team_id: team_id.map(str::to_owned),
        }
    }

    /// Two organizations with every role represented.
    ///
    /// | id | role        | org    | department | team   |
    /// |----|-------------|--------|------------|--------|
    /// | 1  | SUPER_ADMIN | acme   |            |        |
    /// | 2  | ADMIN       | acme   |            |        |
    /// | 3  | HR          | acme   | people     |        |
    /// | 4  | MANAGER     | acme   | ops        | red    |
    /// | 5  | EMPLOYEE    | acme   | ops        | red    |
    /// | 6  | EMPLOYEE    | acme   | sales      | blue   |
    /// | 7  | ADMIN       | globex |            |        |
    /// | 8  | EMPLOYEE    | globex | ops        |        |
    /// | 9  | MANAGER     | acme   |            | blue   |
    pub(crate) fn entries() -> Vec<UserEntry> {
        vec![
            entry(1, Role::SuperAdmin, "acme", None, None),
            entry(2, Role::Admin, "acme", None, None),
            entry(3, Role::Hr, "acme", Some("people"), None),
            entry(4, Role::Manager, "acme", Some("ops"), Some("red")),
            entry(5, Role::Employee, "acme", Some("ops"), Some("red")),
            entry(6, Role::Employee, "acme", Some("sales"), Some("blue")),
            entry(7, Role::Admin, "globex", None, None),
            entry(8, Role::Employee, "globex", Some("ops"), None),
            entry(9, Role::Manager, "acme", None, Some("blue")),
        ]
    }

    pub(crate) fn directory() -> Directory {
        Directory::from_entries(entries()).unwrap()
    }
}
