use clap::Args;

use crate::client::http::HttpClient;
use crate::client::Portal;
use crate::identity::{Employee, Role};
use crate::Result;

/// Employees visible to the signed in user
#[derive(Args, Debug)]
pub struct EmployeesCommand {
    /// Show a single employee
    pub id: Option<u64>,
    /// Assign a new role to the employee (e.g. MANAGER)
    #[arg(long, requires = "id")]
    pub set_role: Option<String>,
}

impl EmployeesCommand {
    pub async fn run(self, client: HttpClient) -> Result<()> {
        let mut portal = Portal::new(client);
        portal.resume().await?;

        match (self.id, self.set_role) {
            (Some(id), Some(role)) => {
                let role: Role = role.parse()?;
                print_employee(&portal.change_role(id, role).await?);
            }
            (Some(id), None) => print_employee(&portal.employee(id).await?),
            (None, _) => {
                for employee in portal.employees().await? {
                    print_employee(&employee);
                }
            }
        }

        Ok(())
    }
}

fn print_employee(employee: &Employee) {
    println!(
        "{}\t{}\t{}\t{}\t{}\t{} <{}>",
        employee.id,
        employee.role,
        employee.organization_id,
        employee.department_id.as_deref().unwrap_or("-"),
        employee.team_id.as_deref().unwrap_or("-"),
        employee.name,
        employee.email,
    );
}
