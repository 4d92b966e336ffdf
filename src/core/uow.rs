use std::fmt;

use tokio::sync::oneshot;

use crate::common::{Error, ErrorKind, Result};
use crate::core::policy::Operation;
use crate::core::session::SessionToken;
use crate::identity::{Employee, PrincipalPayload, Role, SignInArea};
use crate::protocol::{SignInRequest, SignInResponse, SignOutResponse};

/// Who sent a request, as far as the gatekeeper knows at a given stage.
#[derive(Debug, Clone)]
pub(crate) enum Caller {
    Anonymous,
    // Token presented but not checked yet.
    Bearer(SessionToken),
    // Token checked, employee re-read from the directory.
    Authenticated {
        token: SessionToken,
        employee: Employee,
    },
}

impl Caller {
    pub(crate) fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) => Caller::Bearer(token),
            None => Caller::Anonymous,
        }
    }

    pub(crate) fn employee(&self) -> Option<&Employee> {
        match self {
            Caller::Authenticated { employee, .. } => Some(employee),
            _ => None,
        }
    }

    pub(crate) fn token(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Bearer(token) | Caller::Authenticated { token, .. } => Some(token),
        }
    }
}

pub(crate) struct SignIn {
    pub(crate) area: SignInArea,
    pub(crate) request: SignInRequest,
}

pub(crate) struct ChangeRole {
    pub(crate) employee_id: u64,
    pub(crate) role: Role,
}

pub(crate) enum UnitOfWork {
    SignIn(Work<SignIn, SignInResponse>),
    SignOut(Work<(), SignOutResponse>),
    Me(Work<(), PrincipalPayload>),
    ListEmployees(Work<(), Vec<Employee>>),
    GetEmployee(Work<u64, Employee>),
    ChangeRole(Work<ChangeRole, Employee>),
}

pub(crate) struct Work<Req, Res> {
    pub(crate) caller: Caller,
    pub(crate) request: Req,
    // Wrap with option so that response can be sent via mut reference.
    pub(crate) response_sender: Option<oneshot::Sender<Result<Res>>>,
}

impl<Req, Res> Work<Req, Res> {
    fn new(caller: Caller, request: Req) -> (Self, oneshot::Receiver<Result<Res>>) {
        let (tx, rx) = oneshot::channel();
        (
            Work {
                caller,
                request,
                response_sender: Some(tx),
            },
            rx,
        )
    }

    pub(crate) fn send_response(&mut self, response: Result<Res>) -> Result<()> {
        self.response_sender
            .take()
            .ok_or_else(|| ErrorKind::Internal("response already sent".to_owned()))?
            .send(response)
            .map_err(|_| ErrorKind::Internal("send response".to_owned()).into())
    }
}

type Receiver<T> = oneshot::Receiver<Result<T>>;

impl UnitOfWork {
    pub(crate) fn new_sign_in(
        area: SignInArea,
        request: SignInRequest,
    ) -> (UnitOfWork, Receiver<SignInResponse>) {
        let (work, rx) = Work::new(Caller::Anonymous, SignIn { area, request });
        (UnitOfWork::SignIn(work), rx)
    }

    pub(crate) fn new_sign_out(caller: Caller) -> (UnitOfWork, Receiver<SignOutResponse>) {
        let (work, rx) = Work::new(caller, ());
        (UnitOfWork::SignOut(work), rx)
    }

    pub(crate) fn new_me(caller: Caller) -> (UnitOfWork, Receiver<PrincipalPayload>) {
        let (work, rx) = Work::new(caller, ());
        (UnitOfWork::Me(work), rx)
    }

    pub(crate) fn new_list_employees(caller: Caller) -> (UnitOfWork, Receiver<Vec<Employee>>) {
        let (work, rx) = Work::new(caller, ());
        (UnitOfWork::ListEmployees(work), rx)
    }

    pub(crate) fn new_get_employee(
        caller: Caller,
        employee_id: u64,
    ) -> (UnitOfWork, Receiver<Employee>) {
        let (work, rx) = Work::new(caller, employee_id);
        (UnitOfWork::GetEmployee(work), rx)
    }

    pub(crate) fn new_change_role(
        caller: Caller,
        employee_id: u64,
        role: Role,
    ) -> (UnitOfWork, Receiver<Employee>) {
        let (work, rx) = Work::new(caller, ChangeRole { employee_id, role });
        (UnitOfWork::ChangeRole(work), rx)
    }

    /// Operation checked against the access policy. Sign in has none.
    pub(crate) fn operation(&self) -> Option<Operation> {
        match self {
            UnitOfWork::SignIn(_) => None,
            UnitOfWork::SignOut(_) => Some(Operation::SignOut),
            UnitOfWork::Me(_) => Some(Operation::Me),
            UnitOfWork::ListEmployees(_) => Some(Operation::ListEmployees),
            UnitOfWork::GetEmployee(_) => Some(Operation::ReadEmployee),
            UnitOfWork::ChangeRole(_) => Some(Operation::ChangeRole),
        }
    }

    pub(crate) fn caller(&self) -> &Caller {
        match self {
            UnitOfWork::SignIn(work) => &work.caller,
            UnitOfWork::SignOut(work) => &work.caller,
            UnitOfWork::Me(work) => &work.caller,
            UnitOfWork::ListEmployees(work) => &work.caller,
            UnitOfWork::GetEmployee(work) => &work.caller,
            UnitOfWork::ChangeRole(work) => &work.caller,
        }
    }

    pub(crate) fn set_caller(&mut self, caller: Caller) {
        let slot = match self {
            UnitOfWork::SignIn(work) => &mut work.caller,
            UnitOfWork::SignOut(work) => &mut work.caller,
            UnitOfWork::Me(work) => &mut work.caller,
            UnitOfWork::ListEmployees(work) => &mut work.caller,
            UnitOfWork::GetEmployee(work) => &mut work.caller,
            UnitOfWork::ChangeRole(work) => &mut work.caller,
        };
        *slot = caller;
    }

    /// Employee the request targets, for requests that have one.
    pub(crate) fn target(&self) -> Option<u64> {
        match self {
            UnitOfWork::GetEmployee(work) => Some(work.request),
            UnitOfWork::ChangeRole(work) => Some(work.request.employee_id),
            _ => None,
        }
    }

    /// Answer the request with `err` without passing it further down the chain.
    pub(crate) fn reject(self, err: Error) -> Result<()> {
        match self {
            UnitOfWork::SignIn(mut work) => work.send_response(Err(err)),
            UnitOfWork::SignOut(mut work) => work.send_response(Err(err)),
            UnitOfWork::Me(mut work) => work.send_response(Err(err)),
            UnitOfWork::ListEmployees(mut work) => work.send_response(Err(err)),
            UnitOfWork::GetEmployee(mut work) => work.send_response(Err(err)),
            UnitOfWork::ChangeRole(mut work) => work.send_response(Err(err)),
        }
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnitOfWork::SignIn(work) => write!(
                f,
                "SignIn(area={} email={})",
                work.request.area, work.request.request.email
            ),
            UnitOfWork::SignOut(_) => write!(f, "SignOut"),
            UnitOfWork::Me(_) => write!(f, "Me"),
            UnitOfWork::ListEmployees(_) => write!(f, "ListEmployees"),
            UnitOfWork::GetEmployee(work) => write!(f, "GetEmployee({})", work.request),
            UnitOfWork::ChangeRole(work) => write!(
                f,
                "ChangeRole({} -> {})",
                work.request.employee_id, work.request.role
            ),
        }
    }
}
