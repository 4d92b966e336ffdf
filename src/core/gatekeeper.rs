use chrono::Utc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::{self, Duration};

use crate::common::{debug, error, info, Result};
use crate::core::middleware::MiddlewareChain;
use crate::core::{AccessPolicy, Config, Store, UnitOfWork};

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
pub(crate) struct Builder {
    config: Config,
    policy: AccessPolicy,
}

impl Builder {
    pub(crate) fn from_config(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub(crate) fn build(self) -> Result<Gatekeeper> {
        let (send, recv) = mpsc::channel(self.config.request_channel_buffer());

        let store = Store::from_config(&self.config)?;
        info!(
            users = store.directory.len(),
            session_ttl = %self.config.session_ttl(),
            "Directory loaded"
        );

        Ok(Gatekeeper {
            request_send: send,
            request_recv: recv,
            middlewares: MiddlewareChain::new(self.policy),
            store,
        })
    }
}

/// Owns the directory and the sessions. Every request is processed here, one at a time.
pub(crate) struct Gatekeeper {
    request_recv: Receiver<UnitOfWork>,
    request_send: Sender<UnitOfWork>,
    middlewares: MiddlewareChain,
    store: Store,
}

impl Gatekeeper {
    pub(crate) fn request_channel(&self) -> Sender<UnitOfWork> {
        self.request_send.clone()
    }

    pub(crate) async fn run(mut self) {
        info!("Gatekeeper running");

        // Requests only come from the senders handed out.
        drop(self.request_send);

        let mut prune = time::interval(PRUNE_INTERVAL);
        loop {
            tokio::select! {
                request = self.request_recv.recv() => match request {
                    Some(uow) => {
                        if let Err(err) = self.middlewares.apply(&mut self.store, uow).await {
                            error!("Handle request {}", err);
                        }
                    }
                    None => break,
                },
                _ = prune.tick() => {
                    let pruned = self.store.sessions.prune(Utc::now());
                    if pruned > 0 {
                        debug!(pruned, "Expired sessions pruned");
                    }
                }
            }
        }

        info!("Gatekeeper stopped");
    }

    #[cfg(test)]
    async fn handle_request(&mut self, uow: UnitOfWork) -> Result<()> {
        self.middlewares.apply(&mut self.store, uow).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use crate::core::directory::fixture;
    use crate::core::Caller;
    use crate::identity::{Role, SignInArea};
    use crate::protocol::{SignInRequest, SignInResponse};

    fn gatekeeper() -> Gatekeeper {
        let config = Config {
            users: fixture::entries(),
            ..Default::default()
        };
        Builder::from_config(config).build().unwrap()
    }

    async fn sign_in(
        gatekeeper: &mut Gatekeeper,
        area: SignInArea,
        email: &str,
        password: &str,
    ) -> Result<SignInResponse> {
        let (uow, rx) = UnitOfWork::new_sign_in(area, SignInRequest::new(email, password));
        gatekeeper.handle_request(uow).await.unwrap();
        rx.await.unwrap()
    }

    async fn caller(gatekeeper: &mut Gatekeeper, area: SignInArea, id: u64) -> Caller {
        let email = gatekeeper.store.directory.get(id).unwrap().employee.email.clone();
        let response = sign_in(gatekeeper, area, &email, fixture::PASSWORD)
            .await
            .unwrap();
        Caller::Bearer(response.token)
    }

    #[test]
    fn sign_in_per_area() {
        tokio_test::block_on(async move {
            let mut gk = gatekeeper();

            let response = sign_in(&mut gk, SignInArea::Admin, "user1@acme.test", fixture::PASSWORD)
                .await
                .unwrap();
            assert_eq!(response.principal.role.as_deref(), Some("SUPER_ADMIN"));
            assert_eq!(response.principal.id, 1);

            let response = sign_in(&mut gk, SignInArea::User, "user3@acme.test", fixture::PASSWORD)
                .await
                .unwrap();
            assert_eq!(response.principal.role.as_deref(), Some("HR"));

            // Admin from the user area and employee from the admin area.
            for (area, email) in [
                (SignInArea::User, "user2@acme.test"),
                (SignInArea::Admin, "user5@acme.test"),
            ] {
                let err = sign_in(&mut gk, area, email, fixture::PASSWORD)
                    .await
                    .unwrap_err();
                assert!(matches!(err.kind(), ErrorKind::InvalidCredentials));
            }

            let err = sign_in(&mut gk, SignInArea::User, "user5@acme.test", "guess")
                .await
                .unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidCredentials));
            assert_eq!(gk.store.sessions.len(), 2);
        })
    }

    #[test]
    fn me_requires_a_valid_token() {
        tokio_test::block_on(async move {
            let mut gk = gatekeeper();

            for anonymous in [Caller::Anonymous, Caller::Bearer("forged".into())] {
                let (uow, rx) = UnitOfWork::new_me(anonymous);
                gk.handle_request(uow).await.unwrap();
                let err = rx.await.unwrap().unwrap_err();
                assert!(matches!(err.kind(), ErrorKind::Unauthenticated(_)));
            }

            let caller = caller(&mut gk, SignInArea::User, 4).await;
            let (uow, rx) = UnitOfWork::new_me(caller);
            gk.handle_request(uow).await.unwrap();
            let me = rx.await.unwrap().unwrap();
            assert_eq!(me.id, 4);
            assert_eq!(me.role.as_deref(), Some("MANAGER"));
        })
    }

    #[test]
    fn list_is_scoped() {
        tokio_test::block_on(async move {
            let mut gk = gatekeeper();

            let manager = caller(&mut gk, SignInArea::User, 4).await;
            let (uow, rx) = UnitOfWork::new_list_employees(manager);
            gk.handle_request(uow).await.unwrap();
            let ids: Vec<u64> = rx.await.unwrap().unwrap().iter().map(|e| e.id).collect();
            assert_eq!(ids, vec![4, 5]);

            let foreign_admin = caller(&mut gk, SignInArea::Admin, 7).await;
            let (uow, rx) = UnitOfWork::new_list_employees(foreign_admin);
            gk.handle_request(uow).await.unwrap();
            let ids: Vec<u64> = rx.await.unwrap().unwrap().iter().map(|e| e.id).collect();
            assert_eq!(ids, vec![7, 8]);
        })
    }

    #[test]
    fn read_outside_scope_is_forbidden() {
        tokio_test::block_on(async move {
            let mut gk = gatekeeper();
            let employee = caller(&mut gk, SignInArea::User, 5).await;

            let (uow, rx) = UnitOfWork::new_get_employee(employee.clone(), 5);
            gk.handle_request(uow).await.unwrap();
            assert_eq!(rx.await.unwrap().unwrap().id, 5);

            let (uow, rx) = UnitOfWork::new_get_employee(employee.clone(), 6);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Forbidden(_)));

            // Unknown ids look the same as foreign ones.
            let (uow, rx) = UnitOfWork::new_get_employee(employee, 404);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Forbidden(_)));

            let root = caller(&mut gk, SignInArea::Admin, 1).await;
            let (uow, rx) = UnitOfWork::new_get_employee(root, 404);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::NotFound(_)));
        })
    }

    #[test]
    fn role_change_is_rederived_on_next_request() {
        tokio_test::block_on(async move {
            let mut gk = gatekeeper();
            let admin = caller(&mut gk, SignInArea::Admin, 2).await;
            let worker = caller(&mut gk, SignInArea::User, 5).await;

            // Employees may not change roles.
            let (uow, rx) = UnitOfWork::new_change_role(worker.clone(), 5, Role::Hr);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Forbidden(_)));

            // Admins may not grant super admin.
            let (uow, rx) = UnitOfWork::new_change_role(admin.clone(), 5, Role::SuperAdmin);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Forbidden(_)));

            let (uow, rx) = UnitOfWork::new_change_role(admin, 5, Role::Hr);
            gk.handle_request(uow).await.unwrap();
            assert_eq!(rx.await.unwrap().unwrap().role, Role::Hr);

            // The old token of the promoted employee is gone.
            let (uow, rx) = UnitOfWork::new_me(worker);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Unauthenticated(_)));

            let promoted = caller(&mut gk, SignInArea::User, 5).await;
            let (uow, rx) = UnitOfWork::new_list_employees(promoted);
            gk.handle_request(uow).await.unwrap();
            assert_eq!(rx.await.unwrap().unwrap().len(), 7);
        })
    }

    #[test]
    fn sign_out_revokes_token() {
        tokio_test::block_on(async move {
            let mut gk = gatekeeper();
            let caller = caller(&mut gk, SignInArea::User, 6).await;

            let (uow, rx) = UnitOfWork::new_sign_out(caller.clone());
            gk.handle_request(uow).await.unwrap();
            assert!(rx.await.unwrap().unwrap().revoked);

            let (uow, rx) = UnitOfWork::new_sign_out(caller);
            gk.handle_request(uow).await.unwrap();
            let err = rx.await.unwrap().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Unauthenticated(_)));
        })
    }

    #[test]
    fn run_stops_when_senders_are_dropped() {
        tokio_test::block_on(async move {
            let gk = gatekeeper();
            let sender = gk.request_channel();
            let handle = tokio::spawn(gk.run());

            let (uow, rx) = UnitOfWork::new_sign_in(
                SignInArea::User,
                SignInRequest::new("user5@acme.test", fixture::PASSWORD),
            );
            sender.send(uow).await.unwrap();
            assert_eq!(rx.await.unwrap().unwrap().principal.id, 5);

            drop(sender);
            handle.await.unwrap();
        })
    }
}
