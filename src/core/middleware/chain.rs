use crate::common::Result;
use crate::core::middleware::{Authenticator, Authorizer, Dispatcher, Logger, Middleware};
use crate::core::{AccessPolicy, Store, UnitOfWork};

pub(crate) struct MiddlewareChain {
    root: Logger<Authenticator<Authorizer<Dispatcher>>>,
}

impl MiddlewareChain {
    pub(crate) fn new(policy: AccessPolicy) -> Self {
        let dispatcher = Dispatcher::new();

        let authorizer = Authorizer::new(policy, dispatcher);

        let authenticator = Authenticator::new(authorizer);

        let logger = Logger::new(authenticator);

        Self { root: logger }
    }

    pub(crate) async fn apply(&mut self, store: &mut Store, uow: UnitOfWork) -> Result<()> {
        self.root.apply(store, uow).await
    }
}
