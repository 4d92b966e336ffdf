use async_trait::async_trait;

use crate::common::{info, Result};
use crate::core::middleware::Middleware;
use crate::core::{Store, UnitOfWork};

pub(crate) struct Logger<MW> {
    next: MW,
}

impl<MW> Logger<MW> {
    pub(crate) fn new(next: MW) -> Self {
        Self { next }
    }
}

#[async_trait]
impl<MW> Middleware for Logger<MW>
where
    MW: Middleware + Send + 'static,
{
    async fn apply(&mut self, store: &mut Store, uow: UnitOfWork) -> Result<()> {
        let start = tokio::time::Instant::now();
        let log = format!("{:?}", uow);
        let caller = uow.caller().employee().map(|employee| employee.id);

        let result = self.next.apply(store, uow).await;

        info!(uow=%log, ?caller, elapsed=?start.elapsed(), ?result, "Uow done");

        result
    }
}
