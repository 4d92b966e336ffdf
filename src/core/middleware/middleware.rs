use async_trait::async_trait;

use crate::common::Result;
use crate::core::{Store, UnitOfWork};

#[async_trait]
pub(crate) trait Middleware {
    async fn apply(&mut self, store: &mut Store, uow: UnitOfWork) -> Result<()>;
}
