pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::gateway::Gateway;

/// Trait for external chat integrations feeding the gateway.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Receive updates until stopped, handing each to `gateway`.
    async fn start(&self, gateway: Arc<Gateway>) -> Result<()>;

    async fn stop(&self) -> Result<()>;
}
