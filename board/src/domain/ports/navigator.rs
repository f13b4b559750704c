//! Navigator port
//!
//! Downloads are triggered by navigating to a backend endpoint rather than by
//! an API call whose result the board consumes.

use async_trait::async_trait;

use crate::error::BackendError;

#[async_trait]
pub trait Navigator: Send + Sync {
    /// Open `url`; returns a short description of where the result went
    async fn navigate(&self, url: &str) -> Result<String, BackendError>;
}
