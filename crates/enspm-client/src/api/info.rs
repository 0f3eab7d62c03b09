//! API root document.

use crate::client::EnspmClient;
use crate::error::Result;
use crate::types::ApiInfo;

/// Info API client.
///
/// The root document is public; the request still carries a bearer when one
/// is stored.
pub struct InfoApi {
    client: EnspmClient,
}

impl InfoApi {
    pub(crate) fn new(client: EnspmClient) -> Self {
        Self { client }
    }

    /// Fetch the welcome document at `/api/v1/`.
    pub async fn get(&self) -> Result<ApiInfo> {
        self.client.get("").await
    }

    /// Simple connectivity check - returns true if the API answers.
    pub async fn is_reachable(&self) -> bool {
        self.get().await.is_ok()
    }
}
