use std::sync::Arc;

use roster_core::{RosterResult, RosterService};

use super::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RosterService>,
    pub version: &'static str,
}

impl AppState {
    pub fn new(roster: RosterService) -> Self {
        Self {
            roster: Arc::new(roster),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Runs a roster call on the blocking pool; store access does file I/O.
    pub async fn with_roster<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(&RosterService) -> RosterResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let roster = Arc::clone(&self.roster);
        tokio::task::spawn_blocking(move || call(&roster))
            .await
            .map_err(|err| ApiError::Internal(format!("roster task failed: {err}")))?
            .map_err(ApiError::from)
    }
}
