//! Candidate key scanning.
//!
//! An account may hold several tokens. Before submitting a write it is
//! useful to know which of them, if any, currently authorizes the path. The
//! registry never falls back from one key to another on its own; this is
//! purely a client convenience built on the dry run.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use pathgate::{Address, PermissionKey};

use crate::api::RegistryApi;
use crate::error::{ClientError, Result};
use crate::paths::canonical_file_path;

/// Configuration for client-side scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum dry runs in flight at once.
    pub max_concurrent_checks: usize,
    /// Timeout for a single dry run.
    pub check_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_concurrent_checks: 8,
            check_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs dry-run checks against a registry.
pub struct WriteScanner<R: RegistryApi> {
    registry: Arc<R>,
    config: ClientConfig,
}

impl<R: RegistryApi + 'static> WriteScanner<R> {
    pub fn new(registry: Arc<R>, config: ClientConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The first key in `candidates` under which `account` may write `path`.
    ///
    /// Checks run concurrently, at most `max_concurrent_checks` at a time,
    /// but the answer respects candidate order: an earlier key wins over a
    /// later one, and a failure on an earlier key is reported even if a
    /// later key would have passed. The path is validated locally first, so
    /// a malformed path costs no registry calls.
    pub async fn find_writable_key(
        &self,
        candidates: &[PermissionKey],
        account: &Address,
        path: &str,
    ) -> Result<Option<PermissionKey>> {
        let path = canonical_file_path(path)?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_checks.max(1)));
        let mut tasks = JoinSet::new();

        for (index, key) in candidates.iter().copied().enumerate() {
            let registry = Arc::clone(&self.registry);
            let permits = Arc::clone(&permits);
            let account = *account;
            let path = path.as_str().to_owned();
            let timeout = self.config.check_timeout;

            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        let check = registry.can_write(&key, &account, &path);
                        match tokio::time::timeout(timeout, check).await {
                            Ok(Ok(allowed)) => Ok(allowed),
                            Ok(Err(e)) => Err(ClientError::Registry(e)),
                            Err(_) => Err(ClientError::Timeout(key)),
                        }
                    }
                    Err(e) => Err(ClientError::Task(e.to_string())),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<bool>>> = Vec::new();
        outcomes.resize_with(candidates.len(), || None);
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined.map_err(|e| ClientError::Task(e.to_string()))?;
            trace!(index, "candidate checked");
            outcomes[index] = Some(outcome);
        }

        for (key, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Some(Ok(true)) => {
                    debug!(%key, %account, %path, "writable key found");
                    return Ok(Some(*key));
                }
                Some(Ok(false)) => {}
                Some(Err(e)) => return Err(e),
                None => return Err(ClientError::Task(format!("no result for {key}"))),
            }
        }

        debug!(%account, %path, candidates = candidates.len(), "no writable key");
        Ok(None)
    }
}
