use std::future::Future;

use tokio::sync::OnceCell;

use crate::ceremony::errors::PlatformError;
use crate::ceremony::types::{CredentialFactor, SupportState};

/// Memoized capability probe.
///
/// The probe runs at most once per instance, even under concurrent callers; a
/// probe error counts as "unsupported" and is cached like any other result.
#[derive(Debug, Default)]
pub(crate) struct SupportCache {
    cell: OnceCell<bool>,
}

impl SupportCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn get_or_probe<F, Fut>(&self, factor: CredentialFactor, probe: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, PlatformError>>,
    {
        *self
            .cell
            .get_or_init(|| async {
                let supported = match probe().await {
                    Ok(supported) => supported,
                    Err(e) => {
                        tracing::warn!("{} capability probe failed: {}", factor, e);
                        false
                    }
                };
                tracing::debug!("{} supported: {}", factor, supported);
                supported
            })
            .await
    }

    pub(crate) fn state(&self) -> SupportState {
        match self.cell.get() {
            None => SupportState::Unknown,
            Some(true) => SupportState::Supported,
            Some(false) => SupportState::Unsupported,
        }
    }
}
