use std::sync::Arc;

use serde::Serialize;

use super::config::{FacialConfig, PasskeyConfig};
use super::main::{FacialRecognition, FingerprintAuth};
use super::platform::{CameraDevice, FaceScorer, PlatformAuthenticator};
use super::types::CeremonyResult;

/// Owner of the one handle per factor.
///
/// Built once when the application is wired together and shared by reference
/// (typically behind an `Arc`) with the login surface.
pub struct CeremonyEngine {
    fingerprint: FingerprintAuth,
    facial: FacialRecognition,
}

/// Memoized support flags of both factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub fingerprint: bool,
    pub facial: bool,
}

impl CeremonyEngine {
    pub fn new(fingerprint: FingerprintAuth, facial: FacialRecognition) -> Self {
        Self {
            fingerprint,
            facial,
        }
    }

    /// Wires both factors from their configs and platform collaborators
    pub fn from_platform(
        passkey: PasskeyConfig,
        facial: FacialConfig,
        authenticator: Arc<dyn PlatformAuthenticator>,
        camera: Arc<dyn CameraDevice>,
        scorer: Arc<dyn FaceScorer>,
    ) -> Self {
        Self::new(
            FingerprintAuth::new(passkey, authenticator),
            FacialRecognition::new(facial, camera, scorer),
        )
    }

    pub fn fingerprint(&self) -> &FingerprintAuth {
        &self.fingerprint
    }

    pub fn facial(&self) -> &FacialRecognition {
        &self.facial
    }

    pub async fn capabilities(&self) -> Capabilities {
        Capabilities {
            fingerprint: self.fingerprint.is_supported().await,
            facial: self.facial.is_supported().await,
        }
    }
}

/// Authenticates with the platform authenticator, falling back to a single
/// registration attempt when authentication fails.
///
/// Used to bootstrap a first credential. The fallback runs at most once; if it
/// also fails, its failure is returned as is.
pub async fn authenticate_or_register(fingerprint: &FingerprintAuth) -> CeremonyResult {
    let first = fingerprint.authenticate().await;
    if first.is_success() {
        return first;
    }

    tracing::info!(
        "Authentication failed ({:?}), attempting registration",
        first.error_kind()
    );
    fingerprint.register().await
}
