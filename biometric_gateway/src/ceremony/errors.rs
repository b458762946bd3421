use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{CeremonyResult, CredentialFactor};
use crate::utils::UtilError;

/// Closed set of failure categories reported to ceremony callers.
///
/// Anything the normalization table does not recognize lands in `Unknown`; the
/// original platform message is kept in the failure message for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeremonyErrorKind {
    /// Platform API or camera API absent
    NotSupported,
    /// User cancelled the prompt or refused permission
    UserDenied,
    /// Platform call exceeded its own timeout
    Timeout,
    /// Transport failure during the ceremony
    Network,
    /// No camera device, or the device is busy
    NoCamera,
    /// Capture was too poor to score, or scored below the acceptance threshold
    PoorQuality,
    NoFaceDetected,
    Unknown,
}

impl CeremonyErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSupported => "not_supported",
            Self::UserDenied => "user_denied",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::NoCamera => "no_camera",
            Self::PoorQuality => "poor_quality",
            Self::NoFaceDetected => "no_face_detected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CeremonyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exception raised by a platform API.
///
/// `name` carries the DOMException style name (`NotAllowedError`,
/// `NotReadableError`, ...), which is what the normalization table keys on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct PlatformError {
    pub name: String,
    pub message: String,
}

impl PlatformError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Maps this exception onto the closed taxonomy for the given factor
    pub fn kind_for(&self, factor: CredentialFactor) -> CeremonyErrorKind {
        match factor {
            CredentialFactor::Fingerprint => webauthn_error_kind(&self.name),
            CredentialFactor::Facial => camera_error_kind(&self.name),
        }
    }
}

fn webauthn_error_kind(name: &str) -> CeremonyErrorKind {
    match name {
        "NotAllowedError" | "AbortError" => CeremonyErrorKind::UserDenied,
        "NotSupportedError" | "SecurityError" => CeremonyErrorKind::NotSupported,
        "TimeoutError" => CeremonyErrorKind::Timeout,
        "NetworkError" => CeremonyErrorKind::Network,
        _ => CeremonyErrorKind::Unknown,
    }
}

fn camera_error_kind(name: &str) -> CeremonyErrorKind {
    match name {
        "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
            CeremonyErrorKind::UserDenied
        }
        "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError"
        | "ConstraintNotSatisfiedError" => CeremonyErrorKind::NoCamera,
        "NotReadableError" | "TrackStartError" | "AbortError" => CeremonyErrorKind::NoCamera,
        "NotSupportedError" | "TypeError" => CeremonyErrorKind::NotSupported,
        "TimeoutError" => CeremonyErrorKind::Timeout,
        "NetworkError" => CeremonyErrorKind::Network,
        _ => CeremonyErrorKind::Unknown,
    }
}

/// Internal error type of the ceremony layer.
///
/// Converted into `CeremonyResult::Failure` at the ceremony boundary.
#[derive(Debug, Error)]
pub(crate) enum CeremonyError {
    #[error("{0} authentication is not supported on this device")]
    NotSupported(CredentialFactor),

    #[error("{factor} platform error: {source}")]
    Platform {
        factor: CredentialFactor,
        source: PlatformError,
    },

    #[error("Camera is already in use by another ceremony")]
    CameraBusy,

    #[error("No face detected in the capture")]
    NoFaceDetected,

    #[error("Capture quality too poor: {0}")]
    PoorQuality(String),

    #[error("Face not recognized (confidence {confidence:.2}, threshold {threshold:.2})")]
    BelowThreshold { confidence: f32, threshold: f32 },

    #[error("Invalid confidence score: {0}")]
    InvalidScore(f32),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl CeremonyError {
    pub(crate) fn platform(factor: CredentialFactor, source: PlatformError) -> Self {
        Self::Platform { factor, source }
    }

    pub(crate) fn kind(&self) -> CeremonyErrorKind {
        match self {
            Self::NotSupported(_) => CeremonyErrorKind::NotSupported,
            Self::Platform { factor, source } => source.kind_for(*factor),
            Self::CameraBusy => CeremonyErrorKind::NoCamera,
            Self::NoFaceDetected => CeremonyErrorKind::NoFaceDetected,
            Self::PoorQuality(_) | Self::BelowThreshold { .. } => CeremonyErrorKind::PoorQuality,
            Self::InvalidScore(_) | Self::Utils(_) => CeremonyErrorKind::Unknown,
        }
    }

    /// Log the error and return self
    pub(crate) fn log(self) -> Self {
        match &self {
            Self::Platform { factor, source } => tracing::error!(
                "{} ceremony failed with {} ({})",
                factor,
                source.name,
                source.kind_for(*factor)
            ),
            other => tracing::error!("Ceremony failed: {}", other),
        }
        self
    }
}

impl From<CeremonyError> for CeremonyResult {
    fn from(err: CeremonyError) -> Self {
        CeremonyResult::Failure {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}
