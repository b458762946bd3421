use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::CeremonyErrorKind;

/// The biometric factor a ceremony runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialFactor {
    /// Platform authenticator reached through WebAuthn (fingerprint sensor, Touch ID, ...)
    Fingerprint,
    /// Camera capture scored by a face recognition collaborator
    Facial,
}

impl fmt::Display for CredentialFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fingerprint => write!(f, "Fingerprint"),
            Self::Facial => write!(f, "Facial"),
        }
    }
}

/// Result of the one-time capability probe of a factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportState {
    /// Not probed yet
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

/// Credential object handed back by the platform authenticator.
///
/// Mirrors the JSON shape of a browser `PublicKeyCredential`; the `response`
/// member (attestation or assertion) is kept opaque and forwarded as-is to
/// whichever server verifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyCredential {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    pub response: serde_json::Value,
}

/// Opaque proof produced by a successful ceremony
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "ceremony", rename_all = "snake_case")]
pub enum CredentialAssertion {
    /// Attestation returned by `navigator.credentials.create()`
    Registration {
        challenge: String,
        credential: PublicKeyCredential,
    },
    /// Assertion returned by `navigator.credentials.get()`
    Authentication {
        challenge: String,
        credential: PublicKeyCredential,
    },
    /// Accepted face capture
    FaceCapture { capture_id: String },
}

impl CredentialAssertion {
    /// Challenge the platform signed over, for WebAuthn ceremonies
    pub fn challenge(&self) -> Option<&str> {
        match self {
            Self::Registration { challenge, .. } | Self::Authentication { challenge, .. } => {
                Some(challenge)
            }
            Self::FaceCapture { .. } => None,
        }
    }
}

/// Terminal outcome of exactly one ceremony.
///
/// Public ceremony operations always return one of these; platform exceptions
/// never propagate to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CeremonyResult {
    Success {
        credential_assertion: CredentialAssertion,
        /// Recognition confidence in `[0, 1]`, facial ceremonies only
        #[serde(skip_serializing_if = "Option::is_none")]
        confidence: Option<f32>,
    },
    Failure {
        error_kind: CeremonyErrorKind,
        message: String,
    },
}

impl CeremonyResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_kind(&self) -> Option<CeremonyErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_kind, .. } => Some(*error_kind),
        }
    }

    pub fn assertion(&self) -> Option<&CredentialAssertion> {
        match self {
            Self::Success {
                credential_assertion,
                ..
            } => Some(credential_assertion),
            Self::Failure { .. } => None,
        }
    }
}
