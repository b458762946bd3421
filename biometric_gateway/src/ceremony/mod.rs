mod config;
mod engine;
mod errors;
mod main;
mod platform;
mod types;

pub use config::{FacialConfig, PasskeyConfig};
pub use engine::{Capabilities, CeremonyEngine, authenticate_or_register};
pub use errors::{CeremonyErrorKind, PlatformError};
pub use main::{
    AuthenticationOptions, DEFAULT_USER_NAME, FacialRecognition, FingerprintAuth,
    RegistrationOptions,
};
pub use platform::{
    CameraDevice, CaptureConstraints, FaceAnalysis, FaceScorer, Frame, HeadlessPlatform,
    MediaStream, PlatformAuthenticator,
};
pub use types::{
    CeremonyResult, CredentialAssertion, CredentialFactor, PublicKeyCredential, SupportState,
};
