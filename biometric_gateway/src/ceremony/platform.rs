//! Seams to the platform APIs a ceremony drives.
//!
//! `PlatformAuthenticator` stands in for `navigator.credentials` plus
//! `PublicKeyCredential.isUserVerifyingPlatformAuthenticatorAvailable()`,
//! `CameraDevice`/`MediaStream` for `navigator.mediaDevices.getUserMedia()` and the
//! resulting stream, and `FaceScorer` for whatever recognition backend is in use.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::PlatformError;
use super::main::{AuthenticationOptions, RegistrationOptions};
use super::types::PublicKeyCredential;

#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether the WebAuthn API exists at all
    fn has_webauthn_api(&self) -> bool;

    /// Whether a user-verifying platform authenticator is available
    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, PlatformError>;

    /// `navigator.credentials.create()`
    async fn create(
        &self,
        options: &RegistrationOptions,
    ) -> Result<PublicKeyCredential, PlatformError>;

    /// `navigator.credentials.get()`
    async fn get(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<PublicKeyCredential, PlatformError>;
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Whether the media devices API exists at all
    fn has_media_devices(&self) -> bool;

    /// Requests exclusive access to a camera matching `constraints`
    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, PlatformError>;
}

/// A live camera stream.
///
/// Owned exclusively by the facial ceremony that opened it and stopped before
/// that ceremony returns.
#[async_trait]
pub trait MediaStream: Send {
    async fn capture_frame(&mut self) -> Result<Frame, PlatformError>;

    /// Number of tracks that have not been stopped
    fn active_tracks(&self) -> usize;

    /// Stops every track of the stream
    fn stop(&mut self);
}

#[async_trait]
pub trait FaceScorer: Send + Sync {
    async fn analyze(&self, frame: &Frame) -> Result<FaceAnalysis, PlatformError>;
}

/// Video constraints passed when opening the camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub facing_mode: String,
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing_mode: "user".to_string(),
            width: 640,
            height: 480,
        }
    }
}

/// Single captured video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Outcome of scoring one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FaceAnalysis {
    /// A face was found and matched with this confidence
    Scored(f32),
    NoFaceDetected,
    /// The frame could not be scored (blur, lighting, partial face, ...)
    PoorQuality(String),
}

/// Platform with neither WebAuthn nor a camera, as seen by a server side process.
///
/// Both factors probe as unsupported, so every ceremony fails fast with
/// `NotSupported` and nothing is ever prompted.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPlatform;

fn not_supported() -> PlatformError {
    PlatformError::new("NotSupportedError", "no platform API in a headless process")
}

#[async_trait]
impl PlatformAuthenticator for HeadlessPlatform {
    fn has_webauthn_api(&self) -> bool {
        false
    }

    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn create(
        &self,
        _options: &RegistrationOptions,
    ) -> Result<PublicKeyCredential, PlatformError> {
        Err(not_supported())
    }

    async fn get(
        &self,
        _options: &AuthenticationOptions,
    ) -> Result<PublicKeyCredential, PlatformError> {
        Err(not_supported())
    }
}

#[async_trait]
impl CameraDevice for HeadlessPlatform {
    fn has_media_devices(&self) -> bool {
        false
    }

    async fn open(
        &self,
        _constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, PlatformError> {
        Err(not_supported())
    }
}

#[async_trait]
impl FaceScorer for HeadlessPlatform {
    async fn analyze(&self, _frame: &Frame) -> Result<FaceAnalysis, PlatformError> {
        Err(not_supported())
    }
}
