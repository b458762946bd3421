//! Test doubles for the platform seams of the ceremony layer

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use super::options::{AuthenticationOptions, RegistrationOptions};
use crate::ceremony::config::PasskeyConfig;
use crate::ceremony::errors::PlatformError;
use crate::ceremony::platform::{
    CameraDevice, CaptureConstraints, FaceAnalysis, FaceScorer, Frame, MediaStream,
    PlatformAuthenticator,
};
use crate::ceremony::types::PublicKeyCredential;

pub(crate) fn passkey_config() -> PasskeyConfig {
    PasskeyConfig::new("https://example.com", None, 60).expect("valid test origin")
}

fn credential(id: &str, challenge: &str) -> PublicKeyCredential {
    PublicKeyCredential {
        id: id.to_string(),
        raw_id: id.to_string(),
        type_: "public-key".to_string(),
        authenticator_attachment: Some("platform".to_string()),
        response: json!({ "challenge": challenge }),
    }
}

/// Scriptable platform authenticator that records every challenge it is asked to sign
pub(crate) struct MockAuthenticator {
    api: bool,
    available: Result<bool, PlatformError>,
    create_error: Option<PlatformError>,
    get_error: Option<PlatformError>,
    probes: AtomicUsize,
    challenges: Mutex<Vec<String>>,
}

impl MockAuthenticator {
    fn with(api: bool, available: Result<bool, PlatformError>) -> Self {
        Self {
            api,
            available,
            create_error: None,
            get_error: None,
            probes: AtomicUsize::new(0),
            challenges: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn available() -> Self {
        Self::with(true, Ok(true))
    }

    pub(crate) fn unavailable() -> Self {
        Self::with(true, Ok(false))
    }

    pub(crate) fn without_api() -> Self {
        Self::with(false, Ok(true))
    }

    pub(crate) fn probe_fails() -> Self {
        Self::with(
            true,
            Err(PlatformError::new("InvalidStateError", "probe failed")),
        )
    }

    pub(crate) fn fail_create(mut self, err: PlatformError) -> Self {
        self.create_error = Some(err);
        self
    }

    pub(crate) fn fail_get(mut self, err: PlatformError) -> Self {
        self.get_error = Some(err);
        self
    }

    pub(crate) fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_challenges(&self) -> Vec<String> {
        self.challenges.lock().unwrap().clone()
    }

    fn record(&self, challenge: &str) {
        self.challenges.lock().unwrap().push(challenge.to_string());
    }
}

#[async_trait]
impl PlatformAuthenticator for MockAuthenticator {
    fn has_webauthn_api(&self) -> bool {
        self.api
    }

    async fn is_user_verifying_platform_authenticator_available(
        &self,
    ) -> Result<bool, PlatformError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.available.clone()
    }

    async fn create(
        &self,
        options: &RegistrationOptions,
    ) -> Result<PublicKeyCredential, PlatformError> {
        self.record(options.challenge());
        match &self.create_error {
            Some(err) => Err(err.clone()),
            None => Ok(credential("registered", options.challenge())),
        }
    }

    async fn get(
        &self,
        options: &AuthenticationOptions,
    ) -> Result<PublicKeyCredential, PlatformError> {
        self.record(options.challenge());
        match &self.get_error {
            Some(err) => Err(err.clone()),
            None => Ok(credential("asserted", options.challenge())),
        }
    }
}

/// Camera whose streams share one live-track counter with the test
pub(crate) struct MockCamera {
    media_devices: bool,
    open_error: Option<PlatformError>,
    capture_error: Option<PlatformError>,
    active: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl MockCamera {
    pub(crate) fn new() -> Self {
        Self {
            media_devices: true,
            open_error: None,
            capture_error: None,
            active: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
        }
    }

    pub(crate) fn without_media_devices() -> Self {
        Self {
            media_devices: false,
            ..Self::new()
        }
    }

    pub(crate) fn deny_open(mut self, err: PlatformError) -> Self {
        self.open_error = Some(err);
        self
    }

    pub(crate) fn fail_capture(mut self, err: PlatformError) -> Self {
        self.capture_error = Some(err);
        self
    }

    pub(crate) fn active_tracks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub(crate) fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

struct MockStream {
    tracks: usize,
    active: Arc<AtomicUsize>,
    capture_error: Option<PlatformError>,
}

#[async_trait]
impl MediaStream for MockStream {
    async fn capture_frame(&mut self) -> Result<Frame, PlatformError> {
        match &self.capture_error {
            Some(err) => Err(err.clone()),
            None => Ok(Frame {
                width: 640,
                height: 480,
                data: vec![0u8; 16],
            }),
        }
    }

    fn active_tracks(&self) -> usize {
        self.tracks
    }

    fn stop(&mut self) {
        self.active.fetch_sub(self.tracks, Ordering::SeqCst);
        self.tracks = 0;
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    fn has_media_devices(&self) -> bool {
        self.media_devices
    }

    async fn open(
        &self,
        _constraints: &CaptureConstraints,
    ) -> Result<Box<dyn MediaStream>, PlatformError> {
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            tracks: 1,
            active: self.active.clone(),
            capture_error: self.capture_error.clone(),
        }))
    }
}

/// Scorer returning the same analysis for every frame
pub(crate) struct FixedScorer {
    outcome: Result<FaceAnalysis, PlatformError>,
}

impl FixedScorer {
    pub(crate) fn new(analysis: FaceAnalysis) -> Self {
        Self {
            outcome: Ok(analysis),
        }
    }

    pub(crate) fn failing(err: PlatformError) -> Self {
        Self { outcome: Err(err) }
    }
}

#[async_trait]
impl FaceScorer for FixedScorer {
    async fn analyze(&self, _frame: &Frame) -> Result<FaceAnalysis, PlatformError> {
        self.outcome.clone()
    }
}
