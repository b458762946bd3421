use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use super::support::SupportCache;

use crate::ceremony::config::FacialConfig;
use crate::ceremony::errors::CeremonyError;
use crate::ceremony::platform::{CameraDevice, FaceAnalysis, FaceScorer, MediaStream};
use crate::ceremony::types::{
    CeremonyResult, CredentialAssertion, CredentialFactor, SupportState,
};

/// Camera based face recognition ceremony.
///
/// Each `authenticate()` call opens the camera, analyzes a single capture and
/// releases the camera again before it returns, whatever the outcome. At most
/// one capture is live per instance; a call made while another is running
/// fails with `NoCamera`.
pub struct FacialRecognition {
    config: FacialConfig,
    camera: Arc<dyn CameraDevice>,
    scorer: Arc<dyn FaceScorer>,
    support: SupportCache,
    capture_lock: Mutex<()>,
}

/// Owns the camera stream for the duration of one ceremony and stops it on drop
struct CaptureGuard {
    stream: Box<dyn MediaStream>,
}

impl CaptureGuard {
    fn new(stream: Box<dyn MediaStream>) -> Self {
        Self { stream }
    }

    fn stream(&mut self) -> &mut dyn MediaStream {
        self.stream.as_mut()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if self.stream.active_tracks() > 0 {
            self.stream.stop();
        }
        tracing::debug!("Camera released");
    }
}

impl FacialRecognition {
    pub fn new(
        config: FacialConfig,
        camera: Arc<dyn CameraDevice>,
        scorer: Arc<dyn FaceScorer>,
    ) -> Self {
        Self {
            config,
            camera,
            scorer,
            support: SupportCache::new(),
            capture_lock: Mutex::new(()),
        }
    }

    /// Whether a media devices API is present. Probed once, then cached.
    pub async fn is_supported(&self) -> bool {
        self.support
            .get_or_probe(CredentialFactor::Facial, || async {
                Ok(self.camera.has_media_devices())
            })
            .await
    }

    pub fn support_state(&self) -> SupportState {
        self.support.state()
    }

    #[tracing::instrument(skip(self))]
    pub async fn authenticate(&self) -> CeremonyResult {
        match self.try_authenticate().await {
            Ok((assertion, confidence)) => {
                tracing::info!("Face accepted with confidence {:.2}", confidence);
                CeremonyResult::Success {
                    credential_assertion: assertion,
                    confidence: Some(confidence),
                }
            }
            Err(e) => e.log().into(),
        }
    }

    async fn try_authenticate(&self) -> Result<(CredentialAssertion, f32), CeremonyError> {
        if !self.is_supported().await {
            return Err(CeremonyError::NotSupported(CredentialFactor::Facial));
        }

        // Held until the capture guard below has released the camera
        let _exclusive = self
            .capture_lock
            .try_lock()
            .map_err(|_| CeremonyError::CameraBusy)?;

        let stream = self
            .camera
            .open(&self.config.constraints)
            .await
            .map_err(|e| CeremonyError::platform(CredentialFactor::Facial, e))?;
        tracing::debug!("Camera acquired");

        let mut capture = CaptureGuard::new(stream);
        let outcome = self.analyze(&mut capture).await;
        drop(capture);

        let confidence = outcome?;
        Ok((
            CredentialAssertion::FaceCapture {
                capture_id: Uuid::new_v4().to_string(),
            },
            confidence,
        ))
    }

    async fn analyze(&self, capture: &mut CaptureGuard) -> Result<f32, CeremonyError> {
        tokio::time::sleep(self.config.analysis_window).await;

        let frame = capture
            .stream()
            .capture_frame()
            .await
            .map_err(|e| CeremonyError::platform(CredentialFactor::Facial, e))?;

        let analysis = self
            .scorer
            .analyze(&frame)
            .await
            .map_err(|e| CeremonyError::platform(CredentialFactor::Facial, e))?;

        match analysis {
            FaceAnalysis::NoFaceDetected => Err(CeremonyError::NoFaceDetected),
            FaceAnalysis::PoorQuality(reason) => Err(CeremonyError::PoorQuality(reason)),
            FaceAnalysis::Scored(confidence) if !(0.0..=1.0).contains(&confidence) => {
                Err(CeremonyError::InvalidScore(confidence))
            }
            FaceAnalysis::Scored(confidence) if confidence < self.config.confidence_threshold => {
                Err(CeremonyError::BelowThreshold {
                    confidence,
                    threshold: self.config.confidence_threshold,
                })
            }
            FaceAnalysis::Scored(confidence) => Ok(confidence),
        }
    }
}
