use std::sync::Arc;

use super::options::{authentication_options, registration_options};
use super::support::SupportCache;

use crate::ceremony::config::PasskeyConfig;
use crate::ceremony::errors::CeremonyError;
use crate::ceremony::platform::PlatformAuthenticator;
use crate::ceremony::types::{
    CeremonyResult, CredentialAssertion, CredentialFactor, SupportState,
};

/// Label used when a credential is created without a named user
pub const DEFAULT_USER_NAME: &str = "Passkey User";

/// WebAuthn ceremonies against the device's platform authenticator
pub struct FingerprintAuth {
    config: PasskeyConfig,
    platform: Arc<dyn PlatformAuthenticator>,
    support: SupportCache,
}

impl FingerprintAuth {
    pub fn new(config: PasskeyConfig, platform: Arc<dyn PlatformAuthenticator>) -> Self {
        Self {
            config,
            platform,
            support: SupportCache::new(),
        }
    }

    /// Whether the WebAuthn API is present and a user-verifying platform
    /// authenticator is available. Probed once, then cached.
    pub async fn is_supported(&self) -> bool {
        self.support
            .get_or_probe(CredentialFactor::Fingerprint, || async {
                if !self.platform.has_webauthn_api() {
                    return Ok(false);
                }
                self.platform
                    .is_user_verifying_platform_authenticator_available()
                    .await
            })
            .await
    }

    pub fn support_state(&self) -> SupportState {
        self.support.state()
    }

    /// Creates a new platform credential for an anonymous user
    pub async fn register(&self) -> CeremonyResult {
        self.register_user(DEFAULT_USER_NAME, DEFAULT_USER_NAME).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn register_user(&self, name: &str, display_name: &str) -> CeremonyResult {
        match self.try_register(name, display_name).await {
            Ok(assertion) => {
                tracing::info!("Platform credential created");
                CeremonyResult::Success {
                    credential_assertion: assertion,
                    confidence: None,
                }
            }
            Err(e) => e.log().into(),
        }
    }

    /// Requests a user-verified assertion from the platform authenticator
    #[tracing::instrument(skip(self))]
    pub async fn authenticate(&self) -> CeremonyResult {
        match self.try_authenticate().await {
            Ok(assertion) => {
                tracing::info!("Platform assertion obtained");
                CeremonyResult::Success {
                    credential_assertion: assertion,
                    confidence: None,
                }
            }
            Err(e) => e.log().into(),
        }
    }

    async fn try_register(
        &self,
        name: &str,
        display_name: &str,
    ) -> Result<CredentialAssertion, CeremonyError> {
        if !self.is_supported().await {
            return Err(CeremonyError::NotSupported(CredentialFactor::Fingerprint));
        }

        let options = registration_options(&self.config, name, display_name)?;
        let credential = self
            .platform
            .create(&options)
            .await
            .map_err(|e| CeremonyError::platform(CredentialFactor::Fingerprint, e))?;

        Ok(CredentialAssertion::Registration {
            challenge: options.challenge,
            credential,
        })
    }

    async fn try_authenticate(&self) -> Result<CredentialAssertion, CeremonyError> {
        if !self.is_supported().await {
            return Err(CeremonyError::NotSupported(CredentialFactor::Fingerprint));
        }

        let options = authentication_options(&self.config)?;
        let credential = self
            .platform
            .get(&options)
            .await
            .map_err(|e| CeremonyError::platform(CredentialFactor::Fingerprint, e))?;

        Ok(CredentialAssertion::Authentication {
            challenge: options.challenge,
            credential,
        })
    }
}
