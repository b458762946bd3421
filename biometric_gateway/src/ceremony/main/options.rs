use serde::{Deserialize, Serialize};

use crate::ceremony::config::PasskeyConfig;
use crate::ceremony::errors::CeremonyError;
use crate::utils::gen_random_string;

/// Number of random bytes behind every challenge
pub(crate) const CHALLENGE_LEN: usize = 32;

/// Acceptable public key algorithms in order of preference: ES256, then RS256
pub(crate) const PUB_KEY_ALGORITHMS: [i32; 2] = [-7, -257];

/// Options for `navigator.credentials.create()`.
///
/// Registration is restricted to platform attached, user verifying
/// authenticators; roaming keys are never offered.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    pub(crate) challenge: String,
    pub(crate) rp: RelyingParty,
    pub(crate) user: PublicKeyCredentialUserEntity,
    pub(crate) pub_key_cred_params: Vec<PubKeyCredParam>,
    pub(crate) authenticator_selection: AuthenticatorSelection,
    pub(crate) timeout: u32,
    pub(crate) attestation: String,
}

impl RegistrationOptions {
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn rp_id(&self) -> &str {
        &self.rp.id
    }
}

/// Options for `navigator.credentials.get()`
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptions {
    pub(crate) challenge: String,
    pub(crate) timeout: u32,
    pub(crate) rp_id: String,
    pub(crate) allow_credentials: Vec<AllowCredential>,
    pub(crate) user_verification: String,
}

impl AuthenticationOptions {
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn rp_id(&self) -> &str {
        &self.rp_id
    }
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct RelyingParty {
    pub(crate) name: String,
    pub(crate) id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublicKeyCredentialUserEntity {
    #[serde(rename = "id")]
    pub(crate) user_handle: String,
    pub(crate) name: String,
    pub(crate) display_name: String,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub(crate) type_: String,
    pub(crate) alg: i32,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct AllowCredential {
    #[serde(rename = "type")]
    pub(crate) type_: String,
    pub(crate) id: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthenticatorSelection {
    pub(crate) authenticator_attachment: String,
    pub(crate) resident_key: String,
    pub(crate) require_resident_key: bool,
    pub(crate) user_verification: String,
}

pub(crate) fn registration_options(
    config: &PasskeyConfig,
    name: &str,
    display_name: &str,
) -> Result<RegistrationOptions, CeremonyError> {
    let challenge = gen_random_string(CHALLENGE_LEN)?;
    let user_handle = gen_random_string(CHALLENGE_LEN)?;

    let options = RegistrationOptions {
        challenge,
        rp: RelyingParty {
            name: config.rp_name.clone(),
            id: config.rp_id.clone(),
        },
        user: PublicKeyCredentialUserEntity {
            user_handle,
            name: name.to_string(),
            display_name: display_name.to_string(),
        },
        pub_key_cred_params: PUB_KEY_ALGORITHMS
            .iter()
            .map(|alg| PubKeyCredParam {
                type_: "public-key".to_string(),
                alg: *alg,
            })
            .collect(),
        authenticator_selection: AuthenticatorSelection {
            authenticator_attachment: "platform".to_string(),
            resident_key: "preferred".to_string(),
            require_resident_key: false,
            user_verification: "required".to_string(),
        },
        timeout: config.timeout_secs.saturating_mul(1000), // Convert seconds to milliseconds
        attestation: "none".to_string(),
    };

    tracing::debug!("Registration options: {:?}", options);

    Ok(options)
}

pub(crate) fn authentication_options(
    config: &PasskeyConfig,
) -> Result<AuthenticationOptions, CeremonyError> {
    let options = AuthenticationOptions {
        challenge: gen_random_string(CHALLENGE_LEN)?,
        timeout: config.timeout_secs.saturating_mul(1000),
        rp_id: config.rp_id.clone(),
        allow_credentials: Vec::new(),
        user_verification: "required".to_string(),
    };

    tracing::debug!("Auth options: {:?}", options);

    Ok(options)
}
