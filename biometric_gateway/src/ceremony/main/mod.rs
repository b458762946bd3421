mod facial;
mod fingerprint;
mod options;
mod support;

#[cfg(test)]
pub(crate) mod test_utils;

pub use facial::FacialRecognition;
pub use fingerprint::{DEFAULT_USER_NAME, FingerprintAuth};
pub use options::{AuthenticationOptions, RegistrationOptions};
