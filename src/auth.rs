use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::error::{FeedbackError, Result};

/// Explicit admin authorization context
///
/// Starts unauthorized; only [`AdminAuth::verify`] with the configured access
/// code flips it. The value is owned by the caller and passed to whatever
/// needs admin rights.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    access_code: String,
    authorized: bool,
}

impl AdminAuth {
    /// Unauthorized context checking against `access_code`
    #[must_use]
    pub fn new(access_code: impl Into<String>) -> Self {
        Self {
            access_code: access_code.into(),
            authorized: false,
        }
    }

    /// Unauthorized context using the configured access code
    #[must_use]
    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.access_code.clone())
    }

    /// Check `code` and record the outcome; returns whether access was granted
    pub fn verify(&mut self, code: &str) -> bool {
        self.authorized = !self.access_code.is_empty() && code == self.access_code;
        if self.authorized {
            info!("Admin access granted");
        } else {
            warn!("Admin access denied: invalid access code");
        }
        self.authorized
    }

    /// Whether the last verification succeeded
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Drop admin rights
    pub fn revoke(&mut self) {
        self.authorized = false;
    }

    /// Fail with `Unauthorized` unless access was granted
    pub fn require(&self, action: &str) -> Result<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(FeedbackError::Unauthorized(format!(
                "admin access required to {action}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unauthorized() {
        let auth = AdminAuth::new("admin123");
        assert!(!auth.is_authorized());
        assert!(auth.require("update status").is_err());
    }

    #[test]
    fn test_verify_and_revoke() {
        let mut auth = AdminAuth::new("admin123");
        assert!(!auth.verify("wrong"));
        assert!(auth.verify("admin123"));
        assert!(auth.require("update status").is_ok());

        auth.revoke();
        assert!(!auth.is_authorized());
    }

    #[test]
    fn test_failed_verify_clears_previous_grant() {
        let mut auth = AdminAuth::new("admin123");
        assert!(auth.verify("admin123"));
        assert!(!auth.verify("admin1234"));
        assert!(!auth.is_authorized());
    }
}
