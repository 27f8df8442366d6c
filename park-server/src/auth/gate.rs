//! Hidden admin entry gate
//!
//! Two pieces: a click counter that reveals the login form after repeated
//! logo clicks, and the admin credential check. The whole gate hides edit
//! affordances from casual visitors; it is not a security boundary for
//! anything of real value, and the password is at least verified against
//! an argon2 hash rather than a reversible checksum.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Clicks on the logo that reveal the admin login form
pub const REVEAL_CLICK_COUNT: u32 = 5;

/// Logo click counter.
///
/// No timeout: the count only resets when the threshold is reached, the
/// form is dismissed, or a login succeeds.
#[derive(Debug, Default)]
pub struct LogoGate {
    clicks: u32,
}

impl LogoGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a click; returns true when the login form should be shown.
    ///
    /// Reaching the threshold resets the counter, so the next click counts
    /// from one again.
    pub fn click(&mut self) -> bool {
        self.clicks += 1;
        if self.clicks >= REVEAL_CLICK_COUNT {
            self.clicks = 0;
            true
        } else {
            false
        }
    }

    /// Login form dismissed or login succeeded
    pub fn reset(&mut self) {
        self.clicks = 0;
    }

    pub fn count(&self) -> u32 {
        self.clicks
    }
}

/// Hash a password using argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verify a password against an argon2 hash
pub fn verify_password(
    hash: &str,
    password: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Admin credentials, constructed once at startup and injected into the
/// server state (no module-level credential constants).
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Hash a plaintext password at construction time (dev fallback path)
    pub fn from_plain(
        username: impl Into<String>,
        password: &str,
    ) -> Result<Self, argon2::password_hash::Error> {
        Ok(Self {
            username: username.into(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a login attempt: exact username match plus hash verification.
    ///
    /// Callers present a single unified failure regardless of which part
    /// mismatched.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username != self.username {
            return false;
        }
        verify_password(&self.password_hash, password).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifth_click_reveals_and_resets() {
        let mut gate = LogoGate::new();
        for _ in 0..4 {
            assert!(!gate.click());
        }
        assert!(gate.click());

        // Counter starts over: four more clicks stay silent
        for _ in 0..4 {
            assert!(!gate.click());
        }
        assert!(gate.click());
    }

    #[test]
    fn test_dismiss_resets_progress() {
        let mut gate = LogoGate::new();
        gate.click();
        gate.click();
        gate.reset();
        assert_eq!(gate.count(), 0);

        for _ in 0..4 {
            assert!(!gate.click());
        }
        assert!(gate.click());
    }

    #[test]
    fn test_credentials_verify_exact_match_only() {
        let creds = AdminCredentials::from_plain("admin", "admin123").unwrap();

        assert!(creds.verify("admin", "admin123"));
        assert!(!creds.verify("admin", "Admin123")); // case matters
        assert!(!creds.verify("Admin", "admin123")); // username exact
        assert!(!creds.verify("admin", ""));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("admin123").unwrap();
        let b = hash_password("admin123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "admin123").unwrap());
        assert!(verify_password(&b, "admin123").unwrap());
    }
}
