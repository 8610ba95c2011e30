// src/auth.rs

//! Credentials and the request viewer
//!
//! Passwords are stored as `sha256$<iterations>$<salt>$<digest>`, where the
//! digest is SHA-256 iterated over the salt and password. API tokens are
//! 40 random hex characters.
//!
//! Every service call receives a [`Viewer`] explicitly; there is no ambient
//! "current user".

use crate::db::models::User;
use crate::error::{Error, Result};
use rand::RngCore;
use sha2::{Digest, Sha256};

const HASH_SCHEME: &str = "sha256";
const HASH_ITERATIONS: u32 = 20_000;
const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 20;

/// Who is making a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(User),
}

impl Viewer {
    /// ID of the authenticated user, if any
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => user.id,
        }
    }

    /// The authenticated user, or `Unauthenticated`
    pub fn require_user(&self) -> Result<&User> {
        match self {
            Self::User(user) if user.id.is_some() => Ok(user),
            _ => Err(Error::Unauthenticated),
        }
    }

    /// ID of the authenticated user, or `Unauthenticated`
    pub fn require_id(&self) -> Result<i64> {
        self.user_id().ok_or(Error::Unauthenticated)
    }

    /// Staff may modify any recipe
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::User(user) if user.is_staff)
    }
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let digest = derive(password, &salt, HASH_ITERATIONS);
    format!("{HASH_SCHEME}${HASH_ITERATIONS}${salt}${digest}")
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(4, '$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if scheme != HASH_SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };

    constant_time_eq(derive(password, salt, iterations).as_bytes(), expected.as_bytes())
}

/// Generate a new API token
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn derive(password: &str, salt: &str, iterations: u32) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(password.as_bytes())
            .finalize();
    }
    hex::encode(digest)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("s3cret-pass");
        assert!(hash.starts_with("sha256$"));
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$1$aa$bb"));
        assert!(!verify_password("x", "sha256$many$aa$bb"));
    }

    #[test]
    fn test_token_format() {
        let token = generate_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_viewer_requirements() {
        assert!(matches!(
            Viewer::Anonymous.require_user(),
            Err(Error::Unauthenticated)
        ));
        assert_eq!(Viewer::Anonymous.user_id(), None);

        let mut user = User::new(
            "a@example.com".into(),
            "a".into(),
            "A".into(),
            "B".into(),
            "h".into(),
        );
        user.id = Some(4);
        user.is_staff = true;
        let viewer = Viewer::User(user);
        assert_eq!(viewer.require_id().unwrap(), 4);
        assert!(viewer.is_staff());
    }
}
