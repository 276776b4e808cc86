//! Two-factor login codes
//!
//! Six digit codes are mailed to the user and kept in process memory
//! only; a restart invalidates every outstanding code.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hr_core::HrError;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TwoFactorError {
    #[error("No verification code was requested for this address")]
    NotFound,
    #[error("Verification code expired")]
    Expired,
    #[error("Invalid verification code, {remaining} attempts left")]
    Invalid { remaining: u32 },
    #[error("Too many failed attempts, request a new code")]
    TooManyAttempts,
}

impl From<TwoFactorError> for HrError {
    fn from(err: TwoFactorError) -> Self {
        HrError::unauthorized(err.to_string())
    }
}

/// A freshly generated code
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Store for pending verification codes, keyed by email
pub trait TwoFactorStore: Send + Sync {
    /// Generate a code for `email`, replacing any pending one
    fn issue(&self, email: &str) -> IssuedCode;

    /// Check a code. A matching code is consumed.
    fn verify(&self, email: &str, code: &str) -> Result<(), TwoFactorError>;

    /// Drop expired codes, returning how many were removed
    fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone)]
struct PendingCode {
    code: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
}

pub struct MemoryTwoFactorStore {
    codes: DashMap<String, PendingCode>,
    ttl: Duration,
    max_attempts: u32,
}

impl MemoryTwoFactorStore {
    pub fn new(ttl_seconds: u64, max_attempts: u32) -> Self {
        Self {
            codes: DashMap::new(),
            ttl: Duration::seconds(ttl_seconds as i64),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn key(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn generate_code() -> String {
        let mut rng = rand::rng();
        format!("{:06}", rng.random_range(0..1_000_000u32))
    }

    /// Compare `code` against the pending entry, counting a failed attempt.
    /// Returns the entry as it was checked.
    fn check(
        &self,
        key: &str,
        code: &str,
    ) -> Result<(Result<(), TwoFactorError>, PendingCode), TwoFactorError> {
        let mut pending = self.codes.get_mut(key).ok_or(TwoFactorError::NotFound)?;
        let outcome = if pending.expires_at <= Utc::now() {
            Err(TwoFactorError::Expired)
        } else if constant_time_eq(pending.code.as_bytes(), code.trim().as_bytes()) {
            Ok(())
        } else {
            pending.attempts += 1;
            if pending.attempts >= self.max_attempts {
                Err(TwoFactorError::TooManyAttempts)
            } else {
                Err(TwoFactorError::Invalid {
                    remaining: self.max_attempts - pending.attempts,
                })
            }
        };
        Ok((outcome, pending.clone()))
    }

    /// Remove the entry only if it is still the one that was checked;
    /// a code issued in between stays valid.
    fn discard(&self, key: &str, checked: &PendingCode) -> bool {
        self.codes
            .remove_if(key, |_, current| {
                current.code == checked.code && current.expires_at == checked.expires_at
            })
            .is_some()
    }
}

impl TwoFactorStore for MemoryTwoFactorStore {
    fn issue(&self, email: &str) -> IssuedCode {
        let issued = IssuedCode {
            code: Self::generate_code(),
            expires_at: Utc::now() + self.ttl,
        };
        self.codes.insert(
            Self::key(email),
            PendingCode {
                code: issued.code.clone(),
                expires_at: issued.expires_at,
                attempts: 0,
            },
        );
        issued
    }

    fn verify(&self, email: &str, code: &str) -> Result<(), TwoFactorError> {
        let key = Self::key(email);
        let (outcome, checked) = self.check(&key, code)?;
        if !matches!(outcome, Err(TwoFactorError::Invalid { .. })) {
            self.discard(&key, &checked);
        }
        outcome
    }

    fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.codes.len();
        self.codes.retain(|_, pending| pending.expires_at > now);
        before.saturating_sub(self.codes.len())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrong(code: &str) -> String {
        if code == "000000" { "111111".into() } else { "000000".into() }
    }

    #[test]
    fn test_code_format() {
        let store = MemoryTwoFactorStore::new(300, 5);
        let issued = store.issue("ops@example.com");
        assert_eq!(issued.code.len(), 6);
        assert!(issued.code.chars().all(|c| c.is_ascii_digit()));
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_code_is_consumed() {
        let store = MemoryTwoFactorStore::new(300, 5);
        let issued = store.issue("Ops@Example.com");

        assert_eq!(store.verify("ops@example.com", &issued.code), Ok(()));
        assert_eq!(
            store.verify("ops@example.com", &issued.code),
            Err(TwoFactorError::NotFound)
        );
    }

    #[test]
    fn test_attempts_are_limited() {
        let store = MemoryTwoFactorStore::new(300, 3);
        let issued = store.issue("ops@example.com");
        let bad = wrong(&issued.code);

        assert_eq!(
            store.verify("ops@example.com", &bad),
            Err(TwoFactorError::Invalid { remaining: 2 })
        );
        assert_eq!(
            store.verify("ops@example.com", &bad),
            Err(TwoFactorError::Invalid { remaining: 1 })
        );
        assert_eq!(
            store.verify("ops@example.com", &bad),
            Err(TwoFactorError::TooManyAttempts)
        );
        // the right code no longer works once invalidated
        assert_eq!(
            store.verify("ops@example.com", &issued.code),
            Err(TwoFactorError::NotFound)
        );
    }

    #[test]
    fn test_expired_code() {
        let store = MemoryTwoFactorStore::new(0, 5);
        let issued = store.issue("ops@example.com");
        assert_eq!(
            store.verify("ops@example.com", &issued.code),
            Err(TwoFactorError::Expired)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_reissue_replaces_code() {
        let store = MemoryTwoFactorStore::new(300, 5);
        store.issue("ops@example.com");
        let second = store.issue("ops@example.com");
        assert_eq!(store.len(), 1);
        assert_eq!(store.verify("ops@example.com", &second.code), Ok(()));
    }

    #[test]
    fn test_purge_expired() {
        let expired = MemoryTwoFactorStore::new(0, 5);
        expired.issue("a@example.com");
        expired.issue("b@example.com");
        assert_eq!(expired.purge_expired(), 2);

        let live = MemoryTwoFactorStore::new(300, 5);
        live.issue("a@example.com");
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn test_discard_keeps_newer_code() {
        let store = MemoryTwoFactorStore::new(300, 5);
        let first = store.issue("ops@example.com");
        let key = MemoryTwoFactorStore::key("ops@example.com");

        let (outcome, checked) = store.check(&key, &first.code).unwrap();
        assert_eq!(outcome, Ok(()));

        // a new code lands between the check and the removal
        let second = store.issue("ops@example.com");
        assert!(!store.discard(&key, &checked));
        assert_eq!(store.len(), 1);
        assert_eq!(store.verify("ops@example.com", &second.code), Ok(()));
    }
}
