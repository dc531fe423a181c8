//! crates/lms_core/src/access.rs
//!
//! The access verifier: validates a login attempt against a freshly fetched
//! student record and enforces single-use-key semantics. The checks are pure;
//! consuming the key is the session manager's job.

use crate::domain::Student;
use crate::ports::PortError;

/// What the user typed into the login form. Values are trimmed before
/// comparison, matching the original form handling.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub private_key: String,
}

/// Every way a login attempt can fail. Each variant carries its own
/// user-facing message; they are never conflated into a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid email address")]
    UnknownEmail,
    #[error("Your account has been disabled. Please contact administrator.")]
    AccountDisabled,
    #[error("No password set. Contact administrator.")]
    NoPasswordConfigured,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("No private key assigned. Contact administrator.")]
    NoKeyAssigned,
    #[error("Invalid private key")]
    InvalidKey,
    #[error("This private key has already been used. Contact administrator for a new key.")]
    KeyAlreadyUsed,
    /// The directory could not be reached at all. Shown as a generic
    /// connectivity message, distinct from every credential failure above.
    #[error("Failed to connect. Please check your internet connection.")]
    Transport(#[from] PortError),
}

/// Verifies the entered credentials against the fetched record, failing fast
/// with a distinct reason at the first violated condition. The check order is
/// part of the contract: a disabled account reports `AccountDisabled` even if
/// the password is also wrong.
pub fn verify(input: &LoginInput, record: Option<&Student>) -> Result<(), LoginError> {
    let student = record.ok_or(LoginError::UnknownEmail)?;

    if !student.enabled {
        return Err(LoginError::AccountDisabled);
    }

    let stored_password = match &student.password {
        Some(p) if !p.trim().is_empty() => p.trim(),
        _ => return Err(LoginError::NoPasswordConfigured),
    };
    // Exact-string, case-sensitive comparison after trimming both sides.
    if stored_password != input.password.trim() {
        return Err(LoginError::InvalidPassword);
    }

    let stored_key = match &student.private_key {
        Some(k) if !k.trim().is_empty() => k.trim(),
        _ => return Err(LoginError::NoKeyAssigned),
    };
    if stored_key != input.private_key.trim() {
        return Err(LoginError::InvalidKey);
    }

    if student.key_used {
        return Err(LoginError::KeyAlreadyUsed);
    }

    Ok(())
}
