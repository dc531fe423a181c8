//! crates/lms_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! portal's HTTP API or the device's preference storage.

use async_trait::async_trait;
use crate::domain::{Course, Student};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, storage).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Record not found: {0}")]
    NotFound(String),
    /// Transport-level failure: the request never reached the server.
    #[error("Network unavailable: {0}")]
    Network(String),
    /// The server responded, but not with a usable answer.
    #[error("Server error: {0}")]
    Server(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The portal's record store: filtered queries, single-record fetches, and
/// the one narrowly-scoped update the client is allowed to make.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Filtered lookup by email address. At most one record is expected;
    /// zero matches is `Ok(None)`, not an error. List queries omit embedded
    /// child records, so the returned student has no assignments populated.
    async fn find_student_by_email(&self, email: &str) -> PortResult<Option<Student>>;

    /// Full record fetch by id, with course assignments embedded.
    async fn get_student(&self, name: &str) -> PortResult<Student>;

    /// Full course fetch by id, with topics embedded.
    async fn get_course(&self, name: &str) -> PortResult<Course>;

    /// Flip the student's key-used flag to true. One-way: the flag never
    /// transitions back.
    async fn mark_key_used(&self, name: &str) -> PortResult<()>;
}

/// Persistent key-value storage for the cached identity, surviving process
/// restarts. Exactly two keys are used: the cached email and the serialized
/// identity snapshot.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
    async fn remove(&self, key: &str) -> PortResult<()>;
}

/// Anti-piracy affordances active while a video is playing: the moving
/// watermark overlay and the input-protection handlers.
///
/// `engage` while already engaged must replace the previous overlay rather
/// than stack a second timer; `disengage` when idle is a no-op. The
/// navigation state machine relies on both being safe to call unconditionally.
pub trait PlaybackProtection: Send + Sync {
    fn engage(&self, watermark_text: &str);
    fn disengage(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// The native application shell: orientation control, fullscreen presentation,
/// and app termination. Purely command-shaped; the shell reports nothing back.
pub trait HostShell: Send + Sync {
    fn lock_orientation(&self, orientation: Orientation);
    fn unlock_orientation(&self);
    fn request_fullscreen(&self);
    fn exit_fullscreen(&self);
    fn exit_app(&self);
}
