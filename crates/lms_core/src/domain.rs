//! crates/lms_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs mirror the portal's directory records but are independent
//! of the wire format used by any particular adapter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A student's directory record (the authenticated Identity).
///
/// Owned by the directory service; the client only ever reads it and performs
/// a single narrowly-scoped update (consuming the one-time private key).
/// Serde derives exist so the session manager can persist a snapshot to the
/// credential store for auto-restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Opaque record id assigned by the directory service.
    pub name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub enabled: bool,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub key_used: bool,
    /// Course assignments embedded in the student record. List queries omit
    /// child tables, so this is only populated by a full record fetch.
    #[serde(default)]
    pub assignments: Vec<CourseAssignment>,
}

impl Student {
    /// The student's display name, e.g. shown behind the watermark overlay.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// A single course assignment embedded within a [`Student`] record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseAssignment {
    /// Record id of the referenced course.
    pub course: String,
    /// Access to the course lapses after this date. `None` means no expiry.
    pub expiry: Option<NaiveDate>,
}

impl CourseAssignment {
    /// An assignment is active iff it has no expiry, or the expiry date is
    /// today-or-later. Date-only comparison; time of day is ignored.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.expiry {
            Some(expiry) => expiry >= today,
            None => true,
        }
    }
}

/// A course record, with its topics embedded in fetch order.
#[derive(Debug, Clone)]
pub struct Course {
    pub name: String,
    pub title: String,
    /// Optional link to a live session (Zoom, Meet, ...), if the course has one.
    pub live_class_link: Option<String>,
    pub topics: Vec<Topic>,
}

/// A course subdivision (a.k.a. lecture) carrying at most one video link.
#[derive(Debug, Clone)]
pub struct Topic {
    pub name: String,
    pub title: String,
    /// Ordering index within the course, as stored by the directory service.
    pub idx: u32,
    pub video_link: Option<String>,
}

/// A playable video, materialized from a topic with a non-empty video link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub topic: String,
    pub title: String,
    pub url: String,
    pub idx: u32,
}

/// The in-memory session. Created at successful login or restore, cleared on
/// logout or revalidation failure. Never persisted directly; the credential
/// store holds a snapshot for UI continuity only.
#[derive(Debug, Clone)]
pub struct Session {
    pub student: Student,
}
