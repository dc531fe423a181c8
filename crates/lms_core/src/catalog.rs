//! crates/lms_core/src/catalog.rs
//!
//! The course catalog builder: resolves a student's embedded course
//! assignments into the displayable catalog, filtering by expiry and
//! isolating per-course fetch failures.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future;
use tracing::warn;

use crate::domain::{Course, Video};
use crate::ports::{DirectoryService, PortResult};

/// One resolved catalog entry, pairing the course with the expiry of the
/// assignment that granted access to it.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub course: Course,
    pub expiry: Option<NaiveDate>,
}

/// The catalog-level result states. `Empty` and `AllExpired` are distinct on
/// purpose: "you were never assigned anything" and "everything you had has
/// lapsed" render different user-facing messages.
#[derive(Debug)]
pub enum Catalog {
    /// The student has no assignments at all.
    Empty,
    /// Assignments existed, but every one was expired or failed to resolve.
    AllExpired,
    Courses(Vec<CatalogEntry>),
}

/// The per-course view: topics reduced to their playable videos.
#[derive(Debug)]
pub enum VideoList {
    /// No topic in the course carries a video link. Distinct from the
    /// catalog-level empty states.
    NoVideos,
    Videos(Vec<Video>),
}

pub struct CatalogBuilder {
    directory: Arc<dyn DirectoryService>,
}

impl CatalogBuilder {
    pub fn new(directory: Arc<dyn DirectoryService>) -> Self {
        Self { directory }
    }

    /// Loads the catalog for the given student record id.
    ///
    /// The assignment list is always fetched fresh from the directory, never
    /// taken from the cached snapshot. Active assignments are resolved
    /// concurrently; the merge preserves the original assignment order, not
    /// completion order. A failed fetch drops only that course.
    pub async fn load(&self, student_name: &str, today: NaiveDate) -> PortResult<Catalog> {
        let student = self.directory.get_student(student_name).await?;

        if student.assignments.is_empty() {
            return Ok(Catalog::Empty);
        }

        let active: Vec<_> = student
            .assignments
            .iter()
            .filter(|a| a.is_active(today))
            .collect();

        let fetches = active.iter().map(|a| self.directory.get_course(&a.course));
        let resolved = future::join_all(fetches).await;

        let mut entries = Vec::with_capacity(active.len());
        let mut dropped = 0usize;
        for (assignment, result) in active.iter().zip(resolved) {
            match result {
                Ok(course) => entries.push(CatalogEntry {
                    course,
                    expiry: assignment.expiry,
                }),
                Err(e) => {
                    dropped += 1;
                    warn!(course = %assignment.course, error = %e, "dropping unresolvable course");
                }
            }
        }
        if dropped > 0 {
            warn!(dropped, "catalog loaded with missing courses");
        }

        if entries.is_empty() {
            Ok(Catalog::AllExpired)
        } else {
            Ok(Catalog::Courses(entries))
        }
    }
}

/// Reduces a course to its playable videos: topics with a non-empty video
/// link, in ascending index order. Topics without a link are dropped silently
/// and do not count toward the `NoVideos` state.
pub fn playable_videos(course: &Course) -> VideoList {
    let mut videos: Vec<Video> = course
        .topics
        .iter()
        .filter_map(|topic| {
            let url = topic.video_link.as_deref()?.trim();
            if url.is_empty() {
                return None;
            }
            Some(Video {
                topic: topic.name.clone(),
                title: topic.title.clone(),
                url: url.to_string(),
                idx: topic.idx,
            })
        })
        .collect();
    videos.sort_by_key(|v| v.idx);

    if videos.is_empty() {
        VideoList::NoVideos
    } else {
        VideoList::Videos(videos)
    }
}

/// Where an assignment's expiry stands relative to today. Feeds the expiry
/// badges on course cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    NoExpiry,
    Expired,
    ExpiresToday,
    ExpiresTomorrow,
    /// Expires within 30 days.
    DaysLeft(i64),
    /// More than 30 days out; shown as an absolute date.
    Until(NaiveDate),
}

pub fn expiry_status(expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    let Some(expiry) = expiry else {
        return ExpiryStatus::NoExpiry;
    };
    let days = (expiry - today).num_days();
    match days {
        d if d < 0 => ExpiryStatus::Expired,
        0 => ExpiryStatus::ExpiresToday,
        1 => ExpiryStatus::ExpiresTomorrow,
        d if d <= 30 => ExpiryStatus::DaysLeft(d),
        _ => ExpiryStatus::Until(expiry),
    }
}

/// A still-active assignment lapsing within a week gets a warning badge.
pub fn expiring_soon(expiry: Option<NaiveDate>, today: NaiveDate) -> bool {
    match expiry {
        Some(expiry) => {
            let days = (expiry - today).num_days();
            (0..=7).contains(&days)
        }
        None => false,
    }
}
