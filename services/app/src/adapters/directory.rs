//! services/app/src/adapters/directory.rs
//!
//! This module contains the directory adapter, the concrete implementation of
//! the `DirectoryService` port. It talks to the portal's resource-style HTTP
//! API: filtered list queries with explicit field projections, single-record
//! fetches with embedded child tables, and the one PUT the client performs.

use async_trait::async_trait;
use chrono::NaiveDate;
use lms_core::domain::{Course, CourseAssignment, Student, Topic};
use lms_core::ports::{DirectoryService, PortError, PortResult};
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Field projection for student list queries. Child tables (course
/// assignments) are not part of list responses; they only arrive embedded in
/// a full record fetch.
const STUDENT_FIELDS: &[&str] = &[
    "name",
    "student_email_id",
    "custom_private_key",
    "custom_password",
    "first_name",
    "last_name",
    "custom_key_used",
    "enabled",
];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A directory adapter that implements the `DirectoryService` port over the
/// portal's resource API.
#[derive(Clone)]
pub struct PortalDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl PortalDirectory {
    /// Creates a new `PortalDirectory`. Every request carries the timeout;
    /// a hung request fails instead of leaving the UI spinning forever.
    pub fn new(
        base_url: &str,
        api_key: String,
        api_secret: String,
        timeout: Duration,
    ) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            api_secret,
        })
    }

    fn auth_header(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret)
    }

    fn resource_url(&self, doctype: &str, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("{}/api/resource/{}/{}", self.base_url, doctype, name),
            None => format!("{}/api/resource/{}", self.base_url, doctype),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> PortResult<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(transport_error)?;
        let response = checked(response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Server(format!("malformed response payload: {e}")))
    }
}

/// Maps a request-level failure: anything that kept us from getting a
/// response is a transport problem, not a server one.
fn transport_error(e: reqwest::Error) -> PortError {
    PortError::Network(e.to_string())
}

fn checked(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(PortError::NotFound(response.url().path().to_string()));
    }
    Err(PortError::Server(format!(
        "portal returned error status: {status}"
    )))
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Deserialize)]
struct RecordResponse<T> {
    data: T,
}

#[derive(Deserialize)]
struct StudentRecord {
    name: String,
    student_email_id: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    custom_password: Option<String>,
    #[serde(default)]
    custom_private_key: Option<String>,
    #[serde(default)]
    custom_key_used: i64,
    #[serde(default = "enabled_by_default")]
    enabled: i64,
    #[serde(default)]
    custom_courses: Vec<AssignmentRecord>,
}

fn enabled_by_default() -> i64 {
    1
}

impl StudentRecord {
    fn to_domain(self) -> Student {
        Student {
            name: self.name,
            email: self.student_email_id,
            first_name: self.first_name,
            last_name: self.last_name.filter(|l| !l.is_empty()),
            enabled: self.enabled != 0,
            password: self.custom_password,
            private_key: self.custom_private_key,
            key_used: self.custom_key_used != 0,
            assignments: self
                .custom_courses
                .into_iter()
                .map(AssignmentRecord::to_domain)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct AssignmentRecord {
    course: String,
    #[serde(default)]
    expiry_date: Option<NaiveDate>,
}

impl AssignmentRecord {
    fn to_domain(self) -> CourseAssignment {
        CourseAssignment {
            course: self.course,
            expiry: self.expiry_date,
        }
    }
}

#[derive(Deserialize)]
struct CourseRecord {
    name: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    custom_youtube_link: Option<String>,
    #[serde(default)]
    topics: Vec<TopicRecord>,
}

impl CourseRecord {
    fn to_domain(self) -> Course {
        let title = match self.course_name.filter(|t| !t.is_empty()) {
            Some(title) => title,
            None => self.name.clone(),
        };
        Course {
            name: self.name,
            title,
            live_class_link: self.custom_youtube_link.filter(|l| !l.trim().is_empty()),
            topics: self
                .topics
                .into_iter()
                .enumerate()
                .map(|(i, t)| t.to_domain(i))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct TopicRecord {
    name: String,
    #[serde(default)]
    topic_name: Option<String>,
    #[serde(default)]
    idx: Option<u32>,
    #[serde(default)]
    custom_video_link: Option<String>,
}

impl TopicRecord {
    fn to_domain(self, position: usize) -> Topic {
        let fallback = position as u32 + 1;
        let title = match self.topic_name.filter(|t| !t.is_empty()) {
            Some(title) => title,
            None => format!("Video {fallback}"),
        };
        Topic {
            name: self.name,
            title,
            idx: self.idx.unwrap_or(fallback),
            video_link: self.custom_video_link,
        }
    }
}

//=========================================================================================
// `DirectoryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DirectoryService for PortalDirectory {
    async fn find_student_by_email(&self, email: &str) -> PortResult<Option<Student>> {
        let filters = serde_json::json!([["student_email_id", "=", email]]).to_string();
        let fields = serde_json::json!(STUDENT_FIELDS).to_string();

        let body: ListResponse<StudentRecord> = self
            .get_json(
                &self.resource_url("Student", None),
                &[("filters", filters.as_str()), ("fields", fields.as_str())],
            )
            .await?;
        Ok(body.data.into_iter().next().map(StudentRecord::to_domain))
    }

    async fn get_student(&self, name: &str) -> PortResult<Student> {
        let body: RecordResponse<StudentRecord> = self
            .get_json(&self.resource_url("Student", Some(name)), &[])
            .await?;
        Ok(body.data.to_domain())
    }

    async fn get_course(&self, name: &str) -> PortResult<Course> {
        let body: RecordResponse<CourseRecord> = self
            .get_json(&self.resource_url("Course", Some(name)), &[])
            .await?;
        Ok(body.data.to_domain())
    }

    async fn mark_key_used(&self, name: &str) -> PortResult<()> {
        let response = self
            .client
            .put(self.resource_url("Student", Some(name)))
            .header(AUTHORIZATION, self.auth_header())
            .json(&serde_json::json!({ "custom_key_used": 1 }))
            .send()
            .await
            .map_err(transport_error)?;
        checked(response)?;
        Ok(())
    }
}
