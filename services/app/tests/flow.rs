//! services/app/tests/flow.rs
//!
//! End-to-end controller flows against in-memory fakes: launch, login,
//! catalog, playback, back navigation, and restore invalidation.

use async_trait::async_trait;
use chrono::{Duration, Local};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use app_lib::adapters::{HeadlessShell, WatermarkGuard};
use app_lib::controller::{AppController, AppEvent, CatalogView, Flow};
use lms_core::access::LoginInput;
use lms_core::domain::{Course, CourseAssignment, Student, Topic};
use lms_core::navigation::Screen;
use lms_core::ports::{CredentialStore, DirectoryService, PortError, PortResult};

struct InMemoryDirectory {
    student: Mutex<Student>,
    courses: HashMap<String, Course>,
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    async fn find_student_by_email(&self, email: &str) -> PortResult<Option<Student>> {
        let student = self.student.lock().unwrap().clone();
        // List queries never carry the embedded assignments.
        Ok((student.email == email).then(|| Student {
            assignments: vec![],
            ..student
        }))
    }

    async fn get_student(&self, name: &str) -> PortResult<Student> {
        let student = self.student.lock().unwrap().clone();
        if student.name == name {
            Ok(student)
        } else {
            Err(PortError::NotFound(name.to_string()))
        }
    }

    async fn get_course(&self, name: &str) -> PortResult<Course> {
        self.courses
            .get(name)
            .cloned()
            .ok_or_else(|| PortError::NotFound(name.to_string()))
    }

    async fn mark_key_used(&self, _name: &str) -> PortResult<()> {
        self.student.lock().unwrap().key_used = true;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }
    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.map.lock().unwrap().insert(key.into(), value.into());
        Ok(())
    }
    async fn remove(&self, key: &str) -> PortResult<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}

fn student() -> Student {
    let today = Local::now().date_naive();
    Student {
        name: "EDU-STU-0001".into(),
        email: "amy@example.com".into(),
        first_name: "Amy".into(),
        last_name: Some("March".into()),
        enabled: true,
        password: Some("p1".into()),
        private_key: Some("k1".into()),
        key_used: false,
        assignments: vec![
            CourseAssignment {
                course: "CRS-ACTIVE".into(),
                expiry: Some(today + Duration::days(10)),
            },
            CourseAssignment {
                course: "CRS-EXPIRED".into(),
                expiry: Some(today - Duration::days(1)),
            },
        ],
    }
}

fn courses() -> HashMap<String, Course> {
    let active = Course {
        name: "CRS-ACTIVE".into(),
        title: "Technical Analysis".into(),
        live_class_link: Some("https://meet.google.com/abc-defg-hij".into()),
        topics: vec![
            Topic {
                name: "TPC-1".into(),
                title: "Intro".into(),
                idx: 1,
                video_link: Some("".into()),
            },
            Topic {
                name: "TPC-2".into(),
                title: "Candlesticks".into(),
                idx: 2,
                video_link: Some("https://youtu.be/dQw4w9WgXcQ".into()),
            },
            Topic {
                name: "TPC-3".into(),
                title: "Notes only".into(),
                idx: 3,
                video_link: None,
            },
        ],
    };
    let expired = Course {
        name: "CRS-EXPIRED".into(),
        title: "Old Course".into(),
        live_class_link: None,
        topics: vec![],
    };
    HashMap::from([
        ("CRS-ACTIVE".to_string(), active),
        ("CRS-EXPIRED".to_string(), expired),
    ])
}

struct Harness {
    controller: AppController,
    directory: Arc<InMemoryDirectory>,
    store: Arc<MemoryStore>,
    guard: Arc<WatermarkGuard>,
    shell: Arc<HeadlessShell>,
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryDirectory {
        student: Mutex::new(student()),
        courses: courses(),
    });
    let store = Arc::new(MemoryStore::default());
    let guard = Arc::new(WatermarkGuard::new());
    let shell = Arc::new(HeadlessShell::new());
    let controller = AppController::new(
        directory.clone(),
        store.clone(),
        guard.clone(),
        shell.clone(),
    );
    Harness {
        controller,
        directory,
        store,
        guard,
        shell,
    }
}

fn login_input() -> LoginInput {
    LoginInput {
        email: "amy@example.com".into(),
        password: "p1".into(),
        private_key: "k1".into(),
    }
}

#[tokio::test]
async fn cold_launch_lands_on_login() {
    let mut h = harness();
    h.controller.launch().await;
    assert_eq!(h.controller.screen(), Screen::LoggedOut);
}

#[tokio::test]
async fn failed_login_keeps_its_specific_message() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(LoginInput {
            password: "wrong".into(),
            ..login_input()
        }))
        .await;
    assert_eq!(h.controller.screen(), Screen::LoggedOut);
    assert_eq!(h.controller.take_notice().as_deref(), Some("Invalid password"));
}

#[tokio::test]
async fn login_builds_the_catalog_without_expired_courses() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(login_input()))
        .await;

    assert_eq!(h.controller.screen(), Screen::CourseList);
    assert_eq!(h.controller.catalog_view(), CatalogView::Courses);
    let titles: Vec<_> = h
        .controller
        .entries()
        .iter()
        .map(|e| e.course.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Technical Analysis"]);
    // The one-time key was consumed on the way in.
    assert!(h.directory.student.lock().unwrap().key_used);
    assert!(h.store.map.lock().unwrap().contains_key("student_email"));
}

#[tokio::test]
async fn playback_cycle_engages_and_releases_protection() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(login_input()))
        .await;
    h.controller.handle(AppEvent::SelectCourse(0)).await;

    assert_eq!(h.controller.screen(), Screen::VideoList);
    // Of the three topics only one has a real video link.
    assert_eq!(h.controller.videos().len(), 1);
    assert!(h.controller.live_class_link().is_some());

    h.controller.handle(AppEvent::SelectVideo(0)).await;
    assert_eq!(h.controller.screen(), Screen::VideoPlaying);
    assert_eq!(h.guard.active_timers(), 1);
    assert_eq!(
        h.guard.watermark_text(),
        "Amy March • amy@example.com"
    );
    assert!(h
        .controller
        .current_embed_url()
        .is_some_and(|url| url.contains("dQw4w9WgXcQ")));

    h.controller.handle(AppEvent::Back).await;
    assert_eq!(h.controller.screen(), Screen::VideoList);
    assert_eq!(h.guard.active_timers(), 0);
    assert!(h.controller.current_embed_url().is_none());

    h.controller.handle(AppEvent::Back).await;
    assert_eq!(h.controller.screen(), Screen::CourseList);
    assert!(h.controller.videos().is_empty());

    let flow = h.controller.handle(AppEvent::Back).await;
    assert_eq!(flow, Flow::Exit);
    assert!(h.shell.exit_requested());
}

#[tokio::test]
async fn backgrounding_unloads_the_active_video() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(login_input()))
        .await;
    h.controller.handle(AppEvent::SelectCourse(0)).await;
    h.controller.handle(AppEvent::SelectVideo(0)).await;
    assert_eq!(h.guard.active_timers(), 1);

    h.controller
        .handle(AppEvent::AppStateChange { is_active: false })
        .await;
    assert_eq!(h.controller.screen(), Screen::VideoList);
    assert_eq!(h.guard.active_timers(), 0);
    assert!(h.controller.current_embed_url().is_none());
}

#[tokio::test]
async fn restore_reuses_the_cached_identity() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(login_input()))
        .await;

    // A fresh controller over the same store restores straight to courses.
    let mut second = AppController::new(
        h.directory.clone(),
        h.store.clone(),
        Arc::new(WatermarkGuard::new()),
        Arc::new(HeadlessShell::new()),
    );
    second.launch().await;
    assert_eq!(second.screen(), Screen::CourseList);
    assert_eq!(second.catalog_view(), CatalogView::Courses);
}

#[tokio::test]
async fn restore_of_a_disabled_account_fails_closed() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(login_input()))
        .await;

    h.directory.student.lock().unwrap().enabled = false;
    let mut second = AppController::new(
        h.directory.clone(),
        h.store.clone(),
        Arc::new(WatermarkGuard::new()),
        Arc::new(HeadlessShell::new()),
    );
    second.launch().await;
    assert_eq!(second.screen(), Screen::LoggedOut);
    assert!(second
        .take_notice()
        .is_some_and(|n| n.contains("disabled")));
    // The cached identity is gone.
    assert!(h.store.map.lock().unwrap().is_empty());
}

#[tokio::test]
async fn logout_clears_everything() {
    let mut h = harness();
    h.controller.launch().await;
    h.controller
        .handle(AppEvent::SubmitLogin(login_input()))
        .await;
    h.controller.handle(AppEvent::Logout).await;

    assert_eq!(h.controller.screen(), Screen::LoggedOut);
    assert!(h.controller.entries().is_empty());
    assert!(h.store.map.lock().unwrap().is_empty());
}
