//! services/app/src/controller.rs
//!
//! The application controller: owns the session manager, catalog builder and
//! navigation state machine, and drives them from discrete user/lifecycle
//! events. Each event is handled to completion before the next one starts
//! (`&mut self` makes concurrent transitions unrepresentable), which is the
//! same guarantee the original got from disabling the triggering control
//! while its request was in flight.

use std::sync::Arc;

use chrono::Local;
use tracing::warn;

use lms_core::access::{LoginError, LoginInput};
use lms_core::catalog::{self, Catalog, CatalogBuilder, CatalogEntry, VideoList};
use lms_core::domain::{Student, Video};
use lms_core::navigation::{BackOutcome, Navigator, Screen};
use lms_core::ports::{CredentialStore, DirectoryService, HostShell, PlaybackProtection};
use lms_core::session::{InvalidationReason, RestoreOutcome, SessionManager};
use lms_core::video;

use crate::ui;

/// Everything the user (or the host) can do to the application.
#[derive(Debug, Clone)]
pub enum AppEvent {
    SubmitLogin(LoginInput),
    SelectCourse(usize),
    SelectVideo(usize),
    OpenLiveClass,
    CloseLiveClass,
    ToggleFullscreen,
    Back,
    Logout,
    AppStateChange { is_active: bool },
}

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// What the course-list screen is currently showing. `Empty` and
/// `AllExpired` are deliberately separate: they carry different messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogView {
    NotLoaded,
    /// No assignments at all.
    Empty,
    /// Assignments existed but every one expired or failed to resolve.
    AllExpired,
    /// The catalog load itself failed (connectivity).
    LoadFailed,
    Courses,
}

pub struct AppController {
    directory: Arc<dyn DirectoryService>,
    sessions: SessionManager,
    catalog: CatalogBuilder,
    nav: Navigator,

    catalog_view: CatalogView,
    entries: Vec<CatalogEntry>,
    course_title: Option<String>,
    videos: Vec<Video>,
    live_class_link: Option<String>,
    current_video: Option<usize>,
    current_embed_url: Option<String>,
    notice: Option<String>,
}

impl AppController {
    pub fn new(
        directory: Arc<dyn DirectoryService>,
        store: Arc<dyn CredentialStore>,
        protection: Arc<dyn PlaybackProtection>,
        shell: Arc<dyn HostShell>,
    ) -> Self {
        Self {
            directory: directory.clone(),
            sessions: SessionManager::new(directory.clone(), store),
            catalog: CatalogBuilder::new(directory),
            nav: Navigator::new(protection, shell),
            catalog_view: CatalogView::NotLoaded,
            entries: Vec::new(),
            course_title: None,
            videos: Vec::new(),
            live_class_link: None,
            current_video: None,
            current_embed_url: None,
            notice: None,
        }
    }

    /// Launch sequence: attempt restore from the credential store, then land
    /// on either the course list (with the catalog loaded) or the login
    /// screen. A disabled account gets its message; other invalidations go
    /// silently back to login.
    pub async fn launch(&mut self) {
        match self.sessions.restore().await {
            RestoreOutcome::Restored => {
                self.nav.show_course_list();
                self.reload_catalog().await;
            }
            RestoreOutcome::Invalidated(InvalidationReason::AccountDisabled) => {
                self.notice = Some(LoginError::AccountDisabled.to_string());
                self.nav.show_login();
            }
            RestoreOutcome::Invalidated(_) | RestoreOutcome::NoCachedIdentity => {
                self.nav.show_login();
            }
        }
    }

    pub async fn handle(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::SubmitLogin(input) => self.submit_login(input).await,
            AppEvent::SelectCourse(index) => self.select_course(index).await,
            AppEvent::SelectVideo(index) => self.select_video(index),
            AppEvent::OpenLiveClass => {
                if self.live_class_link.is_some() {
                    self.nav.open_live_class();
                }
            }
            AppEvent::CloseLiveClass => self.nav.close_live_class(),
            AppEvent::ToggleFullscreen => {
                self.nav.toggle_fullscreen();
            }
            AppEvent::Back => return self.back(),
            AppEvent::Logout => self.logout().await,
            AppEvent::AppStateChange { is_active } => {
                self.nav.app_state_changed(is_active);
                if self.nav.screen() != Screen::VideoPlaying {
                    self.current_video = None;
                    self.current_embed_url = None;
                }
            }
        }
        Flow::Continue
    }

    async fn submit_login(&mut self, input: LoginInput) {
        if self.nav.screen() != Screen::LoggedOut {
            return;
        }
        match self.sessions.login(&input).await {
            Ok(_) => {
                self.notice = None;
                self.nav.show_course_list();
                self.reload_catalog().await;
            }
            // Every failure reason keeps its own message; none retries.
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    async fn select_course(&mut self, index: usize) {
        if self.nav.screen() != Screen::CourseList {
            return;
        }
        let Some(entry) = self.entries.get(index) else {
            self.notice = Some("No such course".to_string());
            return;
        };
        let course_name = entry.course.name.clone();
        self.nav.open_course();

        // Always re-fetched: topics may have changed since the catalog load.
        match self.directory.get_course(&course_name).await {
            Ok(course) => {
                self.course_title = Some(course.title.clone());
                self.live_class_link = course
                    .live_class_link
                    .clone()
                    .filter(|link| video::is_live_class_link(link));
                self.videos = match catalog::playable_videos(&course) {
                    VideoList::Videos(videos) => videos,
                    VideoList::NoVideos => Vec::new(),
                };
            }
            Err(e) => {
                self.notice = Some(format!("Error loading videos: {e}"));
                self.course_title = None;
                self.live_class_link = None;
                self.videos.clear();
            }
        }
    }

    fn select_video(&mut self, index: usize) {
        let screen = self.nav.screen();
        if screen != Screen::VideoList && screen != Screen::VideoPlaying {
            return;
        }
        let Some(video) = self.videos.get(index) else {
            self.notice = Some("No such video".to_string());
            return;
        };
        let Some(id) = video::youtube_video_id(&video.url) else {
            self.notice = Some("Invalid video link".to_string());
            return;
        };
        let embed = video::embed_url(id);
        let Some(watermark) = self.sessions.session().map(|s| ui::watermark_text(&s.student))
        else {
            warn!("video selected without an active session");
            return;
        };
        if self.nav.play_video(&watermark) {
            self.current_video = Some(index);
            self.current_embed_url = Some(embed);
        }
    }

    fn back(&mut self) -> Flow {
        let outcome = self.nav.back();
        if self.nav.screen() != Screen::VideoPlaying {
            self.current_video = None;
            self.current_embed_url = None;
        }
        if self.nav.screen() == Screen::CourseList {
            self.course_title = None;
            self.videos.clear();
            self.live_class_link = None;
        }
        match outcome {
            BackOutcome::ExitRequested => Flow::Exit,
            _ => Flow::Continue,
        }
    }

    async fn logout(&mut self) {
        self.sessions.logout().await;
        self.catalog_view = CatalogView::NotLoaded;
        self.entries.clear();
        self.course_title = None;
        self.videos.clear();
        self.live_class_link = None;
        self.current_video = None;
        self.current_embed_url = None;
        self.nav.show_login();
    }

    async fn reload_catalog(&mut self) {
        let Some(student_name) = self.sessions.session().map(|s| s.student.name.clone()) else {
            self.nav.show_login();
            return;
        };
        let today = Local::now().date_naive();
        match self.catalog.load(&student_name, today).await {
            Ok(Catalog::Empty) => {
                self.catalog_view = CatalogView::Empty;
                self.entries.clear();
            }
            Ok(Catalog::AllExpired) => {
                self.catalog_view = CatalogView::AllExpired;
                self.entries.clear();
            }
            Ok(Catalog::Courses(entries)) => {
                self.catalog_view = CatalogView::Courses;
                self.entries = entries;
            }
            Err(e) => {
                warn!(error = %e, "catalog load failed");
                self.catalog_view = CatalogView::LoadFailed;
                self.entries.clear();
            }
        }
    }

    //=====================================================================================
    // Read accessors for the presentation layer
    //=====================================================================================

    pub fn screen(&self) -> Screen {
        self.nav.screen()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.nav.is_fullscreen()
    }

    pub fn is_live_class_open(&self) -> bool {
        self.nav.is_live_class_open()
    }

    pub fn student(&self) -> Option<&Student> {
        self.sessions.session().map(|s| &s.student)
    }

    pub fn catalog_view(&self) -> CatalogView {
        self.catalog_view
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn course_title(&self) -> Option<&str> {
        self.course_title.as_deref()
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn live_class_link(&self) -> Option<&str> {
        self.live_class_link.as_deref()
    }

    pub fn current_video(&self) -> Option<usize> {
        self.current_video
    }

    pub fn current_embed_url(&self) -> Option<&str> {
        self.current_embed_url.as_deref()
    }

    /// One-shot status message for the presentation layer.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}
