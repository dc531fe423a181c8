//! crates/lms_core/src/navigation.rs
//!
//! The navigation state machine: the finite set of visible screens, the
//! transition rules between them, and the hardware-back-button semantics.
//! Replaces the original's DOM-visibility toggles with one explicit state
//! value; watermark and input protection are engaged and torn down here so
//! no transition path can leak a timer.

use std::sync::Arc;

use crate::ports::{HostShell, Orientation, PlaybackProtection};

/// One active leaf screen at a time. The live-class modal and fullscreen
/// presentation are orthogonal flags layered on top of the main stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LoggedOut,
    Loading,
    CourseList,
    VideoList,
    VideoPlaying,
}

/// How a hardware back press was resolved, in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    ExitedFullscreen,
    ClosedLiveClass,
    SteppedBack,
    /// Already at the course list (or not logged in); the app terminates.
    ExitRequested,
}

pub struct Navigator {
    screen: Screen,
    live_class_open: bool,
    fullscreen: bool,
    protection: Arc<dyn PlaybackProtection>,
    shell: Arc<dyn HostShell>,
}

impl Navigator {
    /// A fresh navigator starts on the loading screen; launch decides whether
    /// login or the course list comes next.
    pub fn new(protection: Arc<dyn PlaybackProtection>, shell: Arc<dyn HostShell>) -> Self {
        Self {
            screen: Screen::Loading,
            live_class_open: false,
            fullscreen: false,
            protection,
            shell,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_live_class_open(&self) -> bool {
        self.live_class_open
    }

    /// Present the login screen (launch without a session, invalidated
    /// restore, or logout).
    pub fn show_login(&mut self) {
        self.live_class_open = false;
        self.transition(Screen::LoggedOut);
    }

    /// Successful login or restore lands on the course list.
    pub fn show_course_list(&mut self) {
        self.live_class_open = false;
        self.transition(Screen::CourseList);
    }

    /// Course selected from the catalog.
    pub fn open_course(&mut self) -> bool {
        if self.screen != Screen::CourseList {
            return false;
        }
        self.transition(Screen::VideoList);
        true
    }

    /// Video selected, either from the video list or from the playlist while
    /// another video is already playing. Engages the watermark overlay and
    /// input protection; a repeat engage replaces the previous overlay.
    pub fn play_video(&mut self, watermark_text: &str) -> bool {
        if self.screen != Screen::VideoList && self.screen != Screen::VideoPlaying {
            return false;
        }
        self.transition(Screen::VideoPlaying);
        self.protection.engage(watermark_text);
        true
    }

    /// The live-class modal overlays the video list only.
    pub fn open_live_class(&mut self) -> bool {
        if self.screen != Screen::VideoList {
            return false;
        }
        self.live_class_open = true;
        true
    }

    pub fn close_live_class(&mut self) {
        self.live_class_open = false;
    }

    /// Fullscreen presentation exists only while a video plays. Entering
    /// locks the device to landscape, leaving locks it back to portrait.
    pub fn toggle_fullscreen(&mut self) -> bool {
        if self.screen != Screen::VideoPlaying {
            return false;
        }
        if self.fullscreen {
            self.drop_fullscreen();
        } else {
            self.shell.request_fullscreen();
            self.shell.unlock_orientation();
            self.shell.lock_orientation(Orientation::Landscape);
            self.fullscreen = true;
        }
        true
    }

    /// Hardware back press, resolved in fixed priority order: leave
    /// fullscreen, then close the live-class modal, then step back one level,
    /// and at the course list terminate the application.
    pub fn back(&mut self) -> BackOutcome {
        if self.fullscreen {
            self.drop_fullscreen();
            return BackOutcome::ExitedFullscreen;
        }
        if self.live_class_open {
            self.live_class_open = false;
            return BackOutcome::ClosedLiveClass;
        }
        match self.screen {
            Screen::VideoPlaying => {
                self.transition(Screen::VideoList);
                BackOutcome::SteppedBack
            }
            Screen::VideoList => {
                self.transition(Screen::CourseList);
                BackOutcome::SteppedBack
            }
            Screen::CourseList | Screen::LoggedOut | Screen::Loading => {
                self.shell.exit_app();
                BackOutcome::ExitRequested
            }
        }
    }

    /// Host lifecycle change. Backgrounding during playback force-unloads the
    /// video and tears the protection down.
    pub fn app_state_changed(&mut self, is_active: bool) {
        if !is_active && self.screen == Screen::VideoPlaying {
            self.transition(Screen::VideoList);
        }
    }

    /// All screen changes funnel through here so that leaving `VideoPlaying`
    /// tears down fullscreen and playback protection on every path.
    fn transition(&mut self, next: Screen) {
        if self.screen == Screen::VideoPlaying && next != Screen::VideoPlaying {
            if self.fullscreen {
                self.drop_fullscreen();
            }
            self.protection.disengage();
        }
        self.screen = next;
    }

    fn drop_fullscreen(&mut self) {
        self.shell.exit_fullscreen();
        self.shell.lock_orientation(Orientation::Portrait);
        self.fullscreen = false;
    }
}
