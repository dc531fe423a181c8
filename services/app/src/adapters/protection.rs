//! services/app/src/adapters/protection.rs
//!
//! The playback-protection adapter: the moving watermark overlay and the
//! input-protection handlers that live only while a video plays.
//!
//! The strict invariant here is no leakage: however many times playback
//! starts and stops, at most one watermark timer is ever live, and none
//! survives a disengage.

use lms_core::ports::PlaybackProtection;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

const WATERMARK_TICK: Duration = Duration::from_secs(2);

/// Initial overlay positions, as percentages of the video surface.
const INITIAL_MARKS: [WatermarkMark; 2] = [
    WatermarkMark { x: 20.0, y: 50.0 },
    WatermarkMark { x: 80.0, y: 85.0 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkMark {
    pub x: f32,
    pub y: f32,
}

#[derive(Default)]
struct GuardState {
    timer: Option<JoinHandle<()>>,
    input_handlers: bool,
}

/// Implements [`PlaybackProtection`] with one tokio interval task that
/// jitters the watermark positions every couple of seconds.
#[derive(Default)]
pub struct WatermarkGuard {
    state: Mutex<GuardState>,
    marks: Arc<Mutex<Vec<WatermarkMark>>>,
    text: Mutex<String>,
}

impl WatermarkGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current overlay positions; empty while disengaged.
    pub fn marks(&self) -> Vec<WatermarkMark> {
        self.marks.lock().expect("marks lock poisoned").clone()
    }

    pub fn watermark_text(&self) -> String {
        self.text.lock().expect("text lock poisoned").clone()
    }

    /// Number of live watermark timers. The whole point of this type is that
    /// the answer is never more than one.
    pub fn active_timers(&self) -> usize {
        let state = self.state.lock().expect("state lock poisoned");
        match &state.timer {
            Some(timer) if !timer.is_finished() => 1,
            _ => 0,
        }
    }

    pub fn input_handlers_active(&self) -> bool {
        self.state.lock().expect("state lock poisoned").input_handlers
    }
}

impl PlaybackProtection for WatermarkGuard {
    fn engage(&self, watermark_text: &str) {
        let mut state = self.state.lock().expect("state lock poisoned");
        // Replace, never stack: a previous timer dies before the new one starts.
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        *self.text.lock().expect("text lock poisoned") = watermark_text.to_string();
        *self.marks.lock().expect("marks lock poisoned") = INITIAL_MARKS.to_vec();

        let marks = Arc::clone(&self.marks);
        state.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(WATERMARK_TICK);
            // The first tick of an interval fires immediately; skip it so the
            // marks hold their initial positions for one full period.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut marks = marks.lock().expect("marks lock poisoned");
                let mut rng = rand::rng();
                for mark in marks.iter_mut() {
                    mark.x = (mark.x + rng.random_range(-2.0..=2.0)).clamp(5.0, 90.0);
                    mark.y = (mark.y + rng.random_range(-2.0..=2.0)).clamp(5.0, 90.0);
                }
            }
        }));
        state.input_handlers = true;
        debug!("playback protection engaged");
    }

    fn disengage(&self) {
        let mut state = self.state.lock().expect("state lock poisoned");
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.input_handlers = false;
        self.marks.lock().expect("marks lock poisoned").clear();
        self.text.lock().expect("text lock poisoned").clear();
        debug!("playback protection disengaged");
    }
}
