//! services/app/src/adapters/shell.rs
//!
//! A headless implementation of the `HostShell` port. The real shell would be
//! the native platform bridge; this one records the commands and logs them,
//! which is all a terminal-hosted client can do with orientation or
//! fullscreen requests.

use lms_core::ports::{HostShell, Orientation};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

#[derive(Default)]
pub struct HeadlessShell {
    exit_requested: AtomicBool,
}

impl HeadlessShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::SeqCst)
    }
}

impl HostShell for HeadlessShell {
    fn lock_orientation(&self, orientation: Orientation) {
        info!(?orientation, "orientation locked");
    }

    fn unlock_orientation(&self) {
        info!("orientation unlocked");
    }

    fn request_fullscreen(&self) {
        info!("fullscreen requested");
    }

    fn exit_fullscreen(&self) {
        info!("fullscreen exited");
    }

    fn exit_app(&self) {
        info!("app exit requested");
        self.exit_requested.store(true, Ordering::SeqCst);
    }
}
