pub mod access;
pub mod catalog;
pub mod domain;
pub mod navigation;
pub mod ports;
pub mod session;
pub mod video;

pub use access::{verify, LoginError, LoginInput};
pub use catalog::{Catalog, CatalogBuilder, CatalogEntry, ExpiryStatus, VideoList};
pub use domain::{Course, CourseAssignment, Session, Student, Topic, Video};
pub use navigation::{BackOutcome, Navigator, Screen};
pub use ports::{
    CredentialStore, DirectoryService, HostShell, Orientation, PlaybackProtection, PortError,
    PortResult,
};
pub use session::{InvalidationReason, RestoreOutcome, SessionManager};
