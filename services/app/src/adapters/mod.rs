pub mod credentials;
pub mod directory;
pub mod protection;
pub mod shell;

pub use credentials::FileCredentialStore;
pub use directory::PortalDirectory;
pub use protection::WatermarkGuard;
pub use shell::HeadlessShell;
