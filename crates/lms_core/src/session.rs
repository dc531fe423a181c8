//! crates/lms_core/src/session.rs
//!
//! The session manager: holds the currently authenticated identity in process
//! memory, backed by the credential store for restart survival, and decides
//! whether a cached identity is still valid on launch.

use std::sync::Arc;

use tracing::warn;

use crate::access::{self, LoginError, LoginInput};
use crate::domain::{Session, Student};
use crate::ports::{CredentialStore, DirectoryService};

/// Credential store key holding the cached login email.
pub const EMAIL_KEY: &str = "student_email";
/// Credential store key holding the serialized identity snapshot.
pub const SNAPSHOT_KEY: &str = "student_data";

/// Why a cached identity was rejected during launch restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The directory could not be reached. Fail-closed: a session we cannot
    /// re-validate is treated as no session at all.
    Transport,
    /// The cached email no longer matches any directory record.
    UnknownEmail,
    /// The account was disabled since the snapshot was taken.
    AccountDisabled,
}

/// Outcome of the launch-time restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing cached; go straight to the login screen.
    NoCachedIdentity,
    /// A cached identity existed but failed re-validation. The store has
    /// already been cleared.
    Invalidated(InvalidationReason),
    /// The fresh record was adopted as the active session.
    Restored,
}

pub struct SessionManager {
    directory: Arc<dyn DirectoryService>,
    store: Arc<dyn CredentialStore>,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(directory: Arc<dyn DirectoryService>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            directory,
            store,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Runs the full login sequence: fetch the record by email, verify the
    /// credentials in order, consume the one-time key, establish the session,
    /// and persist the snapshot for auto-restore.
    ///
    /// Consuming the key is best-effort: a user who passed every check is
    /// never blocked because the flag update failed to persist. The failure
    /// is logged and the session proceeds. The same policy applies to the
    /// snapshot write; only the verification itself can fail a login.
    pub async fn login(&mut self, input: &LoginInput) -> Result<Session, LoginError> {
        let email = input.email.trim();
        let record = self.directory.find_student_by_email(email).await?;
        access::verify(input, record.as_ref())?;
        let student = match record {
            Some(student) => student,
            // verify already rejected the missing-record case.
            None => return Err(LoginError::UnknownEmail),
        };

        if let Err(e) = self.directory.mark_key_used(&student.name).await {
            warn!(student = %student.name, error = %e, "failed to mark private key as used");
        }

        self.persist_snapshot(email, &student).await;
        let session = Session { student };
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Launch-time restore. The cached snapshot is a convenience for UI
    /// continuity, never a trust source: a fresh record is always fetched,
    /// and any doubt clears the store and sends the user back to login.
    pub async fn restore(&mut self) -> RestoreOutcome {
        let email = match self.store.get(EMAIL_KEY).await {
            Ok(Some(email)) => email,
            _ => return RestoreOutcome::NoCachedIdentity,
        };
        match self.store.get(SNAPSHOT_KEY).await {
            Ok(Some(_)) => {}
            _ => return RestoreOutcome::NoCachedIdentity,
        }

        let student = match self.directory.find_student_by_email(&email).await {
            Ok(Some(student)) => student,
            Ok(None) => return self.invalidate(InvalidationReason::UnknownEmail).await,
            Err(e) => {
                warn!(error = %e, "could not re-validate cached identity");
                return self.invalidate(InvalidationReason::Transport).await;
            }
        };

        if !student.enabled {
            return self.invalidate(InvalidationReason::AccountDisabled).await;
        }

        self.session = Some(Session { student });
        RestoreOutcome::Restored
    }

    /// Clears the in-memory session and the persisted snapshot.
    pub async fn logout(&mut self) {
        self.session = None;
        self.clear_store().await;
    }

    async fn invalidate(&mut self, reason: InvalidationReason) -> RestoreOutcome {
        self.session = None;
        self.clear_store().await;
        RestoreOutcome::Invalidated(reason)
    }

    async fn persist_snapshot(&self, email: &str, student: &Student) {
        if let Err(e) = self.store.set(EMAIL_KEY, email).await {
            warn!(error = %e, "failed to persist cached email");
            return;
        }
        let snapshot = match serde_json::to_string(student) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize identity snapshot");
                return;
            }
        };
        if let Err(e) = self.store.set(SNAPSHOT_KEY, &snapshot).await {
            warn!(error = %e, "failed to persist identity snapshot");
        }
    }

    async fn clear_store(&self) {
        for key in [EMAIL_KEY, SNAPSHOT_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "failed to clear credential store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Course;
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeDirectory {
        student: Mutex<Option<Student>>,
        fail_lookup: Mutex<bool>,
        fail_mark: Mutex<bool>,
    }

    impl FakeDirectory {
        fn with_student(student: Student) -> Arc<Self> {
            Arc::new(Self {
                student: Mutex::new(Some(student)),
                fail_lookup: Mutex::new(false),
                fail_mark: Mutex::new(false),
            })
        }
    }

    #[async_trait]
    impl DirectoryService for FakeDirectory {
        async fn find_student_by_email(&self, email: &str) -> PortResult<Option<Student>> {
            if *self.fail_lookup.lock().unwrap() {
                return Err(PortError::Network("connection refused".into()));
            }
            Ok(self
                .student
                .lock()
                .unwrap()
                .clone()
                .filter(|s| s.email == email))
        }

        async fn get_student(&self, name: &str) -> PortResult<Student> {
            self.student
                .lock()
                .unwrap()
                .clone()
                .filter(|s| s.name == name)
                .ok_or_else(|| PortError::NotFound(name.into()))
        }

        async fn get_course(&self, name: &str) -> PortResult<Course> {
            Err(PortError::NotFound(name.into()))
        }

        async fn mark_key_used(&self, _name: &str) -> PortResult<()> {
            if *self.fail_mark.lock().unwrap() {
                return Err(PortError::Server("internal server error".into()));
            }
            if let Some(s) = self.student.lock().unwrap().as_mut() {
                s.key_used = true;
            }
            Ok(())
        }
    }

    struct MemoryStore {
        map: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                map: Mutex::new(HashMap::new()),
            })
        }

        fn seeded(email: &str, snapshot: &str) -> Arc<Self> {
            let store = Self::new();
            let mut map = store.map.lock().unwrap();
            map.insert(EMAIL_KEY.into(), email.into());
            map.insert(SNAPSHOT_KEY.into(), snapshot.into());
            drop(map);
            store
        }

        fn is_empty(&self) -> bool {
            self.map.lock().unwrap().is_empty()
        }
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
        Student {
            name: "EDU-STU-0001".into(),
            email: "amy@example.com".into(),
            first_name: "Amy".into(),
            last_name: Some("March".into()),
            enabled: true,
            password: Some("p1".into()),
            private_key: Some("k1".into()),
            key_used: false,
            assignments: vec![],
        }
    }

    fn input() -> LoginInput {
        LoginInput {
            email: "amy@example.com".into(),
            password: "p1".into(),
            private_key: "k1".into(),
        }
    }

    #[tokio::test]
    async fn successful_login_consumes_key_and_persists_snapshot() {
        let directory = FakeDirectory::with_student(student());
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(directory.clone(), store.clone());

        manager.login(&input()).await.expect("login should succeed");
        assert!(manager.session().is_some());
        assert!(directory.student.lock().unwrap().as_ref().unwrap().key_used);
        assert!(store
            .get(EMAIL_KEY)
            .await
            .unwrap()
            .is_some_and(|e| e == "amy@example.com"));
        assert!(store.get(SNAPSHOT_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn second_login_with_same_key_is_rejected() {
        let directory = FakeDirectory::with_student(student());
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(directory, store);

        manager.login(&input()).await.expect("first login");
        let err = manager.login(&input()).await.unwrap_err();
        assert!(matches!(err, LoginError::KeyAlreadyUsed));
    }

    #[tokio::test]
    async fn failing_key_consumption_does_not_abort_login() {
        let directory = FakeDirectory::with_student(student());
        *directory.fail_mark.lock().unwrap() = true;
        let mut manager = SessionManager::new(directory, MemoryStore::new());

        manager
            .login(&input())
            .await
            .expect("login proceeds despite the update failure");
        assert!(manager.session().is_some());
    }

    #[tokio::test]
    async fn lookup_failure_surfaces_as_transport_error() {
        let directory = FakeDirectory::with_student(student());
        *directory.fail_lookup.lock().unwrap() = true;
        let mut manager = SessionManager::new(directory, MemoryStore::new());

        let err = manager.login(&input()).await.unwrap_err();
        assert!(matches!(err, LoginError::Transport(_)));
    }

    #[tokio::test]
    async fn restore_with_empty_store_asks_for_login() {
        let directory = FakeDirectory::with_student(student());
        let mut manager = SessionManager::new(directory, MemoryStore::new());
        assert_eq!(manager.restore().await, RestoreOutcome::NoCachedIdentity);
    }

    #[tokio::test]
    async fn restore_adopts_fresh_record_not_the_snapshot() {
        let directory = FakeDirectory::with_student(student());
        // Stale snapshot with an outdated first name.
        let stale = serde_json::to_string(&Student {
            first_name: "Old".into(),
            ..student()
        })
        .unwrap();
        let store = MemoryStore::seeded("amy@example.com", &stale);
        let mut manager = SessionManager::new(directory, store);

        assert_eq!(manager.restore().await, RestoreOutcome::Restored);
        assert_eq!(manager.session().unwrap().student.first_name, "Amy");
    }

    #[tokio::test]
    async fn restore_fails_closed_on_transport_error() {
        let directory = FakeDirectory::with_student(student());
        *directory.fail_lookup.lock().unwrap() = true;
        let store = MemoryStore::seeded("amy@example.com", "{}");
        let mut manager = SessionManager::new(directory, store.clone());

        assert_eq!(
            manager.restore().await,
            RestoreOutcome::Invalidated(InvalidationReason::Transport)
        );
        assert!(manager.session().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn restore_clears_store_when_record_vanished() {
        let directory = FakeDirectory::with_student(student());
        let store = MemoryStore::seeded("someone-else@example.com", "{}");
        let mut manager = SessionManager::new(directory, store.clone());

        assert_eq!(
            manager.restore().await,
            RestoreOutcome::Invalidated(InvalidationReason::UnknownEmail)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn restore_rejects_disabled_account() {
        let directory = FakeDirectory::with_student(Student {
            enabled: false,
            ..student()
        });
        let store = MemoryStore::seeded("amy@example.com", "{}");
        let mut manager = SessionManager::new(directory, store.clone());

        assert_eq!(
            manager.restore().await,
            RestoreOutcome::Invalidated(InvalidationReason::AccountDisabled)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn logout_clears_session_and_store() {
        let directory = FakeDirectory::with_student(student());
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(directory, store.clone());

        manager.login(&input()).await.expect("login");
        manager.logout().await;
        assert!(manager.session().is_none());
        assert!(store.is_empty());
    }
}
