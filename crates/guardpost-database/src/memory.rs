//! In-process repositories backed by a Tokio mutex.
//!
//! All three repositories share one [`MemoryDatabase`], so operations that
//! span tables (registration, password reset, user deletion) are atomic
//! under a single lock. Suitable for single-node development and tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use guardpost_core::error::AppError;
use guardpost_core::result::AppResult;
use guardpost_entity::session::{CreateSession, RefreshSession};
use guardpost_entity::user::{CreateUser, UpdateProfile, User, UserStatus};

use crate::repository::{PermissionRepository, SessionRepository, UserRepository};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, RefreshSession>,
    grants: HashMap<Uuid, BTreeSet<String>>,
}

impl Tables {
    fn delete_sessions_of(&mut self, user_id: Uuid, keep: Option<Uuid>) -> u64 {
        let before = self.sessions.len();
        self.sessions
            .retain(|id, s| s.user_id != user_id || Some(*id) == keep);
        (before - self.sessions.len()) as u64
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }
}

fn new_session_row(session: &CreateSession, now: DateTime<Utc>) -> RefreshSession {
    RefreshSession {
        id: session.id,
        user_id: session.user_id,
        token_hash: session.token_hash.clone(),
        user_agent: session.metadata.user_agent.clone(),
        ip_address: session.metadata.ip_address.clone(),
        expires_at: session.expires_at,
        created_at: now,
        last_used_at: now,
    }
}

/// Shared in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// User repository view.
    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository { db: self.clone() }
    }

    /// Session repository view.
    pub fn sessions(&self) -> MemorySessionRepository {
        MemorySessionRepository { db: self.clone() }
    }

    /// Permission repository view.
    pub fn permissions(&self) -> MemoryPermissionRepository {
        MemoryPermissionRepository { db: self.clone() }
    }

    /// Force a session's expiry. Used to simulate elapsed time.
    pub async fn set_session_expiry(&self, session_id: Uuid, expires_at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.sessions.get_mut(&session_id) {
            Some(session) => {
                session.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

/// In-memory [`UserRepository`].
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    db: MemoryDatabase,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.db.tables.lock().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.db.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_with_session(
        &self,
        user: &CreateUser,
        session: &CreateSession,
    ) -> AppResult<(User, RefreshSession)> {
        let mut tables = self.db.tables.lock().await;

        if tables.email_taken(&user.email) {
            return Err(AppError::conflict("User with this email already exists."));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            phone: user.phone.clone(),
            role: user.role,
            department: user.department.clone(),
            status: UserStatus::Active,
            last_active: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        let first_session = new_session_row(session, now);

        tables.users.insert(created.id, created.clone());
        tables.sessions.insert(first_session.id, first_session.clone());

        Ok((created, first_session))
    }

    async fn update_profile(&self, id: Uuid, changes: &UpdateProfile) -> AppResult<Option<User>> {
        let mut tables = self.db.tables.lock().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(phone) = &changes.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(department) = &changes.department {
            user.department = Some(department.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_status(&self, id: Uuid, status: UserStatus) -> AppResult<Option<User>> {
        let mut tables = self.db.tables.lock().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.status = status;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_status_and_revoke(
        &self,
        id: Uuid,
        status: UserStatus,
    ) -> AppResult<Option<(User, u64)>> {
        let mut tables = self.db.tables.lock().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        user.status = status;
        user.updated_at = Utc::now();
        let user = user.clone();
        let revoked = tables.delete_sessions_of(id, None);
        Ok(Some((user, revoked)))
    }

    async fn touch_last_active(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut tables = self.db.tables.lock().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.last_active = Some(Utc::now());
            user.clone()
        }))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tables = self.db.tables.lock().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.reset_token_hash = Some(token_hash.to_string());
            user.reset_token_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        let tables = self.db.tables.lock().await;
        let now = Utc::now();
        Ok(tables
            .users
            .values()
            .find(|u| holds_reset_token(u, token_hash, now))
            .cloned())
    }

    async fn complete_password_reset(
        &self,
        token_hash: &str,
        new_password_hash: &str,
    ) -> AppResult<bool> {
        let mut tables = self.db.tables.lock().await;
        let now = Utc::now();

        let Some(user) = tables
            .users
            .values_mut()
            .find(|u| holds_reset_token(u, token_hash, now))
        else {
            return Ok(false);
        };

        user.password_hash = new_password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.updated_at = now;
        let user_id = user.id;

        tables.delete_sessions_of(user_id, None);
        Ok(true)
    }

    async fn change_password(&self, id: Uuid, new_password_hash: &str) -> AppResult<u64> {
        let mut tables = self.db.tables.lock().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.password_hash = new_password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(tables.delete_sessions_of(id, None))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.db.tables.lock().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.delete_sessions_of(id, None);
        tables.grants.remove(&id);
        Ok(true)
    }
}

fn holds_reset_token(user: &User, token_hash: &str, now: DateTime<Utc>) -> bool {
    user.reset_token_hash.as_deref() == Some(token_hash)
        && user.reset_token_expires_at.is_some_and(|exp| exp > now)
}

/// In-memory [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct MemorySessionRepository {
    db: MemoryDatabase,
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: &CreateSession) -> AppResult<RefreshSession> {
        let mut tables = self.db.tables.lock().await;
        if !tables.users.contains_key(&session.user_id) {
            return Err(AppError::database("Session references an unknown user"));
        }
        let row = new_session_row(session, Utc::now());
        tables.sessions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn touch_if_active(
        &self,
        token_hash: &str,
        user_id: Uuid,
    ) -> AppResult<Option<RefreshSession>> {
        let mut tables = self.db.tables.lock().await;
        let now = Utc::now();
        Ok(tables
            .sessions
            .values_mut()
            .find(|s| s.token_hash == token_hash && s.user_id == user_id && s.is_active_at(now))
            .map(|s| {
                s.last_used_at = now;
                s.clone()
            }))
    }

    async fn rotate(
        &self,
        old_token_hash: &str,
        user_id: Uuid,
        replacement: &CreateSession,
    ) -> AppResult<Option<RefreshSession>> {
        let mut tables = self.db.tables.lock().await;
        let now = Utc::now();
        let consumed = tables
            .sessions
            .values()
            .find(|s| {
                s.token_hash == old_token_hash && s.user_id == user_id && s.is_active_at(now)
            })
            .map(|s| s.id);
        let Some(old_id) = consumed else {
            return Ok(None);
        };

        tables.sessions.remove(&old_id);
        let row = new_session_row(replacement, now);
        tables.sessions.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn find_active_by_user(&self, user_id: Uuid) -> AppResult<Vec<RefreshSession>> {
        let tables = self.db.tables.lock().await;
        let now = Utc::now();
        let mut sessions: Vec<RefreshSession> = tables
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active_at(now))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.last_used_at
                .cmp(&a.last_used_at)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(sessions)
    }

    async fn delete_for_user(&self, user_id: Uuid, session_id: Uuid) -> AppResult<bool> {
        let mut tables = self.db.tables.lock().await;
        match tables.sessions.get(&session_id) {
            Some(s) if s.user_id == user_id => {
                tables.sessions.remove(&session_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_all_for_user(&self, user_id: Uuid, keep: Option<Uuid>) -> AppResult<u64> {
        let mut tables = self.db.tables.lock().await;
        Ok(tables.delete_sessions_of(user_id, keep))
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<bool> {
        let mut tables = self.db.tables.lock().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.token_hash != token_hash);
        Ok(tables.sessions.len() < before)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let mut tables = self.db.tables.lock().await;
        let now = Utc::now();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| s.is_active_at(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}

/// In-memory [`PermissionRepository`].
#[derive(Debug, Clone)]
pub struct MemoryPermissionRepository {
    db: MemoryDatabase,
}

#[async_trait]
impl PermissionRepository for MemoryPermissionRepository {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let tables = self.db.tables.lock().await;
        Ok(tables
            .grants
            .get(&user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn has_permission(&self, user_id: Uuid, permission: &str) -> AppResult<bool> {
        let tables = self.db.tables.lock().await;
        Ok(tables
            .grants
            .get(&user_id)
            .is_some_and(|set| set.contains(permission)))
    }

    async fn replace_for_user(&self, user_id: Uuid, permissions: &[String]) -> AppResult<()> {
        let mut tables = self.db.tables.lock().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::database("Permission grant references an unknown user"));
        }
        let set: BTreeSet<String> = permissions.iter().cloned().collect();
        if set.is_empty() {
            tables.grants.remove(&user_id);
        } else {
            tables.grants.insert(user_id, set);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use guardpost_entity::session::ClientMetadata;
    use guardpost_entity::user::UserRole;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: None,
            role: UserRole::Guard,
            department: None,
        }
    }

    fn new_session(user_id: Uuid, token_hash: &str) -> CreateSession {
        CreateSession {
            id: Uuid::new_v4(),
            user_id,
            token_hash: token_hash.into(),
            metadata: ClientMetadata::default(),
            expires_at: Utc::now() + Duration::days(30),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict_and_writes_nothing() {
        let db = MemoryDatabase::new();
        let first = new_user("a@x.com");
        db.users()
            .create_with_session(&first, &new_session(first.id, "t1"))
            .await
            .unwrap();

        let dup = new_user("A@X.com");
        let err = db
            .users()
            .create_with_session(&dup, &new_session(dup.id, "t2"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, guardpost_core::ErrorKind::Conflict);
        assert!(db.users().find_by_id(dup.id).await.unwrap().is_none());
        assert!(
            db.sessions()
                .touch_if_active("t2", dup.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_touch_requires_owner_and_unexpired_row() {
        let db = MemoryDatabase::new();
        let user = new_user("b@x.com");
        let (_, session) = db
            .users()
            .create_with_session(&user, &new_session(user.id, "tok"))
            .await
            .unwrap();

        let sessions = db.sessions();
        assert!(sessions.touch_if_active("tok", user.id).await.unwrap().is_some());
        assert!(
            sessions
                .touch_if_active("tok", Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );

        db.set_session_expiry(session.id, Utc::now() - Duration::seconds(1))
            .await;
        assert!(sessions.touch_if_active("tok", user.id).await.unwrap().is_none());
        assert_eq!(sessions.delete_expired().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_all_keeps_current() {
        let db = MemoryDatabase::new();
        let user = new_user("c@x.com");
        let (_, current) = db
            .users()
            .create_with_session(&user, &new_session(user.id, "s1"))
            .await
            .unwrap();
        db.sessions().create(&new_session(user.id, "s2")).await.unwrap();
        db.sessions().create(&new_session(user.id, "s3")).await.unwrap();

        let removed = db
            .sessions()
            .delete_all_for_user(user.id, Some(current.id))
            .await
            .unwrap();
        assert_eq!(removed, 2);

        let left = db.sessions().find_active_by_user(user.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, current.id);
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_not_consumed() {
        let db = MemoryDatabase::new();
        let user = new_user("d@x.com");
        db.users()
            .create_with_session(&user, &new_session(user.id, "s"))
            .await
            .unwrap();
        db.users()
            .set_reset_token(user.id, "digest", Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        assert!(db.users().find_by_reset_token("digest").await.unwrap().is_none());
        assert!(
            !db.users()
                .complete_password_reset("digest", "new-hash")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_rotate_consumes_old_session_once() {
        let db = MemoryDatabase::new();
        let user = new_user("f@x.com");
        db.users()
            .create_with_session(&user, &new_session(user.id, "old"))
            .await
            .unwrap();

        let sessions = db.sessions();
        let rotated = sessions
            .rotate("old", user.id, &new_session(user.id, "new-1"))
            .await
            .unwrap();
        assert!(rotated.is_some());

        let again = sessions
            .rotate("old", user.id, &new_session(user.id, "new-2"))
            .await
            .unwrap();
        assert!(again.is_none());

        let left = sessions.find_active_by_user(user.id).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].token_hash, "new-1");
    }

    #[tokio::test]
    async fn test_status_change_with_revoke_drops_sessions() {
        let db = MemoryDatabase::new();
        let user = new_user("g@x.com");
        db.users()
            .create_with_session(&user, &new_session(user.id, "s1"))
            .await
            .unwrap();
        db.sessions().create(&new_session(user.id, "s2")).await.unwrap();

        let (updated, revoked) = db
            .users()
            .update_status_and_revoke(user.id, UserStatus::Suspended)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, UserStatus::Suspended);
        assert_eq!(revoked, 2);
        assert!(db.sessions().find_active_by_user(user.id).await.unwrap().is_empty());

        assert!(
            db.users()
                .update_status_and_revoke(Uuid::new_v4(), UserStatus::Suspended)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let db = MemoryDatabase::new();
        let user = new_user("e@x.com");
        db.users()
            .create_with_session(&user, &new_session(user.id, "s"))
            .await
            .unwrap();
        db.permissions()
            .replace_for_user(user.id, &["users.read".to_string()])
            .await
            .unwrap();

        assert!(db.users().delete(user.id).await.unwrap());
        assert!(db.sessions().find_active_by_user(user.id).await.unwrap().is_empty());
        assert!(db.permissions().find_by_user(user.id).await.unwrap().is_empty());
    }
}
