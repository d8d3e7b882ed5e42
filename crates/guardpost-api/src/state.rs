//! Application state shared across all handlers and extractors.

use std::sync::Arc;
use std::time::Duration;

use guardpost_auth::jwt::{JwtDecoder, JwtEncoder};
use guardpost_auth::password::{PasswordHasher, PasswordResetFlow};
use guardpost_auth::rbac::RbacEnforcer;
use guardpost_auth::session::{SessionCleanup, SessionManager, SessionStore};
use guardpost_auth::{AccountService, Authenticator};
use guardpost_core::config::AppConfig;
use guardpost_core::error::AppError;
use guardpost_database::repositories::{
    PgPermissionRepository, PgSessionRepository, PgUserRepository,
};
use guardpost_database::{
    DatabasePool, PermissionRepository, SessionRepository, UserRepository,
};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL pool, absent when running on in-memory repositories.
    pub db_pool: Option<DatabasePool>,
    /// Bearer token to request identity.
    pub authenticator: Arc<Authenticator>,
    /// Role and permission checks.
    pub rbac: Arc<RbacEnforcer>,
    /// Register, login, refresh and logout.
    pub session_manager: Arc<SessionManager>,
    /// Session listing and revocation.
    pub session_store: Arc<SessionStore>,
    /// Password reset flow.
    pub reset_flow: Arc<PasswordResetFlow>,
    /// Profile and admin user operations.
    pub accounts: Arc<AccountService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("postgres", &self.db_pool.is_some())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires every service on top of the given repositories.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        permissions: Arc<dyn PermissionRepository>,
        db_pool: Option<DatabasePool>,
    ) -> Result<Self, AppError> {
        config.auth.validate()?;

        let hasher = PasswordHasher::new(&config.auth)?;
        let encoder = Arc::new(JwtEncoder::new(&config.auth));
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let session_store = Arc::new(SessionStore::new(sessions));

        let session_manager = Arc::new(SessionManager::new(
            encoder,
            Arc::clone(&decoder),
            Arc::clone(&session_store),
            Arc::clone(&users),
            Arc::clone(&permissions),
            hasher.clone(),
            &config.auth,
        ));
        let reset_flow = Arc::new(PasswordResetFlow::new(
            Arc::clone(&users),
            hasher.clone(),
            &config.auth,
        ));
        let accounts = Arc::new(AccountService::new(
            Arc::clone(&users),
            Arc::clone(&permissions),
            hasher,
        ));
        let authenticator = Arc::new(Authenticator::new(decoder, users));
        let rbac = Arc::new(RbacEnforcer::new(permissions));

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            authenticator,
            rbac,
            session_manager,
            session_store,
            reset_flow,
            accounts,
        })
    }

    /// State backed by PostgreSQL.
    pub fn postgres(config: AppConfig, pool: DatabasePool) -> Result<Self, AppError> {
        let pg = pool.pool().clone();
        Self::new(
            config,
            Arc::new(PgUserRepository::new(pg.clone())),
            Arc::new(PgSessionRepository::new(pg.clone())),
            Arc::new(PgPermissionRepository::new(pg)),
            Some(pool),
        )
    }

    /// Background purge of expired sessions on the configured interval.
    pub fn session_cleanup(&self) -> SessionCleanup {
        let minutes = self.config.session.cleanup_interval_minutes.max(1);
        SessionCleanup::new(
            Arc::clone(&self.session_store),
            Duration::from_secs(minutes * 60),
        )
    }
}
