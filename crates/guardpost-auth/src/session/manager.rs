//! Session lifecycle manager: register, login, refresh and logout flows.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use guardpost_core::config::AuthConfig;
use guardpost_core::error::AppError;
use guardpost_database::{PermissionRepository, UserRepository};
use guardpost_entity::session::ClientMetadata;
use guardpost_entity::user::{CreateUser, User, UserRole};

use crate::jwt::{IssuedToken, JwtDecoder, JwtEncoder};
use crate::password::PasswordHasher;

use super::store::SessionStore;

/// Message for any failed login, whether the email or the password is wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

/// Message for a correct password on a suspended or inactive account.
pub const ACCOUNT_INACTIVE_MESSAGE: &str =
    "Account is suspended or inactive. Please contact administrator.";

/// Message for any refresh token that is not backed by a live session.
pub const INVALID_REFRESH_MESSAGE: &str = "Invalid or expired refresh token.";

/// Message when a refresh token outlives its user's active status.
pub const REFRESH_USER_INACTIVE_MESSAGE: &str = "User not found or inactive.";

/// Message when a required registration field is missing.
pub const REGISTER_REQUIRED_MESSAGE: &str = "Please provide name, email, password, and role.";

/// Input for self-registration.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Role name, e.g. `Guard` or `Operations Manager`.
    pub role: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Department name.
    pub department: Option<String>,
}

/// Tokens and identity handed back by register and login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// The authenticated user.
    pub user: User,
    /// Names of the permissions granted to the user.
    pub permissions: Vec<String>,
    /// Refresh session backing `refresh_token`.
    pub session_id: Uuid,
    /// Bearer credential.
    pub access_token: IssuedToken,
    /// Credential for minting new access tokens.
    pub refresh_token: IssuedToken,
}

/// Result of a refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Newly minted access token.
    pub access_token: IssuedToken,
    /// Replacement refresh token, present only when rotation is enabled.
    pub refresh_token: Option<IssuedToken>,
    /// Session the new access token is bound to.
    pub session_id: Uuid,
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for refresh token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Session persistence.
    session_store: Arc<SessionStore>,
    /// User repository.
    user_repo: Arc<dyn UserRepository>,
    /// Permission grants, returned on login.
    permission_repo: Arc<dyn PermissionRepository>,
    /// Password hasher.
    password_hasher: PasswordHasher,
    /// Issue a new refresh token on every refresh.
    rotate_refresh_tokens: bool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        session_store: Arc<SessionStore>,
        user_repo: Arc<dyn UserRepository>,
        permission_repo: Arc<dyn PermissionRepository>,
        password_hasher: PasswordHasher,
        auth_config: &AuthConfig,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            session_store,
            user_repo,
            permission_repo,
            password_hasher,
            rotate_refresh_tokens: auth_config.rotate_refresh_tokens,
        }
    }

    /// Creates an active account and its first session.
    ///
    /// The user row and the session row are written in one transaction.
    pub async fn register(
        &self,
        input: Registration,
        metadata: ClientMetadata,
    ) -> Result<AuthOutcome, AppError> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AppError::validation(REGISTER_REQUIRED_MESSAGE));
        }
        if input.role.trim().is_empty() {
            return Err(AppError::validation(REGISTER_REQUIRED_MESSAGE));
        }
        let role: UserRole = input.role.parse()?;

        let password_hash = self.password_hasher.hash(&input.password).await?;

        let user_id = Uuid::new_v4();
        let refresh_token = self.jwt_encoder.issue_refresh(user_id)?;
        let session = SessionStore::prepare(
            user_id,
            &refresh_token.token,
            refresh_token.expires_at,
            metadata,
        );
        let new_user = CreateUser {
            id: user_id,
            name: name.to_string(),
            email,
            password_hash,
            phone: non_empty(input.phone),
            role,
            department: non_empty(input.department),
        };

        let (user, session) = self
            .user_repo
            .create_with_session(&new_user, &session)
            .await?;
        let access_token = self
            .jwt_encoder
            .issue_access(user.id, user.role, Some(session.id))?;

        info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(AuthOutcome {
            user,
            permissions: Vec::new(),
            session_id: session.id,
            access_token,
            refresh_token,
        })
    }

    /// Performs the login flow:
    ///
    /// 1. Find the user by email
    /// 2. Verify the password
    /// 3. Reject non-active accounts
    /// 4. Record `last_active`
    /// 5. Create a session, mint both tokens and load permissions
    ///
    /// Steps 1 and 2 fail with the same message.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        metadata: ClientMetadata,
    ) -> Result<AuthOutcome, AppError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Please provide email and password."));
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::unauthenticated(INVALID_CREDENTIALS_MESSAGE))?;

        if !self
            .password_hasher
            .verify(password, &user.password_hash)
            .await?
        {
            info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::unauthenticated(INVALID_CREDENTIALS_MESSAGE));
        }

        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "Login rejected: account not active");
            return Err(AppError::forbidden(ACCOUNT_INACTIVE_MESSAGE));
        }

        let user = self
            .user_repo
            .touch_last_active(user.id)
            .await?
            .ok_or_else(|| AppError::unauthenticated(INVALID_CREDENTIALS_MESSAGE))?;

        let refresh_token = self.jwt_encoder.issue_refresh(user.id)?;
        let session = self
            .session_store
            .create(
                user.id,
                &refresh_token.token,
                refresh_token.expires_at,
                metadata,
            )
            .await?;
        let access_token = self
            .jwt_encoder
            .issue_access(user.id, user.role, Some(session.id))?;

        let permissions = self.permission_repo.find_by_user(user.id).await?;

        info!(user_id = %user.id, session_id = %session.id, "Login successful");

        Ok(AuthOutcome {
            user,
            permissions,
            session_id: session.id,
            access_token,
            refresh_token,
        })
    }

    /// Mints a new access token from a refresh token.
    ///
    /// 1. Verify the refresh token signature and expiry
    /// 2. Check and touch the backing session in one statement
    /// 3. Reload the user and require `active`
    /// 4. Optionally rotate the refresh token
    pub async fn refresh(
        &self,
        refresh_token: &str,
        metadata: ClientMetadata,
    ) -> Result<RefreshOutcome, AppError> {
        let claims = self
            .jwt_decoder
            .verify_refresh(refresh_token)
            .map_err(|_| AppError::unauthenticated(INVALID_REFRESH_MESSAGE))?;
        let user_id = claims.user_id();

        let session = self
            .session_store
            .find_active(refresh_token, user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated(INVALID_REFRESH_MESSAGE))?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AppError::unauthenticated(REFRESH_USER_INACTIVE_MESSAGE))?;

        if !self.rotate_refresh_tokens {
            let access_token = self
                .jwt_encoder
                .issue_access(user.id, user.role, Some(session.id))?;
            return Ok(RefreshOutcome {
                access_token,
                refresh_token: None,
                session_id: session.id,
            });
        }

        let replacement = self.jwt_encoder.issue_refresh(user.id)?;
        let metadata = ClientMetadata {
            user_agent: metadata.user_agent.or(session.user_agent),
            ip_address: metadata.ip_address.or(session.ip_address),
        };
        let rotated = self
            .session_store
            .rotate(
                refresh_token,
                user.id,
                &replacement.token,
                replacement.expires_at,
                metadata,
            )
            .await?
            .ok_or_else(|| AppError::unauthenticated(INVALID_REFRESH_MESSAGE))?;

        let access_token = self
            .jwt_encoder
            .issue_access(user.id, user.role, Some(rotated.id))?;

        info!(user_id = %user.id, old_session = %session.id, new_session = %rotated.id, "Refresh token rotated");

        Ok(RefreshOutcome {
            access_token,
            refresh_token: Some(replacement),
            session_id: rotated.id,
        })
    }

    /// Revokes the session behind `refresh_token`, if any.
    ///
    /// Always succeeds for unknown or malformed tokens.
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<(), AppError> {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        if self.session_store.revoke_token(token).await? {
            info!("Logout revoked a session");
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
