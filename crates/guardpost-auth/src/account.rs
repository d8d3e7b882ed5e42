//! Account maintenance: profile, password change and admin user management.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use guardpost_core::error::AppError;
use guardpost_database::{PermissionRepository, UserRepository};
use guardpost_entity::user::{UpdateProfile, User, UserStatus};

use crate::password::PasswordHasher;

/// Message for an id that matches no user.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found.";

/// Message when an admin targets their own account for deletion.
pub const SELF_DELETE_MESSAGE: &str = "You cannot delete your own account.";

/// Message when the current password does not match.
pub const WRONG_CURRENT_PASSWORD_MESSAGE: &str = "Current password is incorrect.";

/// A user together with their permission grants.
#[derive(Debug, Clone)]
pub struct UserWithPermissions {
    /// The user row.
    pub user: User,
    /// Granted permission names, sorted.
    pub permissions: Vec<String>,
}

/// Profile and account operations on existing users.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    permissions: Arc<dyn PermissionRepository>,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        permissions: Arc<dyn PermissionRepository>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            permissions,
            hasher,
        }
    }

    /// Loads a user and their grants.
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserWithPermissions, AppError> {
        let user = self.find_user(user_id).await?;
        let permissions = self.permissions.find_by_user(user_id).await?;
        Ok(UserWithPermissions { user, permissions })
    }

    /// Applies the provided profile fields. Blank values clear optional
    /// fields; a blank name is rejected.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: UpdateProfile,
    ) -> Result<User, AppError> {
        let changes = UpdateProfile {
            name: changes.name.map(|n| n.trim().to_string()),
            phone: changes.phone.map(|p| p.trim().to_string()),
            department: changes.department.map(|d| d.trim().to_string()),
        };
        if changes.name.as_deref() == Some("") {
            return Err(AppError::validation("Name cannot be empty."));
        }
        if changes.is_empty() {
            return self.find_user(user_id).await;
        }

        self.users
            .update_profile(user_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))
    }

    /// Replaces the password after checking the current one, then revokes
    /// every session of the user.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<u64, AppError> {
        if new_password.is_empty() {
            return Err(AppError::validation("New password is required."));
        }

        let user = self.find_user(user_id).await?;
        if !self
            .hasher
            .verify(current_password, &user.password_hash)
            .await?
        {
            return Err(AppError::validation(WRONG_CURRENT_PASSWORD_MESSAGE));
        }

        let password_hash = self.hasher.hash(new_password).await?;
        let revoked = self.users.change_password(user_id, &password_hash).await?;
        info!(user_id = %user_id, revoked, "Password changed");
        Ok(revoked)
    }

    /// Changes a user's account status. Any status other than `active` also
    /// drops every refresh session of the user in the same transaction.
    pub async fn set_status(&self, user_id: Uuid, status: UserStatus) -> Result<User, AppError> {
        if status == UserStatus::Active {
            let user = self
                .users
                .update_status(user_id, status)
                .await?
                .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;
            info!(user_id = %user_id, status = %status, "User status changed");
            return Ok(user);
        }

        let (user, revoked) = self
            .users
            .update_status_and_revoke(user_id, status)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))?;
        info!(user_id = %user_id, status = %status, revoked, "User status changed, sessions revoked");
        Ok(user)
    }

    /// Replaces every grant of the user with `permissions`.
    pub async fn set_permissions(
        &self,
        user_id: Uuid,
        permissions: Vec<String>,
    ) -> Result<Vec<String>, AppError> {
        self.find_user(user_id).await?;

        let names: BTreeSet<String> = permissions
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let names: Vec<String> = names.into_iter().collect();

        self.permissions.replace_for_user(user_id, &names).await?;
        info!(user_id = %user_id, count = names.len(), "Permissions replaced");
        Ok(names)
    }

    /// Deletes `target`. Sessions and grants are removed with it.
    pub async fn delete_user(&self, actor: Uuid, target: Uuid) -> Result<(), AppError> {
        if actor == target {
            return Err(AppError::validation(SELF_DELETE_MESSAGE));
        }
        if !self.users.delete(target).await? {
            return Err(AppError::not_found(USER_NOT_FOUND_MESSAGE));
        }
        info!(actor = %actor, user_id = %target, "User deleted");
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND_MESSAGE))
    }
}
