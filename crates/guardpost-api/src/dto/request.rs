//! Request DTOs with validation.
//!
//! Required fields default to empty so that the service layer reports
//! the missing-field message rather than a deserialization error.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use guardpost_entity::user::UpdateProfile;

/// Self-registration body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    /// Full name.
    #[validate(length(max = 255, message = "Name is too long."))]
    pub name: String,
    /// Login email.
    #[validate(email(message = "Please provide a valid email address."))]
    pub email: Option<String>,
    /// Plaintext password.
    pub password: String,
    /// Role name.
    pub role: String,
    /// Contact phone.
    #[validate(length(max = 50, message = "Phone is too long."))]
    pub phone: Option<String>,
    /// Department name.
    #[validate(length(max = 100, message = "Department is too long."))]
    pub department: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required."))]
    pub refresh_token: String,
}

/// Logout body. The refresh token is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoutRequest {
    /// Refresh token to revoke.
    pub refresh_token: Option<String>,
}

/// Password reset request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestResetRequest {
    /// Account email.
    #[validate(length(min = 1, message = "Email is required."))]
    pub email: String,
}

/// Password reset completion body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordRequest {
    /// Reset token from the request step.
    #[validate(length(min = 1, message = "Token and new password are required."))]
    pub token: String,
    /// New plaintext password.
    #[validate(length(min = 1, message = "Token and new password are required."))]
    pub new_password: String,
}

/// Password change request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required."))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required."))]
    pub new_password: String,
}

/// Update profile request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    /// Full name.
    #[validate(length(max = 255, message = "Name is too long."))]
    pub name: Option<String>,
    /// Contact phone.
    #[validate(length(max = 50, message = "Phone is too long."))]
    pub phone: Option<String>,
    /// Department name.
    #[validate(length(max = 100, message = "Department is too long."))]
    pub department: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            department: req.department,
        }
    }
}

/// Account status change (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatusRequest {
    /// `active`, `inactive` or `suspended`.
    #[validate(length(min = 1, message = "Status is required."))]
    pub status: String,
}

/// Longest permission name the `user_permissions` table accepts.
pub const MAX_PERMISSION_NAME_LEN: usize = 100;

/// Permission replacement (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsRequest {
    /// Full set of permission names to grant.
    #[validate(custom(function = "permission_names"))]
    pub permissions: Vec<String>,
}

fn permission_names(names: &[String]) -> Result<(), ValidationError> {
    if names
        .iter()
        .any(|name| name.trim().chars().count() > MAX_PERMISSION_NAME_LEN)
    {
        return Err(ValidationError::new("length").with_message(Cow::Owned(format!(
            "Permission names must be at most {MAX_PERMISSION_NAME_LEN} characters."
        ))));
    }
    Ok(())
}
