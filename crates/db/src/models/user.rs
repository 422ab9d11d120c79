//! User entity model and DTOs.

use coursely_core::roles::Role;
use coursely_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role_id: DbId,
    pub referral_code: Option<String>,
    pub telegram_user_id: Option<i64>,
    pub is_active: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// `None` only for a role id outside the seeded set.
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn role_name(&self) -> &'static str {
        self.role().map_or("unknown", Role::name)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Resolved role name (e.g. `"manager"`, `"student"`).
    pub role: String,
    pub role_id: DbId,
    pub referral_code: Option<String>,
    pub telegram_linked: bool,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role_name().to_string(),
            role_id: user.role_id,
            referral_code: user.referral_code.clone(),
            telegram_linked: user.telegram_user_id.is_some(),
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role_id: DbId,
    pub referral_code: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<DbId>,
    pub referral_code: Option<String>,
    pub is_active: Option<bool>,
}

/// Filters for the manager user list.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role_id: Option<DbId>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
