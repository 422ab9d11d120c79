//! Platform roles. Ids match the rows seeded by
//! `20260301000001_create_roles_and_users.sql`.

use serde::{Deserialize, Serialize};

/// Platform role of an authenticated user. Guests have no role at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Instructor,
    Seller,
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Manager, Self::Instructor, Self::Seller, Self::Student];

    /// Seeded `roles.id` for this role.
    pub fn id(self) -> i64 {
        match self {
            Self::Manager => 1,
            Self::Instructor => 2,
            Self::Seller => 3,
            Self::Student => 4,
        }
    }

    /// Same spelling as the serde form and `roles.name`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Instructor => "instructor",
            Self::Seller => "seller",
            Self::Student => "student",
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }
}
