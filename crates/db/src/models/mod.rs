//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where rows are mutable

pub mod activity;
pub mod announcement;
pub mod channel;
pub mod completion;
pub mod course;
pub mod feedback;
pub mod income_rate;
pub mod order;
pub mod question;
pub mod report;
pub mod role;
pub mod session;
pub mod telegram_link;
pub mod user;
