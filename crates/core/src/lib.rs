//! Pure domain logic for the Coursely course marketplace.
//!
//! No database or network dependencies live here; handlers and workers load
//! data and pass it in.

pub mod assistant;
pub mod commission;
pub mod error;
pub mod link_codes;
pub mod payments;
pub mod progress;
pub mod reporting;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
