pub mod announcements;
pub mod assistant;
pub mod auth;
pub mod checkout;
pub mod courses;
pub mod learning;
pub mod manager;
pub mod outline;
pub mod questions;
pub mod reports;
pub mod seller;
pub mod telegram;
pub mod webhooks;
