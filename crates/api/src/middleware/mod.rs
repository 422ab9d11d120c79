//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireManager`] -- requires the `manager` role.
//! - [`rbac::RequireInstructor`] -- requires `instructor` or `manager`.
//! - [`rbac::RequireSeller`] -- requires `seller` or `manager`.

pub mod auth;
pub mod rbac;
