//! Credentials: Argon2id password hashes in [`password`], access and
//! refresh tokens in [`jwt`].

pub mod jwt;
pub mod password;
