//! Access gate primitives.
//!
//! - [`password`] -- Argon2id hashing and the login password check.
//! - [`jwt`] -- HS256 session token generation and validation.
//! - [`cookie`] -- `sm_session` cookie formatting.

pub mod cookie;
pub mod jwt;
pub mod password;
