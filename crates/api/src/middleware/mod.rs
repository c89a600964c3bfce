//! Access gate extractors.
//!
//! - [`auth::Session`] -- A validated session from the `sm_session` cookie or a Bearer token.
//! - [`access::RequireAuth`] -- Requires a valid session.
//! - [`access::ReadAccess`] -- Requires a session unless public reads are enabled.

pub mod access;
pub mod auth;
