//! Authentication primitives.
//!
//! - [`jwt`] -- validation of the HS256 access tokens issued by the auth provider.

pub mod jwt;
