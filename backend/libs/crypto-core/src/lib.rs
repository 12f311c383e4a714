//! Token primitives shared by the blog backend.
//!
//! Only RS256 bearer tokens are supported. Services hold a [`jwt::JwtValidator`]
//! built from the auth backend's public key; [`jwt::JwtIssuer`] exists for tests
//! and local tooling that need to mint tokens.

pub mod jwt;

#[cfg(any(test, feature = "test-keys"))]
pub mod test_keys;
