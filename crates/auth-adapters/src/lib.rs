//! # auth-adapters
//!
//! Argon2 implementation of [`domains::PasswordHasher`] and, behind the
//! `auth-cookie` feature, an HMAC-SHA256 [`domains::SessionCodec`] for the
//! session cookie.

pub mod password;

#[cfg(feature = "auth-cookie")]
pub mod cookie;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-cookie")]
pub use cookie::{CodecError, HmacSessionCodec, MIN_SECRET_LEN};
