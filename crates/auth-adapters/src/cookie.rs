//! Signed session cookie values: `<session uuid>.<base64url(HMAC-SHA256)>`.
//!
//! The cookie only names a server-side session; the signature stops clients
//! from guessing or forging other session ids.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use domains::SessionCodec;

type HmacSha256 = Hmac<Sha256>;

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("session secret must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    WeakSecret(usize),
    #[error("invalid session secret: {0}")]
    InvalidKey(String),
}

#[derive(Clone)]
pub struct HmacSessionCodec {
    mac: HmacSha256,
}

impl HmacSessionCodec {
    pub fn new(secret: &[u8]) -> Result<Self, CodecError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CodecError::WeakSecret(secret.len()));
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|e| CodecError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    fn signer(&self, payload: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac
    }
}

impl SessionCodec for HmacSessionCodec {
    fn encode(&self, session_id: Uuid) -> String {
        let payload = session_id.to_string();
        let sig = self.signer(&payload).finalize().into_bytes();
        format!("{payload}.{}", URL_SAFE_NO_PAD.encode(sig))
    }

    fn decode(&self, value: &str) -> Option<Uuid> {
        let (payload, sig) = value.split_once('.')?;
        let expected = URL_SAFE_NO_PAD.decode(sig).ok()?;
        self.signer(payload).verify_slice(&expected).ok()?;
        Uuid::parse_str(payload).ok()
    }
}
