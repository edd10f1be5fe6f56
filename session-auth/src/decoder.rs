//! Local decoding of identity claims from a bearer token.
//!
//! The signature is not verified. The decoded identity is for display only; the
//! backend validates the token on every profile request.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{decode_error, DecodeErrorKind, Error};

/// The signed-in user as asserted by the token's claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

/// Claims the backend puts in the token payload. Other claims are ignored.
#[derive(Debug, Deserialize)]
struct Claims {
    user_id: i64,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
            name: claims.name,
        }
    }
}

/// Derives an [`Identity`] from the middle segment of `token`.
pub fn decode(token: &str) -> Result<Identity, Error> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(decode_error(
            DecodeErrorKind::SegmentCount,
            &format!("expected 3 segments, found {}", segments.len()),
        ));
    }

    let payload = decode_segment(segments[1])?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: crate::ErrorKind::Decode(DecodeErrorKind::Payload),
    })?;

    Ok(claims.into())
}

// JWTs use unpadded base64url; tokens built by hand often use the standard alphabet.
fn decode_segment(segment: &str) -> Result<Vec<u8>, Error> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::ErrorKind::Decode(DecodeErrorKind::Base64),
        })
}
