//! Error types for the `session-auth` crate.
//!
//! A root Error struct holds an error kind plus an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for session-auth crate.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in session-auth.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// The token could not be turned into an identity.
    Decode(DecodeErrorKind),
    /// Exchanging an authorization code for a token failed.
    Exchange(RequestFailureKind),
    /// Reading the profile failed.
    Fetch(RequestFailureKind),
    /// The HTTP client could not be built.
    Http(HttpErrorKind),
}

/// Ways a token can be malformed.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeErrorKind {
    /// The token does not have exactly three dot-separated segments.
    SegmentCount,
    /// The claims segment is not valid base64.
    Base64,
    /// The claims segment is not a JSON record carrying the required claims.
    Payload,
}

/// The three ways a backend request can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestFailureKind {
    /// The server answered with a non-2xx status, or a 2xx body we could not read.
    ServerError { status: u16, body: String },
    /// The request was sent but no response came back.
    NoResponse,
    /// The request could not be constructed.
    RequestSetup(String),
}

/// Errors from HTTP client construction.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
}

impl RequestFailureKind {
    /// Classifies a transport-level reqwest error.
    ///
    /// Builder errors never left the process; everything else is treated as the
    /// backend not answering.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            RequestFailureKind::RequestSetup(err.to_string())
        } else {
            RequestFailureKind::NoResponse
        }
    }

    /// Short message suitable for an error panel.
    pub fn user_message(&self) -> String {
        match self {
            RequestFailureKind::ServerError { status, .. } => format!("Server error: {status}"),
            RequestFailureKind::NoResponse => "No response from server".to_string(),
            RequestFailureKind::RequestSetup(message) => format!("Error: {message}"),
        }
    }

    /// Technical detail shown under the message, when there is any.
    ///
    /// Server bodies are pretty-printed when they are JSON and shown raw otherwise.
    pub fn details(&self) -> Option<String> {
        match self {
            RequestFailureKind::ServerError { body, .. } => {
                match serde_json::from_str::<serde_json::Value>(body) {
                    Ok(value) => serde_json::to_string_pretty(&value).ok(),
                    Err(_) => Some(format!("Error response: {body}")),
                }
            }
            RequestFailureKind::NoResponse => Some(
                "The server did not respond to the authentication request. \
                 The backend might be unavailable."
                    .to_string(),
            ),
            RequestFailureKind::RequestSetup(_) => None,
        }
    }
}

impl Error {
    /// The request failure behind an exchange or fetch error, if that is what this is.
    pub fn request_failure(&self) -> Option<&RequestFailureKind> {
        match &self.error_kind {
            ErrorKind::Exchange(kind) | ErrorKind::Fetch(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Decode(kind) => write!(f, "Token decode error: {:?}", kind),
            ErrorKind::Exchange(kind) => write!(f, "Code exchange error: {}", kind.user_message()),
            ErrorKind::Fetch(kind) => write!(f, "Profile fetch error: {}", kind.user_message()),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Helper function to create decode errors.
pub fn decode_error(kind: DecodeErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Decode(kind),
    }
}

/// Helper function to create code exchange errors.
pub fn exchange_error(
    kind: RequestFailureKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
) -> Error {
    Error {
        source,
        error_kind: ErrorKind::Exchange(kind),
    }
}

/// Helper function to create profile fetch errors.
pub fn fetch_error(
    kind: RequestFailureKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
) -> Error {
    Error {
        source,
        error_kind: ErrorKind::Fetch(kind),
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
        }
    }
}
