use log::*;
use reqwest::StatusCode;

use crate::error::RequestFailureKind;

/// Status and body of a backend response that arrived in full.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// Parses a 2xx body, or reports the response as a server error.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T, RequestFailureKind> {
        if !self.status.is_success() {
            return Err(self.into_server_error());
        }

        serde_json::from_str(&self.body).map_err(|e| {
            warn!("Failed to parse backend response: {e}");
            self.into_server_error()
        })
    }

    pub fn into_server_error(self) -> RequestFailureKind {
        RequestFailureKind::ServerError {
            status: self.status.as_u16(),
            body: self.body,
        }
    }
}

/// Sends a request and reads the whole body, classifying transport failures.
pub(crate) async fn read_body(
    request: reqwest::RequestBuilder,
) -> Result<RawResponse, (RequestFailureKind, reqwest::Error)> {
    let response = request.send().await.map_err(|e| {
        warn!("Backend request failed: {e:?}");
        (RequestFailureKind::from_reqwest(&e), e)
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        warn!("Failed to read backend response body: {e:?}");
        (RequestFailureKind::NoResponse, e)
    })?;

    debug!("Backend responded with status {status}");

    Ok(RawResponse { status, body })
}
