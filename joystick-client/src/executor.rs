//! Shared request execution for both endpoints.

use crate::transport::{ApiRequest, HttpMethod, HttpSender};
use joystick_core::{ApiError, ClientConfig, JoystickError, JoystickResult, ValidationError};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub(crate) const API_KEY_HEADER: &str = "x-api-key";
const REQUEST_BODY_FIELD: &str = "request body";

/// Sends JSON requests and interprets the status and body of the response.
#[derive(Clone)]
pub(crate) struct RequestExecutor {
    config: Arc<ClientConfig>,
    sender: Arc<dyn HttpSender>,
}

impl RequestExecutor {
    pub(crate) fn new(config: Arc<ClientConfig>, sender: Arc<dyn HttpSender>) -> Self {
        Self { config, sender }
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `body` as JSON and decode the 200 response body.
    ///
    /// Transport errors pass through untouched. Any status other than 200
    /// becomes an [`ApiError`] carrying the body text.
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: Url,
        body: &B,
    ) -> JoystickResult<Value> {
        let encoded =
            serde_json::to_vec(body).map_err(|e| ValidationError::NotJsonEncodable {
                field: REQUEST_BODY_FIELD.to_string(),
                reason: e.to_string(),
            })?;

        let request = ApiRequest::new(method, url)
            .with_header("Content-Type", "application/json")
            .with_header(API_KEY_HEADER, self.config.api_key())
            .with_body(encoded);

        debug!(method = %request.method, url = %request.url, "sending Joystick request");
        let response = self
            .sender
            .send(request)
            .await
            .map_err(JoystickError::Transport)?;
        debug!(status = response.status, "received Joystick response");

        if response.status != 200 {
            return Err(ApiError::from_status(response.status, response.body_text()).into());
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            ApiError::MalformedResponse {
                reason: e.to_string(),
            }
            .into()
        })
    }
}
