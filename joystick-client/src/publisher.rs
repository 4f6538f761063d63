//! Single-content writes through the config endpoint.

use crate::executor::RequestExecutor;
use crate::transport::HttpMethod;
use joystick_core::validate::{check_content_id, check_description};
use joystick_core::{ConfigError, ContentUpdate, JoystickResult, Violations};
use reqwest::Url;
use tracing::debug;

#[derive(Clone)]
pub struct SingleContentPublisher {
    executor: RequestExecutor,
}

impl SingleContentPublisher {
    pub(crate) fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// Replace the content stored under `content_id`. Nothing is cached.
    pub async fn publish_content_update(
        &self,
        content_id: &str,
        update: &ContentUpdate,
    ) -> JoystickResult<()> {
        let mut violations = Violations::new();
        check_content_id(content_id, &mut violations);
        check_description(update.description(), &mut violations);
        violations.into_result()?;

        let url = self.content_url(content_id)?;
        self.executor
            .execute(HttpMethod::Put, url, &update.body())
            .await?;
        debug!(content_id, "published content update");
        Ok(())
    }

    /// Config endpoint with the id appended as one percent-encoded segment.
    fn content_url(&self, content_id: &str) -> JoystickResult<Url> {
        let base = &self.executor.config().endpoints().config_url;
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "config_url".to_string(),
            value: base.clone(),
            reason,
        };

        let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base url".to_string()))?
            .pop_if_empty()
            .push(content_id);
        Ok(url)
    }
}
