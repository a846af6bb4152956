use crate::airtable_types::{phone_formula, AirtableListResponse, AirtableRecord, Fields};
use crate::config::AuthorizeConfig;
use crate::consts::FORWARD_TIMEOUT_MILLIS;
use crate::error::AppError;
use crate::mqtt_types::PublishMessage;
use crate::types::{CallerDirectory, Publisher, RecordForwarder};

use async_trait::async_trait;
use aws_sdk_iotdataplane::{error::DisplayErrorContext, primitives::Blob};
use std::time::Duration;
use tracing::{debug, error};

pub struct IotPublisher {
    pub client: aws_sdk_iotdataplane::Client,
}

#[async_trait]
impl Publisher for IotPublisher {
    async fn publish(&self, message: &PublishMessage) -> Result<(), AppError> {
        self.client
            .publish()
            .topic(&message.topic)
            .qos(message.qos.level())
            .payload(Blob::new(message.payload.as_bytes()))
            .send()
            .await
            .map_err(|e| {
                error!(error=%DisplayErrorContext(&e), topic=%message.topic, "failed to publish");
                AppError("iot publish")
            })?;
        Ok(())
    }
}

pub struct AirtableClient {
    http_client: reqwest::Client,
    list_url: reqwest::Url,
    token: String,
}

impl AirtableClient {
    pub fn new(http_client: reqwest::Client, config: &AuthorizeConfig) -> Result<Self, AppError> {
        let mut list_url = reqwest::Url::parse(&config.airtable_api_url).map_err(|e| {
            error!(error=%e, "failed to parse AIRTABLE_API_URL");
            AppError("invalid AIRTABLE_API_URL")
        })?;
        list_url
            .path_segments_mut()
            .map_err(|_| AppError("invalid AIRTABLE_API_URL"))?
            .pop_if_empty()
            .extend(["v0", config.airtable_base_id.as_str(), config.airtable_table.as_str()]);
        Ok(Self {
            http_client,
            list_url,
            token: config.airtable_token.clone(),
        })
    }
}

#[async_trait]
impl CallerDirectory for AirtableClient {
    async fn find_by_phone(&self, phone: &str) -> Result<Vec<AirtableRecord>, AppError> {
        let resp = self
            .http_client
            .get(self.list_url.clone())
            .query(&[("filterByFormula", phone_formula(phone))])
            .bearer_auth(&self.token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error=%e, "failed to query airtable");
                AppError("airtable lookup")
            })?;
        let list = resp.json::<AirtableListResponse>().await.map_err(|e| {
            error!(error=%e, "failed to deserialize airtable records");
            AppError("airtable lookup")
        })?;
        debug!(
            records = list.records.len(),
            more_pages = list.offset.is_some(),
            "airtable lookup complete"
        );
        Ok(list.records)
    }
}

pub struct EndpointForwarder {
    http_client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl EndpointForwarder {
    pub fn new(http_client: reqwest::Client, config: &AuthorizeConfig) -> Self {
        Self {
            http_client,
            url: config.endpoint_url.clone(),
            api_key: config.endpoint_api_key.clone(),
            timeout: Duration::from_millis(FORWARD_TIMEOUT_MILLIS),
        }
    }
}

#[async_trait]
impl RecordForwarder for EndpointForwarder {
    async fn forward(&self, fields: &Fields) -> Result<(), AppError> {
        let resp = self
            .http_client
            .post(&self.url)
            .header("X-API-Key", &self.api_key)
            .json(fields)
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error=%e, timed_out = e.is_timeout(), "failed to forward caller record");
                AppError("record forward")
            })?;
        debug!(status=%resp.status(), "forwarded caller record");
        Ok(())
    }
}
