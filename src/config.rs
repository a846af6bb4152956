use crate::consts::{DEFAULT_AIRTABLE_API_URL, DEFAULT_BIND_ADDR};
use crate::error::AppError;
use crate::mqtt_types::QualityOfService;

use std::env;
use std::net::SocketAddr;
use tracing::error;

/// Settings for the publish-to-bus webhook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishConfig {
    pub mqtt_endpoint: String,
    pub mqtt_topic: String,
    pub mqtt_qos: QualityOfService,
}

/// Settings for the call-authorization webhook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizeConfig {
    pub airtable_api_url: String,
    pub airtable_base_id: String,
    pub airtable_table: String,
    pub airtable_token: String,
    pub endpoint_url: String,
    pub endpoint_api_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub publish: Option<PublishConfig>,
    pub authorize: Option<AuthorizeConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Each webhook section is optional as a whole: all of its required keys
    /// absent disables it, some of them absent is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| {
                error!(error=%e, "failed to parse BIND_ADDR");
                AppError("BIND_ADDR is not a socket address")
            })?;

        let publish = match section(&lookup, &["MQTT_ENDPOINT", "MQTT_TOPIC"])? {
            Some(values) => {
                let mut values = values.into_iter();
                let mqtt_qos = match lookup("MQTT_QOS") {
                    Some(qos) => qos.parse::<QualityOfService>()?,
                    None => QualityOfService::default(),
                };
                Some(PublishConfig {
                    mqtt_endpoint: values.next().unwrap_or_default(),
                    mqtt_topic: values.next().unwrap_or_default(),
                    mqtt_qos,
                })
            }
            None => None,
        };

        let authorize = section(
            &lookup,
            &[
                "AIRTABLE_BASE_ID",
                "AIRTABLE_TABLE",
                "AIRTABLE_TOKEN",
                "ENDPOINT_URL",
                "ENDPOINT_API_KEY",
            ],
        )?
        .map(|values| {
            let mut values = values.into_iter();
            let mut next = || values.next().unwrap_or_default();
            AuthorizeConfig {
                airtable_base_id: next(),
                airtable_table: next(),
                airtable_token: next(),
                endpoint_url: next(),
                endpoint_api_key: next(),
                airtable_api_url: lookup("AIRTABLE_API_URL")
                    .unwrap_or_else(|| DEFAULT_AIRTABLE_API_URL.to_string()),
            }
        });

        Ok(Self {
            bind_addr,
            publish,
            authorize,
        })
    }
}

/// Values for `keys` in order, `None` if none are set.
fn section(
    lookup: &impl Fn(&str) -> Option<String>,
    keys: &[&str],
) -> Result<Option<Vec<String>>, AppError> {
    let values: Vec<Option<String>> = keys
        .iter()
        .map(|key| lookup(*key).filter(|v| !v.is_empty()))
        .collect();
    if values.iter().all(Option::is_none) {
        return Ok(None);
    }
    let mut present = Vec::with_capacity(keys.len());
    for (key, value) in keys.iter().zip(values) {
        match value {
            Some(value) => present.push(value),
            None => {
                error!(key = %key, "missing environment variable");
                return Err(AppError("incomplete webhook configuration"));
            }
        }
    }
    Ok(Some(present))
}
