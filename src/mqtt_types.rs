use crate::error::AppError;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QualityOfService {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QualityOfService {
    pub fn level(self) -> i32 {
        self as i32
    }
}

impl std::str::FromStr for QualityOfService {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::AtMostOnce),
            "1" => Ok(Self::AtLeastOnce),
            "2" => Ok(Self::ExactlyOnce),
            _ => Err(AppError("MQTT_QOS must be 0, 1 or 2")),
        }
    }
}

/// A message bound for the bus. Only ever built from a non-empty body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishMessage {
    pub topic: String,
    pub qos: QualityOfService,
    pub payload: String,
}

/// JSON body returned by the publish webhook.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct PublishResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PublishResponse {
    pub fn published(body: String) -> Self {
        Self {
            success: true,
            data: Some(body),
            error: None,
        }
    }

    pub fn rejected(reason: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(reason.to_string()),
        }
    }
}
