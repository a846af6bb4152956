use crate::airtable_types::{AirtableRecord, Fields};
use crate::error::AppError;
use crate::mqtt_types::{PublishMessage, QualityOfService};

use async_trait::async_trait;
use std::sync::Arc;

/// Sends a message to the bus.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &PublishMessage) -> Result<(), AppError>;
}

/// Looks up caller records by phone number, in store order.
#[async_trait]
pub trait CallerDirectory: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> Result<Vec<AirtableRecord>, AppError>;
}

/// Delivers an authorized caller's record downstream.
#[async_trait]
pub trait RecordForwarder: Send + Sync {
    async fn forward(&self, fields: &Fields) -> Result<(), AppError>;
}

pub struct PublishState {
    pub topic: String,
    pub qos: QualityOfService,
    pub publisher: Arc<dyn Publisher>,
}

impl PublishState {
    pub fn message(&self, payload: String) -> PublishMessage {
        PublishMessage {
            topic: self.topic.clone(),
            qos: self.qos,
            payload,
        }
    }
}

pub struct AuthorizeState {
    pub directory: Arc<dyn CallerDirectory>,
    pub forwarder: Arc<dyn RecordForwarder>,
}
