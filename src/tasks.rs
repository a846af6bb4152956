use crate::consts::{AUTHORIZED_GREETING, MISSING_BODY, UNAUTHORIZED_MESSAGE};
use crate::error::AppError;
use crate::mqtt_types::PublishResponse;
use crate::twilio_types::Response;
use crate::types::{AuthorizeState, PublishState};

use axum::http::StatusCode;
use tracing::{info, warn};

/// Relay a webhook body onto the configured topic. Only an empty body is
/// answered locally; a publish failure is returned as the error.
pub async fn publish_event(
    state: &PublishState,
    body: Option<String>,
) -> Result<(StatusCode, PublishResponse), AppError> {
    let body = match body.filter(|b| !b.is_empty()) {
        Some(body) => body,
        None => {
            warn!("missing request body");
            return Ok((
                StatusCode::BAD_REQUEST,
                PublishResponse::rejected(MISSING_BODY),
            ));
        }
    };

    let message = state.message(body);
    state.publisher.publish(&message).await?;
    info!(topic=%message.topic, qos=message.qos.level(), "published to mqtt");

    Ok((StatusCode::OK, PublishResponse::published(message.payload)))
}

/// Look the caller up and script the reply. A matched record is forwarded
/// before the script is returned, so a failed forward never reaches the
/// caller as a welcome.
pub async fn authorize_caller(state: &AuthorizeState, phone: &str) -> Result<Response, AppError> {
    let records = state.directory.find_by_phone(phone).await?;
    let mut response = Response::default();

    match records.first() {
        Some(record) => {
            match record.name() {
                Some(name) => response.say(format!("Hello {name}. {AUTHORIZED_GREETING}")),
                None => {
                    warn!(record=%record.id, "authorized record has no Name");
                    response.say(format!("Hello. {AUTHORIZED_GREETING}"));
                }
            }
            state.forwarder.forward(&record.fields).await?;
            info!(record=%record.id, matches = records.len(), "caller authorized");
        }
        None => {
            response.say(UNAUTHORIZED_MESSAGE);
            info!("caller not authorized");
        }
    }

    Ok(response)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::airtable_types::{AirtableRecord, Fields};
    use crate::mqtt_types::{PublishMessage, QualityOfService};
    use crate::types::{CallerDirectory, Publisher, RecordForwarder};

    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct FakePublisher {
        pub fail: bool,
        pub published: Mutex<Vec<PublishMessage>>,
    }

    #[async_trait]
    impl Publisher for FakePublisher {
        async fn publish(&self, message: &PublishMessage) -> Result<(), AppError> {
            self.published.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(AppError("iot publish"));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeDirectory {
        pub fail: bool,
        pub records: Vec<AirtableRecord>,
        pub queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CallerDirectory for FakeDirectory {
        async fn find_by_phone(&self, phone: &str) -> Result<Vec<AirtableRecord>, AppError> {
            self.queries.lock().unwrap().push(phone.to_string());
            if self.fail {
                return Err(AppError("airtable lookup"));
            }
            Ok(self.records.clone())
        }
    }

    #[derive(Default)]
    pub struct FakeForwarder {
        pub fail: bool,
        pub forwarded: Mutex<Vec<Fields>>,
    }

    #[async_trait]
    impl RecordForwarder for FakeForwarder {
        async fn forward(&self, fields: &Fields) -> Result<(), AppError> {
            self.forwarded.lock().unwrap().push(fields.clone());
            if self.fail {
                return Err(AppError("record forward"));
            }
            Ok(())
        }
    }

    pub fn record(id: &str, fields: serde_json::Value) -> AirtableRecord {
        AirtableRecord {
            id: id.to_string(),
            created_time: None,
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn publish_state(publisher: Arc<FakePublisher>) -> PublishState {
        PublishState {
            topic: "devices/door".to_string(),
            qos: QualityOfService::AtMostOnce,
            publisher,
        }
    }

    fn authorize_state(
        directory: Arc<FakeDirectory>,
        forwarder: Arc<FakeForwarder>,
    ) -> AuthorizeState {
        AuthorizeState {
            directory,
            forwarder,
        }
    }

    #[tokio::test]
    async fn empty_body_is_rejected_without_publishing() {
        let publisher = Arc::new(FakePublisher::default());
        let state = publish_state(publisher.clone());

        for body in [None, Some(String::new())] {
            let (status, response) = publish_event(&state, body).await.expect("response");
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, PublishResponse::rejected("Missing request body"));
        }
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn body_is_published_once_to_configured_topic() {
        let publisher = Arc::new(FakePublisher::default());
        let state = publish_state(publisher.clone());

        let (status, response) = publish_event(&state, Some("{\"x\":1}".to_string()))
            .await
            .expect("response");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, PublishResponse::published("{\"x\":1}".to_string()));

        let published = publisher.published.lock().unwrap();
        assert_eq!(
            *published,
            vec![PublishMessage {
                topic: "devices/door".to_string(),
                qos: QualityOfService::AtMostOnce,
                payload: "{\"x\":1}".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn publish_failure_propagates() {
        let publisher = Arc::new(FakePublisher {
            fail: true,
            ..Default::default()
        });
        let state = publish_state(publisher.clone());

        let res = publish_event(&state, Some("hello".to_string())).await;
        assert_eq!(res, Err(AppError("iot publish")));
        assert_eq!(publisher.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn matched_caller_is_greeted_and_forwarded() {
        let directory = Arc::new(FakeDirectory {
            records: vec![
                record("recAna", json!({ "Name": "Ana", "Phone": "+15551234567" })),
                record("recBea", json!({ "Name": "Bea", "Phone": "+15551234567" })),
            ],
            ..Default::default()
        });
        let forwarder = Arc::new(FakeForwarder::default());
        let state = authorize_state(directory.clone(), forwarder.clone());

        let response = authorize_caller(&state, "+15551234567").await.expect("twiml");
        assert_eq!(
            response.spoken_text(),
            "Hello Ana. Your phone number is authorized. Welcome!"
        );
        assert_eq!(*directory.queries.lock().unwrap(), vec!["+15551234567"]);

        let forwarded = forwarder.forwarded.lock().unwrap();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(
            serde_json::Value::Object(forwarded[0].clone()),
            json!({ "Name": "Ana", "Phone": "+15551234567" })
        );
    }

    #[tokio::test]
    async fn unmatched_caller_is_rejected_without_forwarding() {
        let directory = Arc::new(FakeDirectory::default());
        let forwarder = Arc::new(FakeForwarder::default());
        let state = authorize_state(directory, forwarder.clone());

        let response = authorize_caller(&state, "+15550000000").await.expect("twiml");
        assert_eq!(
            response.spoken_text(),
            "Sorry, this phone number is not authorized."
        );
        assert_eq!(response.actions.len(), 1);
        assert!(forwarder.forwarded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_without_name_gets_generic_greeting() {
        let directory = Arc::new(FakeDirectory {
            records: vec![record("recAnon", json!({ "Phone": "+15551234567" }))],
            ..Default::default()
        });
        let forwarder = Arc::new(FakeForwarder::default());
        let state = authorize_state(directory, forwarder.clone());

        let response = authorize_caller(&state, "+15551234567").await.expect("twiml");
        assert_eq!(
            response.spoken_text(),
            "Hello. Your phone number is authorized. Welcome!"
        );
        assert_eq!(forwarder.forwarded.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lookup_failure_propagates_without_forwarding() {
        let directory = Arc::new(FakeDirectory {
            fail: true,
            ..Default::default()
        });
        let forwarder = Arc::new(FakeForwarder::default());
        let state = authorize_state(directory, forwarder.clone());

        let res = authorize_caller(&state, "+15551234567").await;
        assert_eq!(res, Err(AppError("airtable lookup")));
        assert!(forwarder.forwarded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forward_failure_withholds_the_welcome() {
        let directory = Arc::new(FakeDirectory {
            records: vec![record("recAna", json!({ "Name": "Ana" }))],
            ..Default::default()
        });
        let forwarder = Arc::new(FakeForwarder {
            fail: true,
            ..Default::default()
        });
        let state = authorize_state(directory, forwarder);

        let res = authorize_caller(&state, "+15551234567").await;
        assert_eq!(res, Err(AppError("record forward")));
    }
}
