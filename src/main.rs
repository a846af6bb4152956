mod airtable_types;
mod clients;
mod config;
mod error;
mod handlers;
mod mqtt_types;
mod tasks;
mod twilio_types;
mod types;
mod utils;

use crate::clients::{AirtableClient, EndpointForwarder, IotPublisher};
use crate::config::Config;
use crate::types::{AuthorizeState, PublishState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const AUTHORIZED_GREETING: &str = "Your phone number is authorized. Welcome!";
    pub const UNAUTHORIZED_MESSAGE: &str = "Sorry, this phone number is not authorized.";
    pub const MISSING_BODY: &str = "Missing request body";
    pub const INVALID_BODY: &str = "Request body is not valid UTF-8";
    pub const FORWARD_TIMEOUT_MILLIS: u64 = 10_000;
    pub const DEFAULT_AWS_REGION: &str = "us-east-1";
    pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com";
    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
}

/// Webhooks without state are left unrouted.
pub fn routes(
    publish: Option<Arc<PublishState>>,
    authorize: Option<Arc<AuthorizeState>>,
) -> Router {
    let mut app = Router::new().route("/", get(|| async { "Hello, World!" }));
    if let Some(state) = publish {
        app = app.merge(
            Router::new()
                .route("/mqtt/publish", post(handlers::mqtt_publish))
                .with_state(state),
        );
    }
    if let Some(state) = authorize {
        app = app.merge(
            Router::new()
                .route("/twilio/voice/authorize", post(handlers::twilio_voice_authorize))
                .with_state(state),
        );
    }
    app
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; the environment may already be populated
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("aws_config", tracing_subscriber::filter::LevelFilter::WARN),
            ("webhook_relay", tracing_subscriber::filter::LevelFilter::DEBUG),
        ]));
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let http_client = reqwest::Client::new();

    let publish = match &config.publish {
        Some(publish_config) => {
            let client = utils::iot_client(&publish_config.mqtt_endpoint).await;
            info!(topic=%publish_config.mqtt_topic, "mqtt publish webhook enabled");
            Some(Arc::new(PublishState {
                topic: publish_config.mqtt_topic.clone(),
                qos: publish_config.mqtt_qos,
                publisher: Arc::new(IotPublisher { client }),
            }))
        }
        None => {
            warn!("MQTT_ENDPOINT and MQTT_TOPIC not set; mqtt publish webhook disabled");
            None
        }
    };

    let authorize = match &config.authorize {
        Some(authorize_config) => {
            let directory = AirtableClient::new(http_client.clone(), authorize_config)?;
            let forwarder = EndpointForwarder::new(http_client.clone(), authorize_config);
            info!(table=%authorize_config.airtable_table, "voice authorize webhook enabled");
            Some(Arc::new(AuthorizeState {
                directory: Arc::new(directory),
                forwarder: Arc::new(forwarder),
            }))
        }
        None => {
            warn!("Airtable and endpoint settings not set; voice authorize webhook disabled");
            None
        }
    };

    let app = routes(publish, authorize);

    info!(addr=%config.bind_addr, "listening");
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
