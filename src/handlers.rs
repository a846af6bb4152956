use crate::consts::INVALID_BODY;
use crate::error::AppError;
use crate::mqtt_types::PublishResponse;
use crate::tasks::{authorize_caller, publish_event};
use crate::twilio_types::TwilioVoicePayload;
use crate::types::{AuthorizeState, PublishState};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

#[tracing::instrument(skip_all, fields(invocation = %Uuid::new_v4()))]
pub async fn mqtt_publish(
    State(state): State<Arc<PublishState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<PublishResponse>), AppError> {
    let body = match String::from_utf8(body.to_vec()) {
        Ok(body) => body,
        Err(e) => {
            warn!(error=%e, "publish body is not utf-8");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(PublishResponse::rejected(INVALID_BODY)),
            ));
        }
    };
    info!(body=%body, content_type=?headers.get(header::CONTENT_TYPE), "webhook event");
    let (status, response) = publish_event(&state, Some(body)).await?;
    Ok((status, Json(response)))
}

#[tracing::instrument(skip_all, fields(invocation = %Uuid::new_v4()))]
pub async fn twilio_voice_authorize(
    State(state): State<Arc<AuthorizeState>>,
    body: String,
) -> Result<(StatusCode, HeaderMap, String), AppError> {
    trace!(body=%body, "voice request body");
    let payload = match serde_urlencoded::from_str::<TwilioVoicePayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error=%e, "failed to deserialize Twilio voice payload");
            return Ok((
                StatusCode::BAD_REQUEST,
                HeaderMap::new(),
                "Bad request".to_string(),
            ));
        }
    };
    info!(
        from=%payload.from,
        call_sid=?payload.call_sid,
        call_status=?payload.call_status,
        "voice webhook"
    );

    let response = authorize_caller(&state, &payload.from).await?;
    debug!(said=%response.spoken_text(), "voice response");
    let twiml = response.into_twiml();
    trace!("twiml: '{}'", twiml);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/xml"),
    );
    Ok((StatusCode::OK, headers, twiml))
}
