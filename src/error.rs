use axum::{http::StatusCode, response::IntoResponse};

#[derive(Debug, PartialEq, Eq)]
pub struct AppError(pub &'static str);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AppError {
    fn description(&self) -> &str {
        self.0
    }
}

/// An upstream failure ends the invocation with a bare 500 and no body; the
/// caller gets no JSON payload and no TwiML. The failure site has already
/// logged the cause.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
