use crate::{
    cli::globals::GlobalArgs,
    gate::token::GateToken,
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header::CACHE_CONTROL, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct GateRequest {
    #[serde(default)]
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GateGranted {
    success: bool,
    token: String,
    expires: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GateError {
    error: String,
}

/// Terminal outcomes of the gate, each a fixed status and one-line body.
#[derive(Debug, PartialEq, Eq)]
pub enum GateRejection {
    MethodNotAllowed,
    ServerMisconfigured,
    Unauthorized,
}

impl GateRejection {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ServerMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    const fn message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "Method not allowed",
            Self::ServerMisconfigured => "Server configuration error",
            Self::Unauthorized => "Invalid password",
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let body = Json(GateError {
            error: self.message().to_string(),
        });

        (self.status(), body).into_response()
    }
}

type GateResponse = Result<(StatusCode, HeaderMap, Json<GateGranted>), GateRejection>;

#[utoipa::path(
    post,
    path= "/api/verify-password",
    request_body = GateRequest,
    responses (
        (status = 200, description = "Password accepted, gate token issued", body = GateGranted),
        (status = 401, description = "Password does not match the configured secret", body = GateError),
        (status = 405, description = "Only POST is accepted on this route", body = GateError),
        (status = 500, description = "No gate password in the server configuration", body = GateError),
    ),
    tag = "gate",
)]
#[instrument(skip(globals, payload))]
pub async fn verify_password(
    Extension(globals): Extension<Arc<GlobalArgs>>,
    payload: Result<Json<GateRequest>, JsonRejection>,
) -> GateResponse {
    // Configuration is checked before the payload so a missing secret
    // answers 500 no matter what the caller sent.
    let secret = configured_secret(&globals)?;
    let request = parse_gate_request(payload);

    check_password(&request.password, secret)?;

    let token = GateToken::issue(Utc::now().timestamp_millis());
    debug!("Gate token issued, expires at {}", token.expires_at_millis());

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((
        StatusCode::OK,
        headers,
        Json(GateGranted {
            success: true,
            token: token.encode(),
            expires: token.expires_at_millis(),
        }),
    ))
}

/// Fallback for every non-POST method on the gate route. The password is
/// never evaluated here.
pub async fn method_not_allowed() -> GateRejection {
    GateRejection::MethodNotAllowed
}

fn configured_secret(globals: &GlobalArgs) -> Result<&SecretString, GateRejection> {
    match &globals.gate_password {
        Some(secret) if !secret.expose_secret().is_empty() => Ok(secret),
        _ => {
            error!("Gate password missing from configuration");
            Err(GateRejection::ServerMisconfigured)
        }
    }
}

// A missing or malformed body is an absent password: it can never match a
// configured secret, so it falls through to Unauthorized.
fn parse_gate_request(payload: Result<Json<GateRequest>, JsonRejection>) -> GateRequest {
    match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Failed to parse gate payload: {}", rejection);
            GateRequest::default()
        }
    }
}

fn check_password(supplied: &str, secret: &SecretString) -> Result<(), GateRejection> {
    if supplied == secret.expose_secret() {
        debug!("Password accepted");
        Ok(())
    } else {
        debug!("Password rejected");
        Err(GateRejection::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::token::TOKEN_TTL_MILLIS;

    fn globals_with(password: Option<&str>) -> Arc<GlobalArgs> {
        Arc::new(GlobalArgs::new(
            password.map(|value| SecretString::from(value.to_string())),
        ))
    }

    fn gate_request(password: &str) -> Result<Json<GateRequest>, JsonRejection> {
        Ok(Json(GateRequest {
            password: password.to_string(),
        }))
    }

    fn malformed_payload() -> Result<Json<GateRequest>, JsonRejection> {
        match Json::<GateRequest>::from_bytes(b"not json") {
            Err(rejection) => Err(rejection),
            Ok(_) => panic!("expected a json rejection"),
        }
    }

    #[test]
    fn configured_secret_rejects_missing_password() {
        let globals = globals_with(None);
        assert!(matches!(
            configured_secret(&globals),
            Err(GateRejection::ServerMisconfigured)
        ));
    }

    #[test]
    fn configured_secret_rejects_empty_password() {
        let globals = globals_with(Some(""));
        assert!(matches!(
            configured_secret(&globals),
            Err(GateRejection::ServerMisconfigured)
        ));
    }

    #[test]
    fn configured_secret_accepts_configured_password() {
        let globals = globals_with(Some("hunter2"));
        let secret = configured_secret(&globals).expect("secret should be configured");
        assert_eq!(secret.expose_secret(), "hunter2");
    }

    #[test]
    fn parse_gate_request_defaults_on_rejection() {
        let request = parse_gate_request(malformed_payload());
        assert_eq!(request.password, "");
    }

    #[test]
    fn check_password_is_exact_equality() {
        let secret = SecretString::from("hunter2".to_string());
        assert_eq!(check_password("hunter2", &secret), Ok(()));
        assert_eq!(
            check_password("Hunter2", &secret),
            Err(GateRejection::Unauthorized)
        );
        assert_eq!(
            check_password("hunter2 ", &secret),
            Err(GateRejection::Unauthorized)
        );
        assert_eq!(check_password("", &secret), Err(GateRejection::Unauthorized));
    }

    #[test]
    fn rejections_map_to_contract_statuses() {
        assert_eq!(
            GateRejection::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GateRejection::ServerMisconfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(GateRejection::Unauthorized.status(), StatusCode::UNAUTHORIZED);

        assert_eq!(GateRejection::MethodNotAllowed.message(), "Method not allowed");
        assert_eq!(
            GateRejection::ServerMisconfigured.message(),
            "Server configuration error"
        );
        assert_eq!(GateRejection::Unauthorized.message(), "Invalid password");
    }

    #[tokio::test]
    async fn verify_password_grants_on_match() {
        let before = Utc::now().timestamp_millis();
        let result = verify_password(
            Extension(globals_with(Some("hunter2"))),
            gate_request("hunter2"),
        )
        .await;
        let after = Utc::now().timestamp_millis();

        let (status, headers, Json(granted)) = result.expect("gate should open");
        assert_eq!(status, StatusCode::OK);
        assert!(granted.success);
        assert!(!granted.token.is_empty());
        assert!(granted.expires >= before + TOKEN_TTL_MILLIS);
        assert!(granted.expires <= after + TOKEN_TTL_MILLIS);
        assert_eq!(
            headers
                .get(CACHE_CONTROL)
                .and_then(|value| value.to_str().ok()),
            Some("no-store")
        );
    }

    #[tokio::test]
    async fn verify_password_rejects_mismatch() {
        let result = verify_password(
            Extension(globals_with(Some("hunter2"))),
            gate_request("letmein"),
        )
        .await;
        assert_eq!(result.err(), Some(GateRejection::Unauthorized));
    }

    #[tokio::test]
    async fn verify_password_rejects_malformed_body_as_unauthorized() {
        let result =
            verify_password(Extension(globals_with(Some("hunter2"))), malformed_payload()).await;
        assert_eq!(result.err(), Some(GateRejection::Unauthorized));
    }

    #[tokio::test]
    async fn verify_password_reports_missing_secret_before_password() {
        // Even a would-be-correct password answers 500 without configuration.
        let result = verify_password(Extension(globals_with(None)), gate_request("hunter2")).await;
        assert_eq!(result.err(), Some(GateRejection::ServerMisconfigured));
    }

    #[tokio::test]
    async fn method_not_allowed_never_touches_the_password() {
        let rejection = method_not_allowed().await;
        assert_eq!(rejection, GateRejection::MethodNotAllowed);
        assert_eq!(rejection.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
