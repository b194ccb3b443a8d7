use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use nova_rag::ErrorResponse;
use subtle::ConstantTimeEq;

type AuthRejection = (StatusCode, Json<ErrorResponse>);

/// Guards the JSON API when `NOVA_API_TOKEN` is configured. Without a
/// configured token every request passes.
pub async fn require_token(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    match auth {
        Some(TypedHeader(auth)) if tokens_match(auth.token(), expected) => {
            log::debug!("Authenticated API request with token {}", mask_token(auth.token()));
            Ok(next.run(request).await)
        }
        Some(TypedHeader(auth)) => {
            log::warn!("Rejected API request with token {}", mask_token(auth.token()));
            Err(unauthorized("Invalid bearer token"))
        }
        None => {
            log::warn!("Rejected API request without bearer token");
            Err(unauthorized("Authorization Bearer token is required"))
        }
    }
}

/// Compares in time independent of where the tokens differ. Only the length
/// can leak.
fn tokens_match(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn unauthorized(message: &str) -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            status: "error".to_string(),
            error: message.to_string(),
        }),
    )
}

/// First and last four characters only; short tokens are hidden entirely.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
