//! JSON endpoints over the authorizer.
//!
//! - `POST /v1/authorize`       : 204 allowed, 403 insufficient privilege
//! - `GET  /v1/allowed-actions` : `{"allowed_actions": [..] | null}`
//! - `POST /v1/refresh`         : reload policies now

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use orgauthz_core::error::{AuthzError, ErrorCode};
use orgauthz_core::policy::AuthorizeInput;

use crate::app_state::AppState;
use crate::context::RequestContext;

#[derive(Debug, Deserialize)]
pub struct AllowedActionsQuery {
    pub org: String,
    pub user: String,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InsufficientPrivilege => StatusCode::FORBIDDEN,
        ErrorCode::AliasResolution => StatusCode::NOT_FOUND,
        ErrorCode::StoreUnavailable | ErrorCode::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InvalidPolicy
        | ErrorCode::Evaluation
        | ErrorCode::BadConfig
        | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &AuthzError) -> Response {
    let code = err.code();
    let body = json!({ "code": code.as_str(), "msg": err.to_string() });
    (status_for(code), Json(body)).into_response()
}

pub async fn authorize(State(app): State<AppState>, Json(input): Json<AuthorizeInput>) -> Response {
    match app
        .authorizer()
        .authorize(&RequestContext::background(), &input)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn allowed_actions(
    State(app): State<AppState>,
    Query(q): Query<AllowedActionsQuery>,
) -> Response {
    match app
        .authorizer()
        .get_allowed_actions(&RequestContext::background(), &q.user, &q.org)
        .await
    {
        Ok(actions) => Json(json!({ "allowed_actions": actions })).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn refresh(State(app): State<AppState>) -> Response {
    match app.authorizer().refresh().await {
        Ok(orgs) => Json(json!({ "organizations": orgs })).into_response(),
        Err(e) => error_response(&e),
    }
}
