// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Simple REST API server example for the point ledger.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /users` - Register a user (awards signup points)
//! - `POST /actions` - Apply an action to a user's balance
//! - `GET /users/{id}` - Get a user's point balance
//! - `GET /rules` - List configured point rules
//! - `GET /rules/{action}` - Preview the point value for an action
//! - `PUT /rules/{action}` - Install or replace a point rule
//!
//! ## Example Usage
//!
//! ```bash
//! # Register a user
//! curl -X POST http://localhost:3000/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": 1}'
//!
//! # File a report
//! curl -X POST http://localhost:3000/actions \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": 1, "action": "add_report"}'
//!
//! # Check the balance
//! curl http://localhost:3000/users/1
//!
//! # Tune a rule without redeploying
//! curl -X PUT http://localhost:3000/rules/add_report \
//!   -H "Content-Type: application/json" \
//!   -d '{"points": 7}'
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use point_ledger::{ActionKind, ActionRule, Applied, Engine, PointError, RuleRegistry, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for registering a user.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub user_id: u64,
}

/// Request body for applying an action.
///
/// ```json
/// {"user_id": 1, "action": "add_report"}
/// ```
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub user_id: u64,
    pub action: ActionKind,
}

/// Response body for a successful application.
#[derive(Debug, Serialize)]
pub struct AppliedResponse {
    pub entry_id: u64,
    pub user_id: u64,
    pub action: ActionKind,
    pub points_applied: i64,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Applied> for AppliedResponse {
    fn from(applied: Applied) -> Self {
        AppliedResponse {
            entry_id: applied.entry.id.0,
            user_id: applied.entry.user_id.0,
            action: applied.entry.action,
            points_applied: applied.entry.points_applied,
            total_points: applied.total_points,
            created_at: applied.entry.created_at,
        }
    }
}

/// Response body for balance lookups.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user: u64,
    pub total_points: i64,
}

/// Response body for rule lookups.
#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub action: ActionKind,
    pub points: i64,
    pub label: Option<String>,
}

/// Request body for installing a rule.
#[derive(Debug, Deserialize)]
pub struct RuleUpdateRequest {
    pub points: i64,
    pub label: Option<String>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the point engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

// === Error Handling ===

/// Wrapper for converting `PointError` into HTTP responses.
pub struct AppError(PointError);

impl From<PointError> for AppError {
    fn from(err: PointError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            PointError::InvalidActionKind => (StatusCode::BAD_REQUEST, "INVALID_ACTION_KIND"),
            PointError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            PointError::DuplicateUser => (StatusCode::CONFLICT, "DUPLICATE_USER"),
            PointError::Persistence => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /users - Register a user and award signup points.
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AppliedResponse>), AppError> {
    let applied = state.engine.signup(UserId(request.user_id))?;
    Ok((StatusCode::CREATED, Json(applied.into())))
}

/// POST /actions - Apply an action to a user's balance.
async fn create_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<(StatusCode, Json<AppliedResponse>), AppError> {
    let applied = state
        .engine
        .apply(UserId(request.user_id), request.action)?;
    Ok((StatusCode::CREATED, Json(applied.into())))
}

/// GET /users/{id} - Get a user's point balance.
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<BalanceResponse>, AppError> {
    let total_points = state.engine.balance(UserId(id))?;
    Ok(Json(BalanceResponse {
        user: id,
        total_points,
    }))
}

/// GET /rules - List configured rules.
async fn list_rules(State(state): State<AppState>) -> Json<Vec<RuleResponse>> {
    let rules: Vec<RuleResponse> = state
        .engine
        .rules()
        .rules()
        .into_iter()
        .map(|rule| RuleResponse {
            action: rule.kind,
            points: rule.points,
            label: Some(rule.label),
        })
        .collect();

    Json(rules)
}

/// GET /rules/{action} - Preview the point value for an action.
///
/// Unconfigured actions still answer, with the registry default.
async fn get_rule(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Result<Json<RuleResponse>, AppError> {
    let kind = ActionKind::from_str(&action)?;
    let rule = state.engine.rules().get(kind);

    Ok(Json(RuleResponse {
        action: kind,
        points: state.engine.resolve_rule(kind),
        label: rule.map(|rule| rule.label),
    }))
}

/// PUT /rules/{action} - Install or replace a rule.
async fn put_rule(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Json(request): Json<RuleUpdateRequest>,
) -> Result<StatusCode, AppError> {
    let kind = ActionKind::from_str(&action)?;
    let rule = match request.label {
        Some(label) => ActionRule::with_label(kind, request.points, label),
        None => ActionRule::new(kind, request.points),
    };
    state.engine.rules().set(rule);
    Ok(StatusCode::NO_CONTENT)
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/actions", post(create_action))
        .route("/rules", get(list_rules))
        .route("/rules/{action}", get(get_rule).put(put_rule))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let state = AppState {
        engine: Arc::new(Engine::new(Arc::new(RuleRegistry::with_defaults()))),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000")
        .await
        .expect("failed to bind to port 3000");

    println!("Point ledger listening on http://127.0.0.1:3000");

    axum::serve(listener, app).await.expect("server failed");
}
