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

//! Integration tests for the REST API server with concurrent requests.
//!
//! These tests verify that the server correctly handles concurrent point
//! applications while maintaining balance consistency.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::future::join_all;
use point_ledger::{ActionKind, Engine, PointError, RuleRegistry, UserId};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === DTOs (duplicated from the example server for test isolation) ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub user_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub user_id: u64,
    pub action: ActionKind,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppliedResponse {
    pub entry_id: u64,
    pub user_id: u64,
    pub action: ActionKind,
    pub points_applied: i64,
    pub total_points: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user: u64,
    pub total_points: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Server (mirrors the example wiring) ===

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

struct AppError(PointError);

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

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AppliedResponse>), AppError> {
    let applied = state.engine.signup(UserId(request.user_id)).map_err(AppError)?;
    Ok((
        StatusCode::CREATED,
        Json(AppliedResponse {
            entry_id: applied.entry.id.0,
            user_id: applied.entry.user_id.0,
            action: applied.entry.action,
            points_applied: applied.entry.points_applied,
            total_points: applied.total_points,
        }),
    ))
}

async fn create_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<(StatusCode, Json<AppliedResponse>), AppError> {
    let applied = state
        .engine
        .apply(UserId(request.user_id), request.action)
        .map_err(AppError)?;
    Ok((
        StatusCode::CREATED,
        Json(AppliedResponse {
            entry_id: applied.entry.id.0,
            user_id: applied.entry.user_id.0,
            action: applied.entry.action,
            points_applied: applied.entry.points_applied,
            total_points: applied.total_points,
        }),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<BalanceResponse>, AppError> {
    let total_points = state.engine.balance(UserId(id)).map_err(AppError)?;
    Ok(Json(BalanceResponse {
        user: id,
        total_points,
    }))
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/actions", post(create_action))
        .with_state(state)
}

/// Spawns the server on an ephemeral port and returns its base URL.
async fn spawn_server(engine: Arc<Engine>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = create_router(AppState { engine });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn engine() -> Arc<Engine> {
    Arc::new(Engine::new(Arc::new(RuleRegistry::with_defaults())))
}

// === Tests ===

#[tokio::test]
async fn signup_then_action_over_http() {
    let base = spawn_server(engine()).await;
    let client = Client::new();

    let response = client
        .post(format!("{base}/users"))
        .json(&SignupRequest { user_id: 1 })
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let applied: AppliedResponse = response.json().await.unwrap();
    assert_eq!(applied.total_points, 10);

    let response = client
        .post(format!("{base}/actions"))
        .json(&ActionRequest {
            user_id: 1,
            action: ActionKind::AddReport,
        })
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let applied: AppliedResponse = response.json().await.unwrap();
    assert_eq!(applied.points_applied, 5);
    assert_eq!(applied.total_points, 15);

    let balance: BalanceResponse = client
        .get(format!("{base}/users/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(balance.total_points, 15);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_actions_lose_no_updates() {
    let engine = engine();
    let base = spawn_server(engine.clone()).await;
    let client = Client::new();

    client
        .post(format!("{base}/users"))
        .json(&SignupRequest { user_id: 1 })
        .send()
        .await
        .unwrap();

    const REQUESTS: usize = 200;

    let posts = (0..REQUESTS).map(|_| {
        let client = client.clone();
        let url = format!("{base}/actions");
        async move {
            let response = client
                .post(url)
                .json(&ActionRequest {
                    user_id: 1,
                    action: ActionKind::AddReport,
                })
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }
    });
    join_all(posts).await;

    let balance: BalanceResponse = client
        .get(format!("{base}/users/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(balance.total_points, 10 + REQUESTS as i64 * 5);
    assert_eq!(engine.ledger().len(), REQUESTS + 1);
}

#[tokio::test]
async fn unknown_user_returns_not_found() {
    let base = spawn_server(engine()).await;
    let client = Client::new();

    let response = client
        .post(format!("{base}/actions"))
        .json(&ActionRequest {
            user_id: 99,
            action: ActionKind::AddReport,
        })
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.code, "USER_NOT_FOUND");
}

#[tokio::test]
async fn duplicate_signup_returns_conflict() {
    let base = spawn_server(engine()).await;
    let client = Client::new();

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let response = client
            .post(format!("{base}/users"))
            .json(&SignupRequest { user_id: 1 })
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn unknown_action_name_is_rejected() {
    let base = spawn_server(engine()).await;
    let client = Client::new();

    // Invalid enum value fails JSON deserialization at the boundary.
    let response = client
        .post(format!("{base}/actions"))
        .json(&serde_json::json!({"user_id": 1, "action": "upvote"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
