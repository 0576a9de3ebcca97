// Copyright 2026 JapaAdvisor Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for JapaAdvisor.
//!
//! Failures are reported in the JSON body as `{"error": ...}` with a 200
//! status, which is what the web client expects.

use crate::config::Config;
use crate::error::RoadmapError;
use crate::fetch::{Fetcher, LiveFetcher};
use crate::requirements::dispatch::Dispatcher;
use crate::requirements::RenderTimings;
use crate::roadmap::{RoadmapClient, UserProfile};
use anyhow::Context;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// State shared by all handlers.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub fetcher: Arc<dyn Fetcher>,
    pub roadmap: RoadmapClient,
}

impl AppState {
    /// Live state: network fetcher, Chromium rendering and the configured model.
    pub fn from_config(config: &Config) -> Self {
        Self {
            dispatcher: Dispatcher::new(RenderTimings::from(&config.fetch)),
            fetcher: Arc::new(LiveFetcher::new(config.fetch.clone())),
            roadmap: RoadmapClient::new(config.llm.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RequirementsRequest {
    country: String,
    #[serde(rename = "nationality", default = "default_nationality")]
    _nationality: String,
}

fn default_nationality() -> String {
    "Nigeria".to_string()
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/api/countries", get(countries))
        .route("/api/requirements", post(requirements))
        .route("/generate-roadmap", post(generate_roadmap))
        .layer(cors)
        .with_state(state)
}

/// Serve the API on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("REST API listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .context("REST server stopped")?;
    Ok(())
}

/// Bind `addr` and serve the API.
pub async fn start(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve(listener, state).await
}

// ── Handlers ────────────────────────────────────────────────────

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to JapaAdvisor API!" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn countries(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "countries": state.dispatcher.supported() }))
}

async fn requirements(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequirementsRequest>,
) -> Response {
    match state
        .dispatcher
        .requirements(&body.country, state.fetcher.as_ref())
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            info!(country = %body.country, "rejected requirements request: {e}");
            Json(json!({ "error": e.to_string() })).into_response()
        }
    }
}

async fn generate_roadmap(
    State(state): State<Arc<AppState>>,
    Json(profile): Json<UserProfile>,
) -> Response {
    match state.roadmap.generate(&profile).await {
        Ok(roadmap) => Json(roadmap).into_response(),
        Err(RoadmapError::ModelOutput { raw }) => {
            Json(json!({ "error": "Failed to parse GPT response", "raw": raw })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "roadmap generation failed");
            Json(json!({ "error": e.to_string() })).into_response()
        }
    }
}
