use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::BidId;
use super::repository::{BidRepository, RepositoryError};
use super::schedule::Clock;
use super::service::{BidService, BidServiceError, BidSubmission};
use crate::workflows::players::PlayerDirectory;

/// Router builder exposing HTTP endpoints for intake, approval, standings,
/// and the scheduler's evaluation trigger.
pub fn bid_router<R, P, C>(service: Arc<BidService<R, P, C>>) -> Router
where
    R: BidRepository + 'static,
    P: PlayerDirectory + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/bids", post(submit_handler::<R, P, C>))
        .route(
            "/api/v1/bids/current-week",
            get(current_week_handler::<R, P, C>),
        )
        .route(
            "/api/v1/bids/:bid_id/approval",
            post(approve_handler::<R, P, C>),
        )
        .route(
            "/api/v1/bids/evaluation",
            post(evaluation_handler::<R, P, C>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, P, C>(
    State(service): State<Arc<BidService<R, P, C>>>,
    axum::Json(submission): axum::Json<BidSubmission>,
) -> Response
where
    R: BidRepository + 'static,
    P: PlayerDirectory + 'static,
    C: Clock + 'static,
{
    match service.submit(submission) {
        Ok(bid) => (StatusCode::ACCEPTED, axum::Json(bid.status_view())).into_response(),
        Err(BidServiceError::UnknownPlayer(player)) => {
            let payload = json!({
                "error": format!("player {:?} is not registered", player.0),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(BidServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({
                "error": "bid already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn approve_handler<R, P, C>(
    State(service): State<Arc<BidService<R, P, C>>>,
    Path(bid_id): Path<String>,
) -> Response
where
    R: BidRepository + 'static,
    P: PlayerDirectory + 'static,
    C: Clock + 'static,
{
    let id = BidId(bid_id);
    match service.approve(&id) {
        Ok(bid) => (StatusCode::OK, axum::Json(bid.status_view())).into_response(),
        Err(BidServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "bid not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error @ BidServiceError::InvalidApproval { .. }) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn current_week_handler<R, P, C>(
    State(service): State<Arc<BidService<R, P, C>>>,
) -> Response
where
    R: BidRepository + 'static,
    P: PlayerDirectory + 'static,
    C: Clock + 'static,
{
    match service.evaluate_current_week() {
        Ok(bids) => {
            let views: Vec<_> = bids.iter().map(|bid| bid.status_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn evaluation_handler<R, P, C>(
    State(service): State<Arc<BidService<R, P, C>>>,
) -> Response
where
    R: BidRepository + 'static,
    P: PlayerDirectory + 'static,
    C: Clock + 'static,
{
    match service.run_weekly_evaluation() {
        Ok(run) => (StatusCode::OK, axum::Json(run)).into_response(),
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: BidServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
