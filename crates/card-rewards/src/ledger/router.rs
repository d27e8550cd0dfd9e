use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{PostingPeriod, Status, StatusBody, TransactionSubmission};
use super::repository::TransactionRepository;
use super::service::{LedgerError, RewardsLedgerService};
use crate::rewards::MonthlyPoints;

/// Router builder exposing posting and reporting endpoints.
pub fn ledger_router<R>(service: Arc<RewardsLedgerService<R>>) -> Router
where
    R: TransactionRepository + 'static,
{
    Router::new()
        .route("/transaction/post-list", post(post_list_handler::<R>))
        .route(
            "/transaction/monthly-reward-report",
            get(monthly_report_handler::<R>),
        )
        .route(
            "/transaction/transaction-level-point",
            get(transaction_point_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub year: String,
    pub month: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionPointQuery {
    pub transaction_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLevelPoint {
    pub transaction_name: String,
    pub point: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReportResponse {
    #[serde(flatten)]
    pub status: StatusBody,
    pub year: String,
    pub month: String,
    pub maximum_monthly_rewards_point: u64,
    pub transaction_level_points_list: Vec<TransactionLevelPoint>,
}

impl MonthlyReportResponse {
    pub fn new(year: String, month: String, points: &MonthlyPoints) -> Self {
        Self {
            status: Status::Ok.into(),
            year,
            month,
            maximum_monthly_rewards_point: points.total,
            transaction_level_points_list: points
                .transactions
                .iter()
                .map(|entry| TransactionLevelPoint {
                    transaction_name: entry.name.clone(),
                    point: entry.points,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLevelPointResponse {
    #[serde(flatten)]
    pub status: StatusBody,
    pub transaction_name: String,
    pub point: u64,
}

pub(crate) async fn post_list_handler<R>(
    State(service): State<Arc<RewardsLedgerService<R>>>,
    Json(submissions): Json<Vec<TransactionSubmission>>,
) -> Response
where
    R: TransactionRepository + 'static,
{
    match service.post_batch(submissions) {
        Ok(_) => (StatusCode::OK, Json(StatusBody::from(Status::Ok))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn monthly_report_handler<R>(
    State(service): State<Arc<RewardsLedgerService<R>>>,
    Query(query): Query<MonthlyReportQuery>,
) -> Response
where
    R: TransactionRepository + 'static,
{
    let result = PostingPeriod::parse(&query.year, &query.month)
        .and_then(|period| service.monthly_report(period));

    match result {
        Ok(points) => {
            let body = MonthlyReportResponse::new(query.year, query.month, &points);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn transaction_point_handler<R>(
    State(service): State<Arc<RewardsLedgerService<R>>>,
    Query(query): Query<TransactionPointQuery>,
) -> Response
where
    R: TransactionRepository + 'static,
{
    match service.transaction_points(&query.transaction_name) {
        Ok(points) => {
            let body = TransactionLevelPointResponse {
                status: Status::Ok.into(),
                transaction_name: points.name,
                point: points.points,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Rule violations answer 400 with their status code; anything else is a 500 with 9999.
pub fn error_response(error: LedgerError) -> Response {
    match error.status() {
        Some(status) => {
            tracing::debug!(%error, code = status.code(), "ledger request rejected");
            (StatusCode::BAD_REQUEST, Json(StatusBody::from(status))).into_response()
        }
        None => {
            tracing::error!(%error, "ledger request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusBody::unexpected(error.to_string())),
            )
                .into_response()
        }
    }
}
