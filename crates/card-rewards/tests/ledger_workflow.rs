//! End-to-end posting and reporting through the public ledger facade and HTTP router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use card_rewards::config::RewardsConfig;
use card_rewards::ledger::{
    ledger_router, read_submissions, InMemoryTransactionRepository, MonthlyReportResponse,
    PostingPeriod, RewardsLedgerService,
};
use card_rewards::rewards::BundleStrategy;
use serde_json::{json, Value};
use tower::ServiceExt;

const MAY_STATEMENT: &str = "transaction_name,date,merchant_code,amount_cents
T01,2021-05-09,sportcheck,21000
T02,2021-05-10,sportcheck,8700
T03,2021-05-10,tim_hortons,323
T04,2021-05-10,tim_hortons,1267
T05,2021-05-10,tim_hortons,2116
T06,2021-05-10,tim_hortons,2211
T07,2021-05-10,subway,1853
T08,2021-05-10,subway,2153
T09,2021-05-10,sportcheck,7326
T10,2021-05-10,tim_hortons,1321
";

fn service(config: RewardsConfig) -> Arc<RewardsLedgerService<InMemoryTransactionRepository>> {
    let repository = Arc::new(InMemoryTransactionRepository::default());
    Arc::new(RewardsLedgerService::new(repository, config.engine()))
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[test]
fn csv_statement_reports_through_service() {
    let submissions = read_submissions(MAY_STATEMENT.as_bytes()).expect("csv parses");
    let service = service(RewardsConfig::default());

    assert_eq!(service.post_batch(submissions).expect("batch posts"), 10);
    let period = PostingPeriod::new(2021, 5).expect("valid period");
    let points = service.monthly_report(period).expect("report builds");
    let report = MonthlyReportResponse::new("2021".to_string(), "05".to_string(), &points);

    assert_eq!(report.status.code, 1200);
    assert_eq!(report.maximum_monthly_rewards_point, 1657);
    assert_eq!(report.transaction_level_points_list[0].point, 760);
    assert_eq!(report.transaction_level_points_list[9].point, 13);
}

#[test]
fn optimal_configuration_scores_at_least_greedy() {
    let greedy = service(RewardsConfig::default());
    let optimal = service(RewardsConfig {
        strategy: BundleStrategy::Optimal,
        ..RewardsConfig::default()
    });
    let period = PostingPeriod::new(2021, 5).expect("valid period");

    for service in [&greedy, &optimal] {
        let submissions = read_submissions(MAY_STATEMENT.as_bytes()).expect("csv parses");
        service.post_batch(submissions).expect("batch posts");
    }

    let greedy_total = greedy.monthly_report(period).expect("greedy report").total;
    let optimal_total = optimal.monthly_report(period).expect("optimal report").total;
    assert_eq!(greedy_total, 1657);
    assert!(optimal_total >= greedy_total);
}

#[tokio::test]
async fn http_post_then_lookup() {
    let app = ledger_router(service(RewardsConfig::default()));

    let post = Request::builder()
        .method("POST")
        .uri("/transaction/post-list")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!([
                {"transaction_name": "T01", "date": "2021-05-09", "merchant_code": "sportcheck", "amount_cents": 2500},
                {"transaction_name": "T02", "date": "2021-05-09", "merchant_code": "sportcheck", "amount_cents": 10068},
                {"transaction_name": "T03", "date": "2021-05-09", "merchant_code": "tim_hortons", "amount_cents": 3550},
                {"transaction_name": "T04", "date": "2021-05-09", "merchant_code": "subway", "amount_cents": 3558},
                {"transaction_name": "T05", "date": "2021-05-09", "merchant_code": "the_bay", "amount_cents": 1000}
            ])
            .to_string(),
        ))
        .expect("request builds");
    let response = app.clone().oneshot(post).await.expect("post responds");
    assert_eq!(response.status(), StatusCode::OK);

    let report = Request::builder()
        .uri("/transaction/monthly-reward-report?year=2021&month=05")
        .body(Body::empty())
        .expect("request builds");
    let response = app.clone().oneshot(report).await.expect("report responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["maximum_monthly_rewards_point"], json!(741));
    assert_eq!(body["transaction_level_points_list"][1]["point"], json!(375));

    let lookup = Request::builder()
        .uri("/transaction/transaction-level-point?transaction_name=T01")
        .body(Body::empty())
        .expect("request builds");
    let response = app.oneshot(lookup).await.expect("lookup responds");
    assert_eq!(
        read_json(response).await,
        json!({
            "code": 1200,
            "message": "Successful Request.",
            "transaction_name": "T01",
            "point": 80
        })
    );
}

#[tokio::test]
async fn june_report_is_empty_after_may_posting() {
    let service = service(RewardsConfig::default());
    let submissions = read_submissions(MAY_STATEMENT.as_bytes()).expect("csv parses");
    service.post_batch(submissions).expect("batch posts");
    let app = ledger_router(service);

    let request = Request::builder()
        .uri("/transaction/monthly-reward-report?year=2021&month=06")
        .body(Body::empty())
        .expect("request builds");
    let response = app.oneshot(request).await.expect("report responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], json!(1001));
}
