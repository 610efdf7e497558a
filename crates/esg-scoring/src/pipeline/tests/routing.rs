use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use crate::pipeline::router::{final_score_handler, FinalScoreRequest};

#[tokio::test]
async fn final_score_handler_returns_rounded_scores() {
    let (service, _, _) = build_service();
    let request = FinalScoreRequest {
        final_subfactor_scores: json!({
            "Environmental": { "GHG Score": 80, "Energy Efficiency Score": null },
            "Social": { "Retention Score": 70 },
            "Governance": {}
        }),
    };

    let response = final_score_handler::<FixedEvaluator, FlatBackfill>(
        State(service),
        Ok(axum::Json(request)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!({ "E_score": 80.0, "S_score": 70.0, "G_score": 0.0, "ESG_score": 56.5 })
    );
}

#[tokio::test]
async fn final_score_route_rejects_textual_leaves() {
    let response = router()
        .oneshot(post_json(
            "/api/calculate-final-esg-score",
            &json!({ "final_subfactor_scores": { "Social": { "Safety Score": "n/a" } } }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("Safety Score"));
}

#[tokio::test]
async fn final_score_route_rejects_missing_top_level_object() {
    let response = router()
        .oneshot(post_json("/api/calculate-final-esg-score", &json!({ "scores": {} })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("final_subfactor_scores"));
}

#[tokio::test]
async fn unparsable_body_is_a_json_bad_request() {
    let request = axum::http::Request::post("/api/calculate-esg-scores-by-formulas")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"overall_data\": "))
        .expect("valid request");

    let response = router().oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_content_type_keeps_the_error_envelope() {
    let request = axum::http::Request::post("/api/esg-report")
        .body(axum::body::Body::from("{\"final_subfactor_scores\": {}}"))
        .expect("valid request");

    let response = router().oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = read_json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn formula_route_wraps_subfactor_scores() {
    let response = router()
        .oneshot(post_json(
            "/api/calculate-esg-scores-by-formulas",
            &json!({
                "result": { "file": "sustainability-report.pdf" },
                "overall_data": { "Vehicles produced": 100000, "Total GHG emissions (in tCO2)": 285000 },
                "status": "success"
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["subfactor_scores"]["Environmental"]["GHG Score"], json!(80.0));
    assert_eq!(
        body["subfactor_scores"]["Environmental"]["Energy Efficiency Score"],
        json!(null)
    );
    assert_eq!(body["subfactor_scores"]["Governance"], json!({}));
}

#[tokio::test]
async fn formula_route_rejects_empty_metrics() {
    let response = router()
        .oneshot(post_json(
            "/api/calculate-esg-scores-by-formulas",
            &json!({ "overall_data": {} }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn backfill_route_returns_final_subfactor_scores() {
    let response = router()
        .oneshot(post_json(
            "/api/fill-missing-esg-sub-scores-by-industryavg",
            &json!({ "subfactor_scores": {
                "Environmental": { "GHG Score": 80, "Water Efficiency Score": null },
                "Social": {},
                "Governance": { "Board Independence Score": null }
            }}),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let filled = &body["final_subfactor_scores"];
    assert_eq!(filled["Environmental"]["GHG Score"], json!(80.0));
    assert_eq!(filled["Environmental"]["Water Efficiency Score"], json!(55.0));
    assert_eq!(filled["Governance"]["Board Independence Score"], json!(55.0));
}

#[tokio::test]
async fn evaluator_failures_map_to_bad_gateway() {
    let response = broken_router()
        .oneshot(post_json(
            "/api/calculate-esg-scores-by-formulas",
            &json!({ "overall_data": { "Vehicles produced": 1000 } }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("not valid JSON"));
}

#[tokio::test]
async fn report_route_includes_breakdown() {
    let response = router()
        .oneshot(post_json(
            "/api/esg-report",
            &json!({ "final_subfactor_scores": {
                "Environmental": { "GHG Score": 90 },
                "Social": { "Retention Score": 72, "Safety Score": null },
                "Governance": { "Board Independence Score": 40 }
            }}),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["scores"]["ESG_score"], json!(71.2));
    assert_eq!(body["composite_status"], json!("good"));
    assert_eq!(body["categories"][0]["status"], json!("excellent"));
    assert_eq!(body["categories"][1]["missing"], json!(1));
    assert_eq!(body["categories"][2]["status"], json!("poor"));
}

#[tokio::test]
async fn pipeline_route_runs_all_stages() {
    let response = router()
        .oneshot(post_json(
            "/api/esg-pipeline",
            &json!({ "overall_data": { "Vehicles produced": 100000 } }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["scores"]["E_score"], json!(67.5));
    assert_eq!(body["scores"]["ESG_score"], json!(48.88));
}
