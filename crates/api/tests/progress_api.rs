//! HTTP-level integration tests for completion and lock state.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, create_course, create_module, delete, get, learner_token, post_empty,
};
use serde_json::json;
use sqlx::PgPool;

async fn course_with_modules(pool: &PgPool, titles: &[&str]) -> (String, Vec<i64>) {
    let created = create_course(pool, json!({ "title": "Sequenced" })).await;
    let ext = created["external_id"].as_str().unwrap().to_string();
    let mut ids = Vec::new();
    for title in titles {
        let module = create_module(pool, &ext, title).await;
        ids.push(module["id"].as_i64().unwrap());
    }
    (ext, ids)
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_complete_updates_percentage(pool: PgPool) {
    let (_, ids) = course_with_modules(&pool, &["A", "B", "C"]).await;

    let app = common::build_test_app(pool);
    let response = post_empty(app, &format!("/api/v1/modules/{}/complete", ids[0]), &learner_token(5)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["percentage"], 33);
    assert_eq!(json["learner_id"], 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_complete_twice_is_idempotent(pool: PgPool) {
    let (_, ids) = course_with_modules(&pool, &["A", "B"]).await;
    let uri = format!("/api/v1/modules/{}/complete", ids[1]);

    let app = common::build_test_app(pool.clone());
    post_empty(app, &uri, &learner_token(5)).await;
    let app = common::build_test_app(pool);
    let json = body_json(post_empty(app, &uri, &learner_token(5)).await).await;
    assert_eq!(json["percentage"], 50);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_out_of_order_completion_keeps_later_locked(pool: PgPool) {
    let (ext, ids) = course_with_modules(&pool, &["A", "B", "C"]).await;

    let app = common::build_test_app(pool.clone());
    post_empty(app, &format!("/api/v1/modules/{}/complete", ids[1]), &learner_token(9)).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/courses/{ext}/progress"), &learner_token(9)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let locked: Vec<bool> = json["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["locked"].as_bool().unwrap())
        .collect();
    assert_eq!(locked, vec![false, true, true]);
    assert_eq!(json["modules"][1]["completed"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_is_per_learner(pool: PgPool) {
    let (ext, ids) = course_with_modules(&pool, &["A", "B"]).await;

    let app = common::build_test_app(pool.clone());
    post_empty(app, &format!("/api/v1/modules/{}/complete", ids[0]), &learner_token(1)).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/courses/{ext}/progress"), &learner_token(2)).await).await;
    assert_eq!(json["percentage"], 0);
    assert_eq!(json["modules"][1]["locked"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_deleting_module_recomputes_summary(pool: PgPool) {
    let (_, ids) = course_with_modules(&pool, &["A", "B"]).await;

    let app = common::build_test_app(pool.clone());
    post_empty(app, &format!("/api/v1/modules/{}/complete", ids[0]), &learner_token(4)).await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/modules/{}", ids[1]), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let summary = academy_db::repositories::ProgressRepo::find(&pool, 4, course_id_of(&pool, ids[0]).await)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.percentage, 100);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_completing_missing_module_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_empty(app, "/api/v1/modules/999999/complete", &learner_token(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn course_id_of(pool: &PgPool, module_id: i64) -> i64 {
    academy_db::repositories::ModuleRepo::find_by_id(pool, module_id)
        .await
        .unwrap()
        .unwrap()
        .course_id
}
