mod common;
use reqwest::StatusCode;
use serde_json::json;
use taxlearn::model::entity::UserEntity;
use taxlearn::web::middlewares::AUTH_TOKEN;
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, saved_id, setup_server, setup_test_db, signin_action, signin_admin_action,
    signup_action,
};

#[tokio::test]
async fn route_signup_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("learner", "secret")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(ent.username(), "learner");
                    assert_eq!(ent.role().to_string(), "user");
                    assert!(!body.contains("password_hash"));
                }),
        )
        .step(signup_action("learner", "secret").with_expect(StatusCode::CONFLICT))
        .step(signup_action("", "secret").with_expect(StatusCode::BAD_REQUEST))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("accountant", "ledger").with_save_cookies(false))
        .step(
            signin_action("accountant", "ledger")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid JSON format");
                    assert_eq!(ent.username(), "accountant");
                })
                .with_clear_cookies(true),
        )
        .step(Action::new("verify", "GET", "/api/v1/account/verify"))
        .step(
            signin_action("accountant", "wrong")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| assert!(body.contains("Authentication error")))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            signin_action("nobody", "nothing")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .step(
            Action::new("verify_anonymous", "GET", "/api/v1/account/verify")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_list_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("learner", "secret"))
        .step(
            Action::new("user_list", "GET", "/api/v1/account/page")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .assert_body(|body| assert!(body.contains("error")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(signin_admin_action())
        .step(
            Action::new("user_list", "GET", "/api/v1/account/page")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .assert_dyn_body(|_, body| {
                    // bootstrapped admin plus the learner
                    assert_eq!(body["total"], 2);
                    assert_eq!(body["items"].as_array().map(Vec::len), Some(2));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_update_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("first", "pass1")
                .with_save_cookies(false)
                .with_save_as("first"),
        )
        .step(signup_action("second", "pass2").with_save_as("second"))
        // learners cannot rename someone else
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "first")))
                .with_body(json!({ "username": "hijacked", "password": "-" }))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "second")))
                .with_body(json!({ "username": "renamed", "password": "-" }))
                .assert_body(|body| assert!(body.contains("renamed"))),
        )
        .step(signin_admin_action().with_clear_cookies(true))
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "first")))
                .with_body(json!({ "username": "first-renamed", "password": "-" }))
                .assert_body(|body| assert!(body.contains("first-renamed"))),
        )
        // taken by the second user
        .step(
            Action::new("user_update", "PUT", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "first")))
                .with_body(json!({ "username": "renamed", "password": "-" }))
                .with_expect(StatusCode::CONFLICT),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_delete_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("first", "pass1")
                .with_save_cookies(false)
                .with_save_as("first"),
        )
        .step(signup_action("second", "pass2").with_save_as("second"))
        .step(
            Action::new("user_delete", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "first")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("user_delete_self", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "second"))),
        )
        .step(signin_admin_action())
        .step(
            Action::new("user_delete_missing", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "second")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("user_delete_by_admin", "DELETE", "dynamic")
                .with_dyn_path(|ctx| format!("/api/v1/account/{}", saved_id(ctx, "first"))),
        )
        .run(&mut server, pool)
        .await;
}
