use std::sync::Arc;

use axum::http::StatusCode;
use figger_backend::models::{activity_log::actions, user::UserRole};
use serde_json::json;
use tower::ServiceExt;

mod support;

use support::{
    activity_count, form_request, get_request, json_request, location, login_token,
    response_json, seed_user, test_app, test_config, test_pool, test_state_with, unique_email,
    CapturingMailer, TEST_PASSWORD,
};

const NEW_PASSWORD: &str = "Nueva-Clave-2025";

fn token_from(body: &str) -> String {
    let start = body.find("token=").expect("reset link in mail") + "token=".len();
    body[start..start + 64].to_string()
}

#[tokio::test]
async fn reset_link_changes_password_once_and_revokes_sessions() {
    let pool = test_pool().await;
    let user = seed_user(&pool, UserRole::Empleado).await;
    let mailer = Arc::new(CapturingMailer::default());
    let app = test_app(test_state_with(pool.clone(), test_config(), mailer.clone()));

    let old_token = login_token(&app, &user.email, TEST_PASSWORD).await;

    let requested = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            json!({ "email": user.email }),
        ))
        .await
        .unwrap();
    assert_eq!(requested.status(), StatusCode::OK);

    let mail = mailer.last_body_for(&user.email).expect("reset mail sent");
    assert!(mail.contains("/restablecer-contrasena?token="));
    let token = token_from(&mail);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let page = app
        .clone()
        .oneshot(get_request(
            &format!("/restablecer-contrasena?token={token}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);

    let mismatch = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            json!({ "token": token, "password": NEW_PASSWORD, "password_confirm": "otra-cosa-123" }),
        ))
        .await
        .unwrap();
    assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

    let form = app
        .clone()
        .oneshot(form_request(
            "/restablecer-contrasena",
            None,
            &format!("token={token}&password={NEW_PASSWORD}&password_confirm={NEW_PASSWORD}"),
        ))
        .await
        .unwrap();
    assert_eq!(form.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&form).as_deref(),
        Some("/login?ok=contrasena_restablecida")
    );

    let reused = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            json!({ "token": token, "password": NEW_PASSWORD, "password_confirm": NEW_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(reused.status(), StatusCode::BAD_REQUEST);
    let body = response_json(reused).await;
    assert_eq!(body["error"], "BAD_REQUEST");

    let revoked = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&old_token)))
        .await
        .unwrap();
    assert_eq!(revoked.status(), StatusCode::UNAUTHORIZED);

    let old_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": user.email, "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(old_password.status(), StatusCode::UNAUTHORIZED);
    login_token(&app, &user.email, NEW_PASSWORD).await;

    let user_id = user.id.to_string();
    assert_eq!(
        activity_count(&pool, &user_id, actions::PASSWORD_RESET_REQUESTED).await,
        1
    );
    assert_eq!(activity_count(&pool, &user_id, actions::PASSWORD_RESET).await, 1);
}

#[tokio::test]
async fn unknown_email_gets_the_same_answer_and_no_mail() {
    let pool = test_pool().await;
    let mailer = Arc::new(CapturingMailer::default());
    let app = test_app(test_state_with(pool, test_config(), mailer.clone()));
    let email = unique_email("nadie");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            json!({ "email": email }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(mailer.last_body_for(&email).is_none());

    let bogus = app
        .oneshot(json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            json!({ "token": "0".repeat(64), "password": NEW_PASSWORD, "password_confirm": NEW_PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}
