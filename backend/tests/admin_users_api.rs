use axum::http::StatusCode;
use std::sync::Arc;

use chrono::Utc;
use figger_backend::{
    config::LogRetentionPolicy,
    models::{
        activity_log::{actions, DELETED_USER_MARKER},
        alert::{AlertStatus, RiskLevel},
        user::UserRole,
    },
    repositories::{alert as alert_repo, user as user_repo},
    services::activity_log::ActivityLogService,
};
use serde_json::json;
use tower::ServiceExt;

mod support;

use support::{
    activity_count, assign_alert, form_request, get_request, json_request, location,
    login_token, response_json, response_text, seed_alert, seed_user, test_app, test_config,
    test_pool, test_state, test_state_with, CapturingMailer, TEST_PASSWORD,
};

#[tokio::test]
async fn deleting_a_user_releases_alerts_and_annotates_history() {
    let pool = test_pool().await;
    let admin = seed_user(&pool, UserRole::Admin).await;
    let empleado = seed_user(&pool, UserRole::Empleado).await;
    let app = test_app(test_state(pool.clone()));

    let alert = seed_alert(&pool, "Río Cauca, Antioquia", RiskLevel::Alto, Utc::now()).await;
    assign_alert(&pool, &alert, &empleado).await;
    // One history row written by the user being deleted.
    login_token(&app, &empleado.email, TEST_PASSWORD).await;
    assert_eq!(
        activity_count(&pool, &empleado.id.to_string(), actions::LOGIN).await,
        1
    );

    let token = login_token(&app, &admin.email, TEST_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/users/{}", empleado.id),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["released_alerts"], 1);
    assert_eq!(body["data"]["affected_log_rows"], 1);

    assert!(user_repo::find_user_by_id(&pool, empleado.id)
        .await
        .unwrap()
        .is_none());

    let released = alert_repo::find_alert(&pool, alert.id)
        .await
        .unwrap()
        .expect("alert survives deletion");
    assert_eq!(released.assigned_user_id, None);
    assert_eq!(released.status, AlertStatus::Activa);

    let history = ActivityLogService::new(pool.clone())
        .for_user(empleado.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].description.contains(DELETED_USER_MARKER));

    assert_eq!(
        activity_count(&pool, &admin.id.to_string(), actions::USER_DELETED).await,
        1
    );
}

#[tokio::test]
async fn purge_policy_removes_history_of_deleted_user() {
    let pool = test_pool().await;
    let admin = seed_user(&pool, UserRole::Admin).await;
    let empleado = seed_user(&pool, UserRole::Empleado).await;
    let mut config = test_config();
    config.user_deletion_log_policy = LogRetentionPolicy::Purge;
    let app = test_app(test_state_with(
        pool.clone(),
        config,
        Arc::new(CapturingMailer::default()),
    ));

    login_token(&app, &empleado.email, TEST_PASSWORD).await;
    let token = login_token(&app, &admin.email, TEST_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/admin/users/{}", empleado.id),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["affected_log_rows"], 1);

    let history = ActivityLogService::new(pool.clone())
        .for_user(empleado.id)
        .await
        .unwrap();
    assert!(history.is_empty());
    assert_eq!(
        activity_count(&pool, &admin.id.to_string(), actions::USER_DELETED).await,
        1
    );
}

#[tokio::test]
async fn admin_cannot_target_their_own_account() {
    let pool = test_pool().await;
    let admin = seed_user(&pool, UserRole::Admin).await;
    let app = test_app(test_state(pool.clone()));
    let token = login_token(&app, &admin.email, TEST_PASSWORD).await;

    let requests = [
        json_request(
            "POST",
            &format!("/api/admin/users/{}/deactivate", admin.id),
            Some(&token),
            json!({}),
        ),
        json_request(
            "PUT",
            &format!("/api/admin/users/{}/role", admin.id),
            Some(&token),
            json!({ "role": "auditor" }),
        ),
        json_request(
            "DELETE",
            &format!("/api/admin/users/{}", admin.id),
            Some(&token),
            json!({}),
        ),
    ];
    for request in requests {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let unchanged = user_repo::find_user_by_id(&pool, admin.id)
        .await
        .unwrap()
        .expect("admin still present");
    assert!(unchanged.active);
    assert_eq!(unchanged.role, UserRole::Admin);
    assert_eq!(
        activity_count(&pool, &admin.id.to_string(), actions::USER_DEACTIVATED).await,
        0
    );
}

#[tokio::test]
async fn deactivation_revokes_sessions_and_is_logged_each_time() {
    let pool = test_pool().await;
    let admin = seed_user(&pool, UserRole::Admin).await;
    let target = seed_user(&pool, UserRole::Auditor).await;
    let app = test_app(test_state(pool.clone()));

    let target_token = login_token(&app, &target.email, TEST_PASSWORD).await;
    let token = login_token(&app, &admin.email, TEST_PASSWORD).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/admin/users/{}/deactivate", target.id),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["data"]["active"], false);
    }
    assert_eq!(
        activity_count(&pool, &admin.id.to_string(), actions::USER_DEACTIVATED).await,
        2
    );

    let revoked = app
        .clone()
        .oneshot(get_request("/api/auth/me", Some(&target_token)))
        .await
        .unwrap();
    assert_eq!(revoked.status(), StatusCode::UNAUTHORIZED);

    let activated = app
        .oneshot(json_request(
            "POST",
            &format!("/api/admin/users/{}/activate", target.id),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(activated.status(), StatusCode::OK);
    assert!(user_repo::find_user_by_id(&pool, target.id)
        .await
        .unwrap()
        .unwrap()
        .active);
}

#[tokio::test]
async fn role_change_validates_and_persists() {
    let pool = test_pool().await;
    let admin = seed_user(&pool, UserRole::Admin).await;
    let target = seed_user(&pool, UserRole::Empleado).await;
    let app = test_app(test_state(pool.clone()));
    let token = login_token(&app, &admin.email, TEST_PASSWORD).await;

    let invalid = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{}/role", target.id),
            Some(&token),
            json!({ "role": "superusuario" }),
        ))
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{}/role", target.id),
            Some(&token),
            json!({ "role": "auditor" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["role"], "auditor");
    assert_eq!(
        activity_count(&pool, &admin.id.to_string(), actions::USER_ROLE_CHANGED).await,
        1
    );

    let missing = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/admin/users/{}/role", uuid::Uuid::new_v4()),
            Some(&token),
            json!({ "role": "auditor" }),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn management_page_forms_redirect_with_flash_codes() {
    let pool = test_pool().await;
    let admin = seed_user(&pool, UserRole::Admin).await;
    let target = seed_user(&pool, UserRole::Empleado).await;
    let app = test_app(test_state(pool.clone()));
    let token = login_token(&app, &admin.email, TEST_PASSWORD).await;
    let cookie = format!("figger_session={token}");

    let page = app
        .clone()
        .oneshot(get_request("/admin/usuarios", Some(&token)))
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(response_text(page).await.contains(&target.email));

    let cases = [
        (format!("/admin/usuarios/{}/desactivar", target.id), "", "/admin/usuarios?ok=desactivado"),
        (format!("/admin/usuarios/{}/rol", target.id), "role=auditor", "/admin/usuarios?ok=rol"),
        (format!("/admin/usuarios/{}/rol", target.id), "role=root", "/admin/usuarios?error=rol_invalido"),
        (format!("/admin/usuarios/{}/eliminar", admin.id), "", "/admin/usuarios?error=propia_cuenta"),
        ("/admin/usuarios/no-es-un-id/activar".to_string(), "", "/admin/usuarios?error=no_encontrado"),
        (format!("/admin/usuarios/{}/eliminar", target.id), "", "/admin/usuarios?ok=eliminado"),
    ];
    for (uri, body, expected) in cases {
        let response = app
            .clone()
            .oneshot(form_request(&uri, Some(&cookie), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response).as_deref(), Some(expected), "{uri}");
    }

    assert!(user_repo::find_user_by_id(&pool, target.id)
        .await
        .unwrap()
        .is_none());
}
