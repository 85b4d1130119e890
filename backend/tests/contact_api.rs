use axum::http::StatusCode;
use tower::ServiceExt;

mod support;

use support::{form_request, response_text, test_app, test_pool, test_state, unique_email};

fn encode(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('@', "%40")
        .replace('<', "%3C")
        .replace('>', "%3E")
        .replace('/', "%2F")
        .replace('&', "%26")
        .replace(' ', "+")
}

#[tokio::test]
async fn contact_message_is_stored_once_with_markup_removed() {
    let pool = test_pool().await;
    let app = test_app(test_state(pool.clone()));
    let email = unique_email("Ciudadano").replace("figgerenergy.gov.co", "Correo.CO");

    let body = format!(
        "name={}&email={}&phone=3001234567&subject={}&message={}&inquiry_type=Queja",
        encode("Carlos <b>Ruiz</b>"),
        encode(&email),
        encode("Minería en la quebrada"),
        encode("Se observan <script>alert(1)</script>retroexcavadoras junto al río."),
    );
    let response = app
        .oneshot(form_request("/contacto", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response_text(response).await;
    assert!(html.contains("Carlos Ruiz"));

    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        "SELECT name, email, message, inquiry_type FROM contact_messages WHERE email = $1",
    )
    .bind(&email)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    let (name, stored_email, message, inquiry_type) = &rows[0];
    assert_eq!(name, "Carlos Ruiz");
    assert_eq!(stored_email, &email);
    assert!(!message.contains('<'));
    assert!(message.contains("retroexcavadoras"));
    assert_eq!(inquiry_type, "Queja");
}

#[tokio::test]
async fn invalid_contact_form_is_rerendered_without_storing() {
    let pool = test_pool().await;
    let app = test_app(test_state(pool.clone()));
    let email = unique_email("ciudadano");

    let body = format!(
        "name=Ana&email={}&subject=Hola&message=corto&inquiry_type=felicitacion",
        encode(&email),
    );
    let response = app
        .oneshot(form_request("/contacto.php", None, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response_text(response).await.contains("<form"));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}
