//! Public contact (PQRS) form.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};

use crate::{
    handlers::page_message,
    middleware::auth::resolve_session,
    models::contact_message::ContactForm,
    services::contact::submit_contact_message,
    state::AppState,
    utils::request_meta::RequestMeta,
    views::{ContactSentTemplate, ContactTemplate, HtmlTemplate, Nav},
};

async fn nav_for(state: &AppState, headers: &HeaderMap) -> Nav {
    match resolve_session(headers, &state.pool, &state.config).await {
        Ok(Some((session, _))) => Nav::for_session(&session),
        _ => Nav::anonymous(),
    }
}

pub async fn contact_page(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let nav = nav_for(&state, &headers).await;
    HtmlTemplate(ContactTemplate::new(nav, ContactForm::default(), None))
}

pub async fn contact_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    meta: RequestMeta,
    Form(form): Form<ContactForm>,
) -> Response {
    let nav = nav_for(&state, &headers).await;
    match submit_contact_message(&state.pool, &form, meta.ip()).await {
        Ok(message) => HtmlTemplate(ContactSentTemplate {
            nav,
            name: message.name,
        })
        .into_response(),
        Err(err) => {
            let template = ContactTemplate::new(nav, form.sanitized(), Some(page_message(&err)));
            (err.status(), HtmlTemplate(template)).into_response()
        }
    }
}
