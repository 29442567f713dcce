use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use context::CallerIdentity;
use directory::{CreatedGroup, DirectoryError, GroupName, OwnerAssignment};
use serde::Serialize;

use crate::{
    flash::{self, FlashMessage},
    page,
    state::AppState,
};

/// Renders the form and consumes pending flash messages.
pub(crate) async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(cookie) = flash::cookie_value(&headers) else {
        return Html(page::render(&[])).into_response();
    };

    let messages = state.flash_key.open(cookie).unwrap_or_default();

    (
        AppendHeaders([(SET_COOKIE, flash::clear_cookie())]),
        Html(page::render(&messages)),
    )
        .into_response()
}

/// The first `group_name` field of the submission. An unreadable body counts as an empty name.
fn submitted_group_name(form: Result<Form<Vec<(String, String)>>, FormRejection>) -> String {
    let fields = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            log::debug!("Unreadable form submission: {rejection}");
            return String::new();
        }
    };

    fields
        .into_iter()
        .find_map(|(key, value)| (key == "group_name").then_some(value))
        .unwrap_or_default()
}

/// Validates the submitted name, creates the group owned by the caller and redirects back to the form.
pub(crate) async fn create_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let group_name = submitted_group_name(form);

    let flash = match GroupName::parse(&group_name) {
        Ok(name) => {
            let caller = context::current_user_id(&headers);

            if caller.is_none() {
                log::warn!("Could not determine the signed-in user; group '{name}' will have no owner");
            }

            let result = state
                .groups
                .create_security_group(&name, caller.as_ref().map(CallerIdentity::as_str))
                .await;

            creation_flash(result)
        }
        Err(e) => {
            log::debug!("Rejected group name: {e}");
            FlashMessage::error(e.to_string())
        }
    };

    (
        AppendHeaders([(SET_COOKIE, flash::set_cookie(&state.flash_key, &[flash]))]),
        Redirect::to("/"),
    )
        .into_response()
}

fn creation_flash(result: Result<CreatedGroup, DirectoryError>) -> FlashMessage {
    match result {
        Ok(group) => match group.owner {
            OwnerAssignment::Bound(_) => FlashMessage::success(group.message()),
            OwnerAssignment::Unassigned => FlashMessage::warning(format!(
                "{}, but no owner was assigned because the signed-in user could not be determined",
                group.message()
            )),
            OwnerAssignment::Failed(_) => FlashMessage::warning(group.message()),
        },
        Err(e) => FlashMessage::error(e.client_message()),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'static str>,
}

/// Reports healthy only if a directory client can be built, which requires a token round-trip.
pub(crate) async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.groups.connect().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                details: None,
            }),
        ),
        Err(e) => {
            log::error!("Health check failed: {e}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    details: Some("Could not initialize Graph client"),
                }),
            )
        }
    }
}
