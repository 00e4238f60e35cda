use crate::console::PendingAction;
use crate::errors::AppError;
use crate::forms::{CampaignForm, ContactForm, SendForm, StatusForm, UploadForm};
use crate::models::HealthResponse;
use crate::state::AppState;
use crate::ui::render_index;
use crate::workflow;
use axum::{
    extract::{Multipart, Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use std::time::Instant;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let now = Instant::now();
    let mut console = state.console.lock().await;
    console.prune_alerts(now);
    Html(render_index(&console, now))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(workflow::health(&state).await)
}

pub async fn activate_tab(State(state): State<AppState>, Path(name): Path<String>) -> Redirect {
    workflow::activate_tab(&state, &name).await;
    Redirect::to("/")
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                form.file_name = field.file_name().map(str::to_string);
                form.bytes = field.bytes().await?.to_vec();
            }
            Some("source") => form.source = field.text().await?,
            _ => {}
        }
    }

    workflow::submit_upload(&state, form).await;
    Ok(Redirect::to("/"))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Form(form): Form<CampaignForm>,
) -> Redirect {
    workflow::submit_campaign(&state, form).await;
    Redirect::to("/")
}

pub async fn view_campaign(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    workflow::view_campaign(&state, id).await;
    Redirect::to("/")
}

pub async fn edit_campaign(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    workflow::edit_campaign(&state, id).await;
    Redirect::to("/")
}

pub async fn save_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CampaignForm>,
) -> Redirect {
    workflow::save_campaign(&state, id, form).await;
    Redirect::to("/")
}

pub async fn delete_campaign(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    workflow::request(&state, PendingAction::DeleteCampaign(id)).await;
    Redirect::to("/")
}

pub async fn send_from_view(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    workflow::send_from_view(&state, id).await;
    Redirect::to("/")
}

pub async fn send_campaign(State(state): State<AppState>, Form(form): Form<SendForm>) -> Redirect {
    workflow::submit_send(&state, form).await;
    Redirect::to("/")
}

pub async fn activate_batch(State(state): State<AppState>, Path(batch_id): Path<String>) -> Redirect {
    workflow::request(&state, PendingAction::ActivateBatch(batch_id)).await;
    Redirect::to("/")
}

pub async fn deactivate_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> Redirect {
    workflow::request(&state, PendingAction::DeactivateBatch(batch_id)).await;
    Redirect::to("/")
}

pub async fn view_contacts(State(state): State<AppState>, Path(batch_id): Path<String>) -> Redirect {
    workflow::view_contacts(&state, &batch_id).await;
    Redirect::to("/")
}

pub async fn new_contact(State(state): State<AppState>, Path(batch_id): Path<String>) -> Redirect {
    workflow::show_add_contact(&state, &batch_id).await;
    Redirect::to("/")
}

pub async fn add_contact(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
    Form(form): Form<ContactForm>,
) -> Redirect {
    workflow::add_contact(&state, &batch_id, form).await;
    Redirect::to("/")
}

pub async fn contact_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    workflow::request_status_change(&state, id, form).await;
    Redirect::to("/")
}

pub async fn delete_contact(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    workflow::request(&state, PendingAction::DeleteContact(id)).await;
    Redirect::to("/")
}

pub async fn confirm(State(state): State<AppState>) -> Redirect {
    workflow::confirm(&state).await;
    Redirect::to("/")
}

pub async fn cancel(State(state): State<AppState>) -> Redirect {
    workflow::cancel(&state).await;
    Redirect::to("/")
}

pub async fn dismiss_modal(State(state): State<AppState>) -> Redirect {
    workflow::dismiss_modal(&state).await;
    Redirect::to("/")
}

pub async fn close_modal(State(state): State<AppState>) -> Redirect {
    workflow::close_modal(&state).await;
    Redirect::to("/")
}
