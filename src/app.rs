use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

const UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/tabs/:name", get(handlers::activate_tab))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT)),
        )
        .route("/campaigns", post(handlers::create_campaign))
        .route("/campaigns/:id/view", post(handlers::view_campaign))
        .route("/campaigns/:id/edit", post(handlers::edit_campaign))
        .route("/campaigns/:id/save", post(handlers::save_campaign))
        .route("/campaigns/:id/delete", post(handlers::delete_campaign))
        .route("/campaigns/:id/send-from-view", post(handlers::send_from_view))
        .route("/send", post(handlers::send_campaign))
        .route("/batches/:id/activate", post(handlers::activate_batch))
        .route("/batches/:id/deactivate", post(handlers::deactivate_batch))
        .route("/batches/:id/contacts", post(handlers::view_contacts))
        .route("/batches/:id/contacts/new", post(handlers::new_contact))
        .route("/batches/:id/contacts/add", post(handlers::add_contact))
        .route("/contacts/:id/status", post(handlers::contact_status))
        .route("/contacts/:id/delete", post(handlers::delete_contact))
        .route("/confirm", post(handlers::confirm))
        .route("/confirm/cancel", post(handlers::cancel))
        .route("/modal/dismiss", post(handlers::dismiss_modal))
        .route("/modal/close", post(handlers::close_modal))
        .with_state(state)
}
