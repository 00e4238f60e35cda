use crate::console::{AlertKind, Listing, Modal, PendingAction, SendDraft, Tab};
use crate::errors::ApiError;
use crate::forms::{CampaignForm, ContactForm, SendForm, StatusForm, UploadForm};
use crate::models::HealthResponse;
use crate::state::AppState;
use tracing::{debug, info, warn};

fn listing<T>(result: Result<Vec<T>, ApiError>, context: &str) -> Listing<T> {
    match result {
        Ok(items) => Listing::Loaded(items),
        Err(err) => {
            warn!("{context}: {err}");
            Listing::Failed(err.describe(context))
        }
    }
}

async fn fail(state: &AppState, tab: Tab, message: &str) {
    debug!(tab = tab.name(), "validation failed: {message}");
    let mut console = state.console.lock().await;
    console.show_alert(tab, AlertKind::Error, message);
}

async fn begin(state: &AppState, tab: Tab) {
    state.console.lock().await.set_loading(tab, true);
}

/// Activates the named tab and loads its data. Unknown names change nothing.
pub async fn activate_tab(state: &AppState, name: &str) -> bool {
    let Some(tab) = Tab::parse(name) else {
        debug!("ignoring unknown tab {name:?}");
        return false;
    };

    state.console.lock().await.activate(tab);
    match tab {
        Tab::Campaigns => load_campaigns(state).await,
        Tab::Send => load_campaigns_for_send(state).await,
        Tab::Batches => load_batches(state).await,
        Tab::Stats => load_stats(state).await,
        Tab::Upload => {}
    }
    true
}

pub async fn load_initial(state: &AppState) {
    load_stats(state).await;
    load_campaigns(state).await;
    load_campaigns_for_send(state).await;
    load_batches(state).await;
}

pub async fn load_campaigns(state: &AppState) {
    let result = state.client.list_campaigns().await;
    state.console.lock().await.campaigns = listing(result, "Erro ao carregar campanhas");
}

pub async fn load_campaigns_for_send(state: &AppState) {
    let result = state.client.list_campaigns().await;
    state.console.lock().await.send_options = listing(result, "Erro ao carregar campanhas");
}

pub async fn load_batches(state: &AppState) {
    begin(state, Tab::Batches).await;
    let result = state.client.list_batches().await;
    let mut console = state.console.lock().await;
    console.set_loading(Tab::Batches, false);
    console.batches = listing(result, "Erro ao carregar lotes");
}

pub async fn load_stats(state: &AppState) {
    let result = state.client.daily_stats().await;
    let mut console = state.console.lock().await;
    match result {
        Ok(stats) => console.stats = Some(stats),
        Err(err) => {
            warn!("failed to load daily stats: {err}");
            console.show_alert(
                Tab::Stats,
                AlertKind::Error,
                err.describe("Erro ao carregar estatísticas"),
            );
        }
    }
}

pub async fn submit_upload(state: &AppState, form: UploadForm) {
    let upload = match form.validate() {
        Ok(upload) => upload,
        Err(message) => return fail(state, Tab::Upload, message).await,
    };

    begin(state, Tab::Upload).await;
    let file_name = upload.file_name.clone();
    let result = state.client.import_contacts(upload).await;

    let mut console = state.console.lock().await;
    console.set_loading(Tab::Upload, false);
    match result {
        Ok(receipt) => {
            info!(file = %file_name, imported = receipt.contacts_imported, "contacts imported");
            let message = receipt.message.unwrap_or_else(|| {
                format!("{} contatos importados com sucesso", receipt.contacts_imported)
            });
            console.show_alert(Tab::Upload, AlertKind::Success, message);
        }
        Err(err) => {
            warn!(file = %file_name, "import failed: {err}");
            console.show_alert(Tab::Upload, AlertKind::Error, err.describe("Erro"));
        }
    }
}

pub async fn submit_campaign(state: &AppState, form: CampaignForm) {
    let campaign = match form.validate() {
        Ok(campaign) => campaign,
        Err(message) => {
            state.console.lock().await.campaign_draft = form.into_draft();
            return fail(state, Tab::Campaigns, message).await;
        }
    };

    begin(state, Tab::Campaigns).await;
    let result = state.client.create_campaign(&campaign).await;

    let created = {
        let mut console = state.console.lock().await;
        console.set_loading(Tab::Campaigns, false);
        match result {
            Ok(created) => {
                info!(campaign_id = created.campaign_id, "campaign created");
                console.campaign_draft = Default::default();
                console.show_alert(
                    Tab::Campaigns,
                    AlertKind::Success,
                    format!("Campanha criada com sucesso! ID: {}", created.campaign_id),
                );
                true
            }
            Err(err) => {
                warn!("campaign creation failed: {err}");
                console.campaign_draft = form.into_draft();
                console.show_alert(Tab::Campaigns, AlertKind::Error, err.describe("Erro"));
                false
            }
        }
    };

    if created {
        load_campaigns(state).await;
    }
}

pub async fn submit_send(state: &AppState, form: SendForm) {
    let (campaign_id, options) = match form.validate() {
        Ok(valid) => valid,
        Err(message) => {
            state.console.lock().await.send_draft = form.into_draft();
            return fail(state, Tab::Send, message).await;
        }
    };

    begin(state, Tab::Send).await;
    let result = state.client.send_campaign(campaign_id, &options).await;

    let sent = {
        let mut console = state.console.lock().await;
        console.set_loading(Tab::Send, false);
        match result {
            Ok(ack) => {
                info!(campaign_id, test_mode = options.test_mode, async_mode = options.async_mode, "campaign send accepted");
                console.send_draft = SendDraft::default();
                console.show_alert(
                    Tab::Send,
                    AlertKind::Success,
                    ack.message
                        .unwrap_or_else(|| "Campanha enviada com sucesso!".to_string()),
                );
                true
            }
            Err(err) => {
                warn!(campaign_id, "campaign send failed: {err}");
                console.send_draft = form.into_draft();
                console.show_alert(Tab::Send, AlertKind::Error, err.describe("Erro"));
                false
            }
        }
    };

    if sent {
        load_campaigns_for_send(state).await;
    }
}

pub async fn view_campaign(state: &AppState, campaign_id: i64) {
    let campaign = match state.client.campaign(campaign_id).await {
        Ok(campaign) => campaign,
        Err(err) => {
            warn!(campaign_id, "failed to load campaign: {err}");
            let message = err.describe("Erro ao carregar campanha");
            return fail(state, Tab::Campaigns, &message).await;
        }
    };

    // Stats are optional decoration for the view.
    let stats = match state.client.campaign_stats(campaign_id).await {
        Ok(stats) => Some(stats),
        Err(err) => {
            debug!(campaign_id, "campaign stats unavailable: {err}");
            None
        }
    };

    state
        .console
        .lock()
        .await
        .modals
        .open(Modal::CampaignView { campaign, stats });
}

pub async fn edit_campaign(state: &AppState, campaign_id: i64) {
    match state.client.campaign(campaign_id).await {
        Ok(campaign) => state
            .console
            .lock()
            .await
            .modals
            .open(Modal::edit(campaign)),
        Err(err) => {
            warn!(campaign_id, "failed to load campaign for edit: {err}");
            let message = err.describe("Erro ao carregar campanha para edição");
            fail(state, Tab::Campaigns, &message).await;
        }
    }
}

pub async fn save_campaign(state: &AppState, campaign_id: i64, form: CampaignForm) {
    let campaign = match form.validate() {
        Ok(campaign) => campaign,
        Err(message) => {
            state
                .console
                .lock()
                .await
                .modals
                .keep_edit_draft(campaign_id, form.into_draft());
            return fail(state, Tab::Campaigns, message).await;
        }
    };

    let result = state.client.update_campaign(campaign_id, &campaign).await;

    let saved = {
        let mut console = state.console.lock().await;
        match result {
            Ok(_) => {
                info!(campaign_id, "campaign updated");
                console.modals.close();
                console.show_alert(
                    Tab::Campaigns,
                    AlertKind::Success,
                    "Campanha atualizada com sucesso!",
                );
                true
            }
            Err(err) => {
                warn!(campaign_id, "campaign update failed: {err}");
                console.modals.keep_edit_draft(campaign_id, form.into_draft());
                console.show_alert(
                    Tab::Campaigns,
                    AlertKind::Error,
                    err.describe("Erro ao atualizar campanha"),
                );
                false
            }
        }
    };

    if saved {
        load_campaigns(state).await;
    }
}

/// Closes the view and jumps to the send tab with `campaign_id` preselected.
pub async fn send_from_view(state: &AppState, campaign_id: i64) {
    {
        let mut console = state.console.lock().await;
        console.modals.close();
        console.activate(Tab::Send);
    }
    load_campaigns_for_send(state).await;
    state.console.lock().await.send_draft = SendDraft {
        campaign_id: Some(campaign_id),
        ..SendDraft::default()
    };
}

pub async fn view_contacts(state: &AppState, batch_id: &str) {
    begin(state, Tab::Batches).await;
    let result = state.client.batch_contacts(batch_id).await;

    let mut console = state.console.lock().await;
    console.set_loading(Tab::Batches, false);
    match result {
        Ok(contacts) => console.modals.open(Modal::BatchContacts {
            batch_id: batch_id.to_string(),
            contacts,
        }),
        Err(err) => {
            warn!(batch_id, "failed to load batch contacts: {err}");
            console.show_alert(
                Tab::Batches,
                AlertKind::Error,
                err.describe("Erro ao carregar contatos"),
            );
        }
    }
}

pub async fn show_add_contact(state: &AppState, batch_id: &str) {
    state.console.lock().await.modals.push(Modal::add_contact(batch_id));
}

pub async fn add_contact(state: &AppState, batch_id: &str, form: ContactForm) {
    let contact = match form.validate(batch_id) {
        Ok(contact) => contact,
        Err(message) => {
            state
                .console
                .lock()
                .await
                .modals
                .keep_contact_draft(batch_id, form.into_draft());
            return fail(state, Tab::Batches, message).await;
        }
    };

    let result = state.client.add_contact(&contact).await;

    let added = {
        let mut console = state.console.lock().await;
        match result {
            Ok(_) => {
                info!(batch_id, "contact added");
                console.modals.close();
                console.show_alert(
                    Tab::Batches,
                    AlertKind::Success,
                    "Contato adicionado com sucesso!",
                );
                true
            }
            Err(err) => {
                warn!(batch_id, "adding contact failed: {err}");
                console.modals.keep_contact_draft(batch_id, form.into_draft());
                console.show_alert(
                    Tab::Batches,
                    AlertKind::Error,
                    err.describe("Erro ao adicionar contato"),
                );
                false
            }
        }
    };

    if added {
        view_contacts(state, batch_id).await;
    }
}

/// Stacks a confirmation prompt; nothing is sent until [`confirm`].
pub async fn request(state: &AppState, action: PendingAction) {
    state.console.lock().await.modals.push(Modal::Confirm(action));
}

pub async fn request_status_change(state: &AppState, contact_id: i64, form: StatusForm) {
    match form.validate() {
        Ok(status) => request(state, PendingAction::SetContactStatus { contact_id, status }).await,
        Err(message) => fail(state, Tab::Batches, message).await,
    }
}

pub async fn cancel(state: &AppState) {
    state.console.lock().await.modals.take_confirmation();
}

/// Runs the action waiting in the top confirmation prompt, if any.
pub async fn confirm(state: &AppState) {
    let action = state.console.lock().await.modals.take_confirmation();
    match action {
        Some(action) => execute(state, action).await,
        None => debug!("confirm without a pending action"),
    }
}

async fn execute(state: &AppState, action: PendingAction) {
    let tab = action.tab();
    begin(state, tab).await;

    let (result, context, fallback) = match &action {
        PendingAction::ActivateBatch(batch_id) => (
            state.client.activate_batch(batch_id).await,
            "Erro ao ativar lote",
            format!("Lote {batch_id} ativado com sucesso"),
        ),
        PendingAction::DeactivateBatch(batch_id) => (
            state.client.deactivate_batch(batch_id).await,
            "Erro ao desativar lote",
            format!("Lote {batch_id} desativado com sucesso"),
        ),
        PendingAction::SetContactStatus { contact_id, status } => (
            state.client.update_contact_status(*contact_id, *status).await,
            "Erro ao atualizar status",
            format!("Status do contato {contact_id} atualizado para {status}"),
        ),
        PendingAction::DeleteContact(contact_id) => (
            state.client.delete_contact(*contact_id).await,
            "Erro ao excluir contato",
            format!("Contato {contact_id} excluído com sucesso"),
        ),
        PendingAction::DeleteCampaign(campaign_id) => (
            state.client.delete_campaign(*campaign_id).await,
            "Erro ao excluir campanha",
            "Campanha excluída com sucesso!".to_string(),
        ),
    };

    let succeeded = {
        let mut console = state.console.lock().await;
        console.set_loading(tab, false);
        match result {
            Ok(ack) => {
                info!(?action, "action completed");
                let message = match action {
                    PendingAction::DeleteCampaign(_) => fallback,
                    _ => ack.message.unwrap_or(fallback),
                };
                if matches!(
                    action,
                    PendingAction::SetContactStatus { .. } | PendingAction::DeleteContact(_)
                ) {
                    console.modals.close();
                }
                console.show_alert(tab, AlertKind::Success, message);
                true
            }
            Err(err) => {
                warn!(?action, "action failed: {err}");
                console.show_alert(tab, AlertKind::Error, err.describe(context));
                false
            }
        }
    };

    if succeeded {
        match tab {
            Tab::Campaigns => load_campaigns(state).await,
            _ => load_batches(state).await,
        }
    }
}

/// Console health plus what the backend reports about itself.
pub async fn health(state: &AppState) -> HealthResponse {
    match state.client.health().await {
        Ok(backend) if backend.is_healthy() => HealthResponse {
            status: "ok",
            backend: Some(backend),
            backend_error: None,
        },
        Ok(backend) => {
            let error = backend
                .error
                .clone()
                .unwrap_or_else(|| format!("backend status: {}", backend.status));
            warn!("backend reports unhealthy: {error}");
            HealthResponse {
                status: "degraded",
                backend: Some(backend),
                backend_error: Some(error),
            }
        }
        Err(err) => {
            warn!("backend health check failed: {err}");
            HealthResponse {
                status: "degraded",
                backend: None,
                backend_error: Some(err.to_string()),
            }
        }
    }
}

pub async fn dismiss_modal(state: &AppState) {
    state.console.lock().await.modals.dismiss();
}

pub async fn close_modal(state: &AppState) {
    state.console.lock().await.modals.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendClient;
    use crate::config::Config;
    use crate::console::{CampaignDraft, ContactDraft};
    use crate::models::{Campaign, ContactStatus};
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(server: &MockServer) -> AppState {
        let config = Config {
            backend_url: server.uri(),
            ..Config::default()
        };
        AppState::new(BackendClient::new(&config).unwrap(), Duration::from_secs(5))
    }

    async fn alert_text(state: &AppState, tab: Tab) -> Option<String> {
        let console = state.console.lock().await;
        console.alert(tab, Instant::now()).map(|a| a.message.clone())
    }

    fn campaign_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Q1",
            "subject": "Oi {nome}",
            "body_template": "Olá",
            "created_at": "2025-01-01 10:00:00"
        })
    }

    fn stored_campaign(id: i64) -> Campaign {
        serde_json::from_value(campaign_json(id)).unwrap()
    }

    async fn mount_empty_lists(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "campaigns": []})),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contacts/batches"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "batches": []})),
            )
            .mount(server)
            .await;
    }

    fn contact_json(id: i64, email: &str) -> serde_json::Value {
        json!({"id": id, "email": email, "status": "active", "batch_id": "b1"})
    }

    #[tokio::test]
    async fn unknown_tab_loads_nothing() {
        let server = MockServer::start().await;
        let state = state_for(&server);

        assert!(!activate_tab(&state, "settings").await);
        assert_eq!(state.console.lock().await.active, Tab::Upload);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stats_tab_populates_counters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats/daily"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "stats": {"emails_sent_today": 5, "daily_limit": 1000, "total_contacts": 200, "total_campaigns": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for(&server);

        assert!(activate_tab(&state, "stats").await);
        let console = state.console.lock().await;
        assert_eq!(console.active, Tab::Stats);
        let stats = console.stats.clone().unwrap();
        assert_eq!(stats.emails_sent_today, 5);
        assert_eq!(stats.daily_limit, 1000);
        assert_eq!(stats.total_contacts, 200);
        assert_eq!(stats.total_campaigns, 3);
    }

    #[tokio::test]
    async fn empty_required_field_issues_no_request() {
        let server = MockServer::start().await;
        let state = state_for(&server);

        submit_campaign(
            &state,
            CampaignForm {
                name: "Q1 Promo".into(),
                subject: String::new(),
                body: "Hello".into(),
            },
        )
        .await;
        submit_send(&state, SendForm::default()).await;
        submit_upload(&state, UploadForm::default()).await;
        add_contact(&state, "b1", ContactForm::default()).await;

        assert!(server.received_requests().await.unwrap().is_empty());
        assert_eq!(
            alert_text(&state, Tab::Campaigns).await.as_deref(),
            Some("Todos os campos são obrigatórios.")
        );
        assert_eq!(
            state.console.lock().await.campaign_draft.name,
            "Q1 Promo"
        );
    }

    #[tokio::test]
    async fn create_campaign_reports_id_and_clears_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/campaigns"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "campaign_id": 42})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "campaigns": []})),
            )
            .mount(&server)
            .await;
        let state = state_for(&server);

        submit_campaign(
            &state,
            CampaignForm {
                name: "Q1 Promo".into(),
                subject: "Hi {nome}".into(),
                body: "Hello".into(),
            },
        )
        .await;

        assert_eq!(
            alert_text(&state, Tab::Campaigns).await.as_deref(),
            Some("Campanha criada com sucesso! ID: 42")
        );
        let console = state.console.lock().await;
        assert_eq!(console.campaign_draft, Default::default());
        assert_eq!(console.campaigns, Listing::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn failed_list_fetch_becomes_single_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts/batches"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "database is locked"})),
            )
            .mount(&server)
            .await;
        let state = state_for(&server);

        load_batches(&state).await;
        let console = state.console.lock().await;
        assert_eq!(
            console.batches,
            Listing::Failed("Erro ao carregar lotes: database is locked".into())
        );
        assert!(!console.is_loading(Tab::Batches));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/campaigns/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "campaigns": []})),
            )
            .mount(&server)
            .await;
        let state = state_for(&server);

        request(&state, PendingAction::DeleteCampaign(7)).await;
        cancel(&state).await;
        assert!(server.received_requests().await.unwrap().is_empty());

        request(&state, PendingAction::DeleteCampaign(7)).await;
        confirm(&state).await;
        assert_eq!(
            alert_text(&state, Tab::Campaigns).await.as_deref(),
            Some("Campanha excluída com sucesso!")
        );
        assert!(!state.console.lock().await.modals.is_open());
    }

    #[tokio::test]
    async fn status_change_closes_modal_and_reloads_batches() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/contacts/3/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Status do contato 3 atualizado para inactive",
                "batch_id": "b1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contacts/batches"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "batches": []})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for(&server);
        state.console.lock().await.modals.open(Modal::BatchContacts {
            batch_id: "b1".into(),
            contacts: Vec::new(),
        });

        request_status_change(
            &state,
            3,
            StatusForm {
                status: "inactive".into(),
            },
        )
        .await;
        assert!(matches!(
            state.console.lock().await.modals.top(),
            Some(Modal::Confirm(PendingAction::SetContactStatus {
                contact_id: 3,
                status: ContactStatus::Inactive
            }))
        ));

        confirm(&state).await;
        let console = state.console.lock().await;
        assert!(!console.modals.is_open());
        assert_eq!(console.batches, Listing::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn added_contact_shows_once_after_reload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contacts/manual"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "contact_id": 2})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contacts/batches/b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "batch_id": "b1",
                "contacts": [contact_json(1, "ana@exemplo.com"), contact_json(2, "bia@exemplo.com")]
            })))
            .mount(&server)
            .await;
        let state = state_for(&server);

        view_contacts(&state, "b1").await;
        show_add_contact(&state, "b1").await;
        add_contact(
            &state,
            "b1",
            ContactForm {
                email: "bia@exemplo.com".into(),
                ..ContactForm::default()
            },
        )
        .await;

        let console = state.console.lock().await;
        assert_eq!(console.modals.depth(), 1);
        let Some(Modal::BatchContacts { contacts, .. }) = console.modals.top() else {
            panic!("contacts modal not open");
        };
        let matching = contacts
            .iter()
            .filter(|c| c.email == "bia@exemplo.com")
            .count();
        assert_eq!(matching, 1);
    }

    #[tokio::test]
    async fn send_from_view_preselects_campaign() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "campaigns": [{"id": 9, "name": "Q1", "subject": "s", "body_template": "b", "created_at": "2025-01-01"}]
            })))
            .mount(&server)
            .await;
        let state = state_for(&server);

        send_from_view(&state, 9).await;
        let console = state.console.lock().await;
        assert_eq!(console.active, Tab::Send);
        assert_eq!(console.send_draft.campaign_id, Some(9));
        assert_eq!(console.send_options.items().len(), 1);
    }

    #[tokio::test]
    async fn view_campaign_includes_stats_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/campaigns/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "campaign": campaign_json(5)
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/campaigns/5/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "stats": {"total_sent": 12, "total_opened": 4}
            })))
            .mount(&server)
            .await;
        let state = state_for(&server);

        view_campaign(&state, 5).await;
        let console = state.console.lock().await;
        let Some(Modal::CampaignView { campaign, stats }) = console.modals.top() else {
            panic!("campaign view not open");
        };
        assert_eq!(campaign.id, 5);
        let stats = stats.as_ref().unwrap();
        assert_eq!(stats.emails_sent, 12);
        assert_eq!(stats.opened, 4);
    }

    #[tokio::test]
    async fn view_campaign_opens_without_stats_when_they_fail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/campaigns/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "campaign": campaign_json(5)
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/campaigns/5/stats"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;
        let state = state_for(&server);

        view_campaign(&state, 5).await;
        let console = state.console.lock().await;
        assert!(matches!(
            console.modals.top(),
            Some(Modal::CampaignView { stats: None, .. })
        ));
        assert!(console.alert(Tab::Campaigns, Instant::now()).is_none());
    }

    #[tokio::test]
    async fn edit_campaign_opens_form_with_stored_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/campaigns/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "campaign": campaign_json(5)
            })))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for(&server);

        edit_campaign(&state, 5).await;
        let console = state.console.lock().await;
        let Some(Modal::CampaignEdit { campaign, draft }) = console.modals.top() else {
            panic!("edit form not open");
        };
        assert_eq!(campaign.id, 5);
        assert_eq!(draft.subject, "Oi {nome}");
        assert_eq!(draft.body, "Olá");
    }

    #[tokio::test]
    async fn save_campaign_closes_form_and_reloads() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/campaigns/5"))
            .and(body_json(json!({"name": "Q2", "subject": "Oi", "body": "Novo corpo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "campaigns": [campaign_json(5)]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for(&server);
        state.console.lock().await.modals.open(Modal::edit(stored_campaign(5)));

        save_campaign(
            &state,
            5,
            CampaignForm {
                name: "Q2".into(),
                subject: "Oi".into(),
                body: "Novo corpo".into(),
            },
        )
        .await;

        assert_eq!(
            alert_text(&state, Tab::Campaigns).await.as_deref(),
            Some("Campanha atualizada com sucesso!")
        );
        let console = state.console.lock().await;
        assert!(!console.modals.is_open());
        assert_eq!(console.campaigns.items().len(), 1);
    }

    #[tokio::test]
    async fn invalid_edit_keeps_operator_input_without_request() {
        let server = MockServer::start().await;
        let state = state_for(&server);
        state.console.lock().await.modals.open(Modal::edit(stored_campaign(5)));

        save_campaign(
            &state,
            5,
            CampaignForm {
                name: "Renomeada".into(),
                subject: String::new(),
                body: "Corpo editado".into(),
            },
        )
        .await;

        assert!(server.received_requests().await.unwrap().is_empty());
        assert_eq!(
            alert_text(&state, Tab::Campaigns).await.as_deref(),
            Some("Todos os campos são obrigatórios.")
        );
        let console = state.console.lock().await;
        let Some(Modal::CampaignEdit { draft, .. }) = console.modals.top() else {
            panic!("edit form closed");
        };
        assert_eq!(
            draft,
            &CampaignDraft {
                name: "Renomeada".into(),
                subject: String::new(),
                body: "Corpo editado".into(),
            }
        );
    }

    #[tokio::test]
    async fn rejected_edit_keeps_operator_input() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/campaigns/5"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Nome já existe"})),
            )
            .mount(&server)
            .await;
        let state = state_for(&server);
        state.console.lock().await.modals.open(Modal::edit(stored_campaign(5)));

        save_campaign(
            &state,
            5,
            CampaignForm {
                name: "Duplicada".into(),
                subject: "Oi".into(),
                body: "Corpo".into(),
            },
        )
        .await;

        assert_eq!(
            alert_text(&state, Tab::Campaigns).await.as_deref(),
            Some("Erro ao atualizar campanha: Nome já existe")
        );
        let console = state.console.lock().await;
        let Some(Modal::CampaignEdit { draft, .. }) = console.modals.top() else {
            panic!("edit form closed");
        };
        assert_eq!(draft.name, "Duplicada");
    }

    #[tokio::test]
    async fn rejected_contact_keeps_typed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contacts/manual"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "Email já cadastrado"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        let state = state_for(&server);
        state.console.lock().await.modals.open(Modal::BatchContacts {
            batch_id: "b1".into(),
            contacts: Vec::new(),
        });
        show_add_contact(&state, "b1").await;

        add_contact(
            &state,
            "b1",
            ContactForm {
                email: "ana@exemplo.com".into(),
                company: "ACME".into(),
                ..ContactForm::default()
            },
        )
        .await;

        let console = state.console.lock().await;
        assert_eq!(console.modals.depth(), 2);
        let Some(Modal::AddContact { draft, .. }) = console.modals.top() else {
            panic!("add contact form closed");
        };
        assert_eq!(
            draft,
            &ContactDraft {
                email: "ana@exemplo.com".into(),
                company: "ACME".into(),
                ..ContactDraft::default()
            }
        );
        assert_eq!(
            console
                .alert(Tab::Batches, Instant::now())
                .map(|a| a.message.as_str()),
            Some("Erro ao adicionar contato: Email já cadastrado")
        );
    }

    #[tokio::test]
    async fn confirmed_batch_toggles_hit_backend_and_reload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contacts/batches/lote%201/activate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Lote lote 1 ativado"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/contacts/batches/lote%201/deactivate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        mount_empty_lists(&server).await;
        let state = state_for(&server);

        request(&state, PendingAction::ActivateBatch("lote 1".into())).await;
        confirm(&state).await;
        assert_eq!(
            alert_text(&state, Tab::Batches).await.as_deref(),
            Some("Lote lote 1 ativado")
        );

        request(&state, PendingAction::DeactivateBatch("lote 1".into())).await;
        confirm(&state).await;
        assert_eq!(
            alert_text(&state, Tab::Batches).await.as_deref(),
            Some("Lote lote 1 desativado com sucesso")
        );

        let reloads = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|req| req.method.as_str() == "GET" && req.url.path() == "/contacts/batches")
            .count();
        assert_eq!(reloads, 2);
        assert_eq!(state.console.lock().await.batches, Listing::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn health_is_degraded_when_backend_reports_unhealthy() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"status": "unhealthy", "error": "database is locked"})),
            )
            .mount(&server)
            .await;
        let state = state_for(&server);

        let report = health(&state).await;
        assert_eq!(report.status, "degraded");
        assert_eq!(report.backend_error.as_deref(), Some("database is locked"));
        assert_eq!(report.backend.unwrap().status, "unhealthy");
    }

    #[tokio::test]
    async fn health_is_ok_for_healthy_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "can_send_emails": true,
                "daily_sent_count": 3,
                "daily_limit": 1000
            })))
            .mount(&server)
            .await;
        let state = state_for(&server);

        let report = health(&state).await;
        assert_eq!(report.status, "ok");
        assert!(report.backend_error.is_none());
    }

    #[tokio::test]
    async fn initial_load_is_bounded_by_backend_timeout() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });
        let config = Config {
            backend_url: format!("http://{addr}"),
            backend_timeout: Some(Duration::from_millis(200)),
            ..Config::default()
        };
        let state = AppState::new(BackendClient::new(&config).unwrap(), Duration::from_secs(5));

        let finished = tokio::time::timeout(Duration::from_secs(3), load_initial(&state)).await;
        assert!(finished.is_ok());
        let console = state.console.lock().await;
        assert!(matches!(console.batches, Listing::Failed(ref m) if m.starts_with("Erro de conexão")));
    }
}
