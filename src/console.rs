use crate::models::{Batch, Campaign, CampaignStats, Contact, ContactStatus, DailyStats};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tab {
    Upload,
    Campaigns,
    Send,
    Batches,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Upload, Tab::Campaigns, Tab::Send, Tab::Batches, Tab::Stats];

    pub fn name(self) -> &'static str {
        match self {
            Tab::Upload => "upload",
            Tab::Campaigns => "campaigns",
            Tab::Send => "send",
            Tab::Batches => "batches",
            Tab::Stats => "stats",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Upload => "📤 Importar Contatos",
            Tab::Campaigns => "📝 Campanhas",
            Tab::Send => "🚀 Enviar",
            Tab::Batches => "📦 Lotes",
            Tab::Stats => "📊 Estatísticas",
        }
    }

    pub fn parse(name: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.name() == name.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn css(self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub shown_at: Instant,
}

/// A collection as last fetched. Every reload replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Idle,
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Listing::Idle
    }
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Loaded(items) => items,
            _ => &[],
        }
    }
}

/// A destructive action waiting for the operator's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    ActivateBatch(String),
    DeactivateBatch(String),
    SetContactStatus { contact_id: i64, status: ContactStatus },
    DeleteContact(i64),
    DeleteCampaign(i64),
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::ActivateBatch(_) => "Tem certeza que deseja ativar este lote?".into(),
            PendingAction::DeactivateBatch(_) => {
                "Tem certeza que deseja desativar este lote?".into()
            }
            PendingAction::SetContactStatus { contact_id, status } => format!(
                "Tem certeza que deseja alterar o status do contato {contact_id} para \"{status}\"?"
            ),
            PendingAction::DeleteContact(id) => {
                format!("Tem certeza que deseja excluir o contato {id}?")
            }
            PendingAction::DeleteCampaign(_) => {
                "Tem certeza que deseja excluir esta campanha? Esta ação não pode ser desfeita."
                    .into()
            }
        }
    }

    /// Tab whose alert container reports the outcome.
    pub fn tab(&self) -> Tab {
        match self {
            PendingAction::DeleteCampaign(_) => Tab::Campaigns,
            _ => Tab::Batches,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    CampaignView {
        campaign: Campaign,
        stats: Option<CampaignStats>,
    },
    CampaignEdit {
        campaign: Campaign,
        draft: CampaignDraft,
    },
    BatchContacts {
        batch_id: String,
        contacts: Vec<Contact>,
    },
    AddContact {
        batch_id: String,
        draft: ContactDraft,
    },
    Confirm(PendingAction),
}

impl Modal {
    pub fn edit(campaign: Campaign) -> Self {
        let draft = CampaignDraft {
            name: campaign.name.clone(),
            subject: campaign.subject.clone(),
            body: campaign.body_template.clone(),
        };
        Modal::CampaignEdit { campaign, draft }
    }

    pub fn add_contact(batch_id: impl Into<String>) -> Self {
        Modal::AddContact {
            batch_id: batch_id.into(),
            draft: ContactDraft::default(),
        }
    }
}

/// Owned replacement for a document-global modal slot. Only the top layer
/// is visible.
#[derive(Debug, Clone, Default)]
pub struct ModalStack {
    layers: Vec<Modal>,
}

impl ModalStack {
    /// Replaces whatever is open.
    pub fn open(&mut self, modal: Modal) {
        self.layers.clear();
        self.layers.push(modal);
    }

    /// Stacks `modal` over the current one; dismissing it reveals the layer below.
    pub fn push(&mut self, modal: Modal) {
        self.layers.push(modal);
    }

    pub fn dismiss(&mut self) -> Option<Modal> {
        self.layers.pop()
    }

    pub fn close(&mut self) {
        self.layers.clear();
    }

    pub fn top(&self) -> Option<&Modal> {
        self.layers.last()
    }

    /// Keeps the operator's edits in the open edit form of `campaign_id`.
    pub fn keep_edit_draft(&mut self, campaign_id: i64, edited: CampaignDraft) {
        if let Some(Modal::CampaignEdit { campaign, draft }) = self.layers.last_mut() {
            if campaign.id == campaign_id {
                *draft = edited;
            }
        }
    }

    pub fn keep_contact_draft(&mut self, for_batch: &str, typed: ContactDraft) {
        if let Some(Modal::AddContact { batch_id, draft }) = self.layers.last_mut() {
            if batch_id.as_str() == for_batch {
                *draft = typed;
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn is_open(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Pops the top layer if it is a confirmation prompt.
    pub fn take_confirmation(&mut self) -> Option<PendingAction> {
        match self.layers.last() {
            Some(Modal::Confirm(_)) => match self.layers.pop() {
                Some(Modal::Confirm(action)) => Some(action),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignDraft {
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub email: String,
    pub name: String,
    pub company: String,
    pub position: String,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendDraft {
    pub campaign_id: Option<i64>,
    pub contact_limit: String,
    pub test_mode: bool,
    pub async_mode: bool,
}

#[derive(Debug)]
pub struct Console {
    pub active: Tab,
    pub modals: ModalStack,
    pub campaigns: Listing<Campaign>,
    pub send_options: Listing<Campaign>,
    pub batches: Listing<Batch>,
    pub stats: Option<DailyStats>,
    pub campaign_draft: CampaignDraft,
    pub send_draft: SendDraft,
    alerts: BTreeMap<Tab, Alert>,
    loading: BTreeMap<Tab, usize>,
    alert_ttl: Duration,
}

impl Console {
    pub fn new(alert_ttl: Duration) -> Self {
        Self {
            active: Tab::Upload,
            modals: ModalStack::default(),
            campaigns: Listing::Idle,
            send_options: Listing::Idle,
            batches: Listing::Idle,
            stats: None,
            campaign_draft: CampaignDraft::default(),
            send_draft: SendDraft::default(),
            alerts: BTreeMap::new(),
            loading: BTreeMap::new(),
            alert_ttl,
        }
    }

    pub fn activate(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    /// One alert per container; a newer alert overwrites the previous one.
    pub fn show_alert(&mut self, tab: Tab, kind: AlertKind, message: impl Into<String>) {
        self.show_alert_at(tab, kind, message, Instant::now());
    }

    pub fn show_alert_at(
        &mut self,
        tab: Tab,
        kind: AlertKind,
        message: impl Into<String>,
        now: Instant,
    ) {
        self.alerts.insert(
            tab,
            Alert {
                kind,
                message: message.into(),
                shown_at: now,
            },
        );
    }

    pub fn alert(&self, tab: Tab, now: Instant) -> Option<&Alert> {
        self.alerts
            .get(&tab)
            .filter(|alert| now.saturating_duration_since(alert.shown_at) < self.alert_ttl)
    }

    pub fn prune_alerts(&mut self, now: Instant) {
        let ttl = self.alert_ttl;
        self.alerts
            .retain(|_, alert| now.saturating_duration_since(alert.shown_at) < ttl);
    }

    /// Counts calls in flight per tab; the indicator stays up until the last
    /// one finishes.
    pub fn set_loading(&mut self, tab: Tab, loading: bool) {
        if loading {
            *self.loading.entry(tab).or_default() += 1;
        } else if let Some(count) = self.loading.get_mut(&tab) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.loading.remove(&tab);
            }
        }
    }

    pub fn is_loading(&self, tab: Tab) -> bool {
        self.loading.contains_key(&tab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(id: i64) -> Campaign {
        Campaign {
            id,
            name: format!("Campanha {id}"),
            subject: "Oi {nome}".into(),
            body_template: "Olá".into(),
            created_at: "2025-03-01 09:00:00".into(),
        }
    }

    #[test]
    fn parse_known_and_unknown_tabs() {
        assert_eq!(Tab::parse("batches"), Some(Tab::Batches));
        assert_eq!(Tab::parse(" stats "), Some(Tab::Stats));
        assert_eq!(Tab::parse("settings"), None);
    }

    #[test]
    fn activating_a_tab_leaves_exactly_one_active() {
        let mut console = Console::new(Duration::from_secs(5));
        for tab in Tab::ALL {
            console.activate(tab);
            let active = Tab::ALL.iter().filter(|t| console.is_active(**t)).count();
            assert_eq!(active, 1);
        }
    }

    #[test]
    fn open_replaces_existing_modal() {
        let mut modals = ModalStack::default();
        modals.open(Modal::edit(campaign(1)));
        modals.open(Modal::CampaignView {
            campaign: campaign(2),
            stats: None,
        });
        assert_eq!(modals.depth(), 1);
        assert!(matches!(modals.top(), Some(Modal::CampaignView { .. })));
    }

    #[test]
    fn dismiss_reveals_layer_below() {
        let mut modals = ModalStack::default();
        modals.open(Modal::BatchContacts {
            batch_id: "b1".into(),
            contacts: Vec::new(),
        });
        modals.push(Modal::add_contact("b1"));
        modals.dismiss();
        assert!(matches!(modals.top(), Some(Modal::BatchContacts { .. })));
        modals.dismiss();
        assert!(!modals.is_open());
        assert!(modals.dismiss().is_none());
    }

    #[test]
    fn take_confirmation_only_pops_prompts() {
        let mut modals = ModalStack::default();
        modals.open(Modal::add_contact("b1"));
        assert!(modals.take_confirmation().is_none());
        assert_eq!(modals.depth(), 1);

        modals.push(Modal::Confirm(PendingAction::DeleteContact(3)));
        assert_eq!(
            modals.take_confirmation(),
            Some(PendingAction::DeleteContact(3))
        );
        assert_eq!(modals.depth(), 1);
    }

    #[test]
    fn alerts_expire_after_ttl() {
        let mut console = Console::new(Duration::from_secs(5));
        let start = Instant::now();
        console.show_alert_at(Tab::Upload, AlertKind::Success, "ok", start);
        assert!(console.alert(Tab::Upload, start + Duration::from_secs(4)).is_some());
        assert!(console.alert(Tab::Upload, start + Duration::from_secs(5)).is_none());

        console.prune_alerts(start + Duration::from_secs(6));
        assert!(console.alert(Tab::Upload, start).is_none());
    }

    #[test]
    fn later_alert_overwrites_earlier() {
        let mut console = Console::new(Duration::from_secs(5));
        let now = Instant::now();
        console.show_alert_at(Tab::Batches, AlertKind::Success, "primeiro", now);
        console.show_alert_at(Tab::Batches, AlertKind::Error, "segundo", now);
        let alert = console.alert(Tab::Batches, now).unwrap();
        assert_eq!(alert.message, "segundo");
        assert_eq!(alert.kind, AlertKind::Error);
    }

    #[test]
    fn contact_status_prompt_names_contact_and_status() {
        let prompt = PendingAction::SetContactStatus {
            contact_id: 12,
            status: ContactStatus::Inactive,
        }
        .prompt();
        assert_eq!(
            prompt,
            "Tem certeza que deseja alterar o status do contato 12 para \"inactive\"?"
        );
    }

    #[test]
    fn loading_stays_up_until_last_call_finishes() {
        let mut console = Console::new(Duration::from_secs(5));
        console.set_loading(Tab::Batches, true);
        console.set_loading(Tab::Batches, true);
        console.set_loading(Tab::Batches, false);
        assert!(console.is_loading(Tab::Batches));
        console.set_loading(Tab::Batches, false);
        assert!(!console.is_loading(Tab::Batches));
        console.set_loading(Tab::Batches, false);
        assert!(!console.is_loading(Tab::Batches));
    }

    #[test]
    fn edit_modal_starts_from_campaign_fields() {
        let Modal::CampaignEdit { draft, .. } = Modal::edit(campaign(4)) else {
            panic!("expected edit modal");
        };
        assert_eq!(draft.name, "Campanha 4");
        assert_eq!(draft.body, "Olá");
    }
}
