use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub subject: String,
    #[serde(alias = "body")]
    pub body_template: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Active,
    Inactive,
}

impl BatchStatus {
    pub fn is_active(self) -> bool {
        self == BatchStatus::Active
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Active => f.write_str("active"),
            BatchStatus::Inactive => f.write_str("inactive"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    pub batch_id: String,
    pub contact_count: u64,
    pub first_import: String,
    pub last_import: String,
    pub batch_status: BatchStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Active,
    Inactive,
    Bounced,
}

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::Active => "active",
            ContactStatus::Inactive => "inactive",
            ContactStatus::Bounced => "bounced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "active" => Some(ContactStatus::Active),
            "inactive" => Some(ContactStatus::Inactive),
            "bounced" => Some(ContactStatus::Bounced),
            _ => None,
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub status: ContactStatus,
    #[serde(default)]
    pub batch_id: Option<String>,
}

fn default_daily_limit() -> u64 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStats {
    #[serde(default)]
    pub emails_sent_today: u64,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,
    #[serde(default)]
    pub total_contacts: u64,
    #[serde(default)]
    pub total_campaigns: u64,
}

/// Delivery metrics for one campaign. The backend reports `total_*` keys;
/// older deployments used the short names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CampaignStats {
    #[serde(default, alias = "total_sent")]
    pub emails_sent: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default, alias = "total_bounced")]
    pub bounced: u64,
    #[serde(default, alias = "total_opened")]
    pub opened: u64,
    #[serde(default, alias = "total_clicked")]
    pub clicked: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewCampaign {
    pub name: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendOptions {
    pub contact_limit: Option<u64>,
    pub test_mode: bool,
    pub async_mode: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ManualContact {
    pub email: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub source: Option<String>,
    pub batch_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ContactStatus,
}

/// A CSV file received from the operator, forwarded as-is to the backend.
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub source: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ImportReceipt {
    #[serde(default)]
    pub contacts_imported: u64,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CampaignCreated {
    pub campaign_id: i64,
}

/// Generic acknowledgement for mutations that only report a message.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub can_send_emails: Option<bool>,
    #[serde(default)]
    pub daily_sent_count: Option<u64>,
    #[serde(default)]
    pub daily_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: Option<BackendHealth>,
    pub backend_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn campaign_accepts_body_alias() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": 7,
            "name": "Q1",
            "subject": "Hi",
            "body": "Hello",
            "created_at": "2025-01-02 10:00:00"
        }))
        .unwrap();
        assert_eq!(campaign.body_template, "Hello");
    }

    #[test]
    fn contact_rejects_unknown_status() {
        let result: Result<Contact, _> = serde_json::from_value(json!({
            "id": 1,
            "email": "a@b.c",
            "status": "deleted"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn daily_stats_defaults_missing_limit() {
        let stats: DailyStats = serde_json::from_value(json!({
            "emails_sent_today": 2,
            "total_contacts": 9,
            "total_campaigns": 1
        }))
        .unwrap();
        assert_eq!(stats.daily_limit, 10_000);
        assert_eq!(stats.emails_sent_today, 2);
    }

    #[test]
    fn campaign_stats_reads_backend_totals() {
        let stats: CampaignStats = serde_json::from_value(json!({
            "total_sent": 10,
            "total_opened": 4,
            "total_clicked": 1,
            "total_bounced": 2,
            "open_rate": 40.0
        }))
        .unwrap();
        assert_eq!(stats.emails_sent, 10);
        assert_eq!(stats.opened, 4);
        assert_eq!(stats.bounced, 2);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn send_options_serialize_null_limit() {
        let body = serde_json::to_value(SendOptions {
            contact_limit: None,
            test_mode: true,
            async_mode: false,
        })
        .unwrap();
        assert_eq!(body, json!({"contact_limit": null, "test_mode": true, "async_mode": false}));
    }
}
