use crate::console::{CampaignDraft, ContactDraft, SendDraft};
use crate::models::{ContactStatus, CsvUpload, ManualContact, NewCampaign, SendOptions};
use serde::Deserialize;

pub const FIELDS_REQUIRED: &str = "Todos os campos são obrigatórios.";
pub const FILE_REQUIRED: &str = "Por favor, selecione um arquivo CSV.";
pub const FILE_NOT_CSV: &str = "Arquivo deve ser CSV";
pub const CAMPAIGN_REQUIRED: &str = "Por favor, selecione uma campanha.";
pub const LIMIT_INVALID: &str = "Limite de contatos deve ser um número positivo.";
pub const EMAIL_REQUIRED: &str = "Email é obrigatório";
pub const STATUS_INVALID: &str = "Status inválido";

const DEFAULT_SOURCE: &str = "csv_import";

/// Multipart fields collected from the upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    pub source: String,
}

impl UploadForm {
    pub fn validate(self) -> Result<CsvUpload, &'static str> {
        let file_name = match self.file_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(FILE_REQUIRED),
        };
        if !file_name.to_ascii_lowercase().ends_with(".csv") {
            return Err(FILE_NOT_CSV);
        }

        let source = self.source.trim();
        Ok(CsvUpload {
            file_name,
            bytes: self.bytes,
            source: if source.is_empty() {
                DEFAULT_SOURCE.to_string()
            } else {
                source.to_string()
            },
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl CampaignForm {
    pub fn validate(&self) -> Result<NewCampaign, &'static str> {
        let name = self.name.trim();
        let subject = self.subject.trim();
        if name.is_empty() || subject.is_empty() || self.body.trim().is_empty() {
            return Err(FIELDS_REQUIRED);
        }
        Ok(NewCampaign {
            name: name.to_string(),
            subject: subject.to_string(),
            body: self.body.clone(),
        })
    }

    pub fn into_draft(self) -> CampaignDraft {
        CampaignDraft {
            name: self.name,
            subject: self.subject,
            body: self.body,
        }
    }
}

/// HTML checkboxes are only submitted when ticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default)]
    pub contact_limit: String,
    #[serde(default)]
    pub test_mode: Option<String>,
    #[serde(default)]
    pub async_mode: Option<String>,
}

impl SendForm {
    pub fn validate(&self) -> Result<(i64, SendOptions), &'static str> {
        let campaign_id = self
            .campaign_id
            .trim()
            .parse::<i64>()
            .map_err(|_| CAMPAIGN_REQUIRED)?;

        let limit = self.contact_limit.trim();
        let contact_limit = if limit.is_empty() {
            None
        } else {
            match limit.parse::<u64>() {
                Ok(value) if value > 0 => Some(value),
                _ => return Err(LIMIT_INVALID),
            }
        };

        Ok((
            campaign_id,
            SendOptions {
                contact_limit,
                test_mode: self.test_mode.is_some(),
                async_mode: self.async_mode.is_some(),
            },
        ))
    }

    pub fn into_draft(self) -> SendDraft {
        SendDraft {
            campaign_id: self.campaign_id.trim().parse().ok(),
            test_mode: self.test_mode.is_some(),
            async_mode: self.async_mode.is_some(),
            contact_limit: self.contact_limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub source: String,
}

impl ContactForm {
    pub fn validate(&self, batch_id: &str) -> Result<ManualContact, &'static str> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(EMAIL_REQUIRED);
        }
        Ok(ManualContact {
            email: email.to_string(),
            name: optional(&self.name),
            company: optional(&self.company),
            position: optional(&self.position),
            source: optional(&self.source),
            batch_id: batch_id.to_string(),
        })
    }

    pub fn into_draft(self) -> ContactDraft {
        ContactDraft {
            email: self.email,
            name: self.name,
            company: self.company,
            position: self.position,
            source: self.source,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

impl StatusForm {
    pub fn validate(&self) -> Result<ContactStatus, &'static str> {
        ContactStatus::parse(&self.status).ok_or(STATUS_INVALID)
    }
}
