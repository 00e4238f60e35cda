use crate::config::Config;
use crate::errors::{ApiError, ConfigError};
use crate::models::{
    Ack, BackendHealth, Batch, Campaign, CampaignCreated, CampaignStats, Contact, ContactStatus,
    CsvUpload, DailyStats, ImportReceipt, ManualContact, NewCampaign, SendOptions, StatusUpdate,
};
use reqwest::{multipart, Client as HttpClient, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

type Envelope = Map<String, Value>;

#[derive(Clone)]
pub struct BackendClient {
    http: HttpClient,
    base: Url,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let base = Url::parse(&config.backend_url).map_err(|_| ConfigError::Invalid {
            name: "BACKEND_URL",
            value: config.backend_url.clone(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                name: "BACKEND_URL",
                value: config.backend_url.clone(),
            });
        }

        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.backend_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(%method, %url, "backend request");
        self.http.request(method, url)
    }

    pub async fn import_contacts(&self, upload: CsvUpload) -> Result<ImportReceipt, ApiError> {
        let file = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("text/csv")?;
        let form = multipart::Form::new()
            .part("file", file)
            .text("source", upload.source);

        let envelope = send(self.request(Method::POST, &["contacts", "import"]).multipart(form)).await?;
        decode(envelope)
    }

    pub async fn list_batches(&self) -> Result<Vec<Batch>, ApiError> {
        let envelope = send(self.request(Method::GET, &["contacts", "batches"])).await?;
        field(&envelope, "batches")
    }

    pub async fn batch_contacts(&self, batch_id: &str) -> Result<Vec<Contact>, ApiError> {
        let envelope = send(self.request(Method::GET, &["contacts", "batches", batch_id])).await?;
        field(&envelope, "contacts")
    }

    pub async fn activate_batch(&self, batch_id: &str) -> Result<Ack, ApiError> {
        let envelope = send(self.request(
            Method::POST,
            &["contacts", "batches", batch_id, "activate"],
        ))
        .await?;
        decode(envelope)
    }

    pub async fn deactivate_batch(&self, batch_id: &str) -> Result<Ack, ApiError> {
        let envelope = send(self.request(
            Method::POST,
            &["contacts", "batches", batch_id, "deactivate"],
        ))
        .await?;
        decode(envelope)
    }

    pub async fn add_contact(&self, contact: &ManualContact) -> Result<Ack, ApiError> {
        let envelope = send(self.request(Method::POST, &["contacts", "manual"]).json(contact)).await?;
        decode(envelope)
    }

    pub async fn update_contact_status(
        &self,
        contact_id: i64,
        status: ContactStatus,
    ) -> Result<Ack, ApiError> {
        let id = contact_id.to_string();
        let envelope = send(
            self.request(Method::PUT, &["contacts", &id, "status"])
                .json(&StatusUpdate { status }),
        )
        .await?;
        decode(envelope)
    }

    pub async fn delete_contact(&self, contact_id: i64) -> Result<Ack, ApiError> {
        let id = contact_id.to_string();
        let envelope = send(self.request(Method::DELETE, &["contacts", &id])).await?;
        decode(envelope)
    }

    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, ApiError> {
        let envelope = send(self.request(Method::GET, &["campaigns"])).await?;
        field(&envelope, "campaigns")
    }

    pub async fn create_campaign(&self, campaign: &NewCampaign) -> Result<CampaignCreated, ApiError> {
        let envelope = send(self.request(Method::POST, &["campaigns"]).json(campaign)).await?;
        decode(envelope)
    }

    pub async fn campaign(&self, campaign_id: i64) -> Result<Campaign, ApiError> {
        let id = campaign_id.to_string();
        let envelope = send(self.request(Method::GET, &["campaigns", &id])).await?;
        field(&envelope, "campaign")
    }

    pub async fn update_campaign(
        &self,
        campaign_id: i64,
        campaign: &NewCampaign,
    ) -> Result<Ack, ApiError> {
        let id = campaign_id.to_string();
        let envelope = send(self.request(Method::PUT, &["campaigns", &id]).json(campaign)).await?;
        decode(envelope)
    }

    pub async fn delete_campaign(&self, campaign_id: i64) -> Result<Ack, ApiError> {
        let id = campaign_id.to_string();
        let envelope = send(self.request(Method::DELETE, &["campaigns", &id])).await?;
        decode(envelope)
    }

    pub async fn send_campaign(
        &self,
        campaign_id: i64,
        options: &SendOptions,
    ) -> Result<Ack, ApiError> {
        let id = campaign_id.to_string();
        let envelope = send(
            self.request(Method::POST, &["campaigns", &id, "send"])
                .json(options),
        )
        .await?;
        decode(envelope)
    }

    pub async fn campaign_stats(&self, campaign_id: i64) -> Result<CampaignStats, ApiError> {
        let id = campaign_id.to_string();
        let envelope = send(self.request(Method::GET, &["campaigns", &id, "stats"])).await?;
        field(&envelope, "stats")
    }

    pub async fn daily_stats(&self) -> Result<DailyStats, ApiError> {
        let envelope = send(self.request(Method::GET, &["stats", "daily"])).await?;
        field(&envelope, "stats")
    }

    /// `/health` has no `success` envelope. A non-2xx answer is never healthy,
    /// whatever its body claims.
    pub async fn health(&self) -> Result<BackendHealth, ApiError> {
        let response = self.request(Method::GET, &["health"]).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let mut health: BackendHealth = serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::Malformed(format!("HTTP {status}: {err}")))?;

        if !status.is_success() {
            if health.is_healthy() {
                health.status = "unhealthy".into();
            }
            health.error.get_or_insert_with(|| format!("HTTP {status}"));
        }
        Ok(health)
    }
}

async fn send(request: RequestBuilder) -> Result<Envelope, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;
    debug!(%status, len = bytes.len(), "backend response");
    parse_envelope(&bytes)
}

/// Checks the `{success, error}` envelope. The backend's 4xx/5xx bodies carry
/// only `error`, so a missing `success` with an `error` is a server failure.
pub fn parse_envelope(bytes: &[u8]) -> Result<Envelope, ApiError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| ApiError::Malformed(format!("corpo não é JSON: {err}")))?;
    let Value::Object(envelope) = value else {
        return Err(ApiError::Malformed("envelope não é um objeto JSON".into()));
    };

    let success = envelope.get("success").cloned();
    let error = envelope
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);

    match (success, error) {
        (Some(Value::Bool(true)), _) => Ok(envelope),
        (Some(Value::Bool(false)), error) => Err(ApiError::Server(
            error.unwrap_or_else(|| "erro desconhecido".into()),
        )),
        (None, Some(message)) => Err(ApiError::Server(message)),
        (None, None) => Err(ApiError::Malformed("campo `success` ausente".into())),
        (Some(other), _) => Err(ApiError::Malformed(format!(
            "campo `success` inválido: {other}"
        ))),
    }
}

fn field<T: DeserializeOwned>(envelope: &Envelope, key: &str) -> Result<T, ApiError> {
    let value = envelope
        .get(key)
        .cloned()
        .ok_or_else(|| ApiError::Malformed(format!("campo `{key}` ausente")))?;
    serde_json::from_value(value).map_err(|err| ApiError::Malformed(format!("`{key}`: {err}")))
}

fn decode<T: DeserializeOwned>(envelope: Envelope) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(envelope))
        .map_err(|err| ApiError::Malformed(err.to_string()))
}
