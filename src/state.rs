use crate::api::BackendClient;
use crate::console::Console;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub client: BackendClient,
    pub console: Arc<Mutex<Console>>,
}

impl AppState {
    pub fn new(client: BackendClient, alert_ttl: Duration) -> Self {
        Self {
            client,
            console: Arc::new(Mutex::new(Console::new(alert_ttl))),
        }
    }
}
