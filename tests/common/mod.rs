#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use blogverse_client::{
    AuthenticatedHttpClient, BlogApi, ClientConfig, MemoryTokenStore, Navigator, TokenStore,
};
use httpmock::MockServer;

/// Navigator that records every redirect.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_owned());
    }
}

pub struct Harness {
    pub client: AuthenticatedHttpClient<MemoryTokenStore, RecordingNavigator>,
    pub store: Arc<MemoryTokenStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn api(&self) -> BlogApi<MemoryTokenStore, RecordingNavigator> {
        BlogApi::new(self.client.clone())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.base_url().parse().unwrap())
}

pub fn harness(server: &MockServer) -> Harness {
    harness_with(config_for(server))
}

pub fn harness_with(config: ClientConfig) -> Harness {
    let store = Arc::new(MemoryTokenStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client =
        AuthenticatedHttpClient::with_shared(config, store.clone(), navigator.clone()).unwrap();
    Harness {
        client,
        store,
        navigator,
    }
}

/// Seed the store with a signed-in session.
pub fn sign_in(h: &Harness, access: &str, refresh: Option<&str>) {
    h.store.set("access", access).unwrap();
    if let Some(refresh) = refresh {
        h.store.set("refresh", refresh).unwrap();
    }
    h.store.set("userLabel", "A").unwrap();
}

pub fn blog_json(id: u64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "content": format!("Content of {title}"),
        "author": "a@b.com",
        "created_at": "2025-01-15T09:30:00Z",
    })
}
