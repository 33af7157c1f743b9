#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Router,
    http::{HeaderMap, header},
};
use client::{
    ApiClient, Finance, MemoryStorage, Navigator, SessionStorage, SessionStore, storage::keys,
};

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port nobody listens on.
pub async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// Counts requests and remembers the `Authorization` header of each one.
#[derive(Clone, Default)]
pub struct Hits {
    count: Arc<AtomicUsize>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Hits {
    pub fn record(&self, headers: &HeaderMap) {
        self.count.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth.lock().unwrap().push(auth);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth.lock().unwrap().clone()
    }
}

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: Arc<SessionStore>,
    pub finance: Finance,
}

pub fn harness(base_url: &str) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let navigator = Arc::new(RecordingNavigator::default());

    let api = ApiClient::builder()
        .base_url(base_url)
        .storage(storage.clone())
        .build()
        .unwrap();
    let session = Arc::new(SessionStore::new(api, storage.clone(), navigator.clone()));
    let finance = Finance::new(session.clone());

    Harness {
        storage,
        navigator,
        session,
        finance,
    }
}

impl Harness {
    /// Writes a complete session as a previous run would have left it.
    pub fn seed_session(&self, token: &str, user_id: &str) {
        self.storage.set(keys::TOKEN, token).unwrap();
        self.storage.set(keys::USER_EMAIL, "a@b.com").unwrap();
        self.storage.set(keys::USER_NAME, "Ana").unwrap();
        self.storage.set(keys::USER_ID, user_id).unwrap();
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key)
    }
}
