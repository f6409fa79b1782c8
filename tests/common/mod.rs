// tests/common/mod.rs
// Shared doubles for integration tests. Not every test file uses every helper.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use publish_notifier::notify::{Announcement, Notifier};
use publish_notifier::state::{MemoryObjectStore, ObjectStore};
use publish_notifier::{PublishedItem, Source, StateStore};

/// Source whose published list can be changed between runs.
pub struct StaticSource {
    pub name: &'static str,
    pub items: Arc<Mutex<Vec<PublishedItem>>>,
}

impl StaticSource {
    pub fn new(name: &'static str, items: Vec<PublishedItem>) -> (Self, Arc<Mutex<Vec<PublishedItem>>>) {
        let shared = Arc::new(Mutex::new(items));
        (
            Self {
                name,
                items: shared.clone(),
            },
            shared,
        )
    }
}

#[async_trait]
impl Source for StaticSource {
    fn name(&self) -> &'static str {
        self.name
    }
    fn heading(&self) -> &'static str {
        "Newly Published Collections"
    }
    async fn fetch_published(&self) -> Result<Vec<PublishedItem>> {
        Ok(self.items.lock().unwrap().clone())
    }
}

pub struct FailingSource;

#[async_trait]
impl Source for FailingSource {
    fn name(&self) -> &'static str {
        "broken"
    }
    fn heading(&self) -> &'static str {
        "Broken"
    }
    async fn fetch_published(&self) -> Result<Vec<PublishedItem>> {
        Err(anyhow!("401 Unauthorized"))
    }
}

/// Records every announcement; can be switched to fail, either outright or
/// after a number of accepted posts.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Announcement>>,
    pub fail: Mutex<bool>,
    pub accept_limit: Mutex<Option<usize>>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn accept_only(&self, n: Option<usize>) {
        *self.accept_limit.lock().unwrap() = n;
    }

    pub fn sent_ids(&self) -> Vec<Vec<String>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.items.iter().map(|i| i.identifier.clone()).collect())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, announcement: &Announcement) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(anyhow!("webhook returned 500"));
        }
        let mut sent = self.sent.lock().unwrap();
        if matches!(*self.accept_limit.lock().unwrap(), Some(n) if sent.len() >= n) {
            return Err(anyhow!("webhook returned 413"));
        }
        sent.push(announcement.clone());
        Ok(())
    }
}

/// Object store that rejects writes.
pub struct ReadOnlyStore(pub MemoryObjectStore);

#[async_trait]
impl ObjectStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.0.get(key).await
    }
    async fn put(&self, _key: &str, _body: Vec<u8>) -> Result<()> {
        Err(anyhow!("AccessDenied"))
    }
}

pub fn item(id: &str, title: &str) -> PublishedItem {
    PublishedItem::new(id, title, format!("http://x/{}", id.trim_start_matches('/')))
}

pub fn memory_store() -> (StateStore, Arc<MemoryObjectStore>) {
    let mem = Arc::new(MemoryObjectStore::new());
    (StateStore::new(mem.clone()), mem)
}

pub fn stored_ids(mem: &MemoryObjectStore, key: &str) -> Vec<String> {
    match mem.object(key) {
        Some(bytes) => serde_json::from_slice(&bytes).unwrap(),
        None => vec![],
    }
}

/// Serve `app` on an ephemeral port. Keep the sender alive for the server's lifetime.
pub async fn serve(app: Router) -> (String, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{addr}"), tx)
}
