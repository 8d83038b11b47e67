//! Document backend seam
//!
//! Every record FLOW reads or writes lives in a hosted document database
//! reached through the [`DocumentBackend`] trait: one-shot queries, live
//! snapshot subscriptions, and writes, all scoped to a company. The hosted
//! client implements this trait outside this crate; [`MemoryBackend`] is the
//! in-process implementation used by tests and demo mode, and it reproduces
//! the hosted live-query contract: every subscriber receives the *full*
//! current state of its query after each mutation, never a delta.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::FlowError;
use crate::types::SessionContext;

/// Collection names owned by the hosted database schema.
pub const CALENDAR_EVENTS: &str = "calendarEvents";
pub const PROJECTS: &str = "projects";
pub const PEOPLE: &str = "people";
pub const SALES_TEMPLATES: &str = "salesTemplates";

/// A full-state record batch. Subscriptions always deliver the complete
/// current contents of their query, not an incremental delta.
pub type Snapshot = Vec<Value>;

/// A company-scoped query against one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocQuery {
    pub collection: String,
    pub company_id: String,
}

impl DocQuery {
    pub fn scoped(collection: &str, session: &SessionContext) -> Self {
        Self {
            collection: collection.to_string(),
            company_id: session.company_id.clone(),
        }
    }
}

/// Live registration against the backend. Unsubscribing on view teardown is
/// a hard requirement; dropping the handle unsubscribes as a backstop so a
/// torn-down view can never leak its registration.
pub struct SubscriptionHandle {
    id: u64,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(id: u64, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Explicitly remove this registration from the backend.
    pub fn unsubscribe(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .finish()
    }
}

/// The document database contract this crate consumes.
///
/// `fetch_once` and the write operations are request/response; `subscribe`
/// registers a sender that receives a full snapshot immediately and again
/// after every mutation touching the query.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn fetch_once(&self, query: &DocQuery) -> Result<Snapshot, FlowError>;

    fn subscribe(&self, query: &DocQuery, tx: mpsc::Sender<Snapshot>) -> SubscriptionHandle;

    /// Insert a document, returning its id. The backend stamps `id` and
    /// `companyId` onto the stored document.
    async fn insert(&self, query: &DocQuery, doc: Value) -> Result<String, FlowError>;

    /// Shallow-merge `patch` fields onto an existing document.
    async fn update(&self, query: &DocQuery, id: &str, patch: Value) -> Result<(), FlowError>;

    async fn delete(&self, query: &DocQuery, id: &str) -> Result<(), FlowError>;
}

struct Subscriber {
    id: u64,
    query: DocQuery,
    tx: mpsc::Sender<Snapshot>,
}

/// In-process document backend with hosted-style live queries.
pub struct MemoryBackend {
    docs: Mutex<HashMap<DocQuery, HashMap<String, Value>>>,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_subscription_id: AtomicU64,
    /// Test/demo switch: make every write fail as a backend error.
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscription_id: AtomicU64::new(1),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Force all subsequent writes to fail with a retryable backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of live subscriber registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Synchronous fixture loading: inserts every doc and pushes one
    /// snapshot to live subscribers, same as a hosted bulk import would.
    pub fn seed(&self, query: &DocQuery, docs: Vec<Value>) {
        {
            let mut all = self.docs.lock();
            let scope = all.entry(query.clone()).or_default();
            for doc in docs {
                let (id, stamped) = stamp_doc(doc, query);
                scope.insert(id, stamped);
            }
        }
        self.broadcast(query);
    }

    fn snapshot(&self, query: &DocQuery) -> Snapshot {
        self.docs
            .lock()
            .get(query)
            .map(|scope| scope.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Push the current snapshot to every subscriber of `query`.
    ///
    /// Delivery is non-blocking: a full channel drops this snapshot, which
    /// is safe because the next one fully supersedes it. Closed channels
    /// are pruned.
    fn broadcast(&self, query: &DocQuery) {
        let snapshot = self.snapshot(query);
        let mut subs = self.subscribers.lock();
        subs.retain(|sub| {
            if sub.query != *query {
                return !sub.tx.is_closed();
            }
            match sub.tx.try_send(snapshot.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => true,
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn check_writable(&self) -> Result<(), FlowError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FlowError::Backend("write rejected".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure a document carries `id` and `companyId`, assigning a fresh id
/// when the caller did not provide one.
fn stamp_doc(mut doc: Value, query: &DocQuery) -> (String, Value) {
    let id = doc
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    if let Some(obj) = doc.as_object_mut() {
        obj.insert("id".to_string(), Value::String(id.clone()));
        obj.insert(
            "companyId".to_string(),
            Value::String(query.company_id.clone()),
        );
    }
    (id, doc)
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn fetch_once(&self, query: &DocQuery) -> Result<Snapshot, FlowError> {
        Ok(self.snapshot(query))
    }

    fn subscribe(&self, query: &DocQuery, tx: mpsc::Sender<Snapshot>) -> SubscriptionHandle {
        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);

        // New subscribers immediately see the current state.
        let _ = tx.try_send(self.snapshot(query));

        self.subscribers.lock().push(Subscriber {
            id,
            query: query.clone(),
            tx,
        });

        let subscribers = Arc::clone(&self.subscribers);
        SubscriptionHandle::new(id, move || {
            subscribers.lock().retain(|sub| sub.id != id);
            log::debug!("Backend: subscription {} removed", id);
        })
    }

    async fn insert(&self, query: &DocQuery, doc: Value) -> Result<String, FlowError> {
        self.check_writable()?;
        if !doc.is_object() {
            return Err(FlowError::InvalidInput(
                "document must be a JSON object".to_string(),
            ));
        }

        let id = {
            let mut all = self.docs.lock();
            let scope = all.entry(query.clone()).or_default();
            let (id, stamped) = stamp_doc(doc, query);
            scope.insert(id.clone(), stamped);
            id
        };
        self.broadcast(query);
        Ok(id)
    }

    async fn update(&self, query: &DocQuery, id: &str, patch: Value) -> Result<(), FlowError> {
        self.check_writable()?;
        let fields = patch
            .as_object()
            .ok_or_else(|| FlowError::InvalidInput("patch must be a JSON object".to_string()))?
            .clone();

        {
            let mut all = self.docs.lock();
            let doc = all
                .get_mut(query)
                .and_then(|scope| scope.get_mut(id))
                .ok_or_else(|| FlowError::NotFound(id.to_string()))?;
            if let Some(obj) = doc.as_object_mut() {
                for (key, value) in fields {
                    obj.insert(key, value);
                }
            }
        }
        self.broadcast(query);
        Ok(())
    }

    async fn delete(&self, query: &DocQuery, id: &str) -> Result<(), FlowError> {
        self.check_writable()?;
        {
            let mut all = self.docs.lock();
            let removed = all
                .get_mut(query)
                .map(|scope| scope.remove(id).is_some())
                .unwrap_or(false);
            if !removed {
                return Err(FlowError::NotFound(id.to_string()));
            }
        }
        self.broadcast(query);
        Ok(())
    }
}
