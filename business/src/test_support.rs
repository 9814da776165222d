//! In-memory doubles shared by the use case tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use uuid::Uuid;

use crate::domain::errors::{CacheError, RepositoryError};
use crate::domain::logger::Logger;
use crate::domain::product::cache::{CacheBatch, CacheCommand, CacheStore};
use crate::domain::product::model::{Product, ProductRow};
use crate::domain::product::repository::{ProductRepository, ProductUpsertTransaction};
use crate::domain::product::value_objects::Price;
use crate::domain::tasks::{BackgroundTask, TaskSpawner};

mock! {
    pub Log {}

    impl Logger for Log {
        fn info(&self, message: &str);
        fn warn(&self, message: &str);
        fn error(&self, message: &str);
        fn debug(&self, message: &str);
    }
}

pub fn mock_logger() -> Arc<dyn Logger> {
    let mut logger = MockLog::new();
    logger.expect_info().returning(|_| ());
    logger.expect_warn().returning(|_| ());
    logger.expect_error().returning(|_| ());
    logger.expect_debug().returning(|_| ());
    Arc::new(logger)
}

pub fn product(name: &str, price: &str, qty: u32) -> Product {
    let now = Utc::now();
    Product::from_repository(
        Uuid::new_v4(),
        name.to_string(),
        None,
        price.parse::<Price>().unwrap(),
        qty,
        qty == 0,
        now,
        now,
    )
}

/// Store double that enforces the natural-key upsert and the derived stock flag
/// the way the database does.
#[derive(Default)]
pub struct InMemoryStore {
    pub products: Arc<Mutex<Vec<Product>>>,
    pub failing_names: HashSet<String>,
    pub fail_reads: bool,
    pub fail_begin: bool,
    pub fail_commit: bool,
    pub begun: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn with(products: Vec<Product>) -> Self {
        Self {
            products: Arc::new(Mutex::new(products)),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        if self.fail_reads {
            return Err(RepositoryError::DatabaseError);
        }
        let mut products = self.snapshot();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn begin_bulk_upsert(
        &self,
    ) -> Result<Box<dyn ProductUpsertTransaction>, RepositoryError> {
        self.begun.store(true, Ordering::SeqCst);
        if self.fail_begin {
            return Err(RepositoryError::Transaction);
        }
        Ok(Box::new(InMemoryTransaction {
            working: self.snapshot(),
            target: self.products.clone(),
            failing_names: self.failing_names.clone(),
            fail_commit: self.fail_commit,
        }))
    }
}

pub struct InMemoryTransaction {
    working: Vec<Product>,
    target: Arc<Mutex<Vec<Product>>>,
    failing_names: HashSet<String>,
    fail_commit: bool,
}

#[async_trait]
impl ProductUpsertTransaction for InMemoryTransaction {
    async fn upsert_by_name(&mut self, row: &ProductRow) -> Result<Product, RepositoryError> {
        if self.failing_names.contains(&row.name) {
            return Err(RepositoryError::DatabaseError);
        }
        let now = Utc::now();
        if let Some(existing) = self.working.iter_mut().find(|p| p.name == row.name) {
            existing.image = row.image.clone();
            existing.price = row.price.clone();
            existing.qty = row.qty;
            existing.out_of_stock = row.qty == 0;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        if self.working.iter().any(|p| p.id == row.id) {
            return Err(RepositoryError::DatabaseError);
        }
        let stored = Product::from_repository(
            row.id,
            row.name.clone(),
            row.image.clone(),
            row.price.clone(),
            row.qty,
            row.qty == 0,
            now,
            now,
        );
        self.working.push(stored.clone());
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let InMemoryTransaction {
            working,
            target,
            fail_commit,
            ..
        } = *self;
        if fail_commit {
            return Err(RepositoryError::Transaction);
        }
        *target.lock().unwrap() = working;
        Ok(())
    }
}

#[derive(Default)]
struct CacheState {
    values: HashMap<String, (String, Option<Duration>)>,
    sets: HashMap<String, Vec<String>>,
}

/// Cache double. Batches apply all-or-nothing, like a MULTI/EXEC pipeline.
#[derive(Default)]
pub struct InMemoryCache {
    state: Mutex<CacheState>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl InMemoryCache {
    pub fn value(&self, key: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.values.get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let state = self.state.lock().unwrap();
        state.values.get(key).map(|(_, ttl)| *ttl)
    }

    pub fn members(&self, key: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.sets.get(key).cloned().unwrap_or_default()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        state.values.insert(key.to_string(), (value.to_string(), None));
    }

    pub fn add_member(&self, key: &str, member: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .sets
            .entry(key.to_string())
            .or_default()
            .push(member.to_string());
    }

    /// Drops a single entry the way a TTL expiry or an eviction would.
    pub fn expire(&self, key: &str) {
        let mut state = self.state.lock().unwrap();
        state.values.remove(key);
    }

    pub fn is_untouched(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.values.is_empty() && state.sets.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable);
        }
        Ok(self.members(key))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable);
        }
        Ok(keys.iter().map(|key| self.value(key)).collect())
    }

    async fn execute(&self, batch: CacheBatch) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::WriteFailed);
        }
        let mut state = self.state.lock().unwrap();
        for command in batch.into_commands() {
            match command {
                CacheCommand::Set { key, value, ttl } => {
                    state.values.insert(key, (value, ttl));
                }
                CacheCommand::Delete { key } => {
                    state.values.remove(&key);
                    state.sets.remove(&key);
                }
                CacheCommand::SetAdd { key, members } => {
                    let set = state.sets.entry(key).or_default();
                    for member in members {
                        if !set.contains(&member) {
                            set.push(member);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Holds spawned tasks until the test decides to run them.
#[derive(Default)]
pub struct DeferredSpawner {
    tasks: Mutex<Vec<BackgroundTask>>,
}

impl DeferredSpawner {
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub async fn run_all(&self) {
        let tasks: Vec<BackgroundTask> = self.tasks.lock().unwrap().drain(..).collect();
        for task in tasks {
            task.await;
        }
    }
}

impl TaskSpawner for DeferredSpawner {
    fn spawn(&self, task: BackgroundTask) {
        self.tasks.lock().unwrap().push(task);
    }
}

/// Polls `check` until it holds, failing the test after two seconds.
pub async fn eventually<F: Fn() -> bool>(check: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
