//! Orchestrator - registry plus sequential runner for probes and repairs
//!
//! One engine type serves both sides:
//! - [`DiagnosticEngine`] runs `Probe`s and yields `DiagnosticResult`s
//! - [`RepairEngine`] runs `Repair`s and yields `RepairResult`s
//!
//! Items run one at a time in registration order. Cancellation is checked before
//! each item; a cancelled run returns, and publishes, the results gathered so far.
//! Each run fills its own buffer, and the finished buffer replaces the
//! "last results" cache in one step. When runs overlap, the last to finish wins.

use crate::context::SystemContext;
use crate::probe::{standard_probes, Probe};
use crate::repair::{standard_repairs, Repair};
use crate::types::{DiagnosticResult, RepairResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

// ============================================================================
// Runnable items
// ============================================================================

/// Anything an orchestrator can register and run
#[async_trait]
pub trait Runnable: Clone + Send + Sync {
    type Output: Clone + Send + Sync;

    /// Used in log lines ("probe", "repair")
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    async fn run(&self, cancel: &CancellationToken) -> Self::Output;

    /// Synthetic result for an id nobody registered
    fn not_found(id: &str) -> Self::Output;
}

#[async_trait]
impl Runnable for Arc<dyn Probe> {
    type Output = DiagnosticResult;
    const KIND: &'static str = "probe";

    fn id(&self) -> &str {
        Probe::id(self.as_ref())
    }

    fn name(&self) -> &str {
        Probe::name(self.as_ref())
    }

    async fn run(&self, cancel: &CancellationToken) -> DiagnosticResult {
        self.check(cancel).await
    }

    fn not_found(id: &str) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(id, "Unknown check");
        result.set_error(format!("No diagnostic check with id '{}'", id), false);
        result
    }
}

#[async_trait]
impl Runnable for Arc<dyn Repair> {
    type Output = RepairResult;
    const KIND: &'static str = "repair";

    fn id(&self) -> &str {
        Repair::id(self.as_ref())
    }

    fn name(&self) -> &str {
        Repair::name(self.as_ref())
    }

    async fn run(&self, cancel: &CancellationToken) -> RepairResult {
        self.repair(cancel).await
    }

    fn not_found(id: &str) -> RepairResult {
        let mut result = RepairResult::new(id, "Unknown repair");
        result.set_failure(format!("No repair action with id '{}'", id));
        result
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

pub struct Orchestrator<T: Runnable> {
    items: Mutex<Vec<T>>,
    last_results: RwLock<Vec<T::Output>>,
}

pub type DiagnosticEngine = Orchestrator<Arc<dyn Probe>>;
pub type RepairEngine = Orchestrator<Arc<dyn Repair>>;

impl<T: Runnable> Orchestrator<T> {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            last_results: RwLock::new(Vec::new()),
        }
    }

    pub fn with_items(items: Vec<T>) -> Self {
        let orchestrator = Self::new();
        for item in items {
            orchestrator.register(item);
        }
        orchestrator
    }

    /// Append an item; it runs after everything registered before it
    pub fn register(&self, item: T) {
        debug!("Registered {} '{}'", T::KIND, item.id());
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    fn snapshot(&self) -> Vec<T> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run every registered item in order
    pub async fn run_all(&self, cancel: &CancellationToken) -> Vec<T::Output> {
        let items = self.snapshot();
        let mut buffer = Vec::with_capacity(items.len());
        let start = Instant::now();
        info!("Running {} {}(s)", items.len(), T::KIND);

        for item in &items {
            if cancel.is_cancelled() {
                warn!(
                    "Run cancelled after {} of {} {}(s)",
                    buffer.len(),
                    items.len(),
                    T::KIND
                );
                break;
            }
            buffer.push(Self::run_item(item, cancel).await);
        }

        *self
            .last_results
            .write()
            .unwrap_or_else(PoisonError::into_inner) = buffer.clone();
        info!(
            "{} run finished: {} result(s) in {}ms",
            T::KIND,
            buffer.len(),
            start.elapsed().as_millis()
        );
        buffer
    }

    /// Run one item by id. Unknown ids yield a synthetic failure result.
    /// Does not touch the last-results cache.
    pub async fn run_single(&self, id: &str, cancel: &CancellationToken) -> T::Output {
        let item = self.snapshot().into_iter().find(|item| item.id() == id);
        match item {
            Some(item) => Self::run_item(&item, cancel).await,
            None => {
                warn!("No {} registered with id '{}'", T::KIND, id);
                T::not_found(id)
            }
        }
    }

    async fn run_item(item: &T, cancel: &CancellationToken) -> T::Output {
        info!("Starting {} '{}'", T::KIND, item.id());
        let start = Instant::now();
        let output = item.run(cancel).await;
        info!(
            "Finished {} '{}' in {}ms",
            T::KIND,
            item.id(),
            start.elapsed().as_millis()
        );
        output
    }

    /// Results of the most recent completed (or cancelled) run
    pub fn results(&self) -> Vec<T::Output> {
        self.last_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registered ids, in registration order
    pub fn ids(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|item| item.id().to_string())
            .collect()
    }

    /// (id, name) pairs, in registration order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.snapshot()
            .iter()
            .map(|item| (item.id().to_string(), item.name().to_string()))
            .collect()
    }
}

impl<T: Runnable> Default for Orchestrator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator<Arc<dyn Probe>> {
    /// Engine preloaded with the built-in probes
    pub fn standard(ctx: &SystemContext) -> Self {
        Self::with_items(standard_probes(ctx))
    }
}

impl Orchestrator<Arc<dyn Repair>> {
    /// Engine preloaded with the built-in repair actions
    pub fn standard(ctx: &SystemContext) -> Self {
        Self::with_items(standard_repairs(ctx))
    }

    /// (name, requires_admin) for a registered action
    pub fn info(&self, id: &str) -> Option<(String, bool)> {
        self.snapshot()
            .iter()
            .find(|repair| Repair::id(repair.as_ref()) == id)
            .map(|repair| (repair.name().to_string(), repair.requires_admin()))
    }
}
