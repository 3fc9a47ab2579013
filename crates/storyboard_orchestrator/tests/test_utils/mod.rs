//! Test utilities for orchestrator tests.
//!
//! Scripted collaborators and a helper that wires them into an orchestrator
//! with an in-memory history and no pacing delay.

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{FakeAnalyzer, FakeRenderer, FakeRepair};

use std::sync::Arc;
use std::time::Duration;
use storyboard_orchestrator::BatchOrchestrator;
use storyboard_rate_limit::Pacer;
use storyboard_storage::{InMemoryBackend, ResultStore};

/// Orchestrator over the given fakes, an in-memory store and zero pacing.
pub async fn orchestrator(
    analyzer: Arc<FakeAnalyzer>,
    renderer: Arc<FakeRenderer>,
    repair: Arc<FakeRepair>,
) -> (BatchOrchestrator, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    let store = Arc::new(ResultStore::open(backend.clone()).await);
    let orchestrator = BatchOrchestrator::new(analyzer, renderer, repair, store)
        .with_pacer(Pacer::fixed(Duration::ZERO));
    (orchestrator, backend)
}
