//! In-memory fakes of the ports for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::{Product, ProductAnalysis, ProductQuery, UsageLogEntry};
use crate::ports::{AnalysisError, PortResult, ProductClassificationService, StorageService};

#[derive(Default)]
pub struct MemoryStorage {
    shelf: Mutex<Vec<Product>>,
    history: Mutex<Vec<UsageLogEntry>>,
    appends: AtomicUsize,
}

impl MemoryStorage {
    pub fn append_calls(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageService for MemoryStorage {
    async fn load_shelf(&self) -> PortResult<Vec<Product>> {
        Ok(self.shelf.lock().unwrap().clone())
    }

    async fn save_shelf(&self, products: &[Product]) -> PortResult<()> {
        *self.shelf.lock().unwrap() = products.to_vec();
        Ok(())
    }

    async fn load_history(&self) -> PortResult<Vec<UsageLogEntry>> {
        Ok(self.history.lock().unwrap().clone())
    }

    async fn append_history(&self, entries: &[UsageLogEntry]) -> PortResult<()> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.history.lock().unwrap().extend_from_slice(entries);
        Ok(())
    }
}

pub struct StubClassifier {
    answer: Option<ProductAnalysis>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn answering(analysis: ProductAnalysis) -> Self {
        Self { answer: Some(analysis), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { answer: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductClassificationService for StubClassifier {
    async fn classify(&self, _query: &ProductQuery) -> Result<ProductAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .ok_or_else(|| AnalysisError::Request("stub classifier offline".to_string()))
    }
}
