//! Module for the persistence of processed readings

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{domain::Reading, error::RepositoryError};

/// Create-only store for readings. Must accept concurrent `create` calls from several workers.
pub trait ReadingRepository: Send + Sync {
    fn create(&self, reading: Reading) -> Result<(), RepositoryError>;
}

impl<T: ReadingRepository + ?Sized> ReadingRepository for &T {
    fn create(&self, reading: Reading) -> Result<(), RepositoryError> {
        (**self).create(reading)
    }
}

impl<T: ReadingRepository + ?Sized> ReadingRepository for Arc<T> {
    fn create(&self, reading: Reading) -> Result<(), RepositoryError> {
        (**self).create(reading)
    }
}

/// Keeps every created reading in memory, in creation order.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    readings: Mutex<Vec<Reading>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.readings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.lock().is_empty()
    }

    pub fn readings(&self) -> Vec<Reading> {
        self.readings.lock().clone()
    }
}

impl ReadingRepository for InMemoryRepository {
    fn create(&self, reading: Reading) -> Result<(), RepositoryError> {
        self.readings.lock().push(reading);
        Ok(())
    }
}
