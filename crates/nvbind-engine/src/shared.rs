//! Shared handle that serializes reconciliation passes.
//!
//! Inputs may arrive from several tasks while a pass is suspended in a bulk
//! load. Every pass takes the binding's lock for its whole duration, and the
//! lock is fair, so passes run one at a time in submission order.

use std::sync::Arc;

use nvbind_core::errors::Result;
use nvbind_core::viewer::Viewer;
use tokio::sync::{Mutex, MutexGuard};

use crate::binding::{Binding, PassOutcome, Props};

pub struct SharedBinding<V: Viewer> {
    inner: Arc<Mutex<Binding<V>>>,
}

impl<V: Viewer> Clone for SharedBinding<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Viewer> SharedBinding<V> {
    pub fn new(binding: Binding<V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(binding)),
        }
    }

    pub async fn mount(&self) -> Result<()> {
        self.inner.lock().await.mount().await
    }

    /// Queue a pass behind any pass in flight, then run it.
    pub async fn update(&self, props: Props) -> Result<PassOutcome> {
        let mut binding = self.inner.lock().await;
        binding.update(&props).await
    }

    /// Exclusive access between passes.
    pub async fn lock(&self) -> MutexGuard<'_, Binding<V>> {
        self.inner.lock().await
    }
}
