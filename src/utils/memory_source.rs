//! In-memory report source for testing

use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// Balance source that serves a fixed report text
///
/// Clones share the same text, so a test can swap the report between
/// loads with [`StaticSource::set_text`].
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    text: Arc<RwLock<String>>,
}

impl StaticSource {
    /// Create a source serving `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(text.into())),
        }
    }

    /// Replace the text served by subsequent fetches
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.write().unwrap_or_else(|e| e.into_inner()) = text.into();
    }
}

impl BalanceSource for StaticSource {
    fn fetch(&self) -> ReconcileResult<String> {
        Ok(self.text.read().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
