//! LanguageModel trait and offline implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use flowrank_core::{Error, Result};

/// Single uniform capability the pipeline requires from a language model.
///
/// One blocking round-trip per call; no retry or timeout policy here —
/// those belong to the concrete client.
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Offline model that replays canned responses in order.
///
/// Once the queue is exhausted, the last response is repeated. Used in
/// tests and dry runs where no external API is available.
pub struct CannedModel {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
}

impl CannedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
        }
    }

    /// Model that always answers with the same text.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new([response.into()])
    }
}

impl LanguageModel for CannedModel {
    fn generate(&self, _prompt: &str) -> Result<String> {
        let mut queue = self.responses.lock().expect("canned model lock");
        match queue.pop_front() {
            Some(response) => {
                let mut last = self.last.lock().expect("canned model lock");
                *last = Some(response.clone());
                Ok(response)
            }
            None => {
                let last = self.last.lock().expect("canned model lock");
                last.clone()
                    .ok_or_else(|| Error::Model("canned model has no responses".into()))
            }
        }
    }
}

/// Model that always fails. Exercises the degrade paths.
pub struct FailingModel;

impl LanguageModel for FailingModel {
    fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Model("model unavailable".into()))
    }
}
