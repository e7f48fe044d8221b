//! Shared test doubles.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::rr::RecordType;

use crate::error::Error;
use crate::record::Record;
use crate::resolver::DnsResolver;

/// Scripted resolver: canned per-type responses, an optional forced error,
/// and an optional artificial delay.
#[derive(Debug)]
pub(crate) struct MockResolver {
    name: String,
    responses: HashMap<RecordType, Vec<Record>>,
    error: Option<String>,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockResolver {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: HashMap::new(),
            error: None,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn respond(mut self, rtype: RecordType, records: Vec<Record>) -> Self {
        self.responses.insert(rtype, records);
        self
    }

    pub(crate) fn fail(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl DnsResolver for MockResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve_type(&self, _host: &str, rtype: RecordType) -> Result<Vec<Record>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(message) = &self.error {
            return Err(Error::Transport {
                op: "recv",
                source: std::io::Error::other(message.clone()),
            });
        }
        match self.responses.get(&rtype) {
            Some(records) => Ok(records.clone()),
            None => Err(Error::NoRecords),
        }
    }
}
