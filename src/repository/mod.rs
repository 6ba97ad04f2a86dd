//! Persistence for assembled reports.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::AuditReport;
use crate::error::Result;

#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist a report and return its newly assigned opaque id.
    async fn save(&self, report: AuditReport) -> Result<String>;
    async fn get(&self, id: &str) -> Result<Option<AuditReport>>;
}

/// Process-local store; reports live as long as the store does.
#[derive(Default)]
pub struct InMemoryAuditStore {
    reports: DashMap<String, AuditReport>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn save(&self, mut report: AuditReport) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        report.id = Some(id.clone());
        self.reports.insert(id.clone(), report);
        tracing::debug!("[STORE] Saved report {}", id);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<AuditReport>> {
        Ok(self.reports.get(id).map(|entry| entry.value().clone()))
    }
}
