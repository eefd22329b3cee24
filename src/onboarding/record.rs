use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{ContractorId, ContractorStatus, DocumentType, OnboardingRoute, StepId};

/// The contractor record the orchestrator drives through its lifecycle.
///
/// `status` is the single source of truth for workflow position. Step
/// payloads are stored opaque under the step that produced them; the
/// orchestrator never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractorRecord {
    pub id: ContractorId,
    pub full_name: String,
    pub email: String,
    pub status: ContractorStatus,
    /// Chosen exactly once at route selection; only a post-rejection restart
    /// clears it.
    pub route: Option<OnboardingRoute>,
    pub documents: BTreeMap<DocumentType, String>,
    pub step_data: BTreeMap<StepId, Value>,
    /// Optimistic concurrency stamp; bumped by the repository on every update.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContractorRecord {
    pub fn new(id: ContractorId, full_name: &str, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: full_name.to_string(),
            email: email.to_string(),
            status: ContractorStatus::Draft,
            route: None,
            documents: BTreeMap::new(),
            step_data: BTreeMap::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    /// Required document types not yet on file.
    pub fn missing_documents(&self, required: &[DocumentType]) -> Vec<DocumentType> {
        required
            .iter()
            .copied()
            .filter(|doc| !self.documents.contains_key(doc))
            .collect()
    }

    pub fn record_step_payload(&mut self, step: StepId, payload: Value) {
        if !payload.is_null() {
            self.step_data.insert(step, payload);
        }
    }
}
