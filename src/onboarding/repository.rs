use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use super::domain::{ContractorId, ContractorStatus};
use super::record::ContractorRecord;
use super::token::{ActionToken, TokenScope};

/// Storage abstraction so the orchestrator can be exercised in isolation.
///
/// `update` must compare the stored version against the incoming record's and
/// reject stale writes; that check is what serializes concurrent `advance`
/// calls for one contractor.
pub trait ContractorRepository: Send + Sync {
    fn insert(&self, record: ContractorRecord) -> Result<ContractorRecord, RepositoryError>;
    fn fetch(&self, id: &ContractorId) -> Result<Option<ContractorRecord>, RepositoryError>;
    fn update(&self, record: ContractorRecord) -> Result<ContractorRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("stale record version")]
    StaleVersion,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Reference repository backing the crate's own tests and any embedding that
/// does not bring its own store. Version checking mirrors a row-level
/// compare-and-swap.
#[derive(Default)]
pub struct InMemoryContractorRepository {
    records: Mutex<HashMap<ContractorId, ContractorRecord>>,
}

impl InMemoryContractorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContractorRepository for InMemoryContractorRepository {
    fn insert(&self, record: ContractorRecord) -> Result<ContractorRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ContractorId) -> Result<Option<ContractorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, mut record: ContractorRecord) -> Result<ContractorRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != record.version {
            return Err(RepositoryError::StaleVersion);
        }
        record.version += 1;
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationRecipient {
    Contractor,
    Operator,
    Client,
    ThirdParty,
}

impl NotificationRecipient {
    /// The actor expected to redeem a token of the given scope.
    pub const fn for_scope(scope: TokenScope) -> Self {
        match scope {
            TokenScope::UploadDocuments | TokenScope::SignContract => Self::Contractor,
            TokenScope::CohfSignature
            | TokenScope::SubmitQuoteSheet
            | TokenScope::UploadContract => Self::ThirdParty,
            TokenScope::SignWorkOrder => Self::Client,
        }
    }
}

/// What happened, from the notifier's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    /// An external party must act; the accompanying token carries the link.
    ExternalActionRequired { scope: TokenScope },
    /// Internal status change for the operator dashboard.
    StatusChanged { status: ContractorStatus },
}

/// Outbound message handed to the notifier. Carries the token needed for the
/// recipient's next step and nothing else; raw step payloads are never echoed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub contractor_id: ContractorId,
    pub recipient: NotificationRecipient,
    pub event: NotificationEvent,
    pub token: Option<ActionToken>,
}

/// Trait describing the outbound delivery hook (e-mail, dashboard, webhook).
pub trait Notifier: Send + Sync {
    fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
