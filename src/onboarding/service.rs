use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::TokenTtlConfig;
use crate::error::OnboardingError;

use super::domain::{ContractorId, ContractorStatus, DocumentType, OnboardingRoute, StepId};
use super::record::ContractorRecord;
use super::repository::{
    ContractorRepository, Notification, NotificationEvent, NotificationRecipient, Notifier,
};
use super::state_machine::ContractorStateMachine;
use super::strategy::{RouteInfo, StepOutOfSequence, StepOutcome, StrategyRegistry, WorkflowStep};
use super::token::{ActionToken, TokenGrant, TokenScope, TokenVault};

/// Result of advancing a contractor one workflow step.
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub status: ContractorStatus,
    /// Present when the step handed control to an external party.
    pub issued_token: Option<ActionToken>,
    pub note: &'static str,
}

/// Read-only projection used to render next-action UI.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowView {
    pub contractor_id: ContractorId,
    pub status: ContractorStatus,
    pub route: Option<OnboardingRoute>,
    pub allowed_statuses: Vec<ContractorStatus>,
    pub steps: Vec<WorkflowStep>,
    pub current_step: Option<StepId>,
    pub completed_steps: Vec<StepId>,
    pub pending_steps: Vec<StepId>,
}

// Random ids survive process restarts against a durable repository; a
// counter would collide with rows written by an earlier run.
fn next_contractor_id() -> ContractorId {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    ContractorId(format!("ctr-{}", URL_SAFE_NO_PAD.encode(bytes)))
}

/// The external action a status is waiting on, if any. Drives link re-issue.
const fn pending_external_scope(status: ContractorStatus) -> Option<TokenScope> {
    match status {
        ContractorStatus::PendingDocuments => Some(TokenScope::UploadDocuments),
        ContractorStatus::AwaitingCohfSignature => Some(TokenScope::CohfSignature),
        ContractorStatus::PendingThirdPartyQuote => Some(TokenScope::SubmitQuoteSheet),
        ContractorStatus::PendingClientWoSignature => Some(TokenScope::SignWorkOrder),
        ContractorStatus::PendingThirdPartyContract => Some(TokenScope::UploadContract),
        ContractorStatus::PendingSignature => Some(TokenScope::SignContract),
        _ => None,
    }
}

/// Orchestrates the onboarding workflow: loads the record, asks the route
/// strategy what should happen, validates the result through the state
/// machine, persists, then issues tokens and notifications.
///
/// The service is the sole writer of `status`; strategies and the state
/// machine stay pure and are shared freely across concurrent calls.
pub struct OnboardingService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    registry: StrategyRegistry,
    tokens: Arc<TokenVault>,
    ttls: TokenTtlConfig,
}

impl<R, N> OnboardingService<R, N>
where
    R: ContractorRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self::with_config(
            repository,
            notifier,
            StrategyRegistry::with_defaults(),
            Arc::new(TokenVault::new()),
            TokenTtlConfig::default(),
        )
    }

    pub fn with_config(
        repository: Arc<R>,
        notifier: Arc<N>,
        registry: StrategyRegistry,
        tokens: Arc<TokenVault>,
        ttls: TokenTtlConfig,
    ) -> Self {
        Self {
            repository,
            notifier,
            registry,
            tokens,
            ttls,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenVault> {
        &self.tokens
    }

    /// Create a new contractor record in `Draft`.
    pub fn create(&self, full_name: &str, email: &str) -> Result<ContractorRecord, OnboardingError> {
        let record = ContractorRecord::new(next_contractor_id(), full_name, email, Utc::now());
        let stored = self.repository.insert(record)?;
        info!(contractor = %stored.id, "contractor record created");
        Ok(stored)
    }

    /// Advance a contractor one workflow step.
    ///
    /// Reads and decisions come first; the single repository `update` is the
    /// only write, so a failure anywhere before it leaves the record
    /// untouched. Token issuance and notification run after the write; a
    /// crash between the two is recovered by re-running the call, since
    /// `TokenVault::issue` supersedes any still-live token for the scope.
    pub fn advance(
        &self,
        id: &ContractorId,
        step: StepId,
        payload: Value,
    ) -> Result<AdvanceOutcome, OnboardingError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or_else(|| OnboardingError::NotFound(id.clone()))?;

        let outcome = if step.is_orchestrator_step() {
            self.execute_orchestrator_step(&mut record, step, &payload)?
        } else {
            let route = record
                .route
                .ok_or_else(|| OnboardingError::NoRouteSelected(id.clone()))?;
            let strategy = self.registry.resolve(route)?;
            if !strategy.has_step(step) {
                warn!(contractor = %id, %route, %step, "step not part of route workflow");
                return Err(OnboardingError::UnknownStep { route, step });
            }
            // A step may only run while the record sits in the status it is
            // due for; a legal-looking table hop from the wrong step must not
            // slip through.
            if strategy.step_for_status(record.status) != Some(step) {
                return Err(OnboardingError::OutOfSequence(StepOutOfSequence {
                    step,
                    status: record.status,
                }));
            }
            let missing = strategy.validate_step(step, &payload);
            if !missing.is_empty() {
                return Err(OnboardingError::IncompleteStepData { step, missing });
            }
            strategy.execute_step(step, record.status, &payload)?
        };

        // The chokepoint: no strategy bug may corrupt the global graph.
        let new_status = ContractorStateMachine::transition(record.status, outcome.next_status)
            .map_err(|err| {
                warn!(
                    contractor = %id,
                    from = %err.from,
                    to = %err.to,
                    "state machine rejected transition"
                );
                err
            })?;

        record.status = new_status;
        record.record_step_payload(step, payload);
        record.updated_at = Utc::now();
        let record = self.repository.update(record)?;

        info!(
            contractor = %record.id,
            %step,
            route = record.route.map(OnboardingRoute::label).unwrap_or("unset"),
            status = %record.status,
            external_action = outcome.external_action.is_some(),
            "onboarding step executed"
        );

        let issued_token = match outcome.external_action {
            Some(scope) => Some(self.issue_and_notify(&record, scope)?),
            None => {
                self.notifier.send(Notification {
                    contractor_id: record.id.clone(),
                    recipient: NotificationRecipient::Operator,
                    event: NotificationEvent::StatusChanged {
                        status: record.status,
                    },
                    token: None,
                })?;
                None
            }
        };

        Ok(AdvanceOutcome {
            status: record.status,
            issued_token,
            note: outcome.note,
        })
    }

    /// Re-issue the link for the external action the record is currently
    /// waiting on and notify the recipient again.
    ///
    /// Recovery path for a lost link or a crash between persist and notify:
    /// the record's status alone determines the scope, so the call needs no
    /// knowledge of the step that issued the original token. The fresh token
    /// supersedes any still-live one.
    pub fn resend_external_action(
        &self,
        id: &ContractorId,
    ) -> Result<ActionToken, OnboardingError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or_else(|| OnboardingError::NotFound(id.clone()))?;
        let scope = pending_external_scope(record.status)
            .ok_or_else(|| OnboardingError::NoExternalActionPending(id.clone()))?;
        let token = self.issue_and_notify(&record, scope)?;

        info!(
            contractor = %record.id,
            status = %record.status,
            %scope,
            "external action link re-issued"
        );
        Ok(token)
    }

    /// Authorize an unauthenticated request: look the token up without
    /// consuming it.
    pub fn resolve_by_token(&self, value: &str) -> Result<TokenGrant, OnboardingError> {
        Ok(self.tokens.validate(value)?)
    }

    /// The one state-changing use of a token. Exactly one concurrent caller
    /// per value succeeds.
    pub fn consume_token(&self, value: &str) -> Result<TokenGrant, OnboardingError> {
        Ok(self.tokens.consume(value)?)
    }

    /// Read-only workflow projection for a contractor.
    pub fn workflow_view(&self, id: &ContractorId) -> Result<WorkflowView, OnboardingError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or_else(|| OnboardingError::NotFound(id.clone()))?;

        let allowed_statuses =
            ContractorStateMachine::allowed_transitions(record.status).to_vec();

        let (steps, current_step) = match record.route {
            Some(route) => {
                let strategy = self.registry.resolve(route)?;
                (
                    strategy.steps().to_vec(),
                    strategy.step_for_status(record.status),
                )
            }
            None => (Vec::new(), None),
        };

        let (completed_steps, pending_steps) = match current_step {
            Some(step) => split_by_current(&steps, step),
            // The workflow ran to completion; every step is behind us.
            None if record.status.is_post_activation() => {
                (steps.iter().map(|step| step.id).collect(), Vec::new())
            }
            None => (Vec::new(), Vec::new()),
        };

        Ok(WorkflowView {
            contractor_id: record.id,
            status: record.status,
            route: record.route,
            allowed_statuses,
            steps,
            current_step,
            completed_steps,
            pending_steps,
        })
    }

    pub fn available_routes(&self) -> Vec<RouteInfo> {
        self.registry.route_info()
    }

    pub fn required_documents(
        &self,
        route: OnboardingRoute,
    ) -> Result<&'static [DocumentType], OnboardingError> {
        Ok(self.registry.resolve(route)?.required_documents())
    }

    /// Suspend an active contractor.
    pub fn suspend(&self, id: &ContractorId) -> Result<ContractorStatus, OnboardingError> {
        self.lifecycle_transition(id, ContractorStatus::Suspended)
    }

    /// Bring a suspended contractor back to active.
    pub fn reactivate(&self, id: &ContractorId) -> Result<ContractorStatus, OnboardingError> {
        self.lifecycle_transition(id, ContractorStatus::Active)
    }

    /// Terminate an active or suspended contractor.
    pub fn terminate(&self, id: &ContractorId) -> Result<ContractorStatus, OnboardingError> {
        self.lifecycle_transition(id, ContractorStatus::Terminated)
    }

    fn lifecycle_transition(
        &self,
        id: &ContractorId,
        to: ContractorStatus,
    ) -> Result<ContractorStatus, OnboardingError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or_else(|| OnboardingError::NotFound(id.clone()))?;
        record.status = ContractorStateMachine::transition(record.status, to)?;
        record.updated_at = Utc::now();
        let record = self.repository.update(record)?;

        info!(contractor = %record.id, status = %record.status, "lifecycle status changed");
        self.notifier.send(Notification {
            contractor_id: record.id.clone(),
            recipient: NotificationRecipient::Operator,
            event: NotificationEvent::StatusChanged {
                status: record.status,
            },
            token: None,
        })?;
        Ok(record.status)
    }

    /// Steps the orchestrator handles itself: everything before a route
    /// exists, plus the cancel/restart lifecycle edges shared by all routes.
    fn execute_orchestrator_step(
        &self,
        record: &mut ContractorRecord,
        step: StepId,
        payload: &Value,
    ) -> Result<StepOutcome, OnboardingError> {
        match step {
            StepId::StartDocuments => Ok(StepOutcome::external(
                ContractorStatus::PendingDocuments,
                TokenScope::UploadDocuments,
                "document upload link issued",
            )),
            StepId::DocumentsUploaded => {
                self.merge_documents(record, payload)?;
                match parse_route(step, payload)? {
                    None => Ok(StepOutcome::advance(
                        ContractorStatus::DocumentsUploaded,
                        "documents uploaded; awaiting route selection",
                    )),
                    // Inline route: record documents, then hop through
                    // DocumentsUploaded into the route's entry status. Both
                    // transitions pass the state machine; one write persists.
                    Some(route) => {
                        record.status = ContractorStateMachine::transition(
                            record.status,
                            ContractorStatus::DocumentsUploaded,
                        )?;
                        self.select_route(record, route)
                    }
                }
            }
            StepId::RouteSelection => {
                let route =
                    parse_route(step, payload)?.ok_or(OnboardingError::IncompleteStepData {
                        step,
                        missing: vec!["route"],
                    })?;
                self.select_route(record, route)
            }
            // Decision: rejection restarts the entire document/route cycle,
            // not just CDS. The cleared record goes back through upload and
            // route selection from scratch.
            StepId::Restart => {
                record.route = None;
                record.documents.clear();
                record.step_data.clear();
                Ok(StepOutcome::advance(
                    ContractorStatus::Draft,
                    "onboarding restarted after rejection",
                ))
            }
            StepId::Cancel => Ok(StepOutcome::advance(
                ContractorStatus::Cancelled,
                "onboarding cancelled",
            )),
            _ => unreachable!("is_orchestrator_step gates this match"),
        }
    }

    /// Route is chosen exactly once; completeness of the uploaded documents
    /// is checked here, before the record may progress past upload.
    fn select_route(
        &self,
        record: &mut ContractorRecord,
        route: OnboardingRoute,
    ) -> Result<StepOutcome, OnboardingError> {
        if let Some(existing) = record.route {
            return Err(OnboardingError::RouteAlreadySelected {
                id: record.id.clone(),
                route: existing,
            });
        }
        let strategy = self.registry.resolve(route)?;
        let missing = record.missing_documents(strategy.required_documents());
        if !missing.is_empty() {
            return Err(OnboardingError::IncompleteStepData {
                step: StepId::RouteSelection,
                missing: missing.into_iter().map(DocumentType::label).collect(),
            });
        }
        record.route = Some(route);
        Ok(strategy.entry_outcome())
    }

    fn merge_documents(
        &self,
        record: &mut ContractorRecord,
        payload: &Value,
    ) -> Result<(), OnboardingError> {
        let Some(raw) = payload.get("documents") else {
            return Ok(());
        };
        let documents: std::collections::BTreeMap<DocumentType, String> =
            serde_json::from_value(raw.clone()).map_err(|_| {
                OnboardingError::IncompleteStepData {
                    step: StepId::DocumentsUploaded,
                    missing: vec!["documents"],
                }
            })?;
        record.documents.extend(documents);
        Ok(())
    }

    fn issue_and_notify(
        &self,
        record: &ContractorRecord,
        scope: TokenScope,
    ) -> Result<ActionToken, OnboardingError> {
        let token = self
            .tokens
            .issue(record.id.clone(), scope, self.ttls.ttl(scope));
        self.notifier.send(Notification {
            contractor_id: record.id.clone(),
            recipient: NotificationRecipient::for_scope(scope),
            event: NotificationEvent::ExternalActionRequired { scope },
            token: Some(token.clone()),
        })?;
        Ok(token)
    }
}

fn parse_route(step: StepId, payload: &Value) -> Result<Option<OnboardingRoute>, OnboardingError> {
    match payload.get("route") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|_| {
            OnboardingError::IncompleteStepData {
                step,
                missing: vec!["route"],
            }
        }),
    }
}

fn split_by_current(steps: &[WorkflowStep], current: StepId) -> (Vec<StepId>, Vec<StepId>) {
    let Some(current_order) = steps
        .iter()
        .find(|step| step.id == current)
        .map(|step| step.order)
    else {
        return (Vec::new(), Vec::new());
    };

    let completed = steps
        .iter()
        .filter(|step| step.order < current_order)
        .map(|step| step.id)
        .collect();
    let pending = steps
        .iter()
        .filter(|step| step.order > current_order)
        .map(|step| step.id)
        .collect();
    (completed, pending)
}
