//! Route strategies: the per-route step ordering and status mapping.
//!
//! One stateless unit struct per route, registered in a [`StrategyRegistry`]
//! built at process start. Adding a route means adding a module and a
//! registration line, never editing existing routes.

mod freelancer;
mod offshore;
mod saudi;
mod standard;
mod uae;
mod wps;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::domain::{ContractorStatus, DocumentType, OnboardingRoute, ReviewDecision, StepId};
use super::token::TokenScope;

pub use freelancer::FreelancerStrategy;
pub use offshore::OffshoreStrategy;
pub use saudi::SaudiStrategy;
pub use uae::UaeStrategy;
pub use wps::WpsStrategy;

/// Definition of one workflow step as presented to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowStep {
    pub id: StepId,
    pub name: &'static str,
    pub description: &'static str,
    pub order: u8,
}

/// Route-specific decision for a step: where the record goes next and whether
/// an external party has to act before the workflow moves again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub next_status: ContractorStatus,
    pub external_action: Option<TokenScope>,
    pub note: &'static str,
}

impl StepOutcome {
    pub fn advance(next_status: ContractorStatus, note: &'static str) -> Self {
        Self {
            next_status,
            external_action: None,
            note,
        }
    }

    pub fn external(
        next_status: ContractorStatus,
        scope: TokenScope,
        note: &'static str,
    ) -> Self {
        Self {
            next_status,
            external_action: Some(scope),
            note,
        }
    }

    pub fn requires_external_action(&self) -> bool {
        self.external_action.is_some()
    }
}

/// A step arrived while the record sits in a status the route's transition
/// table knows nothing about. Signals a caller bug, never silently skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step '{step}' cannot run while status is '{status}'")]
pub struct StepOutOfSequence {
    pub step: StepId,
    pub status: ContractorStatus,
}

/// Behavior every onboarding route implements. Strategies are pure: they
/// decide, the orchestrator persists and notifies.
pub trait OnboardingStrategy: Send + Sync {
    fn route(&self) -> OnboardingRoute;

    fn display_name(&self) -> &'static str {
        self.route().display_name()
    }

    /// Documents that must be on file before this route progresses past
    /// `documents_uploaded`.
    fn required_documents(&self) -> &'static [DocumentType];

    /// Ordered listing of every step this route accepts.
    fn steps(&self) -> &'static [WorkflowStep];

    /// Pure lookup into the route's transition table. `None` means the status
    /// is not part of this route.
    fn next_status(&self, current: ContractorStatus) -> Option<ContractorStatus>;

    /// Outcome of completing route selection for this route.
    fn entry_outcome(&self) -> StepOutcome;

    /// Names of payload fields a step requires but the payload lacks.
    fn validate_step(&self, step: StepId, payload: &Value) -> Vec<&'static str> {
        let _ = (step, payload);
        Vec::new()
    }

    /// Route-specific, side-effect-free decision for a step.
    fn execute_step(
        &self,
        step: StepId,
        current: ContractorStatus,
        payload: &Value,
    ) -> Result<StepOutcome, StepOutOfSequence>;

    /// Workflow step an operator is looking at for a given status; drives the
    /// read-only workflow view.
    fn step_for_status(&self, status: ContractorStatus) -> Option<StepId>;

    fn has_step(&self, step: StepId) -> bool {
        self.steps().iter().any(|s| s.id == step)
    }
}

/// Steps whose handling is identical on every route. Route modules call this
/// as their fallback after matching their own special cases.
pub(crate) fn common_execute(
    strategy: &dyn OnboardingStrategy,
    step: StepId,
    current: ContractorStatus,
    payload: &Value,
) -> Result<StepOutcome, StepOutOfSequence> {
    match step {
        StepId::ReviewDecision => review_outcome(current, payload, step),
        StepId::WorkOrder => {
            let next = table_next(strategy, step, current)?;
            Ok(StepOutcome::external(
                next,
                TokenScope::SignWorkOrder,
                "work order sent to client for signature",
            ))
        }
        StepId::Contract => {
            let next = table_next(strategy, step, current)?;
            Ok(StepOutcome::external(
                next,
                TokenScope::SignContract,
                "employment contract generated and sent for signature",
            ))
        }
        StepId::ContractSigned => Ok(StepOutcome::advance(
            table_next(strategy, step, current)?,
            "contract signed by contractor",
        )),
        StepId::Activation => Ok(StepOutcome::advance(
            table_next(strategy, step, current)?,
            "contractor account activated",
        )),
        _ => Ok(StepOutcome::advance(
            table_next(strategy, step, current)?,
            "step completed",
        )),
    }
}

pub(crate) fn table_next(
    strategy: &dyn OnboardingStrategy,
    step: StepId,
    current: ContractorStatus,
) -> Result<ContractorStatus, StepOutOfSequence> {
    strategy
        .next_status(current)
        .ok_or(StepOutOfSequence { step, status: current })
}

fn review_outcome(
    current: ContractorStatus,
    payload: &Value,
    step: StepId,
) -> Result<StepOutcome, StepOutOfSequence> {
    if current != ContractorStatus::PendingReview {
        return Err(StepOutOfSequence { step, status: current });
    }
    match parse_decision(payload) {
        Some(ReviewDecision::Approve) => Ok(StepOutcome::advance(
            ContractorStatus::Approved,
            "contractor approved by admin review",
        )),
        Some(ReviewDecision::Reject) => Ok(StepOutcome::advance(
            ContractorStatus::Rejected,
            "contractor rejected by admin review",
        )),
        // validate_step reports the missing/invalid field before this runs.
        None => Err(StepOutOfSequence { step, status: current }),
    }
}

/// Missing-field validation shared by every route: the review decision payload.
pub(crate) fn validate_review_decision(payload: &Value) -> Vec<&'static str> {
    if parse_decision(payload).is_none() {
        vec!["decision"]
    } else {
        Vec::new()
    }
}

fn parse_decision(payload: &Value) -> Option<ReviewDecision> {
    payload
        .get("decision")
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
}

pub(crate) fn payload_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Summary row for route listings.
#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub route: OnboardingRoute,
    pub display_name: &'static str,
    pub required_documents: &'static [DocumentType],
    pub step_count: usize,
}

/// Raised when a route has no registered strategy; a startup configuration
/// error, not a per-request condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no strategy registered for route '{0}'")]
pub struct UnknownRoute(pub OnboardingRoute);

/// Maps each route identifier to its strategy. Built once at process start
/// and read-only afterwards.
pub struct StrategyRegistry {
    strategies: HashMap<OnboardingRoute, Arc<dyn OnboardingStrategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registry with all five built-in routes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(UaeStrategy));
        registry.register(Arc::new(SaudiStrategy));
        registry.register(Arc::new(OffshoreStrategy));
        registry.register(Arc::new(FreelancerStrategy));
        registry.register(Arc::new(WpsStrategy));
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn OnboardingStrategy>) {
        self.strategies.insert(strategy.route(), strategy);
    }

    pub fn resolve(
        &self,
        route: OnboardingRoute,
    ) -> Result<&Arc<dyn OnboardingStrategy>, UnknownRoute> {
        self.strategies.get(&route).ok_or(UnknownRoute(route))
    }

    pub fn is_registered(&self, route: OnboardingRoute) -> bool {
        self.strategies.contains_key(&route)
    }

    pub fn route_info(&self) -> Vec<RouteInfo> {
        let mut info: Vec<RouteInfo> = self
            .strategies
            .values()
            .map(|strategy| RouteInfo {
                route: strategy.route(),
                display_name: strategy.display_name(),
                required_documents: strategy.required_documents(),
                step_count: strategy.steps().len(),
            })
            .collect();
        info.sort_by_key(|entry| entry.route.label());
        info
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
