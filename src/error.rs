use crate::onboarding::domain::{ContractorId, OnboardingRoute, StepId};
use crate::onboarding::repository::{NotifyError, RepositoryError};
use crate::onboarding::state_machine::InvalidTransition;
use crate::onboarding::strategy::{StepOutOfSequence, UnknownRoute};
use crate::onboarding::token::TokenError;

/// Everything an orchestrator call can fail with. All variants are terminal
/// for the current call and none are fatal to the process; the surrounding
/// layer owns retry policy and user-facing messaging.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("contractor '{0}' not found")]
    NotFound(ContractorId),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("onboarding route not selected for contractor '{0}'")]
    NoRouteSelected(ContractorId),
    #[error("no external action pending for contractor '{0}'")]
    NoExternalActionPending(ContractorId),
    #[error("route already selected for contractor '{id}': {route}")]
    RouteAlreadySelected {
        id: ContractorId,
        route: OnboardingRoute,
    },
    #[error(transparent)]
    UnknownRoute(#[from] UnknownRoute),
    #[error("step '{step}' is not part of the '{route}' workflow")]
    UnknownStep {
        route: OnboardingRoute,
        step: StepId,
    },
    #[error(transparent)]
    OutOfSequence(#[from] StepOutOfSequence),
    #[error("missing required data for step '{step}': {missing:?}")]
    IncompleteStepData {
        step: StepId,
        missing: Vec<&'static str>,
    },
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
