//! Freelancer route: standard sequence with the lightest document set.

use serde_json::Value;

use super::{common_execute, standard, OnboardingStrategy, StepOutOfSequence, StepOutcome, WorkflowStep};
use crate::onboarding::domain::{ContractorStatus, DocumentType, OnboardingRoute, StepId};

pub struct FreelancerStrategy;

const REQUIRED_DOCUMENTS: &[DocumentType] = &[DocumentType::Passport, DocumentType::Photo];

impl OnboardingStrategy for FreelancerStrategy {
    fn route(&self) -> OnboardingRoute {
        OnboardingRoute::Freelancer
    }

    fn required_documents(&self) -> &'static [DocumentType] {
        REQUIRED_DOCUMENTS
    }

    fn steps(&self) -> &'static [WorkflowStep] {
        standard::STEPS
    }

    fn next_status(&self, current: ContractorStatus) -> Option<ContractorStatus> {
        standard::next_status(current)
    }

    fn entry_outcome(&self) -> StepOutcome {
        standard::entry_outcome("freelancer route selected; CDS open")
    }

    fn validate_step(&self, step: StepId, payload: &Value) -> Vec<&'static str> {
        standard::validate_step(step, payload)
    }

    fn execute_step(
        &self,
        step: StepId,
        current: ContractorStatus,
        payload: &Value,
    ) -> Result<StepOutcome, StepOutOfSequence> {
        common_execute(self, step, current, payload)
    }

    fn step_for_status(&self, status: ContractorStatus) -> Option<StepId> {
        standard::step_for_status(status)
    }
}
