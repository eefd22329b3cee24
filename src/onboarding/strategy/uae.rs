//! 3rd Party UAE route.
//!
//! Documents → Route → COHF → CDS/Costing → Review → Work Order →
//! 3rd Party Contract → Activation.
//!
//! The COHF (Cost of Hire Form) must be signed by the third party before
//! CDS/Costing opens, and the third party uploads its own employment contract
//! after the work order completes; contract generation is skipped entirely.

use serde_json::Value;

use super::{
    common_execute, payload_str, validate_review_decision, OnboardingStrategy, StepOutOfSequence,
    StepOutcome, WorkflowStep,
};
use crate::onboarding::domain::{ContractorStatus, DocumentType, OnboardingRoute, StepId};
use crate::onboarding::token::TokenScope;

pub struct UaeStrategy;

const REQUIRED_DOCUMENTS: &[DocumentType] = &[
    DocumentType::Passport,
    DocumentType::Photo,
    DocumentType::EmiratesId,
    DocumentType::Visa,
    DocumentType::Degree,
];

const STEPS: &[WorkflowStep] = &[
    WorkflowStep {
        id: StepId::StartDocuments,
        name: "Start Document Collection",
        description: "Send the contractor a document upload link",
        order: 1,
    },
    WorkflowStep {
        id: StepId::DocumentsUploaded,
        name: "Document Upload",
        description: "Contractor uploads passport, photo, Emirates ID, visa, degree",
        order: 2,
    },
    WorkflowStep {
        id: StepId::RouteSelection,
        name: "Route Selection",
        description: "Select onboarding route and third party",
        order: 3,
    },
    WorkflowStep {
        id: StepId::Cohf,
        name: "Cost of Hire Form",
        description: "Complete and submit COHF for 3rd party signature",
        order: 4,
    },
    WorkflowStep {
        id: StepId::CohfComplete,
        name: "COHF Signature",
        description: "3rd party signs the COHF",
        order: 5,
    },
    WorkflowStep {
        id: StepId::CdsCosting,
        name: "Open CDS & Costing",
        description: "Open the contractor data sheet after COHF completion",
        order: 6,
    },
    WorkflowStep {
        id: StepId::CdsComplete,
        name: "CDS & Costing Sheet",
        description: "Complete contractor data sheet and costing information",
        order: 7,
    },
    WorkflowStep {
        id: StepId::AdminReview,
        name: "Submit for Review",
        description: "Send completed CDS and costing to admin review",
        order: 8,
    },
    WorkflowStep {
        id: StepId::ReviewDecision,
        name: "Admin Review",
        description: "Admin approves or rejects contractor details",
        order: 9,
    },
    WorkflowStep {
        id: StepId::WorkOrder,
        name: "Work Order",
        description: "Generate and send work order to client for signature",
        order: 10,
    },
    WorkflowStep {
        id: StepId::WorkOrderComplete,
        name: "Work Order Signed",
        description: "Client signs the work order",
        order: 11,
    },
    WorkflowStep {
        id: StepId::Contract,
        name: "Request 3rd Party Contract",
        description: "Ask the 3rd party to upload their employment contract",
        order: 12,
    },
    WorkflowStep {
        id: StepId::ThirdPartyContract,
        name: "3rd Party Contract",
        description: "3rd party uploads their employment contract",
        order: 13,
    },
    WorkflowStep {
        id: StepId::SendContract,
        name: "Send Contract",
        description: "Send the approved contract to the contractor for signature",
        order: 14,
    },
    WorkflowStep {
        id: StepId::ContractSigned,
        name: "Contract Signature",
        description: "Contractor signs the employment contract",
        order: 15,
    },
    WorkflowStep {
        id: StepId::Activation,
        name: "Activation",
        description: "Activate contractor account",
        order: 16,
    },
];

impl OnboardingStrategy for UaeStrategy {
    fn route(&self) -> OnboardingRoute {
        OnboardingRoute::Uae
    }

    fn required_documents(&self) -> &'static [DocumentType] {
        REQUIRED_DOCUMENTS
    }

    fn steps(&self) -> &'static [WorkflowStep] {
        STEPS
    }

    fn next_status(&self, current: ContractorStatus) -> Option<ContractorStatus> {
        use ContractorStatus::*;
        match current {
            DocumentsUploaded => Some(PendingCohf),
            PendingCohf => Some(AwaitingCohfSignature),
            AwaitingCohfSignature => Some(CohfCompleted),
            CohfCompleted => Some(PendingCdsCs),
            PendingCdsCs => Some(CdsCsCompleted),
            CdsCsCompleted => Some(PendingReview),
            Approved => Some(PendingClientWoSignature),
            PendingClientWoSignature => Some(WorkOrderCompleted),
            WorkOrderCompleted => Some(PendingThirdPartyContract),
            PendingThirdPartyContract => Some(ContractApproved),
            ContractApproved => Some(PendingSignature),
            PendingSignature => Some(Signed),
            Signed => Some(Active),
            _ => None,
        }
    }

    fn entry_outcome(&self) -> StepOutcome {
        StepOutcome::advance(
            ContractorStatus::PendingCohf,
            "UAE route selected; COHF required before CDS",
        )
    }

    fn validate_step(&self, step: StepId, payload: &Value) -> Vec<&'static str> {
        match step {
            StepId::Cohf => ["employee_name", "remuneration", "third_party_id"]
                .into_iter()
                .filter(|field| payload.get(field).map_or(true, Value::is_null))
                .collect(),
            StepId::ThirdPartyContract => {
                if payload_str(payload, "contract_url").is_none() {
                    vec!["contract_url"]
                } else {
                    Vec::new()
                }
            }
            StepId::ContractSigned => {
                if payload_str(payload, "signature").is_none() {
                    vec!["signature"]
                } else {
                    Vec::new()
                }
            }
            StepId::ReviewDecision => validate_review_decision(payload),
            _ => Vec::new(),
        }
    }

    fn execute_step(
        &self,
        step: StepId,
        current: ContractorStatus,
        payload: &Value,
    ) -> Result<StepOutcome, StepOutOfSequence> {
        match step {
            StepId::Cohf => Ok(StepOutcome::external(
                ContractorStatus::AwaitingCohfSignature,
                TokenScope::CohfSignature,
                "COHF submitted; awaiting 3rd party signature",
            )),
            StepId::CohfComplete => Ok(StepOutcome::advance(
                ContractorStatus::CohfCompleted,
                "COHF signed by all parties",
            )),
            // Contract generation is skipped: the 3rd party uploads theirs.
            StepId::Contract => Ok(StepOutcome::external(
                ContractorStatus::PendingThirdPartyContract,
                TokenScope::UploadContract,
                "awaiting 3rd party employment contract",
            )),
            StepId::ThirdPartyContract => Ok(StepOutcome::advance(
                ContractorStatus::ContractApproved,
                "3rd party contract uploaded and approved",
            )),
            StepId::SendContract => Ok(StepOutcome::external(
                ContractorStatus::PendingSignature,
                TokenScope::SignContract,
                "contract sent to contractor for signature",
            )),
            _ => common_execute(self, step, current, payload),
        }
    }

    fn step_for_status(&self, status: ContractorStatus) -> Option<StepId> {
        use ContractorStatus::*;
        match status {
            Draft => Some(StepId::StartDocuments),
            PendingDocuments => Some(StepId::DocumentsUploaded),
            DocumentsUploaded => Some(StepId::RouteSelection),
            PendingCohf => Some(StepId::Cohf),
            AwaitingCohfSignature => Some(StepId::CohfComplete),
            CohfCompleted => Some(StepId::CdsCosting),
            PendingCdsCs => Some(StepId::CdsComplete),
            CdsCsCompleted => Some(StepId::AdminReview),
            PendingReview => Some(StepId::ReviewDecision),
            Approved => Some(StepId::WorkOrder),
            PendingClientWoSignature => Some(StepId::WorkOrderComplete),
            WorkOrderCompleted => Some(StepId::Contract),
            PendingThirdPartyContract => Some(StepId::ThirdPartyContract),
            ContractApproved => Some(StepId::SendContract),
            PendingSignature => Some(StepId::ContractSigned),
            Signed => Some(StepId::Activation),
            _ => None,
        }
    }
}
