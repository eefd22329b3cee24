//! 3rd Party Saudi Arabia route.
//!
//! Documents → Route → Quote Sheet → CDS/Costing → Review → Work Order →
//! Contract → Activation.
//!
//! A costing quote from the Saudi third party must land before CDS/Costing
//! opens; the employment contract itself is generated in-house.

use serde_json::Value;

use super::{
    common_execute, payload_str, validate_review_decision, OnboardingStrategy, StepOutOfSequence,
    StepOutcome, WorkflowStep,
};
use crate::onboarding::domain::{ContractorStatus, DocumentType, OnboardingRoute, StepId};
use crate::onboarding::token::TokenScope;

pub struct SaudiStrategy;

const REQUIRED_DOCUMENTS: &[DocumentType] = &[
    DocumentType::Passport,
    DocumentType::Photo,
    DocumentType::Degree,
    DocumentType::Iqama,
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
        description: "Contractor uploads passport, photo, degree, iqama",
        order: 2,
    },
    WorkflowStep {
        id: StepId::RouteSelection,
        name: "Route Selection",
        description: "Select onboarding route and third party",
        order: 3,
    },
    WorkflowStep {
        id: StepId::QuoteSheetReceived,
        name: "Quote Sheet",
        description: "Receive costing quote from 3rd party",
        order: 4,
    },
    WorkflowStep {
        id: StepId::CdsComplete,
        name: "CDS & Costing Sheet",
        description: "Complete contractor data sheet and costing information",
        order: 5,
    },
    WorkflowStep {
        id: StepId::AdminReview,
        name: "Submit for Review",
        description: "Send completed CDS and costing to admin review",
        order: 6,
    },
    WorkflowStep {
        id: StepId::ReviewDecision,
        name: "Admin Review",
        description: "Admin approves or rejects contractor details",
        order: 7,
    },
    WorkflowStep {
        id: StepId::WorkOrder,
        name: "Work Order",
        description: "Generate and send work order to client for signature",
        order: 8,
    },
    WorkflowStep {
        id: StepId::WorkOrderComplete,
        name: "Work Order Signed",
        description: "Client signs the work order",
        order: 9,
    },
    WorkflowStep {
        id: StepId::Contract,
        name: "Employment Contract",
        description: "Generate and send the employment contract",
        order: 10,
    },
    WorkflowStep {
        id: StepId::ContractSigned,
        name: "Contract Signature",
        description: "Contractor signs the employment contract",
        order: 11,
    },
    WorkflowStep {
        id: StepId::Activation,
        name: "Activation",
        description: "Activate contractor account",
        order: 12,
    },
];

impl OnboardingStrategy for SaudiStrategy {
    fn route(&self) -> OnboardingRoute {
        OnboardingRoute::Saudi
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
            DocumentsUploaded => Some(PendingThirdPartyQuote),
            PendingThirdPartyQuote => Some(PendingCdsCs),
            PendingCdsCs => Some(CdsCsCompleted),
            CdsCsCompleted => Some(PendingReview),
            Approved => Some(PendingClientWoSignature),
            PendingClientWoSignature => Some(WorkOrderCompleted),
            WorkOrderCompleted => Some(PendingSignature),
            PendingSignature => Some(Signed),
            Signed => Some(Active),
            _ => None,
        }
    }

    fn entry_outcome(&self) -> StepOutcome {
        StepOutcome::external(
            ContractorStatus::PendingThirdPartyQuote,
            TokenScope::SubmitQuoteSheet,
            "Saudi route selected; quote sheet requested from 3rd party",
        )
    }

    fn validate_step(&self, step: StepId, payload: &Value) -> Vec<&'static str> {
        match step {
            StepId::QuoteSheetReceived => {
                if payload_str(payload, "quote_sheet_id").is_none() {
                    vec!["quote_sheet_id"]
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
            StepId::QuoteSheetReceived => Ok(StepOutcome::advance(
                ContractorStatus::PendingCdsCs,
                "quote sheet received; CDS open",
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
            PendingThirdPartyQuote => Some(StepId::QuoteSheetReceived),
            PendingCdsCs => Some(StepId::CdsComplete),
            CdsCsCompleted => Some(StepId::AdminReview),
            PendingReview => Some(StepId::ReviewDecision),
            Approved => Some(StepId::WorkOrder),
            PendingClientWoSignature => Some(StepId::WorkOrderComplete),
            WorkOrderCompleted => Some(StepId::Contract),
            PendingSignature => Some(StepId::ContractSigned),
            Signed => Some(StepId::Activation),
            _ => None,
        }
    }
}
