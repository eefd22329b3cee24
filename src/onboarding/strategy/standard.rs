//! Shared step table for the routes without a third-party detour:
//! Documents → Route → CDS/Costing → Review → Work Order → Contract →
//! Activation. Offshore, Freelancer, and WPS all follow it while remaining
//! distinct route identifiers.

use serde_json::Value;

use super::{payload_str, validate_review_decision, StepOutcome, WorkflowStep};
use crate::onboarding::domain::{ContractorStatus, StepId};

pub(super) const STEPS: &[WorkflowStep] = &[
    WorkflowStep {
        id: StepId::StartDocuments,
        name: "Start Document Collection",
        description: "Send the contractor a document upload link",
        order: 1,
    },
    WorkflowStep {
        id: StepId::DocumentsUploaded,
        name: "Document Upload",
        description: "Contractor uploads required documents",
        order: 2,
    },
    WorkflowStep {
        id: StepId::RouteSelection,
        name: "Route Selection",
        description: "Select onboarding route",
        order: 3,
    },
    WorkflowStep {
        id: StepId::CdsComplete,
        name: "CDS & Costing Sheet",
        description: "Complete contractor data sheet and costing information",
        order: 4,
    },
    WorkflowStep {
        id: StepId::AdminReview,
        name: "Submit for Review",
        description: "Send completed CDS and costing to admin review",
        order: 5,
    },
    WorkflowStep {
        id: StepId::ReviewDecision,
        name: "Admin Review",
        description: "Admin approves or rejects contractor details",
        order: 6,
    },
    WorkflowStep {
        id: StepId::WorkOrder,
        name: "Work Order",
        description: "Generate and send work order to client for signature",
        order: 7,
    },
    WorkflowStep {
        id: StepId::WorkOrderComplete,
        name: "Work Order Signed",
        description: "Client signs the work order",
        order: 8,
    },
    WorkflowStep {
        id: StepId::Contract,
        name: "Employment Contract",
        description: "Generate and send the employment contract",
        order: 9,
    },
    WorkflowStep {
        id: StepId::ContractSigned,
        name: "Contract Signature",
        description: "Contractor signs the employment contract",
        order: 10,
    },
    WorkflowStep {
        id: StepId::Activation,
        name: "Activation",
        description: "Activate contractor account",
        order: 11,
    },
];

pub(super) fn next_status(current: ContractorStatus) -> Option<ContractorStatus> {
    use ContractorStatus::*;
    match current {
        DocumentsUploaded => Some(PendingCdsCs),
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

pub(super) fn entry_outcome(note: &'static str) -> StepOutcome {
    StepOutcome::advance(ContractorStatus::PendingCdsCs, note)
}

pub(super) fn validate_step(step: StepId, payload: &Value) -> Vec<&'static str> {
    match step {
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

pub(super) fn step_for_status(status: ContractorStatus) -> Option<StepId> {
    use ContractorStatus::*;
    match status {
        Draft => Some(StepId::StartDocuments),
        PendingDocuments => Some(StepId::DocumentsUploaded),
        DocumentsUploaded => Some(StepId::RouteSelection),
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
