use super::domain::ContractorStatus;

/// Raised when a proposed status is not in the current status's successor set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition from '{from}' to '{to}'")]
pub struct InvalidTransition {
    pub from: ContractorStatus,
    pub to: ContractorStatus,
}

/// Stateless enforcement point for lifecycle integrity.
///
/// The successor table is the union of every route branch; it alone decides
/// whether a transition is legal. Route eligibility (e.g. COHF statuses only
/// on the UAE route) is the strategies' concern, never checked here.
pub struct ContractorStateMachine;

impl ContractorStateMachine {
    /// The fixed successor set for a status. Total over the status enum and
    /// free of self-edges, so a no-op transition is always denied.
    pub const fn successors(status: ContractorStatus) -> &'static [ContractorStatus] {
        use ContractorStatus::*;
        match status {
            Draft => &[PendingDocuments, Cancelled],
            PendingDocuments => &[DocumentsUploaded, Cancelled],
            // Route selection decides which of the first three applies.
            DocumentsUploaded => &[
                PendingCohf,
                PendingThirdPartyQuote,
                PendingCdsCs,
                Cancelled,
            ],
            PendingCohf => &[AwaitingCohfSignature, Cancelled],
            // Can be sent back to PendingCohf for edits.
            AwaitingCohfSignature => &[CohfCompleted, PendingCohf, Cancelled],
            CohfCompleted => &[PendingCdsCs, Cancelled],
            PendingThirdPartyQuote => &[PendingCdsCs, Cancelled],
            PendingCdsCs => &[CdsCsCompleted, Cancelled],
            CdsCsCompleted => &[PendingReview, Cancelled],
            // PendingCdsCs here is the recall-for-edits edge.
            PendingReview => &[Approved, Rejected, PendingCdsCs],
            Approved => &[PendingClientWoSignature, Cancelled],
            // Recovery edge: a rejected contractor restarts the whole cycle.
            Rejected => &[Draft, Cancelled],
            PendingClientWoSignature => &[WorkOrderCompleted, Approved, Cancelled],
            WorkOrderCompleted => &[PendingThirdPartyContract, PendingSignature, Cancelled],
            PendingThirdPartyContract => &[ContractApproved, Cancelled],
            ContractApproved => &[PendingSignature, Cancelled],
            PendingSignature => &[Signed, Cancelled],
            Signed => &[Active],
            Active => &[Suspended, Terminated],
            Suspended => &[Active, Terminated],
            Cancelled => &[],
            Terminated => &[],
        }
    }

    pub fn can_transition(from: ContractorStatus, to: ContractorStatus) -> bool {
        Self::successors(from).contains(&to)
    }

    /// Returns `to` when the edge exists; the single chokepoint every status
    /// write must pass through.
    pub fn transition(
        from: ContractorStatus,
        to: ContractorStatus,
    ) -> Result<ContractorStatus, InvalidTransition> {
        if Self::can_transition(from, to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from, to })
        }
    }

    pub fn allowed_transitions(from: ContractorStatus) -> &'static [ContractorStatus] {
        Self::successors(from)
    }

    pub const fn is_terminal(status: ContractorStatus) -> bool {
        Self::successors(status).is_empty()
    }
}
