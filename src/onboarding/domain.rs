use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for contractor records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractorId(pub String);

impl fmt::Display for ContractorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every position a contractor record can occupy in its lifecycle.
///
/// Persisted as stable snake_case strings; adding a status never renumbers
/// existing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractorStatus {
    Draft,
    PendingDocuments,
    DocumentsUploaded,

    // UAE route (COHF)
    PendingCohf,
    AwaitingCohfSignature,
    CohfCompleted,

    // Saudi route (quote sheet)
    PendingThirdPartyQuote,

    // CDS and costing
    PendingCdsCs,
    CdsCsCompleted,

    // Admin review
    PendingReview,
    Approved,
    Rejected,

    // Work order
    PendingClientWoSignature,
    WorkOrderCompleted,

    // Contract stages
    #[serde(rename = "pending_3rd_party_contract")]
    PendingThirdPartyContract,
    ContractApproved,
    PendingSignature,
    Signed,

    // Final states
    Active,
    Suspended,
    Cancelled,
    Terminated,
}

impl ContractorStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingDocuments => "pending_documents",
            Self::DocumentsUploaded => "documents_uploaded",
            Self::PendingCohf => "pending_cohf",
            Self::AwaitingCohfSignature => "awaiting_cohf_signature",
            Self::CohfCompleted => "cohf_completed",
            Self::PendingThirdPartyQuote => "pending_third_party_quote",
            Self::PendingCdsCs => "pending_cds_cs",
            Self::CdsCsCompleted => "cds_cs_completed",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PendingClientWoSignature => "pending_client_wo_signature",
            Self::WorkOrderCompleted => "work_order_completed",
            Self::PendingThirdPartyContract => "pending_3rd_party_contract",
            Self::ContractApproved => "contract_approved",
            Self::PendingSignature => "pending_signature",
            Self::Signed => "signed",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
            Self::Terminated => "terminated",
        }
    }

    /// Statuses a record only reaches after the onboarding workflow finished.
    pub const fn is_post_activation(self) -> bool {
        matches!(self, Self::Active | Self::Suspended | Self::Terminated)
    }
}

impl fmt::Display for ContractorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five fixed onboarding routes. Each determines step order and how the
/// employment contract is handled. Freelancer, WPS, and Offshore share a step
/// sequence but remain distinct identifiers; reporting depends on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingRoute {
    Wps,
    Freelancer,
    Uae,
    Saudi,
    Offshore,
}

impl OnboardingRoute {
    pub const fn all() -> [Self; 5] {
        [
            Self::Wps,
            Self::Freelancer,
            Self::Uae,
            Self::Saudi,
            Self::Offshore,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Wps => "wps",
            Self::Freelancer => "freelancer",
            Self::Uae => "uae",
            Self::Saudi => "saudi",
            Self::Offshore => "offshore",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Wps => "WPS (Work Permit System)",
            Self::Freelancer => "Freelancer",
            Self::Uae => "3rd Party UAE",
            Self::Saudi => "3rd Party Saudi Arabia",
            Self::Offshore => "Offshore/International",
        }
    }

    pub const fn requires_third_party(self) -> bool {
        matches!(self, Self::Uae | Self::Saudi)
    }

    pub const fn requires_cohf(self) -> bool {
        matches!(self, Self::Uae)
    }

    pub const fn requires_quote_sheet(self) -> bool {
        matches!(self, Self::Saudi)
    }
}

impl fmt::Display for OnboardingRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Document kinds collected during onboarding. Which are required depends on
/// the route.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    Photo,
    Visa,
    EmiratesId,
    Degree,
    Iqama,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Photo => "photo",
            Self::Visa => "visa",
            Self::EmiratesId => "emirates_id",
            Self::Degree => "degree",
            Self::Iqama => "iqama",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed set of workflow step identifiers across all routes.
///
/// `StartDocuments`, `DocumentsUploaded`, and `RouteSelection` run before a
/// route exists and are handled by the orchestrator directly, as are the
/// lifecycle steps `Restart` and `Cancel`. Everything else dispatches to the
/// resolved route strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    StartDocuments,
    DocumentsUploaded,
    RouteSelection,
    Cohf,
    CohfComplete,
    QuoteSheetReceived,
    CdsCosting,
    CdsComplete,
    AdminReview,
    ReviewDecision,
    WorkOrder,
    WorkOrderComplete,
    Contract,
    ThirdPartyContract,
    SendContract,
    ContractSigned,
    Activation,
    Restart,
    Cancel,
}

impl StepId {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StartDocuments => "start_documents",
            Self::DocumentsUploaded => "documents_uploaded",
            Self::RouteSelection => "route_selection",
            Self::Cohf => "cohf",
            Self::CohfComplete => "cohf_complete",
            Self::QuoteSheetReceived => "quote_sheet_received",
            Self::CdsCosting => "cds_costing",
            Self::CdsComplete => "cds_complete",
            Self::AdminReview => "admin_review",
            Self::ReviewDecision => "review_decision",
            Self::WorkOrder => "work_order",
            Self::WorkOrderComplete => "work_order_complete",
            Self::Contract => "contract",
            Self::ThirdPartyContract => "third_party_contract",
            Self::SendContract => "send_contract",
            Self::ContractSigned => "contract_signed",
            Self::Activation => "activation",
            Self::Restart => "restart",
            Self::Cancel => "cancel",
        }
    }

    /// Steps the orchestrator executes without resolving a route strategy.
    pub const fn is_orchestrator_step(self) -> bool {
        matches!(
            self,
            Self::StartDocuments
                | Self::DocumentsUploaded
                | Self::RouteSelection
                | Self::Restart
                | Self::Cancel
        )
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the admin review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}
