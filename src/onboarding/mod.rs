//! Contractor onboarding workflow core.
//!
//! A contractor record moves through a global status graph enforced by
//! [`state_machine::ContractorStateMachine`]. Route-specific behavior lives in
//! [`strategy`] implementations resolved through a registry, and steps that
//! hand control to an external party mint single-use tokens from
//! [`token::TokenVault`]. The [`service::OnboardingService`] orchestrator is
//! the only component that persists or notifies.

pub mod domain;
pub mod record;
pub mod repository;
pub mod service;
pub mod state_machine;
pub mod strategy;
pub mod token;

#[cfg(test)]
mod tests;

pub use domain::{
    ContractorId, ContractorStatus, DocumentType, OnboardingRoute, ReviewDecision, StepId,
};
pub use record::ContractorRecord;
pub use repository::{
    ContractorRepository, InMemoryContractorRepository, Notification, NotificationEvent,
    NotificationRecipient, Notifier, NotifyError, RepositoryError,
};
pub use service::{AdvanceOutcome, OnboardingService, WorkflowView};
pub use state_machine::{ContractorStateMachine, InvalidTransition};
pub use strategy::{
    FreelancerStrategy, OffshoreStrategy, OnboardingStrategy, RouteInfo, SaudiStrategy,
    StepOutOfSequence, StepOutcome, StrategyRegistry, UaeStrategy, UnknownRoute, WorkflowStep,
    WpsStrategy,
};
pub use token::{
    ActionToken, ConsumedReason, TokenError, TokenGrant, TokenScope, TokenVault,
};
