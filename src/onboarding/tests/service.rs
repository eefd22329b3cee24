use serde_json::{json, Value};

use super::common::{
    create_contractor, documents_payload, drive_to_review, onboard_with_route, service,
};
use crate::error::OnboardingError;
use crate::onboarding::domain::{ContractorId, ContractorStatus, OnboardingRoute, StepId};
use crate::onboarding::repository::{
    ContractorRepository, NotificationEvent, NotificationRecipient, RepositoryError,
};
use crate::onboarding::token::TokenScope;

#[test]
fn create_starts_a_draft_record() {
    let (service, repository, _) = service();
    let id = create_contractor(&service);

    let record = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(record.status, ContractorStatus::Draft);
    assert!(record.route.is_none());
    assert!(record.documents.is_empty());
}

#[test]
fn start_documents_issues_an_upload_token_to_the_contractor() {
    let (service, _, notifier) = service();
    let id = create_contractor(&service);

    let outcome = service
        .advance(&id, StepId::StartDocuments, Value::Null)
        .expect("start documents succeeds");

    assert_eq!(outcome.status, ContractorStatus::PendingDocuments);
    let token = outcome.issued_token.expect("upload token issued");
    assert_eq!(token.scope, TokenScope::UploadDocuments);
    assert_eq!(token.owner, id);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, NotificationRecipient::Contractor);
    assert_eq!(
        sent[0].event,
        NotificationEvent::ExternalActionRequired {
            scope: TokenScope::UploadDocuments
        }
    );
    assert_eq!(sent[0].token.as_ref(), Some(&token));
}

#[test]
fn documents_with_inline_route_reach_the_route_entry_status() {
    let (service, repository, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);

    let record = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(record.status, ContractorStatus::PendingCdsCs);
    assert_eq!(record.route, Some(OnboardingRoute::Offshore));
    assert_eq!(record.documents.len(), 3);
}

#[test]
fn route_selection_as_a_separate_step_also_works() {
    let (service, repository, _) = service();
    let id = create_contractor(&service);
    service
        .advance(&id, StepId::StartDocuments, Value::Null)
        .expect("start documents succeeds");
    service
        .advance(
            &id,
            StepId::DocumentsUploaded,
            documents_payload(OnboardingRoute::Saudi),
        )
        .expect("documents without route succeed");

    let record = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(record.status, ContractorStatus::DocumentsUploaded);
    assert!(record.route.is_none());

    let outcome = service
        .advance(&id, StepId::RouteSelection, json!({ "route": "saudi" }))
        .expect("route selection succeeds");
    assert_eq!(outcome.status, ContractorStatus::PendingThirdPartyQuote);
    assert_eq!(
        outcome.issued_token.expect("quote token issued").scope,
        TokenScope::SubmitQuoteSheet
    );
}

#[test]
fn route_selection_rejects_incomplete_documents() {
    let (service, _, _) = service();
    let id = create_contractor(&service);
    service
        .advance(&id, StepId::StartDocuments, Value::Null)
        .expect("start documents succeeds");
    service
        .advance(
            &id,
            StepId::DocumentsUploaded,
            json!({ "documents": { "passport": "drive://contractors/passport.pdf" } }),
        )
        .expect("partial upload still records the step");

    match service.advance(&id, StepId::RouteSelection, json!({ "route": "uae" })) {
        Err(OnboardingError::IncompleteStepData { step, missing }) => {
            assert_eq!(step, StepId::RouteSelection);
            assert_eq!(missing, ["photo", "emirates_id", "visa", "degree"]);
        }
        other => panic!("expected incomplete document set, got {other:?}"),
    }
}

#[test]
fn route_cannot_be_selected_twice() {
    let (service, _, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Freelancer);

    match service.advance(&id, StepId::RouteSelection, json!({ "route": "wps" })) {
        Err(OnboardingError::RouteAlreadySelected { route, .. }) => {
            assert_eq!(route, OnboardingRoute::Freelancer);
        }
        other => panic!("expected route conflict, got {other:?}"),
    }
}

#[test]
fn route_specific_step_requires_a_route() {
    let (service, _, _) = service();
    let id = create_contractor(&service);

    match service.advance(&id, StepId::CdsComplete, Value::Null) {
        Err(OnboardingError::NoRouteSelected(missing)) => assert_eq!(missing, id),
        other => panic!("expected missing route, got {other:?}"),
    }
}

#[test]
fn step_outside_the_route_workflow_is_unknown() {
    let (service, _, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);

    match service.advance(&id, StepId::Cohf, Value::Null) {
        Err(OnboardingError::UnknownStep { route, step }) => {
            assert_eq!(route, OnboardingRoute::Offshore);
            assert_eq!(step, StepId::Cohf);
        }
        other => panic!("expected unknown step, got {other:?}"),
    }
}

#[test]
fn invalid_transitions_surface_unchanged() {
    let (service, repository, _) = service();
    let id = create_contractor(&service);

    // documents_uploaded cannot run while still in draft.
    match service.advance(&id, StepId::DocumentsUploaded, Value::Null) {
        Err(OnboardingError::Transition(err)) => {
            assert_eq!(err.from, ContractorStatus::Draft);
            assert_eq!(err.to, ContractorStatus::DocumentsUploaded);
        }
        other => panic!("expected transition error, got {other:?}"),
    }

    // The failed call must not have persisted anything.
    let record = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(record.status, ContractorStatus::Draft);
    assert_eq!(record.version, 0);
}

#[test]
fn incomplete_step_payload_is_rejected_before_execution() {
    let (service, _, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Saudi);

    match service.advance(&id, StepId::QuoteSheetReceived, json!({})) {
        Err(OnboardingError::IncompleteStepData { missing, .. }) => {
            assert_eq!(missing, ["quote_sheet_id"]);
        }
        other => panic!("expected missing quote sheet id, got {other:?}"),
    }
}

#[test]
fn rejection_then_restart_clears_the_record() {
    let (service, repository, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);
    drive_to_review(&service, &id, OnboardingRoute::Offshore);

    let rejected = service
        .advance(&id, StepId::ReviewDecision, json!({ "decision": "reject" }))
        .expect("rejection succeeds");
    assert_eq!(rejected.status, ContractorStatus::Rejected);

    let restarted = service
        .advance(&id, StepId::Restart, Value::Null)
        .expect("restart succeeds");
    assert_eq!(restarted.status, ContractorStatus::Draft);

    let record = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");
    assert!(record.route.is_none());
    assert!(record.documents.is_empty());
    assert!(record.step_data.is_empty());
}

#[test]
fn restart_outside_rejected_is_denied() {
    let (service, _, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);

    assert!(matches!(
        service.advance(&id, StepId::Restart, Value::Null),
        Err(OnboardingError::Transition(_))
    ));
}

#[test]
fn cancel_works_mid_workflow() {
    let (service, _, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Uae);

    let outcome = service
        .advance(&id, StepId::Cancel, Value::Null)
        .expect("cancel succeeds");
    assert_eq!(outcome.status, ContractorStatus::Cancelled);

    // Nothing moves out of a cancelled record.
    assert!(matches!(
        service.advance(&id, StepId::StartDocuments, Value::Null),
        Err(OnboardingError::Transition(_))
    ));
}

#[test]
fn unknown_contractor_is_reported() {
    let (service, _, _) = service();
    let missing = ContractorId("ctr-999999".to_string());
    assert!(matches!(
        service.advance(&missing, StepId::StartDocuments, Value::Null),
        Err(OnboardingError::NotFound(_))
    ));
    assert!(matches!(
        service.workflow_view(&missing),
        Err(OnboardingError::NotFound(_))
    ));
}

#[test]
fn tokens_resolve_and_consume_through_the_service() {
    let (service, _, _) = service();
    let id = create_contractor(&service);
    let outcome = service
        .advance(&id, StepId::StartDocuments, Value::Null)
        .expect("start documents succeeds");
    let token = outcome.issued_token.expect("upload token issued");

    let grant = service
        .resolve_by_token(&token.value)
        .expect("token resolves");
    assert_eq!(grant.contractor_id, id);
    assert_eq!(grant.scope, TokenScope::UploadDocuments);

    service.consume_token(&token.value).expect("token consumes");
    assert!(matches!(
        service.consume_token(&token.value),
        Err(OnboardingError::Token(_))
    ));
}

#[test]
fn status_changes_without_external_action_notify_the_operator() {
    let (service, _, notifier) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);

    service
        .advance(&id, StepId::CdsComplete, Value::Null)
        .expect("cds completion succeeds");

    let sent = notifier.sent();
    let last = sent.last().expect("notification recorded");
    assert_eq!(last.recipient, NotificationRecipient::Operator);
    assert_eq!(
        last.event,
        NotificationEvent::StatusChanged {
            status: ContractorStatus::CdsCsCompleted
        }
    );
    assert!(last.token.is_none());
}

#[test]
fn workflow_view_reports_position_and_progress() {
    let (service, _, _) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);

    let view = service.workflow_view(&id).expect("view available");
    assert_eq!(view.status, ContractorStatus::PendingCdsCs);
    assert_eq!(view.route, Some(OnboardingRoute::Offshore));
    assert_eq!(view.current_step, Some(StepId::CdsComplete));
    assert_eq!(
        view.completed_steps,
        [
            StepId::StartDocuments,
            StepId::DocumentsUploaded,
            StepId::RouteSelection
        ]
    );
    assert!(view.pending_steps.contains(&StepId::Activation));
    assert_eq!(
        view.allowed_statuses,
        [ContractorStatus::CdsCsCompleted, ContractorStatus::Cancelled]
    );
}

#[test]
fn workflow_view_before_route_selection_has_no_steps() {
    let (service, _, _) = service();
    let id = create_contractor(&service);

    let view = service.workflow_view(&id).expect("view available");
    assert_eq!(view.status, ContractorStatus::Draft);
    assert!(view.steps.is_empty());
    assert!(view.current_step.is_none());
    assert_eq!(view.allowed_statuses.len(), 2);
}

#[test]
fn lifecycle_operations_follow_the_machine() {
    let (service, _, _) = service();
    let id = activate_offshore(&service);

    assert_eq!(
        service.suspend(&id).expect("suspend succeeds"),
        ContractorStatus::Suspended
    );
    assert_eq!(
        service.reactivate(&id).expect("reactivate succeeds"),
        ContractorStatus::Active
    );
    assert_eq!(
        service.terminate(&id).expect("terminate succeeds"),
        ContractorStatus::Terminated
    );
    assert!(matches!(
        service.reactivate(&id),
        Err(OnboardingError::Transition(_))
    ));
}

#[test]
fn resend_recovers_a_lost_external_action_link() {
    let (service, _, notifier) = service();
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);
    drive_to_review(&service, &id, OnboardingRoute::Offshore);
    service
        .advance(&id, StepId::ReviewDecision, json!({ "decision": "approve" }))
        .expect("approval succeeds");
    let first = service
        .advance(&id, StepId::WorkOrder, Value::Null)
        .expect("work order succeeds")
        .issued_token
        .expect("signing link issued");

    // The link never reached the client; the same signing action is pending,
    // so a replacement can be derived from the status alone.
    let second = service
        .resend_external_action(&id)
        .expect("resend succeeds");
    assert_eq!(second.scope, TokenScope::SignWorkOrder);
    assert_ne!(second.value, first.value);

    assert!(service.resolve_by_token(&first.value).is_err());
    service
        .consume_token(&second.value)
        .expect("fresh link consumes");

    let last = notifier.sent().pop().expect("notification recorded");
    assert_eq!(last.recipient, NotificationRecipient::Client);
    assert_eq!(last.token.map(|token| token.value), Some(second.value));
}

#[test]
fn resend_requires_a_pending_external_action() {
    let (service, _, _) = service();
    // PendingCdsCs waits on an internal operator step, not an external party.
    let id = onboard_with_route(&service, OnboardingRoute::Offshore);

    assert!(matches!(
        service.resend_external_action(&id),
        Err(OnboardingError::NoExternalActionPending(_))
    ));
}

#[test]
fn stale_record_writes_are_rejected() {
    let (service, repository, _) = service();
    let id = create_contractor(&service);
    let stale = repository
        .fetch(&id)
        .expect("fetch succeeds")
        .expect("record present");

    service
        .advance(&id, StepId::StartDocuments, Value::Null)
        .expect("advance bumps the version");

    match repository.update(stale) {
        Err(RepositoryError::StaleVersion) => {}
        other => panic!("expected stale version rejection, got {other:?}"),
    }
}

#[test]
fn created_ids_are_random_not_sequential() {
    let (service, _, _) = service();
    let first = create_contractor(&service);
    let second = create_contractor(&service);

    assert_ne!(first, second);
    for id in [&first, &second] {
        // "ctr-" plus 8 random bytes, base64url without padding.
        assert!(id.0.starts_with("ctr-"));
        assert_eq!(id.0.len(), 15);
    }
}

#[test]
fn finished_workflow_reports_every_step_completed() {
    let (service, _, _) = service();
    let id = activate_offshore(&service);

    let view = service.workflow_view(&id).expect("view available");
    assert!(view.current_step.is_none());
    assert_eq!(view.completed_steps.len(), view.steps.len());
    assert!(view.pending_steps.is_empty());
}

#[test]
fn available_routes_and_required_documents_are_exposed() {
    let (service, _, _) = service();
    assert_eq!(service.available_routes().len(), 5);
    let docs = service
        .required_documents(OnboardingRoute::Freelancer)
        .expect("route registered");
    assert_eq!(docs.len(), 2);
}

/// Full offshore run used by the lifecycle test.
fn activate_offshore(
    service: &super::common::TestService,
) -> ContractorId {
    let id = onboard_with_route(service, OnboardingRoute::Offshore);
    drive_to_review(service, &id, OnboardingRoute::Offshore);
    service
        .advance(&id, StepId::ReviewDecision, json!({ "decision": "approve" }))
        .expect("approval succeeds");
    service
        .advance(&id, StepId::WorkOrder, Value::Null)
        .expect("work order succeeds");
    service
        .advance(&id, StepId::WorkOrderComplete, Value::Null)
        .expect("work order signature succeeds");
    service
        .advance(&id, StepId::Contract, Value::Null)
        .expect("contract succeeds");
    service
        .advance(&id, StepId::ContractSigned, json!({ "signature": "sig-ok" }))
        .expect("contract signature succeeds");
    service
        .advance(&id, StepId::Activation, Value::Null)
        .expect("activation succeeds");
    id
}
