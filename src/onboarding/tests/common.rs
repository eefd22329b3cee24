use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};

use crate::onboarding::domain::{ContractorId, OnboardingRoute, StepId};
use crate::onboarding::repository::{
    InMemoryContractorRepository, Notification, Notifier, NotifyError,
};
use crate::onboarding::service::OnboardingService;
use crate::onboarding::strategy::StrategyRegistry;

/// Captures every outbound notification so tests can assert on recipients,
/// events, and attached tokens.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) type TestService = OnboardingService<InMemoryContractorRepository, RecordingNotifier>;

pub(super) fn service() -> (
    TestService,
    Arc<InMemoryContractorRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(InMemoryContractorRepository::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = OnboardingService::new(repository.clone(), notifier.clone());
    (service, repository, notifier)
}

/// A complete `documents` payload for the given route.
pub(super) fn documents_payload(route: OnboardingRoute) -> Value {
    let registry = StrategyRegistry::with_defaults();
    let documents: Map<String, Value> = registry
        .resolve(route)
        .expect("route registered")
        .required_documents()
        .iter()
        .map(|doc| {
            (
                doc.label().to_string(),
                json!(format!("drive://contractors/{}.pdf", doc.label())),
            )
        })
        .collect();
    json!({ "documents": documents })
}

pub(super) fn create_contractor(service: &TestService) -> ContractorId {
    service
        .create("Amina Hassan", "amina.hassan@example.com")
        .expect("create succeeds")
        .id
}

/// Draft → documents uploaded with the route chosen inline, landing at the
/// route's entry status.
pub(super) fn onboard_with_route(service: &TestService, route: OnboardingRoute) -> ContractorId {
    let id = create_contractor(service);
    service
        .advance(&id, StepId::StartDocuments, Value::Null)
        .expect("start documents succeeds");

    let mut payload = documents_payload(route);
    payload["route"] = json!(route.label());
    service
        .advance(&id, StepId::DocumentsUploaded, payload)
        .expect("documents uploaded with route succeeds");
    id
}

/// Drives any route from its entry status to `PendingReview`.
pub(super) fn drive_to_review(service: &TestService, id: &ContractorId, route: OnboardingRoute) {
    match route {
        OnboardingRoute::Uae => {
            service
                .advance(
                    id,
                    StepId::Cohf,
                    json!({
                        "employee_name": "Amina Hassan",
                        "remuneration": 18_000,
                        "third_party_id": "tp-uae-01",
                    }),
                )
                .expect("cohf submission succeeds");
            service
                .advance(id, StepId::CohfComplete, Value::Null)
                .expect("cohf signature succeeds");
            service
                .advance(id, StepId::CdsCosting, Value::Null)
                .expect("cds opening succeeds");
        }
        OnboardingRoute::Saudi => {
            service
                .advance(
                    id,
                    StepId::QuoteSheetReceived,
                    json!({ "quote_sheet_id": "qs-2026-014" }),
                )
                .expect("quote sheet succeeds");
        }
        _ => {}
    }
    service
        .advance(id, StepId::CdsComplete, json!({ "monthly_rate": 9_500 }))
        .expect("cds completion succeeds");
    service
        .advance(id, StepId::AdminReview, Value::Null)
        .expect("review submission succeeds");
}
