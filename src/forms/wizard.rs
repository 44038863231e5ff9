// Wizard - multi-step form over a shared FormState
// Step-local validation on navigation, full validation and submission on completion

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{error, info, warn};

use super::form_state::{FormMode, FormState, SubmissionState};
use super::notifications::NotificationQueue;
use crate::client::{ClientError, ResourceClient};
use crate::core::EntityId;
use crate::schema::{Draft, FieldErrors};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStep {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: &'static [&'static str],
    pub optional: bool,
}

impl WizardStep {
    pub fn new(id: &'static str, title: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            id,
            title,
            fields,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn owns(&self, path: &str) -> bool {
        self.fields.iter().any(|f| *f == path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Current step has errors; the index is unchanged
    Blocked(FieldErrors),
    Advanced(usize),
    /// Last step reached and valid; `complete()` may be called
    ReadyToSubmit,
    /// `skip()` on a step that is not optional
    NotOptional,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    Submitted(Value),
    /// Full validation failed; the wizard moved to the first step with an error
    Invalid(FieldErrors),
    /// The server rejected the submission; the draft is kept for a retry
    Failed(ClientError),
    /// A submission is already in flight or has succeeded; nothing was sent
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Editing,
    Submitting,
    Submitted,
}

struct WizardState {
    form: FormState,
    current: usize,
    phase: WizardPhase,
    result: Option<Value>,
}

pub struct Wizard {
    title: &'static str,
    steps: Vec<WizardStep>,
    client: Arc<ResourceClient>,
    notifications: NotificationQueue,
    state: Mutex<WizardState>,
}

impl Wizard {
    pub fn new(
        title: &'static str,
        steps: Vec<WizardStep>,
        form: FormState,
        client: Arc<ResourceClient>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            title,
            steps,
            client,
            notifications,
            state: Mutex::new(WizardState {
                form,
                current: 0,
                phase: WizardPhase::Editing,
                result: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.lock().current
    }

    /// `None` only for a wizard without steps, which behaves as a single-page form
    pub fn current_step(&self) -> Option<&WizardStep> {
        self.steps.get(self.current_index())
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index() + 1 >= self.steps.len()
    }

    pub fn phase(&self) -> WizardPhase {
        self.lock().phase
    }

    pub fn mode(&self) -> FormMode {
        self.lock().form.mode()
    }

    pub fn set_field(&self, path: &str, value: Value) {
        self.lock().form.set_field(path, value);
    }

    pub fn clear_field(&self, path: &str) {
        self.lock().form.clear_field(path);
    }

    pub fn value(&self, path: &str) -> Option<Value> {
        self.lock().form.value(path).cloned()
    }

    pub fn draft(&self) -> Draft {
        self.lock().form.draft().clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().form.errors().clone()
    }

    pub fn submission(&self) -> SubmissionState {
        self.lock().form.submission().clone()
    }

    /// The stored record once the wizard has been submitted
    pub fn result(&self) -> Option<Value> {
        self.lock().result.clone()
    }

    /// Validate the current step and move forward when it is valid
    pub fn next(&self) -> StepOutcome {
        let mut state = self.lock();
        let Some(step) = self.steps.get(state.current) else {
            return StepOutcome::ReadyToSubmit;
        };
        let errors = state.form.validate_paths(step.fields);
        if !errors.is_empty() {
            return StepOutcome::Blocked(errors);
        }
        if state.current + 1 >= self.steps.len() {
            return StepOutcome::ReadyToSubmit;
        }
        state.current += 1;
        StepOutcome::Advanced(state.current)
    }

    /// Move one step back without validating
    pub fn back(&self) -> usize {
        let mut state = self.lock();
        state.current = state.current.saturating_sub(1);
        state.current
    }

    /// Advance past an optional step without validating it
    pub fn skip(&self) -> StepOutcome {
        let mut state = self.lock();
        match self.steps.get(state.current) {
            None => return StepOutcome::ReadyToSubmit,
            Some(step) if !step.optional => return StepOutcome::NotOptional,
            Some(_) => {}
        }
        if state.current + 1 >= self.steps.len() {
            return StepOutcome::ReadyToSubmit;
        }
        state.current += 1;
        StepOutcome::Advanced(state.current)
    }

    /// Run full validation and submit through the resource client
    pub async fn complete(&self) -> CompleteOutcome {
        let (payload, mode) = {
            let mut state = self.lock();
            match state.phase {
                WizardPhase::Submitting => {
                    warn!("{}: submission already in flight", self.title);
                    return CompleteOutcome::Ignored;
                }
                WizardPhase::Submitted => {
                    warn!("{}: already saved, open a new form to edit again", self.title);
                    return CompleteOutcome::Ignored;
                }
                WizardPhase::Editing => {}
            }
            match state.form.validate_all() {
                Ok(normalized) => {
                    state.phase = WizardPhase::Submitting;
                    state.form.set_submission(SubmissionState::Submitting);
                    (Value::Object(normalized), state.form.mode())
                }
                Err(errors) => {
                    state.current = self.first_step_with_error(&errors, state.current);
                    drop(state);
                    warn!("{}: {} invalid field(s)", self.title, errors.len());
                    self.notifications
                        .warning(format!("Please fix {} invalid field(s)", errors.len()));
                    return CompleteOutcome::Invalid(errors);
                }
            }
        };

        let result = match mode {
            FormMode::Create => self.client.create(&payload).await,
            FormMode::Edit(id) => self.client.update(id, &payload).await,
        };

        let mut state = self.lock();
        match result {
            Ok(record) => {
                state.phase = WizardPhase::Submitted;
                state.form.set_submission(SubmissionState::Success);
                state.result = Some(record.clone());
                drop(state);
                let id = record
                    .get("id")
                    .and_then(Value::as_i64)
                    .map(EntityId::new);
                info!("{} saved (ID: {:?})", self.title, id);
                self.notifications.success(format!("{} saved", self.title));
                CompleteOutcome::Submitted(record)
            }
            Err(err) => {
                state.phase = WizardPhase::Editing;
                state
                    .form
                    .set_submission(SubmissionState::Error(err.user_message()));
                if let ClientError::Validation(errors) = &err {
                    state.current = self.first_step_with_error(errors, state.current);
                    state.form.set_errors(errors.clone());
                }
                drop(state);
                error!("{} failed to save: {}", self.title, err);
                self.notifications.error(err.user_message());
                CompleteOutcome::Failed(err)
            }
        }
    }

    fn first_step_with_error(&self, errors: &FieldErrors, fallback: usize) -> usize {
        self.steps
            .iter()
            .position(|step| errors.paths().any(|path| step.owns(path)))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ApiRequest, ApiResponse, ApiTransport, ClientResult, RouterTransport};
    use crate::core::Resource;
    use crate::forms::specs::{FormSpec, PropertyForm};
    use crate::test_fixtures::valid_property_draft;
    use crate::{api::create_router, app_state::AppState, config::Config};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        inner: RouterTransport,
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ApiTransport for CountingTransport {
        async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                return Err(ClientError::Transport("connection refused".into()));
            }
            self.inner.send(request).await
        }
    }

    async fn setup(fail: bool) -> (Arc<CountingTransport>, ApiClient, NotificationQueue) {
        let config = Config::default();
        let state = AppState::new(config.clone()).await.unwrap();
        let transport = Arc::new(CountingTransport {
            inner: RouterTransport::new(create_router(state)),
            calls: AtomicUsize::new(0),
            fail,
        });
        let client = ApiClient::new(transport.clone(), &config.cache);
        (transport, client, NotificationQueue::new())
    }

    fn property_wizard(client: &ApiClient, notifications: &NotificationQueue, initial: Draft) -> Wizard {
        let form = FormState::new(PropertyForm::create_schema().unwrap(), FormMode::Create, initial);
        Wizard::new(
            PropertyForm::TITLE,
            PropertyForm::steps(),
            form,
            client.resource(Resource::Properties),
            notifications.clone(),
        )
    }

    #[tokio::test]
    async fn test_next_blocks_on_invalid_first_step() {
        let (_, client, notifications) = setup(false).await;
        let wizard = property_wizard(&client, &notifications, Draft::new());
        wizard.set_field("title", json!("abc"));

        match wizard.next() {
            StepOutcome::Blocked(errors) => {
                assert!(!errors.is_empty());
                assert!(errors.paths().all(|p| wizard.steps()[0].owns(p)));
                assert!(errors.contains("title"));
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
        assert_eq!(wizard.current_index(), 0);
    }

    #[tokio::test]
    async fn test_navigation() {
        let (_, client, notifications) = setup(false).await;
        let wizard = property_wizard(&client, &notifications, valid_property_draft());

        assert_eq!(wizard.back(), 0);
        assert_eq!(wizard.skip(), StepOutcome::NotOptional);
        assert_eq!(wizard.next(), StepOutcome::Advanced(1));
        assert_eq!(wizard.next(), StepOutcome::Advanced(2));
        assert_eq!(wizard.back(), 1);
        assert_eq!(wizard.next(), StepOutcome::Advanced(2));
        assert_eq!(wizard.next(), StepOutcome::Advanced(3));
        assert_eq!(wizard.next(), StepOutcome::Advanced(4));
        assert!(wizard.current_step().unwrap().optional);
        assert!(wizard.is_last_step());
        assert_eq!(wizard.skip(), StepOutcome::ReadyToSubmit);
        assert_eq!(wizard.next(), StepOutcome::ReadyToSubmit);
    }

    #[tokio::test]
    async fn test_complete_jumps_to_first_errored_step() {
        let (transport, client, notifications) = setup(false).await;
        let mut draft = valid_property_draft();
        draft.insert("images".into(), json!([]));
        draft.remove("mainImage");
        let wizard = property_wizard(&client, &notifications, draft);
        for _ in 0..4 {
            wizard.next();
        }
        assert_eq!(wizard.current_index(), 3);
        wizard.back();
        wizard.back();
        wizard.back();

        match wizard.complete().await {
            CompleteOutcome::Invalid(errors) => assert!(errors.contains("images")),
            other => panic!("expected Invalid, got {:?}", other),
        }
        assert_eq!(wizard.current_index(), 3);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_creates_record() {
        let (_, client, notifications) = setup(false).await;
        let wizard = property_wizard(&client, &notifications, valid_property_draft());

        let record = match wizard.complete().await {
            CompleteOutcome::Submitted(record) => record,
            other => panic!("expected Submitted, got {:?}", other),
        };
        assert!(record["id"].as_i64().is_some());
        assert_eq!(wizard.phase(), WizardPhase::Submitted);
        assert_eq!(wizard.submission(), SubmissionState::Success);
        assert_eq!(wizard.result(), Some(record));
        assert_eq!(notifications.pop().unwrap().message, "Property saved");
    }

    #[tokio::test]
    async fn test_concurrent_complete_sends_once() {
        let (transport, client, notifications) = setup(false).await;
        let wizard = property_wizard(&client, &notifications, valid_property_draft());

        let (first, second) = tokio::join!(wizard.complete(), wizard.complete());
        let outcomes = [first, second];
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, CompleteOutcome::Submitted(_)))
                .count(),
            1
        );
        assert!(outcomes.iter().any(|o| *o == CompleteOutcome::Ignored));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submitted_wizard_does_not_resubmit() {
        let (transport, client, notifications) = setup(false).await;
        let wizard = property_wizard(&client, &notifications, valid_property_draft());

        assert!(matches!(wizard.complete().await, CompleteOutcome::Submitted(_)));
        assert_eq!(wizard.complete().await, CompleteOutcome::Ignored);
        assert_eq!(wizard.phase(), WizardPhase::Submitted);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let page = client
            .resource(Resource::Properties)
            .list(&crate::client::ListQuery::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_independent_wizards_save_concurrently() {
        let (transport, client, notifications) = setup(false).await;
        let mut other = valid_property_draft();
        other.insert("title".into(), json!("Byt 3+kk na Smíchově"));
        let first = property_wizard(&client, &notifications, valid_property_draft());
        let second = property_wizard(&client, &notifications, other);

        let (a, b) = tokio::join!(first.complete(), second.complete());
        assert!(matches!(a, CompleteOutcome::Submitted(_)));
        assert!(matches!(b, CompleteOutcome::Submitted(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert_eq!(notifications.len(), 2);
    }

    #[tokio::test]
    async fn test_wizard_without_steps_is_single_page() {
        let (_, client, notifications) = setup(false).await;
        let form = FormState::new(
            PropertyForm::create_schema().unwrap(),
            FormMode::Create,
            valid_property_draft(),
        );
        let wizard = Wizard::new(
            PropertyForm::TITLE,
            Vec::new(),
            form,
            client.resource(Resource::Properties),
            notifications.clone(),
        );

        assert!(wizard.current_step().is_none());
        assert_eq!(wizard.next(), StepOutcome::ReadyToSubmit);
        assert_eq!(wizard.skip(), StepOutcome::ReadyToSubmit);
        assert_eq!(wizard.back(), 0);
        assert!(matches!(wizard.complete().await, CompleteOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn test_network_failure_keeps_draft() {
        let (_, client, notifications) = setup(true).await;
        let wizard = property_wizard(&client, &notifications, valid_property_draft());

        assert!(matches!(
            wizard.complete().await,
            CompleteOutcome::Failed(ClientError::Transport(_))
        ));
        assert_eq!(wizard.phase(), WizardPhase::Editing);
        assert!(matches!(wizard.submission(), SubmissionState::Error(_)));
        assert_eq!(wizard.draft(), valid_property_draft());

        let notification = notifications.pop().unwrap();
        assert_eq!(notification.level, crate::forms::NotificationLevel::Error);
    }
}
