// Admin Shell - top-level back-office session: clients, notifications and form factories

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::{ApiClient, ApiTransport, ClientError, ClientResult, ListQuery};
use crate::config::Config;
use crate::core::{EntityId, Resource};
use crate::forms::{FormMode, FormSpec, FormState, NotificationQueue, SettingsForm, SubmissionState, Wizard};
use crate::models::{Page, Permission, Session};
use crate::schema::Draft;

pub struct AdminShell {
    client: ApiClient,
    notifications: NotificationQueue,
    session: Option<Session>,
    page_size: u32,
}

impl AdminShell {
    pub fn new(transport: Arc<dyn ApiTransport>, config: &Config) -> Self {
        Self {
            client: ApiClient::new(transport, &config.cache),
            notifications: NotificationQueue::new(),
            session: None,
            page_size: config.client.default_page_size,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether the logged-in user holds `permission`; false when logged out
    pub fn can(&self, permission: Permission) -> bool {
        self.session
            .as_ref()
            .map(|session| session.user.can(permission))
            .unwrap_or(false)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<&Session> {
        match self.client.auth().login(email, password).await {
            Ok(session) => {
                self.notifications
                    .success(format!("Welcome back, {}", session.user.name));
                Ok(&*self.session.insert(session))
            }
            Err(err) => {
                self.notifications.error(err.user_message());
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        self.client.auth().logout();
        if let Some(session) = self.session.take() {
            info!("{} logged out", session.user.email);
            self.notifications.info("Logged out");
        }
    }

    /// Wizard for a new record; `None` for forms that only edit
    pub fn create_wizard<F: FormSpec>(&self) -> Option<Wizard> {
        let form = F::form_state(FormMode::Create, F::defaults())?;
        Some(self.wizard::<F>(form))
    }

    /// Wizard over an existing record; a missing record yields an error and no draft
    pub async fn edit_wizard<F: FormSpec>(&self, id: EntityId) -> ClientResult<Wizard> {
        let record = self
            .client
            .resource(F::RESOURCE)
            .get_by_id(id)
            .await
            .inspect_err(|err| self.report(F::TITLE, err))?;

        let draft = match record {
            Value::Object(map) => map,
            _ => return Err(ClientError::Decode(format!("{} {} is not an object", F::TITLE, id))),
        };
        let form = F::form_state(FormMode::Edit(id), draft)
            .ok_or_else(|| ClientError::Decode(format!("{} has no edit form", F::TITLE)))?;
        Ok(self.wizard::<F>(form))
    }

    fn wizard<F: FormSpec>(&self, form: FormState) -> Wizard {
        Wizard::new(
            F::TITLE,
            F::steps(),
            form,
            self.client.resource(F::RESOURCE),
            self.notifications.clone(),
        )
    }

    /// One page of a collection using the configured page size unless the query sets one
    pub async fn list(&self, resource: Resource, query: ListQuery) -> ClientResult<Page<Value>> {
        let query = match query.limit {
            Some(_) => query,
            None => query.limit(self.page_size),
        };
        self.client
            .resource(resource)
            .list(&query)
            .await
            .inspect_err(|err| self.report(resource.label(), err))
    }

    pub async fn delete(&self, resource: Resource, id: EntityId) -> ClientResult<()> {
        let message = self
            .client
            .resource(resource)
            .delete(id)
            .await
            .inspect_err(|err| self.report(resource.label(), err))?;
        self.notifications.success(message);
        Ok(())
    }

    pub async fn bulk(&self, resource: Resource, action: &str, ids: &[EntityId]) -> ClientResult<()> {
        let message = self
            .client
            .resource(resource)
            .bulk(action, ids)
            .await
            .inspect_err(|err| self.report(resource.label(), err))?;
        self.notifications.success(message);
        Ok(())
    }

    /// Record totals per collection for the dashboard, fetched concurrently
    pub async fn overview(&self) -> ClientResult<BTreeMap<Resource, u64>> {
        let query = ListQuery::default().limit(1);
        let pages = join_all(Resource::ALL.into_iter().map(|resource| {
            let query = query.clone();
            async move {
                let page = self.client.resource(resource).list(&query).await;
                (resource, page)
            }
        }))
        .await;

        pages
            .into_iter()
            .map(|(resource, page)| {
                page.map(|page| (resource, page.pagination.total))
                    .inspect_err(|err| self.report(resource.label(), err))
            })
            .collect()
    }

    pub async fn load_settings(&self) -> ClientResult<FormState> {
        let settings = self
            .client
            .settings()
            .get()
            .await
            .inspect_err(|err| self.report("settings", err))?;
        let draft: Draft = match settings {
            Value::Object(map) => map,
            _ => Draft::new(),
        };
        Ok(SettingsForm::form_state(draft))
    }

    /// Validate locally and save; field errors never reach the server
    pub async fn save_settings(&self, form: &mut FormState) -> ClientResult<Value> {
        let normalized = match form.validate_all() {
            Ok(normalized) => normalized,
            Err(errors) => {
                self.notifications
                    .warning(format!("Please fix {} invalid field(s)", errors.len()));
                return Err(ClientError::Validation(errors));
            }
        };

        form.set_submission(SubmissionState::Submitting);
        match self.client.settings().update(&Value::Object(normalized)).await {
            Ok(saved) => {
                form.set_submission(SubmissionState::Success);
                self.notifications.success("Settings saved");
                Ok(saved)
            }
            Err(err) => {
                form.set_submission(SubmissionState::Error(err.user_message()));
                self.report("settings", &err);
                Err(err)
            }
        }
    }

    fn report(&self, what: &str, err: &ClientError) {
        match err {
            ClientError::NotFound(_) | ClientError::Validation(_) => {
                warn!("{}: {}", what, err)
            }
            _ => error!("{}: {}", what, err),
        }
        self.notifications.error(err.user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RouterTransport;
    use crate::forms::{
        BlogPostForm, CompleteOutcome, InquiryForm, NotificationLevel, PropertyForm, StepOutcome,
        UserForm,
    };
    use crate::test_fixtures::{valid_blog_post_draft, valid_property_draft};
    use crate::{api::create_router, app_state::AppState};
    use serde_json::json;

    async fn shell() -> AdminShell {
        let config = Config::default();
        let state = AppState::new(config.clone()).await.unwrap();
        let transport = Arc::new(RouterTransport::new(create_router(state)));
        AdminShell::new(transport, &config)
    }

    fn fill(wizard: &Wizard, draft: Draft) {
        for (path, value) in draft {
            wizard.set_field(&path, value);
        }
    }

    #[tokio::test]
    async fn test_login_sets_permissions() {
        let mut shell = shell().await;
        assert!(!shell.can(Permission::UsersWrite));
        assert!(shell.login("admin@example.com", "wrong").await.is_err());
        assert_eq!(
            shell.notifications().pop().unwrap().level,
            NotificationLevel::Error
        );

        let admin = Config::default().admin;
        shell.login(&admin.email, &admin.password).await.unwrap();
        assert!(shell.can(Permission::UsersWrite));

        shell.logout();
        assert!(shell.session().is_none());
    }

    #[tokio::test]
    async fn test_created_property_shows_in_list() {
        let shell = shell().await;
        let before = shell.list(Resource::Properties, ListQuery::default()).await.unwrap();
        assert_eq!(before.pagination.total, 0);

        let wizard = shell.create_wizard::<PropertyForm>().unwrap();
        fill(&wizard, valid_property_draft());
        while let StepOutcome::Advanced(_) = wizard.next() {}
        let record = match wizard.complete().await {
            CompleteOutcome::Submitted(record) => record,
            other => panic!("expected Submitted, got {:?}", other),
        };

        let after = shell.list(Resource::Properties, ListQuery::default()).await.unwrap();
        assert_eq!(after.pagination.total, 1);
        assert_eq!(after.pagination.limit, 10);
        assert_eq!(after.data[0]["id"], record["id"]);

        let overview = shell.overview().await.unwrap();
        assert_eq!(overview[&Resource::Properties], 1);
        assert_eq!(overview[&Resource::Users], 1);
    }

    #[tokio::test]
    async fn test_edit_wizard_updates_record() {
        let shell = shell().await;
        let wizard = shell.create_wizard::<BlogPostForm>().unwrap();
        fill(&wizard, valid_blog_post_draft());
        let CompleteOutcome::Submitted(created) = wizard.complete().await else {
            panic!("blog post should save");
        };
        let id = EntityId(created["id"].as_i64().unwrap());

        let editor = shell.edit_wizard::<BlogPostForm>(id).await.unwrap();
        assert_eq!(editor.mode(), FormMode::Edit(id));
        editor.set_field("title", json!("Prague market update, revised"));
        // Editing keeps the stored slug
        assert_eq!(editor.value("slug"), Some(json!("prague-market-update")));
        let CompleteOutcome::Submitted(updated) = editor.complete().await else {
            panic!("update should save");
        };
        assert_eq!(updated["title"], "Prague market update, revised");
        assert_eq!(updated["createdAt"], created["createdAt"]);
    }

    #[tokio::test]
    async fn test_missing_record_creates_no_wizard() {
        let shell = shell().await;
        let result = shell.edit_wizard::<PropertyForm>(EntityId(404)).await;
        assert!(matches!(result, Err(ClientError::NotFound(_))));
        assert_eq!(shell.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_user_password_rules() {
        let shell = shell().await;
        let wizard = shell.create_wizard::<UserForm>().unwrap();
        wizard.set_field("name", json!("Eva Dvořáková"));
        wizard.set_field("email", json!("eva@example.cz"));
        assert_eq!(wizard.next(), StepOutcome::Advanced(1));

        wizard.set_field("password", json!("Secret123"));
        wizard.set_field("confirmPassword", json!("Secret124"));
        match wizard.next() {
            StepOutcome::Blocked(errors) => {
                assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"))
            }
            other => panic!("expected Blocked, got {:?}", other),
        }

        wizard.set_field("confirmPassword", json!("Secret123"));
        assert_eq!(wizard.next(), StepOutcome::Advanced(2));
        let CompleteOutcome::Submitted(user) = wizard.complete().await else {
            panic!("user should save");
        };
        assert!(user.get("password").is_none());

        // Update only checks the length
        let id = EntityId(user["id"].as_i64().unwrap());
        let editor = shell.edit_wizard::<UserForm>(id).await.unwrap();
        editor.set_field("password", json!("alllowercase"));
        editor.set_field("confirmPassword", json!("alllowercase"));
        assert!(matches!(editor.complete().await, CompleteOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn test_inquiry_is_edit_only() {
        let shell = shell().await;
        assert!(shell.create_wizard::<InquiryForm>().is_none());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let shell = shell().await;
        let mut form = shell.load_settings().await.unwrap();
        form.set_field("itemsPerPage", json!(500));
        assert!(matches!(
            shell.save_settings(&mut form).await,
            Err(ClientError::Validation(_))
        ));

        form.set_field("itemsPerPage", json!("25"));
        let saved = shell.save_settings(&mut form).await.unwrap();
        assert_eq!(saved["itemsPerPage"], 25);
        assert_eq!(form.submission(), &SubmissionState::Success);
    }
}
