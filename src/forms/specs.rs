// Form definitions - steps, schemas and defaults of each back-office form

use serde_json::{json, Value};

use super::form_state::{FormMode, FormState, SlugBinding};
use super::wizard::WizardStep;
use crate::core::{EntityId, Resource};
use crate::schema::{Draft, EntitySchema, Schema};
use crate::schemas::{
    blog_post_schema, property_schema, user_schema, BlogPostSchema, CreateUserSchema,
    InquiryUpdateSchema, PropertySchema, SettingsSchema, UpdateUserSchema,
};

pub trait FormSpec {
    /// Used in notifications, e.g. "Property saved"
    const TITLE: &'static str;
    const RESOURCE: Resource;

    fn steps() -> Vec<WizardStep>;

    /// `None` when records of this kind are never created from the back office
    fn create_schema() -> Option<Schema>;

    fn update_schema() -> Schema;

    fn slug_binding() -> Option<SlugBinding> {
        None
    }

    /// Starting draft of the create form
    fn defaults() -> Draft {
        Draft::new()
    }

    /// Form state for `mode`, or `None` if the mode is not supported
    fn form_state(mode: FormMode, initial: Draft) -> Option<FormState> {
        let schema = match mode {
            FormMode::Create => Self::create_schema()?,
            FormMode::Edit(_) => Self::update_schema(),
        };
        let form = FormState::new(schema, mode, initial);
        Some(match Self::slug_binding() {
            Some(binding) => form.with_slug_binding(binding),
            None => form,
        })
    }
}

fn object(value: Value) -> Draft {
    match value {
        Value::Object(map) => map,
        _ => Draft::new(),
    }
}

pub struct PropertyForm;

impl FormSpec for PropertyForm {
    const TITLE: &'static str = "Property";
    const RESOURCE: Resource = Resource::Properties;

    fn steps() -> Vec<WizardStep> {
        vec![
            WizardStep::new("basic", "Basic information", property_schema::BASIC_FIELDS),
            WizardStep::new("location", "Location", property_schema::LOCATION_FIELDS),
            WizardStep::new("details", "Details", property_schema::DETAIL_FIELDS),
            WizardStep::new("media", "Photos", property_schema::MEDIA_FIELDS),
            WizardStep::new("seo", "SEO", property_schema::SEO_FIELDS).optional(),
        ]
    }

    fn create_schema() -> Option<Schema> {
        Some(PropertySchema::schema())
    }

    fn update_schema() -> Schema {
        PropertySchema::schema()
    }

    fn defaults() -> Draft {
        object(json!({
            "status": "DRAFT",
            "currency": "CZK",
            "bedrooms": 0,
            "bathrooms": 0,
            "amenities": [],
            "images": [],
        }))
    }
}

pub struct BlogPostForm;

impl FormSpec for BlogPostForm {
    const TITLE: &'static str = "Blog post";
    const RESOURCE: Resource = Resource::BlogPosts;

    fn steps() -> Vec<WizardStep> {
        vec![
            WizardStep::new("content", "Content", blog_post_schema::CONTENT_FIELDS),
            WizardStep::new("publishing", "Publishing", blog_post_schema::PUBLISHING_FIELDS),
            WizardStep::new("seo", "SEO", blog_post_schema::SEO_FIELDS).optional(),
        ]
    }

    fn create_schema() -> Option<Schema> {
        Some(BlogPostSchema::schema())
    }

    fn update_schema() -> Schema {
        BlogPostSchema::schema()
    }

    fn slug_binding() -> Option<SlugBinding> {
        Some(SlugBinding {
            source: "title",
            target: "slug",
        })
    }

    fn defaults() -> Draft {
        object(json!({"status": "draft", "tags": []}))
    }
}

pub struct UserForm;

impl FormSpec for UserForm {
    const TITLE: &'static str = "User";
    const RESOURCE: Resource = Resource::Users;

    fn steps() -> Vec<WizardStep> {
        vec![
            WizardStep::new("account", "Account", user_schema::ACCOUNT_FIELDS),
            WizardStep::new("security", "Password", user_schema::SECURITY_FIELDS),
            WizardStep::new("profile", "Profile", user_schema::PROFILE_FIELDS).optional(),
        ]
    }

    fn create_schema() -> Option<Schema> {
        Some(CreateUserSchema::schema())
    }

    /// Length-only password check on update, see `UpdateUserSchema`
    fn update_schema() -> Schema {
        UpdateUserSchema::schema()
    }

    fn defaults() -> Draft {
        object(json!({"role": "EMPLOYEE", "status": "active"}))
    }
}

pub struct InquiryForm;

const INQUIRY_TRIAGE_FIELDS: &[&str] = &["status", "priority", "assignedTo", "notes"];

impl FormSpec for InquiryForm {
    const TITLE: &'static str = "Inquiry";
    const RESOURCE: Resource = Resource::Inquiries;

    fn steps() -> Vec<WizardStep> {
        vec![WizardStep::new("triage", "Triage", INQUIRY_TRIAGE_FIELDS)]
    }

    fn create_schema() -> Option<Schema> {
        None
    }

    fn update_schema() -> Schema {
        InquiryUpdateSchema::schema()
    }
}

/// Single-page settings form; saved through the settings endpoint
pub struct SettingsForm;

impl SettingsForm {
    /// Settings are a singleton without an id of their own
    pub const ID: EntityId = EntityId(0);

    pub fn form_state(current: Draft) -> FormState {
        FormState::new(SettingsSchema::schema(), FormMode::Edit(Self::ID), current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers_schema<F: FormSpec>(schema: &Schema) {
        let mut stepped: Vec<&str> = F::steps().iter().flat_map(|s| s.fields.iter().copied()).collect();
        stepped.sort_unstable();
        let mut fields: Vec<&str> = schema.field_names().collect();
        fields.sort_unstable();
        assert_eq!(stepped, fields, "{} steps must cover its schema", F::TITLE);
    }

    #[test]
    fn test_steps_cover_every_field_once() {
        covers_schema::<PropertyForm>(&PropertyForm::update_schema());
        covers_schema::<BlogPostForm>(&BlogPostForm::update_schema());
        covers_schema::<UserForm>(&UserForm::create_schema().unwrap());
        covers_schema::<InquiryForm>(&InquiryForm::update_schema());
    }

    #[test]
    fn test_only_trailing_steps_are_optional() {
        for steps in [PropertyForm::steps(), BlogPostForm::steps(), UserForm::steps()] {
            assert!(!steps[0].optional);
            assert!(steps.last().unwrap().optional);
        }
    }

    #[test]
    fn test_inquiries_are_edit_only() {
        assert!(InquiryForm::form_state(FormMode::Create, Draft::new()).is_none());
        assert!(InquiryForm::form_state(FormMode::Edit(EntityId(4)), Draft::new()).is_some());
    }

    #[test]
    fn test_blog_form_derives_slug() {
        let mut form = BlogPostForm::form_state(FormMode::Create, BlogPostForm::defaults()).unwrap();
        form.set_field("title", json!("Market Report 2024"));
        assert_eq!(form.value("slug"), Some(&json!("market-report-2024")));
    }
}
