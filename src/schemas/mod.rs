// Schema definitions - one module per back-office entity

pub mod blog_post_schema;
pub mod inquiry_schema;
pub mod property_schema;
pub mod settings_schema;
pub mod user_schema;

use crate::schema::{EntitySchema, Schema};

pub use blog_post_schema::BlogPostSchema;
pub use inquiry_schema::{InquirySubmissionSchema, InquiryUpdateSchema};
pub use property_schema::PropertySchema;
pub use settings_schema::SettingsSchema;
pub use user_schema::{CreateUserSchema, UpdateUserSchema};

/// Every schema the back office validates against
pub fn all_schemas() -> Vec<Schema> {
    vec![
        PropertySchema::schema(),
        BlogPostSchema::schema(),
        InquirySubmissionSchema::schema(),
        InquiryUpdateSchema::schema(),
        CreateUserSchema::schema(),
        UpdateUserSchema::schema(),
        SettingsSchema::schema(),
    ]
}

/// Validate all registered schemas
pub fn validate_schemas() -> Result<(), Vec<String>> {
    let errors: Vec<String> = all_schemas()
        .iter()
        .filter_map(|schema| schema.check_consistency().err())
        .flatten()
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
