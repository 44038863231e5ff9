// Back-office entities and wire types

pub mod api;
pub mod blog_post;
pub mod file_item;
pub mod inquiry;
pub mod property;
pub mod settings;
pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::EntityId;

pub use api::{ApiEnvelope, BulkRequest, LoginRequest, Page, Pagination, Session};
pub use blog_post::{BlogPost, BlogStatus};
pub use file_item::FileItem;
pub use inquiry::{Inquiry, InquiryStatus, InquirySubmission, InquiryUpdate, Priority};
pub use property::{Currency, Property, PropertyStatus, PropertyType};
pub use settings::Settings;
pub use user::{NewUser, Permission, User, UserRole, UserStatus, UserUpdate};

/// A stored entity: server-assigned identity and timestamps around the entity fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> std::ops::Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.fields
    }
}
