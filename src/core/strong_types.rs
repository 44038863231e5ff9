// Strong Types - newtypes shared by the API, the client and the forms

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strongly-typed record ID - prevents confusion with other numeric types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Server-assigned IDs are always positive
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// REST collections exposed by the back-office API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Properties,
    BlogPosts,
    Users,
    Inquiries,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Properties,
        Resource::BlogPosts,
        Resource::Users,
        Resource::Inquiries,
    ];

    /// URL path segment under `/api`
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Properties => "properties",
            Resource::BlogPosts => "blog-posts",
            Resource::Users => "users",
            Resource::Inquiries => "inquiries",
        }
    }

    /// Singular human label used in log lines and notifications
    pub fn label(self) -> &'static str {
        match self {
            Resource::Properties => "property",
            Resource::BlogPosts => "blog post",
            Resource::Users => "user",
            Resource::Inquiries => "inquiry",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.segment() == segment)
    }

    /// Values the `status` field may take; bulk status actions are checked against these
    pub fn status_values(self) -> &'static [&'static str] {
        match self {
            Resource::Properties => &["AVAILABLE", "RENTED", "SOLD", "DRAFT"],
            Resource::BlogPosts => &["draft", "published", "archived"],
            Resource::Users => &["active", "inactive", "suspended"],
            Resource::Inquiries => &["new", "in_progress", "resolved", "spam"],
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment())
    }
}
