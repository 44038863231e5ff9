// Blog Post Schema - article fields with slug format and SEO limits

use crate::models::{BlogPost, BlogStatus};
use crate::schema::{
    EntitySchema, FieldDefinition, FieldType, FieldValidator, SLUG_PATTERN,
};

pub const CONTENT_FIELDS: &[&str] = &["title", "slug", "excerpt", "content"];
pub const PUBLISHING_FIELDS: &[&str] = &[
    "status",
    "category",
    "tags",
    "publishedAt",
    "featuredImage",
    "readingTime",
];
pub const SEO_FIELDS: &[&str] = &["seoTitle", "seoDescription"];

pub struct BlogPostSchema;

impl EntitySchema for BlogPostSchema {
    type Output = BlogPost;

    fn name() -> &'static str {
        "blog post"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("title", FieldType::String)
                .label("Title")
                .validate(FieldValidator::MinLength(5))
                .validate(FieldValidator::MaxLength(200)),
            FieldDefinition::new("slug", FieldType::String)
                .label("Slug")
                .validate(FieldValidator::MaxLength(200))
                .validate(FieldValidator::pattern(
                    &SLUG_PATTERN,
                    "Slug may only contain lowercase letters, digits and hyphens",
                )),
            FieldDefinition::new("excerpt", FieldType::String)
                .label("Excerpt")
                .validate(FieldValidator::MinLength(10))
                .validate(FieldValidator::MaxLength(500)),
            FieldDefinition::new("content", FieldType::String)
                .label("Content")
                .validate(FieldValidator::MinLength(50)),
            FieldDefinition::new("status", FieldType::Enum(BlogStatus::VALUES.to_vec()))
                .label("Status"),
            FieldDefinition::new("featuredImage", FieldType::File)
                .label("Featured image")
                .optional(),
            FieldDefinition::new("category", FieldType::String)
                .label("Category")
                .validate(FieldValidator::MinLength(2))
                .validate(FieldValidator::MaxLength(50)),
            FieldDefinition::new("tags", FieldType::StringSet)
                .label("Tags")
                .optional()
                .validate(FieldValidator::MaxItems(20)),
            FieldDefinition::new("publishedAt", FieldType::Timestamp)
                .label("Publish date")
                .optional(),
            FieldDefinition::new("seoTitle", FieldType::String)
                .label("SEO title")
                .optional()
                .validate(FieldValidator::MaxLength(60)),
            FieldDefinition::new("seoDescription", FieldType::String)
                .label("SEO description")
                .optional()
                .validate(FieldValidator::MaxLength(160)),
            FieldDefinition::new("readingTime", FieldType::Integer)
                .label("Reading time")
                .optional()
                .validate(FieldValidator::Min(1.0)),
        ]
    }
}
