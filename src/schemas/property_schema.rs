// Property Schema - listing fields composed from the parts the property wizard edits

use serde_json::Value;

use crate::models::{Currency, Property, PropertyStatus, PropertyType};
use crate::schema::{
    Draft, EntitySchema, FieldDefinition, FieldErrors, FieldType, FieldValidator, Refinement,
    Schema,
};

pub const BASIC_FIELDS: &[&str] = &["title", "description", "type", "status"];
pub const LOCATION_FIELDS: &[&str] = &["region", "city", "address"];
pub const DETAIL_FIELDS: &[&str] = &[
    "price",
    "currency",
    "bedrooms",
    "bathrooms",
    "yearBuilt",
    "size",
    "amenities",
];
pub const MEDIA_FIELDS: &[&str] = &["images", "mainImage"];
pub const SEO_FIELDS: &[&str] = &["seoTitle", "seoDescription", "seoKeywords"];

pub const MIN_PRICE: f64 = 10_000.0;
pub const MAX_PRICE: f64 = 5_000_000.0;
pub const MAX_IMAGES: usize = 20;

/// Property listing schema
pub struct PropertySchema;

impl PropertySchema {
    fn parts() -> [Schema; 5] {
        [
            Self::basic_info(),
            Self::location(),
            Self::details(),
            Self::media(),
            Self::seo(),
        ]
    }

    pub fn basic_info() -> Schema {
        Schema::new("property").fields(vec![
            FieldDefinition::new("title", FieldType::String)
                .label("Title")
                .validate(FieldValidator::MinLength(5))
                .validate(FieldValidator::MaxLength(100)),
            FieldDefinition::new("description", FieldType::String)
                .label("Description")
                .validate(FieldValidator::MinLength(20))
                .validate(FieldValidator::MaxLength(5000)),
            FieldDefinition::new("type", FieldType::Enum(PropertyType::VALUES.to_vec()))
                .label("Property type"),
            FieldDefinition::new("status", FieldType::Enum(PropertyStatus::VALUES.to_vec()))
                .label("Status"),
        ])
    }

    pub fn location() -> Schema {
        Schema::new("property").fields(vec![
            FieldDefinition::new("region", FieldType::String)
                .label("Region")
                .validate(FieldValidator::MinLength(2))
                .validate(FieldValidator::MaxLength(100)),
            FieldDefinition::new("city", FieldType::String)
                .label("City")
                .validate(FieldValidator::MinLength(2))
                .validate(FieldValidator::MaxLength(100)),
            FieldDefinition::new("address", FieldType::String)
                .label("Address")
                .validate(FieldValidator::MinLength(5))
                .validate(FieldValidator::MaxLength(200)),
        ])
    }

    pub fn details() -> Schema {
        Schema::new("property").fields(vec![
            FieldDefinition::new("price", FieldType::Number)
                .label("Price")
                .validate(FieldValidator::Range(MIN_PRICE, MAX_PRICE)),
            FieldDefinition::new("currency", FieldType::Enum(Currency::VALUES.to_vec()))
                .label("Currency"),
            FieldDefinition::new("bedrooms", FieldType::Integer)
                .label("Bedrooms")
                .validate(FieldValidator::Range(0.0, 20.0)),
            FieldDefinition::new("bathrooms", FieldType::Integer)
                .label("Bathrooms")
                .validate(FieldValidator::Range(0.0, 20.0)),
            FieldDefinition::new("yearBuilt", FieldType::Integer)
                .label("Year built")
                .optional()
                .validate(FieldValidator::Range(1800.0, 2100.0)),
            FieldDefinition::new("size", FieldType::Number)
                .label("Size")
                .validate(FieldValidator::Range(10.0, 100_000.0)),
            FieldDefinition::new("amenities", FieldType::StringSet)
                .label("Amenities")
                .optional(),
        ])
    }

    pub fn media() -> Schema {
        Schema::new("property")
            .fields(vec![
                FieldDefinition::new("images", FieldType::FileList)
                    .label("Images")
                    .validate(FieldValidator::MinItems(1))
                    .validate(FieldValidator::MaxItems(MAX_IMAGES)),
                FieldDefinition::new("mainImage", FieldType::String)
                    .label("Main image")
                    .optional(),
            ])
            .refine(Refinement::new(
                "main_image_in_images",
                &["images", "mainImage"],
                main_image_in_images,
            ))
    }

    pub fn seo() -> Schema {
        Schema::new("property").fields(vec![
            FieldDefinition::new("seoTitle", FieldType::String)
                .label("SEO title")
                .optional()
                .validate(FieldValidator::MaxLength(60)),
            FieldDefinition::new("seoDescription", FieldType::String)
                .label("SEO description")
                .optional()
                .validate(FieldValidator::MaxLength(160)),
            FieldDefinition::new("seoKeywords", FieldType::StringSet)
                .label("SEO keywords")
                .optional()
                .validate(FieldValidator::MaxItems(20)),
        ])
    }
}

impl EntitySchema for PropertySchema {
    type Output = Property;

    fn name() -> &'static str {
        "property"
    }

    /// Union of the step schemas
    fn fields() -> Vec<FieldDefinition> {
        Self::parts()
            .iter()
            .flat_map(|part| part.definitions().cloned())
            .collect()
    }

    fn refinements() -> Vec<Refinement> {
        Self::parts()
            .iter()
            .flat_map(|part| part.refinements().iter().cloned())
            .collect()
    }
}


fn main_image_in_images(draft: &Draft, errors: &mut FieldErrors) {
    let Some(main) = draft.get("mainImage").and_then(Value::as_str) else {
        return;
    };
    let listed = draft
        .get("images")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .any(|image| image.get("id").and_then(Value::as_str) == Some(main))
        })
        .unwrap_or(false);
    if !listed {
        errors.insert("mainImage", "Main image must be one of the uploaded images");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::valid_property_draft;
    use serde_json::json;

    #[test]
    fn test_valid_property_passes() {
        let property = PropertySchema::validate(&valid_property_draft()).unwrap();
        assert_eq!(property.property_type, PropertyType::Villa);
        assert_eq!(property.cover_image().unwrap().id, "img-2");
        assert_eq!(property.seo_keywords, vec!["villa", "brno"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let schema = PropertySchema::schema();
        for (price, rooms, images) in [(10_000, 0, 1), (5_000_000, 20, 20), (250_000, 3, 5)] {
            let mut draft = valid_property_draft();
            draft.insert("price".into(), json!(price));
            draft.insert("bedrooms".into(), json!(rooms));
            draft.insert("bathrooms".into(), json!(rooms));
            let list: Vec<Value> = (0..images)
                .map(|i| json!({"id": format!("f{}", i), "url": "/u.jpg", "name": "u.jpg"}))
                .collect();
            draft.insert("images".into(), Value::Array(list));
            draft.remove("mainImage");
            assert!(schema.validate_draft(&draft).is_ok(), "price {} rooms {} images {}", price, rooms, images);
        }
    }

    #[test]
    fn test_out_of_bounds_values_fail() {
        let mut draft = valid_property_draft();
        draft.insert("price".into(), json!(9_999));
        draft.insert("bedrooms".into(), json!(21));
        let errors = PropertySchema::schema().validate_draft(&draft).unwrap_err();
        assert!(errors.contains("price"));
        assert!(errors.contains("bedrooms"));
        assert!(!errors.contains("bathrooms"));
    }

    #[test]
    fn test_empty_images_rejected() {
        let mut draft = valid_property_draft();
        draft.insert("images".into(), json!([]));
        draft.remove("mainImage");
        let errors = PropertySchema::schema().validate_draft(&draft).unwrap_err();
        assert_eq!(errors.get("images"), Some("Images must contain at least 1 item(s)"));
    }

    #[test]
    fn test_main_image_must_reference_images() {
        let mut draft = valid_property_draft();
        draft.insert("mainImage".into(), json!("img-404"));
        let errors = PropertySchema::schema().validate_draft(&draft).unwrap_err();
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["mainImage"]);
    }

    #[test]
    fn test_schema_parts_are_consistent() {
        assert!(PropertySchema::schema().check_consistency().is_ok());
        let all: Vec<&str> = [BASIC_FIELDS, LOCATION_FIELDS, DETAIL_FIELDS, MEDIA_FIELDS, SEO_FIELDS].concat();
        let schema = PropertySchema::schema();
        assert_eq!(schema.field_names().count(), all.len());
        assert!(all.iter().all(|f| schema.has_field(f)));

        assert_eq!(PropertySchema::fields().len(), all.len());
        assert_eq!(PropertySchema::refinements().len(), 1);
    }
}
