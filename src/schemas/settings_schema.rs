// Settings Schema - site-wide configuration form

use crate::models::{Currency, Settings};
use crate::schema::{EntitySchema, FieldDefinition, FieldType, FieldValidator, PHONE_PATTERN};

pub struct SettingsSchema;

impl EntitySchema for SettingsSchema {
    type Output = Settings;

    fn name() -> &'static str {
        "settings"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("siteName", FieldType::String)
                .label("Site name")
                .validate(FieldValidator::MinLength(2))
                .validate(FieldValidator::MaxLength(100)),
            FieldDefinition::new("contactEmail", FieldType::String)
                .label("Contact email")
                .validate(FieldValidator::Email),
            FieldDefinition::new("contactPhone", FieldType::String)
                .label("Contact phone")
                .optional()
                .validate(FieldValidator::pattern(&PHONE_PATTERN, "Phone number is not valid")),
            FieldDefinition::new("defaultCurrency", FieldType::Enum(Currency::VALUES.to_vec()))
                .label("Default currency"),
            FieldDefinition::new("itemsPerPage", FieldType::Integer)
                .label("Items per page")
                .validate(FieldValidator::Range(1.0, 100.0)),
            FieldDefinition::new("maintenanceMode", FieldType::Bool).label("Maintenance mode"),
            FieldDefinition::new("address", FieldType::String)
                .label("Address")
                .optional()
                .validate(FieldValidator::MaxLength(200)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_settings_are_valid() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        let settings = SettingsSchema::validate(value.as_object().unwrap()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_checkbox_strings_and_bounds() {
        let mut value = serde_json::to_value(Settings::default()).unwrap();
        value["maintenanceMode"] = json!("true");
        value["itemsPerPage"] = json!(500);
        let errors = SettingsSchema::schema()
            .validate_draft(value.as_object().unwrap())
            .unwrap_err();
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["itemsPerPage"]);

        value["itemsPerPage"] = json!("25");
        let settings = SettingsSchema::validate(value.as_object().unwrap()).unwrap();
        assert!(settings.maintenance_mode);
        assert_eq!(settings.items_per_page, 25);
    }
}
