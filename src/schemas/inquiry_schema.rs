// Inquiry Schemas - public contact submission and the admin edit form

use crate::models::{InquiryStatus, InquirySubmission, InquiryUpdate, Priority};
use crate::schema::{EntitySchema, FieldDefinition, FieldType, FieldValidator, PHONE_PATTERN};

/// Contact form posted by site visitors
pub struct InquirySubmissionSchema;

impl EntitySchema for InquirySubmissionSchema {
    type Output = InquirySubmission;

    fn name() -> &'static str {
        "inquiry"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("name", FieldType::String)
                .label("Name")
                .validate(FieldValidator::MinLength(2))
                .validate(FieldValidator::MaxLength(100)),
            FieldDefinition::new("email", FieldType::String)
                .label("Email")
                .validate(FieldValidator::Email),
            FieldDefinition::new("phone", FieldType::String)
                .label("Phone")
                .optional()
                .validate(FieldValidator::pattern(&PHONE_PATTERN, "Phone number is not valid")),
            FieldDefinition::new("subject", FieldType::String)
                .label("Subject")
                .validate(FieldValidator::MinLength(3))
                .validate(FieldValidator::MaxLength(200)),
            FieldDefinition::new("message", FieldType::String)
                .label("Message")
                .validate(FieldValidator::MinLength(10))
                .validate(FieldValidator::MaxLength(5000)),
            FieldDefinition::new("propertyId", FieldType::Reference)
                .label("Property")
                .optional(),
        ]
    }
}

/// Admin view/edit form: inquiries are never created from the back office
pub struct InquiryUpdateSchema;

impl EntitySchema for InquiryUpdateSchema {
    type Output = InquiryUpdate;

    fn name() -> &'static str {
        "inquiry"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("status", FieldType::Enum(InquiryStatus::VALUES.to_vec()))
                .label("Status"),
            FieldDefinition::new("priority", FieldType::Enum(Priority::VALUES.to_vec()))
                .label("Priority"),
            FieldDefinition::new("assignedTo", FieldType::Reference)
                .label("Assignee")
                .optional(),
            FieldDefinition::new("notes", FieldType::String)
                .label("Notes")
                .optional()
                .validate(FieldValidator::MaxLength(2000)),
        ]
    }
}
