// User Schemas - account fields plus the create/update password rules

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{NewUser, UserRole, UserStatus, UserUpdate};
use crate::schema::{
    Draft, EntitySchema, FieldDefinition, FieldErrors, FieldType, FieldValidator, Refinement,
    Schema, PHONE_PATTERN,
};

pub const ACCOUNT_FIELDS: &[&str] = &["name", "email", "role", "status"];
pub const SECURITY_FIELDS: &[&str] = &["password", "confirmPassword"];
pub const PROFILE_FIELDS: &[&str] = &["phone", "avatar", "bio"];

pub const MIN_PASSWORD_LENGTH: usize = 8;

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").expect("uppercase pattern compiles"));
static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").expect("lowercase pattern compiles"));
static DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").expect("digit pattern compiles"));

/// Account and profile fields shared by create and update
pub fn base_user_schema() -> Schema {
    Schema::new("user").fields(vec![
        FieldDefinition::new("name", FieldType::String)
            .label("Name")
            .validate(FieldValidator::MinLength(2))
            .validate(FieldValidator::MaxLength(100)),
        FieldDefinition::new("email", FieldType::String)
            .label("Email")
            .validate(FieldValidator::Email),
        FieldDefinition::new("role", FieldType::Enum(UserRole::VALUES.to_vec())).label("Role"),
        FieldDefinition::new("status", FieldType::Enum(UserStatus::VALUES.to_vec()))
            .label("Status"),
        FieldDefinition::new("phone", FieldType::String)
            .label("Phone")
            .optional()
            .validate(FieldValidator::pattern(&PHONE_PATTERN, "Phone number is not valid")),
        FieldDefinition::new("avatar", FieldType::File)
            .label("Avatar")
            .optional(),
        FieldDefinition::new("bio", FieldType::String)
            .label("Bio")
            .optional()
            .validate(FieldValidator::MaxLength(500)),
    ])
}

fn passwords_match(draft: &Draft, errors: &mut FieldErrors) {
    if let (Some(password), Some(confirm)) = (draft.get("password"), draft.get("confirmPassword")) {
        if password != confirm {
            errors.insert("confirmPassword", "Passwords do not match");
        }
    }
}

fn password_pair_present(draft: &Draft, errors: &mut FieldErrors) {
    match (draft.contains_key("password"), draft.contains_key("confirmPassword")) {
        (true, false) => errors.insert("confirmPassword", "Please confirm the new password"),
        (false, true) => errors.insert("password", "Enter the new password to confirm"),
        _ => {}
    }
}

/// Create form: password required and must satisfy the composition rules
pub struct CreateUserSchema;

impl EntitySchema for CreateUserSchema {
    type Output = NewUser;

    fn name() -> &'static str {
        "user"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("password", FieldType::String)
                .label("Password")
                .validate(FieldValidator::MinLength(MIN_PASSWORD_LENGTH))
                .validate(FieldValidator::pattern(
                    &UPPERCASE,
                    "Password must contain an uppercase letter",
                ))
                .validate(FieldValidator::pattern(
                    &LOWERCASE,
                    "Password must contain a lowercase letter",
                ))
                .validate(FieldValidator::pattern(&DIGIT, "Password must contain a digit")),
            FieldDefinition::new("confirmPassword", FieldType::String).label("Password confirmation"),
        ]
    }

    fn refinements() -> Vec<Refinement> {
        vec![Refinement::new(
            "passwords_match",
            &["password", "confirmPassword"],
            passwords_match,
        )]
    }

    fn schema() -> Schema {
        let security = Self::refinements()
            .into_iter()
            .fold(Schema::new("user").fields(Self::fields()), Schema::refine);
        base_user_schema().merge(security)
    }
}

/// Edit form: every field optional, password only changes when both fields are given.
/// Composition rules are not applied here; only the length is checked.
pub struct UpdateUserSchema;

impl EntitySchema for UpdateUserSchema {
    type Output = UserUpdate;

    fn name() -> &'static str {
        "user"
    }

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("password", FieldType::String)
                .label("Password")
                .optional()
                .validate(FieldValidator::MinLength(MIN_PASSWORD_LENGTH)),
            FieldDefinition::new("confirmPassword", FieldType::String)
                .label("Password confirmation")
                .optional(),
        ]
    }

    fn refinements() -> Vec<Refinement> {
        vec![
            Refinement::new(
                "password_pair_present",
                &["password", "confirmPassword"],
                password_pair_present,
            ),
            Refinement::new(
                "passwords_match",
                &["password", "confirmPassword"],
                passwords_match,
            ),
        ]
    }

    fn schema() -> Schema {
        let security = Self::refinements()
            .into_iter()
            .fold(Schema::new("user").fields(Self::fields()), Schema::refine);
        base_user_schema().partial().merge(security)
    }
}
