use serde::{Deserialize, Serialize};

use super::FileItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl UserRole {
    pub const VALUES: [&'static str; 3] = ["ADMIN", "MANAGER", "EMPLOYEE"];

    /// Permission set granted by the role
    pub fn permissions(self) -> Vec<Permission> {
        use Permission::*;
        match self {
            UserRole::Admin => Permission::ALL.to_vec(),
            UserRole::Manager => vec![
                PropertiesRead,
                PropertiesWrite,
                BlogRead,
                BlogWrite,
                InquiriesRead,
                InquiriesWrite,
                UsersRead,
                SettingsRead,
            ],
            UserRole::Employee => vec![PropertiesRead, BlogRead, InquiriesRead, InquiriesWrite],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "properties:read")]
    PropertiesRead,
    #[serde(rename = "properties:write")]
    PropertiesWrite,
    #[serde(rename = "blog:read")]
    BlogRead,
    #[serde(rename = "blog:write")]
    BlogWrite,
    #[serde(rename = "inquiries:read")]
    InquiriesRead,
    #[serde(rename = "inquiries:write")]
    InquiriesWrite,
    #[serde(rename = "users:read")]
    UsersRead,
    #[serde(rename = "users:write")]
    UsersWrite,
    #[serde(rename = "settings:read")]
    SettingsRead,
    #[serde(rename = "settings:write")]
    SettingsWrite,
}

impl Permission {
    pub const ALL: [Permission; 10] = [
        Permission::PropertiesRead,
        Permission::PropertiesWrite,
        Permission::BlogRead,
        Permission::BlogWrite,
        Permission::InquiriesRead,
        Permission::InquiriesWrite,
        Permission::UsersRead,
        Permission::UsersWrite,
        Permission::SettingsRead,
        Permission::SettingsWrite,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub const VALUES: [&'static str; 3] = ["active", "inactive", "suspended"];
}

/// Back-office account as returned by the API; the password never leaves the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FileItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl User {
    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Validated output of the create-user form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FileItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// Validated output of the edit-user form; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<FileItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,
}
