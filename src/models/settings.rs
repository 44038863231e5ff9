use serde::{Deserialize, Serialize};

use super::Currency;

/// Site-wide settings singleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub site_name: String,
    pub contact_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    pub default_currency: Currency,
    pub items_per_page: u32,
    pub maintenance_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_name: "Estate Back Office".to_string(),
            contact_email: "info@example.com".to_string(),
            contact_phone: None,
            default_currency: Currency::Czk,
            items_per_page: 10,
            maintenance_mode: false,
            address: None,
        }
    }
}
