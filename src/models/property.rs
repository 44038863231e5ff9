use serde::{Deserialize, Serialize};

use super::FileItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Land,
    Commercial,
    Cottage,
}

impl PropertyType {
    pub const VALUES: [&'static str; 6] =
        ["HOUSE", "APARTMENT", "VILLA", "LAND", "COMMERCIAL", "COTTAGE"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStatus {
    Available,
    Rented,
    Sold,
    Draft,
}

impl PropertyStatus {
    pub const VALUES: [&'static str; 4] = ["AVAILABLE", "RENTED", "SOLD", "DRAFT"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Czk,
    Eur,
    Usd,
}

impl Currency {
    pub const VALUES: [&'static str; 3] = ["CZK", "EUR", "USD"];
}

/// Property listing as accepted by the property form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub region: String,
    pub city: String,
    pub address: String,
    pub price: f64,
    pub currency: Currency,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    pub size: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub images: Vec<FileItem>,
    /// ID of the entry in `images` shown first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Vec<String>,
}

impl Property {
    /// The selected main image, falling back to the first image
    pub fn cover_image(&self) -> Option<&FileItem> {
        self.main_image
            .as_deref()
            .and_then(|id| self.images.iter().find(|image| image.id == id))
            .or_else(|| self.images.first())
    }
}
