// Drafts shared by unit tests

use serde_json::json;

use crate::schema::Draft;

fn object(value: serde_json::Value) -> Draft {
    value.as_object().cloned().unwrap_or_default()
}

pub fn valid_property_draft() -> Draft {
    object(json!({
        "title": "Nádherná Vila",
        "description": "Spacious villa with a garden and a view of the river valley.",
        "type": "VILLA",
        "status": "AVAILABLE",
        "region": "Jihomoravský",
        "city": "Brno",
        "address": "Údolní 15",
        "price": 4_200_000,
        "currency": "CZK",
        "bedrooms": 4,
        "bathrooms": 2,
        "yearBuilt": 1998,
        "size": 240.5,
        "amenities": ["garden", "garage"],
        "images": [
            {"id": "img-1", "url": "/uploads/1.jpg", "name": "front.jpg"},
            {"id": "img-2", "url": "/uploads/2.jpg", "name": "garden.jpg"}
        ],
        "mainImage": "img-2",
        "seoKeywords": "villa, brno"
    }))
}

pub fn valid_blog_post_draft() -> Draft {
    object(json!({
        "title": "Prague market update",
        "slug": "prague-market-update",
        "excerpt": "Prices in Prague kept rising this spring.",
        "content": "Asking prices for flats in Prague grew for the third quarter in a row, driven by low supply.",
        "status": "draft",
        "category": "Market",
        "tags": ["market", "prague", "market"]
    }))
}

pub fn valid_user_draft() -> Draft {
    object(json!({
        "name": "Petr Svoboda",
        "email": "petr@example.cz",
        "role": "EMPLOYEE",
        "status": "active"
    }))
}
