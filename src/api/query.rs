// List query parsing and record matching for the collection endpoints

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Parsed `?page&limit&search&<field>=<value>` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    /// Exact-match filters on top-level record fields
    pub filters: BTreeMap<String, String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListParams {
    /// Unparsable numbers fall back to the defaults; limit is clamped to 1..=MAX_LIMIT
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let mut params = ListParams::default();
        for (key, value) in query {
            match key.as_str() {
                "page" => {
                    params.page = value.parse::<u32>().unwrap_or(DEFAULT_PAGE).max(1);
                }
                "limit" => {
                    params.limit = value
                        .parse::<u32>()
                        .unwrap_or(DEFAULT_LIMIT)
                        .clamp(1, MAX_LIMIT);
                }
                "search" | "q" => {
                    let trimmed = value.trim();
                    if !trimmed.is_empty() {
                        params.search = Some(trimmed.to_lowercase());
                    }
                }
                _ if !value.is_empty() => {
                    params.filters.insert(key.clone(), value.clone());
                }
                _ => {}
            }
        }
        params
    }

    pub fn matches(&self, record: &Value) -> bool {
        let Some(object) = record.as_object() else {
            return false;
        };

        let filters_match = self.filters.iter().all(|(field, expected)| {
            object
                .get(field)
                .map(|actual| value_matches(actual, expected))
                .unwrap_or(false)
        });

        let search_matches = match &self.search {
            None => true,
            Some(needle) => object.values().any(|v| {
                v.as_str()
                    .map(|s| s.to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            }),
        };

        filters_match && search_matches
    }
}

fn value_matches(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Array(items) => items.iter().any(|item| value_matches(item, expected)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(ListParams::from_query(&HashMap::new()), ListParams::default());

        let params = ListParams::from_query(&query(&[("page", "0"), ("limit", "1000")]));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, MAX_LIMIT);

        let params = ListParams::from_query(&query(&[("page", "abc"), ("limit", "0")]));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn test_filters_and_search() {
        let params = ListParams::from_query(&query(&[
            ("status", "AVAILABLE"),
            ("bedrooms", "3"),
            ("search", "Brno"),
        ]));
        let hit = json!({"status": "AVAILABLE", "bedrooms": 3, "city": "Brno"});
        let wrong_status = json!({"status": "SOLD", "bedrooms": 3, "city": "Brno"});
        let wrong_city = json!({"status": "AVAILABLE", "bedrooms": 3, "city": "Praha"});

        assert!(params.matches(&hit));
        assert!(!params.matches(&wrong_status));
        assert!(!params.matches(&wrong_city));
    }

    #[test]
    fn test_array_fields_match_any_entry() {
        let params = ListParams::from_query(&query(&[("tags", "market")]));
        assert!(params.matches(&json!({"tags": ["prague", "market"]})));
        assert!(!params.matches(&json!({"tags": []})));
    }
}
