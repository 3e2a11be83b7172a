//! Data Transfer Objects
//!
//! Request and response types for the backend endpoints.
//! Field names follow the backend's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================
// LAPTOP DTOs
// ============================================

/// A laptop as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laptop {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
    /// Price in dollars, never negative
    pub price: f64,
    /// Units in stock
    pub stock: u32,
    /// Average rating on a 0-5 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Absent and null tag lists both decode as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Laptop {
    /// "Brand Model" display name
    pub fn title(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Body of create and update requests: a laptop without server-owned fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaptopPayload {
    pub brand: String,
    pub model: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
    pub price: f64,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Laptop> for LaptopPayload {
    fn from(laptop: &Laptop) -> Self {
        Self {
            brand: laptop.brand.clone(),
            model: laptop.model.clone(),
            processor: laptop.processor.clone(),
            ram: laptop.ram.clone(),
            storage: laptop.storage.clone(),
            screen_size: laptop.screen_size.clone(),
            os: laptop.os.clone(),
            gpu: laptop.gpu.clone(),
            price: laptop.price,
            stock: laptop.stock,
            rating: laptop.rating,
            tags: laptop.tags.clone(),
            image_url: laptop.image_url.clone(),
            description: laptop.description.clone(),
        }
    }
}

// ============================================
// AUTH DTOs
// ============================================

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================
// PAGINATION DTOs
// ============================================

/// Pagination metadata of a listing response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl Meta {
    /// Whether the counts agree with each other.
    ///
    /// `total_pages == ceil(total_items / limit)` and the page lies in
    /// `1..=total_pages`, or everything is empty.
    pub fn is_consistent(&self) -> bool {
        if self.limit == 0 {
            return false;
        }
        let expected_pages = self.total_items.div_ceil(self.limit as u64);
        if expected_pages != self.total_pages as u64 {
            return false;
        }
        self.total_pages == 0 || (1..=self.total_pages).contains(&self.page)
    }
}

/// Listing envelope: `{ data, meta }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

// ============================================
// FILTER
// ============================================

/// Listing filter, serialized to query parameters
///
/// Unset or blank fields are omitted from the query string; set fields are
/// passed through unmodified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaptopFilter {
    pub brand: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub rating_min: Option<f64>,
    /// Comma-separated tag list
    pub tags: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl LaptopFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.price_min = Some(min);
        self.price_max = Some(max);
        self
    }

    pub fn ram(mut self, ram: impl Into<String>) -> Self {
        self.ram = Some(ram.into());
        self
    }

    pub fn storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn rating_min(mut self, rating: f64) -> Self {
        self.rating_min = Some(rating);
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query parameters in backend order, skipping unset and blank values
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let candidates = [
            ("brand", self.brand.clone()),
            ("price_min", self.price_min.map(|v| v.to_string())),
            ("price_max", self.price_max.map(|v| v.to_string())),
            ("ram", self.ram.clone()),
            ("storage", self.storage.clone()),
            ("rating_min", self.rating_min.map(|v| v.to_string())),
            ("tags", self.tags.clone()),
            ("page", self.page.map(|v| v.to_string())),
            ("limit", self.limit.map(|v| v.to_string())),
        ];

        candidates
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (key, v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laptop_deserialization() {
        let json = r#"{
            "id": "lp-1",
            "brand": "Dell",
            "model": "XPS 13",
            "processor": "Intel Core i7",
            "ram": "16GB",
            "storage": "512GB SSD",
            "screenSize": "13.4 inch",
            "price": 1299.99,
            "stock": 4,
            "rating": 4.5,
            "tags": ["ultrabook", "student"],
            "imageUrl": "https://example.com/xps.jpg",
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"#;

        let laptop: Laptop = serde_json::from_str(json).unwrap();
        assert_eq!(laptop.title(), "Dell XPS 13");
        assert_eq!(laptop.screen_size.as_deref(), Some("13.4 inch"));
        assert_eq!(laptop.tags, vec!["ultrabook", "student"]);
        assert!(laptop.os.is_none());
        assert!(laptop.created_at.is_some());
        assert!(laptop.in_stock());
    }

    #[test]
    fn test_laptop_without_tags() {
        let json = r#"{"id":"2","brand":"HP","model":"Envy","processor":"Ryzen 7",
            "ram":"8GB","storage":"256GB SSD","price":0,"stock":0}"#;
        let laptop: Laptop = serde_json::from_str(json).unwrap();
        assert!(laptop.tags.is_empty());
        assert!(!laptop.in_stock());
    }

    #[test]
    fn test_laptop_with_null_tags() {
        let json = r#"{"id":"3","brand":"Acer","model":"Swift","processor":"i5",
            "ram":"8GB","storage":"512GB SSD","price":649,"stock":2,"tags":null}"#;
        let laptop: Laptop = serde_json::from_str(json).unwrap();
        assert!(laptop.tags.is_empty());
    }

    #[test]
    fn test_payload_uses_camel_case() {
        let payload = LaptopPayload {
            brand: "Asus".into(),
            model: "Zenbook".into(),
            processor: "i5".into(),
            ram: "8GB".into(),
            storage: "256GB SSD".into(),
            screen_size: Some("14 inch".into()),
            os: None,
            gpu: None,
            price: 899.0,
            stock: 3,
            rating: Some(4.0),
            tags: vec![],
            image_url: Some("https://example.com/z.jpg".into()),
            description: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["screenSize"], "14 inch");
        assert_eq!(value["imageUrl"], "https://example.com/z.jpg");
        assert!(value.get("os").is_none());
        assert_eq!(value["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_role_parsing() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","username":"root","email":"root@store.test","role":"admin"}"#,
        )
        .unwrap();
        assert!(user.is_admin());
        assert_eq!(user.role.to_string(), "admin");
    }

    #[test]
    fn test_meta_consistency() {
        let meta = Meta { page: 2, limit: 9, total_items: 19, total_pages: 3 };
        assert!(meta.is_consistent());

        let empty = Meta { page: 1, limit: 9, total_items: 0, total_pages: 0 };
        assert!(empty.is_consistent());

        let wrong_pages = Meta { page: 1, limit: 9, total_items: 19, total_pages: 2 };
        assert!(!wrong_pages.is_consistent());

        let page_out_of_range = Meta { page: 4, limit: 9, total_items: 19, total_pages: 3 };
        assert!(!page_out_of_range.is_consistent());
    }

    #[test]
    fn test_meta_parses_camel_case() {
        let meta: Meta =
            serde_json::from_str(r#"{"page":1,"limit":9,"totalItems":12,"totalPages":2}"#).unwrap();
        assert_eq!(meta.total_items, 12);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn test_filter_passes_set_values_unmodified() {
        let filter = LaptopFilter::new().price_range(500.0, 1500.0).ram("16GB");
        let pairs = filter.query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("price_min", "500".to_string()),
                ("price_max", "1500".to_string()),
                ("ram", "16GB".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_omits_blank_values() {
        let filter = LaptopFilter {
            brand: Some("".into()),
            storage: Some("   ".into()),
            tags: Some("gaming,student".into()),
            page: Some(1),
            limit: Some(9),
            ..Default::default()
        };

        let keys: Vec<&str> = filter.query_pairs().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["tags", "page", "limit"]);
    }

    #[test]
    fn test_filter_keeps_fractional_values() {
        let filter = LaptopFilter::new().rating_min(4.5);
        assert_eq!(filter.query_pairs(), vec![("rating_min", "4.5".to_string())]);
    }
}
