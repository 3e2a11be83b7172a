//! Laptop form state
//!
//! Draft state behind the admin create and edit pages. Every edit goes
//! through [`LaptopDraft::set`], which normalizes the raw input the same
//! way on every keystroke: tags are split out of the comma-separated text,
//! ratings are clamped to 0-5 and numbers fall back to 0 when unparsable.

use std::fmt;
use std::str::FromStr;

use crate::api::{ApiResult, Laptop, LaptopPayload, StoreClient};
use crate::catalog::{BRAND_OPTIONS, OS_OPTIONS, RAM_OPTIONS, STORAGE_OPTIONS};

/// Highest rating a laptop can carry
pub const MAX_RATING: f64 = 5.0;

/// Split a comma-separated tag string, trimming and dropping empty entries
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a numeric field, 0 when the input is not a finite number
pub fn coerce_number(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Clamp a rating into `0..=5`
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, MAX_RATING)
    }
}

/// An editable form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Brand,
    Model,
    Processor,
    Ram,
    Storage,
    ScreenSize,
    Os,
    Gpu,
    Price,
    Stock,
    Rating,
    Tags,
    ImageUrl,
    Description,
}

impl DraftField {
    pub const ALL: [DraftField; 14] = [
        DraftField::Brand,
        DraftField::Model,
        DraftField::Processor,
        DraftField::Ram,
        DraftField::Storage,
        DraftField::ScreenSize,
        DraftField::Os,
        DraftField::Gpu,
        DraftField::Price,
        DraftField::Stock,
        DraftField::Rating,
        DraftField::Tags,
        DraftField::ImageUrl,
        DraftField::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DraftField::Brand => "brand",
            DraftField::Model => "model",
            DraftField::Processor => "processor",
            DraftField::Ram => "ram",
            DraftField::Storage => "storage",
            DraftField::ScreenSize => "screenSize",
            DraftField::Os => "os",
            DraftField::Gpu => "gpu",
            DraftField::Price => "price",
            DraftField::Stock => "stock",
            DraftField::Rating => "rating",
            DraftField::Tags => "tags",
            DraftField::ImageUrl => "imageUrl",
            DraftField::Description => "description",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DraftField {
    type Err = String;

    /// Accepts the JSON name (`screenSize`) or a kebab/snake spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        DraftField::ALL
            .iter()
            .copied()
            .find(|field| field.name().to_lowercase() == normalized)
            .ok_or_else(|| format!("Unknown laptop field: {}", s))
    }
}

/// Whether a submit creates a new laptop or updates an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// Local draft mirroring a laptop
#[derive(Debug, Clone, PartialEq)]
pub struct LaptopDraft {
    pub brand: String,
    pub model: String,
    pub processor: String,
    pub ram: String,
    pub storage: String,
    pub screen_size: String,
    pub os: String,
    pub gpu: String,
    pub price: f64,
    pub stock: u32,
    pub rating: f64,
    pub tags: Vec<String>,
    /// Tag text exactly as typed
    pub tags_input: String,
    pub image_url: String,
    pub description: String,
}

impl Default for LaptopDraft {
    fn default() -> Self {
        let first = |options: &[&str]| options.first().map(|s| s.to_string()).unwrap_or_default();

        Self {
            brand: first(BRAND_OPTIONS),
            model: String::new(),
            processor: String::new(),
            ram: first(RAM_OPTIONS),
            storage: first(STORAGE_OPTIONS),
            screen_size: String::new(),
            os: first(OS_OPTIONS),
            gpu: String::new(),
            price: 0.0,
            stock: 0,
            rating: 0.0,
            tags: Vec::new(),
            tags_input: String::new(),
            image_url: String::new(),
            description: String::new(),
        }
    }
}

impl LaptopDraft {
    /// Empty draft for the create page
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-filled from an existing laptop, for the edit page
    pub fn from_laptop(laptop: &Laptop) -> Self {
        Self {
            brand: laptop.brand.clone(),
            model: laptop.model.clone(),
            processor: laptop.processor.clone(),
            ram: laptop.ram.clone(),
            storage: laptop.storage.clone(),
            screen_size: laptop.screen_size.clone().unwrap_or_default(),
            os: laptop.os.clone().unwrap_or_default(),
            gpu: laptop.gpu.clone().unwrap_or_default(),
            price: laptop.price,
            stock: laptop.stock,
            rating: clamp_rating(laptop.rating.unwrap_or(0.0)),
            tags: laptop.tags.clone(),
            tags_input: laptop.tags.join(", "),
            image_url: laptop.image_url.clone().unwrap_or_default(),
            description: laptop.description.clone().unwrap_or_default(),
        }
    }

    /// Apply one raw input change
    pub fn set(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Brand => self.brand = value.to_string(),
            DraftField::Model => self.model = value.to_string(),
            DraftField::Processor => self.processor = value.to_string(),
            DraftField::Ram => self.ram = value.to_string(),
            DraftField::Storage => self.storage = value.to_string(),
            DraftField::ScreenSize => self.screen_size = value.to_string(),
            DraftField::Os => self.os = value.to_string(),
            DraftField::Gpu => self.gpu = value.to_string(),
            DraftField::Price => self.price = coerce_number(value).max(0.0),
            DraftField::Stock => {
                let stock = coerce_number(value);
                // `as` saturates at u32::MAX
                self.stock = if stock > 0.0 { stock.trunc() as u32 } else { 0 };
            }
            DraftField::Rating => self.rating = clamp_rating(coerce_number(value)),
            DraftField::Tags => {
                self.tags_input = value.to_string();
                self.tags = parse_tags(value);
            }
            DraftField::ImageUrl => self.image_url = value.to_string(),
            DraftField::Description => self.description = value.to_string(),
        }
    }

    /// Request body for create/update; blank optional fields are omitted
    pub fn to_payload(&self) -> LaptopPayload {
        let optional = |value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        LaptopPayload {
            brand: self.brand.trim().to_string(),
            model: self.model.trim().to_string(),
            processor: self.processor.trim().to_string(),
            ram: self.ram.clone(),
            storage: self.storage.clone(),
            screen_size: optional(&self.screen_size),
            os: optional(&self.os),
            gpu: optional(&self.gpu),
            price: self.price,
            stock: self.stock,
            rating: Some(clamp_rating(self.rating)),
            tags: self.tags.clone(),
            image_url: optional(&self.image_url),
            description: optional(&self.description),
        }
    }

    /// Submit the draft as a create or update request
    pub async fn submit(&self, client: &StoreClient, mode: &FormMode) -> ApiResult<Option<Laptop>> {
        let payload = self.to_payload();
        match mode {
            FormMode::Create => {
                tracing::debug!(model = %payload.model, "Creating laptop");
                client.create_laptop(&payload).await
            }
            FormMode::Edit(id) => {
                tracing::debug!(%id, "Updating laptop");
                client.update_laptop(id, &payload).await
            }
        }
    }
}
