//! Catalog constants
//!
//! Option lists offered by the filter bar and the admin forms.

/// Page size used by the listing and admin pages
pub const DEFAULT_PAGE_LIMIT: u32 = 9;

/// Number of laptops shown on the home page
pub const FEATURED_LIMIT: u32 = 3;

pub const RAM_OPTIONS: &[&str] = &["4GB", "8GB", "16GB", "32GB", "64GB"];

pub const STORAGE_OPTIONS: &[&str] = &[
    "128GB SSD",
    "256GB SSD",
    "512GB SSD",
    "1TB SSD",
    "1TB HDD",
    "2TB HDD",
];

pub const OS_OPTIONS: &[&str] = &[
    "Windows 11",
    "Windows 10",
    "macOS",
    "Linux",
    "ChromeOS",
    "No OS",
];

pub const BRAND_OPTIONS: &[&str] = &[
    "Apple", "Dell", "HP", "Lenovo", "Asus", "Acer", "Microsoft", "MSI", "Razer", "Samsung", "LG",
    "Huawei", "Xiaomi", "Other",
];
