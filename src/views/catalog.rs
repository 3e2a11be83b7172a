//! Catalog pages: listing, home, detail

use std::fmt;

use super::{format_price, Loadable};
use crate::api::{Laptop, LaptopFilter, Meta, Paginated};
use crate::catalog::DEFAULT_PAGE_LIMIT;
use crate::pagination::page_window;

pub const EMPTY_LISTING: &str =
    "No laptops found matching your criteria. Try adjusting your filters!";

pub const DETAIL_ERROR: &str =
    "Failed to load laptop details. It might not exist or there was a server error.";

const NO_FEATURED: &str = "No featured laptops available at the moment.";

/// Tags shown on a card; the detail page shows all of them
const CARD_TAG_LIMIT: usize = 3;

/// Five-star rendering of a 0-5 rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRating {
    pub rating: f64,
    pub full: u32,
    pub half: bool,
    pub empty: u32,
}

pub fn star_rating(rating: f64) -> StarRating {
    let rating = if rating.is_nan() { 0.0 } else { rating.clamp(0.0, 5.0) };
    let full = rating.floor() as u32;
    let half = rating.fract() >= 0.5;
    let empty = 5 - full - u32::from(half);

    StarRating {
        rating,
        full,
        half,
        empty,
    }
}

impl StarRating {
    /// Stars followed by `(4.5 / 5)`
    pub fn detailed(&self) -> String {
        if self.rating > 0.0 {
            format!("{} ({:.1} / 5)", self.stars(), self.rating)
        } else {
            self.stars()
        }
    }

    fn stars(&self) -> String {
        let mut out = "★".repeat(self.full as usize);
        if self.half {
            out.push('½');
        }
        out.push_str(&"☆".repeat(self.empty as usize));
        out
    }
}

impl fmt::Display for StarRating {
    /// Stars followed by `(4.5)` when rated
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stars())?;
        if self.rating > 0.0 {
            write!(f, " ({:.1})", self.rating)?;
        }
        Ok(())
    }
}

/// Filter and page of the listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    filter: LaptopFilter,
    page: u32,
    limit: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}

impl ListingQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            filter: LaptopFilter::default(),
            page: 1,
            limit: limit.max(1),
        }
    }

    pub fn filter(&self) -> &LaptopFilter {
        &self.filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Replace the filter; results restart at page 1
    pub fn set_filter(&mut self, filter: LaptopFilter) {
        self.filter = LaptopFilter {
            page: None,
            limit: None,
            ..filter
        };
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.set_filter(LaptopFilter::default());
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Adopt the page the server actually returned
    pub fn sync(&mut self, meta: &Meta) {
        self.page = meta.page.max(1);
    }

    /// Filter sent to the backend, with page and limit applied
    pub fn request(&self) -> LaptopFilter {
        self.filter.clone().page(self.page).limit(self.limit)
    }
}

/// Summary card used by the listing and home pages
pub fn laptop_card(laptop: &Laptop) -> String {
    let mut lines = vec![laptop.title()];

    if let Some(rating) = laptop.rating.filter(|r| *r > 0.0) {
        lines.push(star_rating(rating).to_string());
    }

    lines.push(format!("Processor: {}", laptop.processor));
    lines.push(format!("RAM: {}", laptop.ram));
    lines.push(format!("Storage: {}", laptop.storage));
    if let Some(gpu) = &laptop.gpu {
        lines.push(format!("GPU: {}", gpu));
    }
    if !laptop.tags.is_empty() {
        let tags: Vec<&str> = laptop
            .tags
            .iter()
            .take(CARD_TAG_LIMIT)
            .map(String::as_str)
            .collect();
        lines.push(format!("Tags: {}", tags.join(", ")));
    }
    lines.push(format_price(laptop.price));
    lines.push(format!("Details: show {}", laptop.id));

    lines.join("\n")
}

/// Previous / page numbers / next, `None` for a single page
pub fn pagination_bar(current_page: u32, total_pages: u32) -> Option<String> {
    let window = page_window(current_page, total_pages)?;
    let mut items: Vec<String> = Vec::new();

    if window.has_previous {
        items.push("< Previous".to_string());
    }
    if window.show_first {
        items.push("1".to_string());
    }
    if window.leading_gap {
        items.push("...".to_string());
    }
    for page in window.pages() {
        if page == window.current {
            items.push(format!("[{}]", page));
        } else {
            items.push(page.to_string());
        }
    }
    if window.trailing_gap {
        items.push("...".to_string());
    }
    if window.show_last {
        items.push(window.total_pages.to_string());
    }
    if window.has_next {
        items.push("Next >".to_string());
    }

    Some(items.join("  "))
}

/// The listing page body
pub fn render_listing(state: &Loadable<Paginated<Laptop>>) -> String {
    state.render("Loading laptops...", |page| {
        if page.data.is_empty() {
            return EMPTY_LISTING.to_string();
        }

        let mut sections: Vec<String> = vec![format!(
            "Showing {} of {} laptops.",
            page.data.len(),
            page.meta.total_items
        )];
        sections.extend(page.data.iter().map(laptop_card));
        if let Some(bar) = pagination_bar(page.meta.page, page.meta.total_pages) {
            sections.push(bar);
        }

        sections.join("\n\n")
    })
}

/// The home page with its featured laptops
pub fn render_featured(state: &Loadable<Vec<Laptop>>) -> String {
    let featured = state.render("Loading featured laptops...", |laptops| {
        if laptops.is_empty() {
            NO_FEATURED.to_string()
        } else {
            laptops
                .iter()
                .map(laptop_card)
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    });

    format!(
        "Welcome to Laptop Store Deluxe!\n\
         Find the perfect laptop tailored to your needs.\n\n\
         Featured Laptops\n\n{}",
        featured
    )
}

/// Full specification sheet of one laptop
pub fn render_detail(state: &Loadable<Laptop>) -> String {
    state.render("Loading laptop details...", |laptop| {
        let mut lines = vec![laptop.title()];

        if let Some(rating) = laptop.rating.filter(|r| *r > 0.0) {
            lines.push(star_rating(rating).detailed());
        }
        lines.push(format_price(laptop.price));
        if let Some(description) = &laptop.description {
            lines.push(String::new());
            lines.push(description.clone());
        }

        lines.push(String::new());
        lines.push("Specifications".to_string());
        lines.push(format!("  Processor: {}", laptop.processor));
        if let Some(gpu) = &laptop.gpu {
            lines.push(format!("  GPU: {}", gpu));
        }
        lines.push(format!("  RAM: {}", laptop.ram));
        lines.push(format!("  Storage: {}", laptop.storage));
        if let Some(screen) = &laptop.screen_size {
            lines.push(format!("  Screen Size: {}", screen));
        }
        if let Some(os) = &laptop.os {
            lines.push(format!("  Operating System: {}", os));
        }
        if laptop.in_stock() {
            lines.push(format!("  Stock: {} units available", laptop.stock));
        } else {
            lines.push("  Stock: Out of Stock".to_string());
        }

        if !laptop.tags.is_empty() {
            lines.push(String::new());
            lines.push(format!("Tags: {}", laptop.tags.join(", ")));
        }

        lines.join("\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop(id: &str, rating: Option<f64>, tags: &[&str]) -> Laptop {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "brand": "Dell",
            "model": "XPS 13",
            "processor": "Intel Core i7",
            "ram": "16GB",
            "storage": "512GB SSD",
            "price": 1299.5,
            "stock": 4,
            "rating": rating,
            "tags": tags,
        }))
        .unwrap()
    }

    fn page(data: Vec<Laptop>, page: u32, total_items: u64, total_pages: u32) -> Paginated<Laptop> {
        Paginated {
            data,
            meta: Meta {
                page,
                limit: 9,
                total_items,
                total_pages,
            },
        }
    }

    #[test]
    fn test_star_counts() {
        let stars = star_rating(4.5);
        assert_eq!((stars.full, stars.half, stars.empty), (4, true, 0));
        assert_eq!(stars.to_string(), "★★★★½ (4.5)");
        assert_eq!(stars.detailed(), "★★★★½ (4.5 / 5)");

        let stars = star_rating(3.2);
        assert_eq!((stars.full, stars.half, stars.empty), (3, false, 2));

        let stars = star_rating(0.0);
        assert_eq!(stars.to_string(), "☆☆☆☆☆");

        let stars = star_rating(9.0);
        assert_eq!((stars.full, stars.half, stars.empty), (5, false, 0));
    }

    #[test]
    fn test_card_limits_tags_and_hides_zero_rating() {
        let card = laptop_card(&laptop("lp-1", Some(0.0), &["a", "b", "c", "d"]));
        assert!(card.starts_with("Dell XPS 13\nProcessor: Intel Core i7"));
        assert!(card.contains("Tags: a, b, c\n"));
        assert!(card.contains("$1299.50"));
        assert!(!card.contains('★'));
    }

    #[test]
    fn test_listing_summary_and_bar() {
        let state = Loadable::Ready(page(
            vec![laptop("lp-1", Some(4.0), &[]), laptop("lp-2", None, &[])],
            2,
            20,
            3,
        ));

        let text = render_listing(&state);
        assert!(text.starts_with("Showing 2 of 20 laptops."));
        assert!(text.contains("★★★★☆ (4.0)"));
        assert!(text.ends_with("< Previous  1  [2]  3  Next >"));
    }

    #[test]
    fn test_listing_empty_and_failed() {
        let empty = Loadable::Ready(page(Vec::new(), 1, 0, 0));
        assert_eq!(render_listing(&empty), EMPTY_LISTING);

        let failed: Loadable<Paginated<Laptop>> = Loadable::Failed("Status 500: boom".to_string());
        assert_eq!(render_listing(&failed), "Error: Status 500: boom");
    }

    #[test]
    fn test_pagination_bar_gaps() {
        assert_eq!(pagination_bar(1, 1), None);
        assert_eq!(
            pagination_bar(10, 20).unwrap(),
            "< Previous  1  ...  8  9  [10]  11  12  ...  20  Next >"
        );
        assert_eq!(pagination_bar(1, 6).unwrap(), "[1]  2  3  4  5  6  Next >");
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut query = ListingQuery::default();
        query.go_to(4);
        assert_eq!(query.request().page, Some(4));
        assert_eq!(query.request().limit, Some(DEFAULT_PAGE_LIMIT));

        query.set_filter(LaptopFilter::new().brand("Dell").page(7));
        assert_eq!(query.page(), 1);
        assert_eq!(query.request().page, Some(1));
        assert_eq!(query.filter().brand.as_deref(), Some("Dell"));

        query.sync(&Meta {
            page: 2,
            limit: 9,
            total_items: 12,
            total_pages: 2,
        });
        assert_eq!(query.page(), 2);

        query.clear_filters();
        assert_eq!(query.page(), 1);
        assert_eq!(query.filter(), &LaptopFilter::default());
    }

    #[test]
    fn test_detail_sheet() {
        let mut item = laptop("lp-9", Some(4.5), &["ultrabook"]);
        item.os = Some("Windows 11".to_string());
        item.stock = 0;

        let text = render_detail(&Loadable::Ready(item));
        assert!(text.contains("★★★★½ (4.5 / 5)"));
        assert!(text.contains("  Operating System: Windows 11"));
        assert!(text.contains("  Stock: Out of Stock"));
        assert!(!text.contains("Screen Size"));
        assert!(text.ends_with("Tags: ultrabook"));

        let failed: Loadable<Laptop> = Loadable::Failed(DETAIL_ERROR.to_string());
        assert_eq!(render_detail(&failed), format!("Error: {}", DETAIL_ERROR));
    }

    #[test]
    fn test_featured_empty() {
        let text = render_featured(&Loadable::Ready(Vec::new()));
        assert!(text.ends_with(NO_FEATURED));
    }
}
