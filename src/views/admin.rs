//! Admin dashboard table

use super::{format_price, Loadable};
use crate::api::{Laptop, Paginated};
use crate::views::catalog::pagination_bar;

pub const DELETE_CONFIRMATION: &str =
    "Are you sure you want to delete this laptop? This action cannot be undone.";

const NO_LAPTOPS: &str = "No laptops found. Add one to get started!";

/// Page to show after deleting a row.
///
/// Removing the only row of a page past the first steps back one page;
/// otherwise the current page is reloaded.
pub fn page_after_delete(current_page: u32, rows_on_page: usize) -> u32 {
    if rows_on_page == 1 && current_page > 1 {
        current_page - 1
    } else {
        current_page.max(1)
    }
}

fn rating_cell(laptop: &Laptop) -> String {
    laptop
        .rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Inventory table with id, brand and model, price, stock and rating columns
pub fn render_admin_table(state: &Loadable<Paginated<Laptop>>) -> String {
    state.render("Loading laptops...", |page| {
        if page.data.is_empty() {
            return NO_LAPTOPS.to_string();
        }

        let header = ["ID", "Brand & Model", "Price", "Stock", "Rating"];
        let rows: Vec<[String; 5]> = page
            .data
            .iter()
            .map(|laptop| {
                [
                    laptop.id.clone(),
                    laptop.title(),
                    format_price(laptop.price),
                    laptop.stock.to_string(),
                    rating_cell(laptop),
                ]
            })
            .collect();

        let mut widths = header.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let mut lines = vec![format_row(&header, &widths), format_row(&rule, &widths)];
        lines.extend(rows.iter().map(|row| format_row(row, &widths)));

        if let Some(bar) = pagination_bar(page.meta.page, page.meta.total_pages) {
            lines.push(String::new());
            lines.push(bar);
        }

        lines.join("\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Meta;

    fn laptop(id: &str, model: &str, rating: Option<f64>) -> Laptop {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "brand": "Lenovo",
            "model": model,
            "processor": "Ryzen 7",
            "ram": "16GB",
            "storage": "1TB SSD",
            "price": 999.0,
            "stock": 0,
            "rating": rating,
        }))
        .unwrap()
    }

    #[test]
    fn test_page_after_delete() {
        assert_eq!(page_after_delete(3, 1), 2);
        assert_eq!(page_after_delete(3, 4), 3);
        assert_eq!(page_after_delete(1, 1), 1);
        assert_eq!(page_after_delete(0, 1), 1);
    }

    #[test]
    fn test_table_rows() {
        let state = Loadable::Ready(Paginated {
            data: vec![
                laptop("a1", "ThinkPad X1", Some(4.25)),
                laptop("b22", "Yoga", None),
            ],
            meta: Meta {
                page: 1,
                limit: 9,
                total_items: 2,
                total_pages: 1,
            },
        });

        let text = render_admin_table(&state);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID   Brand & Model"));
        assert!(lines[1].starts_with("---  "));
        assert!(lines[2].contains("Lenovo ThinkPad X1"));
        assert!(lines[2].ends_with("4.2") || lines[2].ends_with("4.3"));
        assert!(lines[3].ends_with("N/A"));
        assert!(lines[3].contains("$999.00"));
    }

    #[test]
    fn test_empty_table() {
        let state = Loadable::Ready(Paginated {
            data: Vec::new(),
            meta: Meta {
                page: 1,
                limit: 9,
                total_items: 0,
                total_pages: 0,
            },
        });
        assert_eq!(render_admin_table(&state), NO_LAPTOPS);
    }
}
