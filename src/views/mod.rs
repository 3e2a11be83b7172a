//! Text views
//!
//! Each page of the storefront renders to plain text for the terminal.
//! Pages that fetch data hold a [`Loadable`] and render a loading line, an
//! inline error, or the result.

mod account;
mod admin;
mod catalog;
mod chat;

pub use account::render_profile;
pub use admin::{page_after_delete, render_admin_table, DELETE_CONFIRMATION};
pub use catalog::{
    laptop_card, pagination_bar, render_detail, render_featured, render_listing, star_rating,
    ListingQuery, StarRating, DETAIL_ERROR, EMPTY_LISTING,
};
pub use chat::{render_message, render_transcript};

use std::future::Future;
use std::io::Write;

use crate::api::ApiError;

/// State of a data-fetching view
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> Loadable<T> {
    /// Failures render the error's own message
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => Loadable::Failed(e.message),
        }
    }

    /// Failures render `message` whatever the error was
    pub fn from_result_or(result: Result<T, ApiError>, message: &str) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                tracing::debug!(status = e.status, "Replacing error message: {}", e.message);
                Loadable::Failed(message.to_string())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Loadable::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Render with `f` when ready; loading and failure get the shared lines
    pub fn render(&self, loading: &str, f: impl FnOnce(&T) -> String) -> String {
        match self {
            Loadable::Loading => loading.to_string(),
            Loadable::Failed(message) => format!("Error: {}", message),
            Loadable::Ready(value) => f(value),
        }
    }
}

/// Write the view's loading line to `out`, then wait for its data
pub async fn load<T, F>(
    out: &mut impl Write,
    render: impl Fn(&Loadable<T>) -> String,
    pending: F,
) -> Loadable<T>
where
    F: Future<Output = Loadable<T>>,
{
    if let Err(e) = writeln!(out, "{}", render(&Loadable::Loading)) {
        tracing::debug!(error = %e, "Failed to write loading indicator");
    }
    pending.await
}

/// `$1299.99`
pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}
