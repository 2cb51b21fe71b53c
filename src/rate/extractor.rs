//! Price extraction from the rate page markup.
//!
//! Extraction runs in two stages so the failure modes stay distinct:
//! 1. Structural: container `div` → first `table` → last `tr` → last `td`
//! 2. Textual: the run of characters before the first `₹` in that cell

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{MissingPart, RateError, RateLookup};

/// Literal currency marker that terminates the price in the cell text.
pub const CURRENCY_MARKER: char = '₹';

// Literal selectors and pattern, parsing cannot fail.
#[allow(clippy::expect_used)]
static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").expect("div selector"));
#[allow(clippy::expect_used)]
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector"));
#[allow(clippy::expect_used)]
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));
#[allow(clippy::expect_used)]
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("td selector"));
#[allow(clippy::expect_used)]
static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*?)₹").expect("price pattern"));

/// Returns the trimmed text of the last cell in the last row of the first
/// table inside the first `div` carrying `container_class`.
///
/// # Errors
///
/// Returns [`RateError::StructureNotFound`] naming the first missing piece.
pub fn extract_cell_text(html: &str, container_class: &str) -> Result<String, RateError> {
    let document = Html::parse_document(html);

    let container = document
        .select(&DIV)
        .find(|div| has_class(div, container_class))
        .ok_or(RateError::StructureNotFound(MissingPart::Container))?;

    let table = container
        .select(&TABLE)
        .next()
        .ok_or(RateError::StructureNotFound(MissingPart::Table))?;

    let row = table
        .select(&ROW)
        .last()
        .ok_or(RateError::StructureNotFound(MissingPart::Row))?;

    let cell = row
        .select(&CELL)
        .last()
        .ok_or(RateError::StructureNotFound(MissingPart::Cell))?;

    Ok(cell.text().collect::<String>().trim().to_owned())
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Parses the price out of a cell's text: everything on the matching line
/// before the first currency marker, trimmed.
///
/// # Errors
///
/// Returns [`RateError::PriceNotParsed`] if the text has no currency marker.
pub fn parse_price(cell_text: &str) -> Result<String, RateError> {
    PRICE
        .captures(cell_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .ok_or_else(|| RateError::PriceNotParsed(cell_text.to_owned()))
}

/// Runs both extraction stages over the page markup.
///
/// # Errors
///
/// Returns the error of whichever stage failed.
pub fn extract_price(html: &str, container_class: &str) -> Result<String, RateError> {
    let cell_text = extract_cell_text(html, container_class)?;
    debug!("Rate cell text: \"{}\"", cell_text);
    parse_price(&cell_text)
}

/// Extracts the price, degrading every failure to [`RateLookup::NotFound`].
#[must_use]
pub fn lookup_from_markup(html: &str, container_class: &str) -> RateLookup {
    match extract_price(html, container_class) {
        Ok(price) => RateLookup::Found(price),
        Err(e) => {
            warn!("Could not extract gold rate: {}", e);
            RateLookup::NotFound
        }
    }
}
