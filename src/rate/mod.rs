//! Gold rate lookup module.
//!
//! Fetches the rate page, extracts the 22k price from its rate table
//! and degrades every failure to a "not found" result for the chat reply.

mod extractor;
mod fetcher;
mod source;

use std::fmt;

use thiserror::Error;

pub use extractor::{
    CURRENCY_MARKER, extract_cell_text, extract_price, lookup_from_markup, parse_price,
};
pub use fetcher::PageFetcher;
pub use source::{GoldRateSource, RateProvider};

/// Placeholder shown to users when no rate could be determined.
pub const RATE_NOT_FOUND: &str = "Unable to find rate";

/// Piece of the rate table layout that was not present in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPart {
    Container,
    Table,
    Row,
    Cell,
}

impl fmt::Display for MissingPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Container => "container",
            Self::Table => "table",
            Self::Row => "row",
            Self::Cell => "cell",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while looking up the rate.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("Failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate table layout not found: no {0}")]
    StructureNotFound(MissingPart),

    #[error("No ₹ symbol found in the text: \"{0}\"")]
    PriceNotParsed(String),
}

/// Outcome of a rate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLookup {
    /// Price text as it appeared before the currency marker.
    Found(String),

    /// The page could not be fetched or did not contain a parseable rate.
    NotFound,
}

impl RateLookup {
    /// Returns the price if one was found.
    #[must_use]
    pub fn price(&self) -> Option<&str> {
        match self {
            Self::Found(price) => Some(price),
            Self::NotFound => None,
        }
    }
}

impl fmt::Display for RateLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(price) => f.write_str(price),
            Self::NotFound => f.write_str(RATE_NOT_FOUND),
        }
    }
}
