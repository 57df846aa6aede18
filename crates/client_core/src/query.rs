//! Filter, sort and page state, and the backend query derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared::domain::SortKey;
use url::form_urlencoded;

use crate::error::CatalogError;

pub const PAGE_SIZE: u32 = 12;
pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 1000.0;
const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PRICE,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

/// User-facing filter inputs. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: String,
    pub level: String,
    pub rating: String,
    pub price_range: PriceRange,
    pub search: String,
}

impl FilterState {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = rating.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = PriceRange { min, max };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
}

impl PageState {
    pub fn first() -> Self {
        Self { current_page: 1 }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::first()
    }
}

/// Backend query arguments. Always derived from `(FilterState, SortKey, PageState)`, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub rating: Option<f64>,
    pub min_price: f64,
    pub max_price: f64,
    pub sort_by: SortKey,
}

impl QueryParams {
    pub fn derive(
        filters: &FilterState,
        sort: SortKey,
        page: PageState,
    ) -> Result<Self, CatalogError> {
        let rating = non_empty(&filters.rating)
            .map(|raw| parse_rating(&raw))
            .transpose()?;

        let PriceRange { min, max } = filters.price_range;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(CatalogError::validation(format!(
                "price range must be non-negative numbers, got {min}..{max}"
            )));
        }
        if min > max {
            return Err(CatalogError::validation(format!(
                "minimum price {min} exceeds maximum price {max}"
            )));
        }

        Ok(Self {
            page: page.current_page.max(1),
            limit: PAGE_SIZE,
            search: non_empty(&filters.search),
            category: non_empty(&filters.category),
            level: non_empty(&filters.level),
            rating,
            min_price: min,
            max_price: max,
            sort_by: sort,
        })
    }

    /// Wire pairs in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(level) = &self.level {
            pairs.push(("level", level.clone()));
        }
        if let Some(rating) = self.rating {
            pairs.push(("rating", format_number(rating)));
        }
        pairs.push(("minPrice", format_number(self.min_price)));
        pairs.push(("maxPrice", format_number(self.max_price)));
        pairs.push(("sortBy", self.sort_by.as_str().to_string()));
        pairs
    }

    pub fn fingerprint(&self) -> RequestFingerprint {
        RequestFingerprint::from_pairs(&self.to_pairs())
    }
}

/// Order-independent serialized form of a query, used for duplicate suppression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let mut sorted: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();
        sorted.sort_unstable();
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish();
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_rating(raw: &str) -> Result<f64, CatalogError> {
    let rating: f64 = raw
        .parse()
        .map_err(|_| CatalogError::validation(format!("rating '{raw}' is not a number")))?;
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(CatalogError::validation(format!(
            "rating {rating} is outside 0..={MAX_RATING}"
        )));
    }
    Ok(rating)
}

// f64's Display already drops a zero fraction ("4", not "4.0").
fn format_number(value: f64) -> String {
    // `-0.0 + 0.0` is `0.0`, so a negative zero renders as `0`.
    format!("{}", value + 0.0)
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
