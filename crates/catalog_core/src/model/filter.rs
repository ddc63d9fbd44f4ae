//! Product list filter and its normalization from raw query input.
//!
//! # Responsibility
//! - Turn untrusted, optional textual parameters into a bounded filter.
//! - Derive the matching predicate and page window from one filter value.
//!
//! # Invariants
//! - Normalization never fails; malformed values fall back to defaults.
//! - `limit` is always within `[MIN_LIMIT, MAX_LIMIT]` once normalized.
//! - `offset` is never negative.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Page size applied when `limit` is absent or unparseable.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a caller can request.
pub const MAX_LIMIT: u32 = 100;
/// Smallest page size; non-positive requests snap to this.
pub const MIN_LIMIT: u32 = 1;
/// Offset applied when `offset` is absent, unparseable or negative.
pub const DEFAULT_OFFSET: u64 = 0;

pub const OFFSET_PARAM: &str = "offset";
pub const LIMIT_PARAM: &str = "limit";
pub const CATEGORY_PARAM: &str = "category";
pub const PRICE_LESS_THAN_PARAM: &str = "priceLessThan";

/// Raw list parameters exactly as received from the outer layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProductQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub price_less_than: Option<String>,
}

impl RawProductQuery {
    /// Collects recognized parameters from key/value pairs.
    ///
    /// Unknown keys are ignored. When a key repeats, the first value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                OFFSET_PARAM => &mut raw.offset,
                LIMIT_PARAM => &mut raw.limit,
                CATEGORY_PARAM => &mut raw.category,
                PRICE_LESS_THAN_PARAM => &mut raw.price_less_than,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        raw
    }
}

/// Canonical, bounded list filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Rows to skip, ordered by product id.
    pub offset: u64,
    /// Rows to return.
    pub limit: u32,
    /// Exact category name match.
    pub category: Option<String>,
    /// Exclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            category: None,
            max_price: None,
        }
    }
}

impl ProductFilter {
    /// Normalizes raw parameters into a bounded filter.
    ///
    /// Rules:
    /// - `category`: kept verbatim when non-empty.
    /// - `priceLessThan`: decimal (plain or scientific); otherwise absent.
    /// - `offset`: integer, default 0, negatives clamp to 0.
    /// - `limit`: integer, default 10, above 100 clamps to 100, below 1 to 1.
    pub fn normalize(raw: &RawProductQuery) -> Self {
        Self {
            offset: normalize_offset(raw.offset.as_deref()),
            limit: normalize_limit(raw.limit.as_deref()),
            category: raw
                .category
                .as_ref()
                .filter(|value| !value.is_empty())
                .cloned(),
            max_price: parse_price_bound(raw.price_less_than.as_deref()),
        }
    }

    /// Matching condition shared by the count and the page fetch.
    pub fn predicate(&self) -> ProductPredicate {
        ProductPredicate {
            category: self.category.clone(),
            max_price: self.max_price,
        }
    }

    /// Pagination window with the limit re-bounded, so hand-built filters
    /// cannot request unbounded pages.
    pub fn window(&self) -> PageWindow {
        PageWindow {
            offset: self.offset,
            limit: self.limit.clamp(MIN_LIMIT, MAX_LIMIT),
        }
    }
}

/// Matching condition over products. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPredicate {
    pub category: Option<String>,
    pub max_price: Option<Decimal>,
}

impl ProductPredicate {
    /// Predicate matching every product.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Offset/limit slice of an id-ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u32,
}

/// Parses `offset`, falling back to `DEFAULT_OFFSET`.
pub fn normalize_offset(value: Option<&str>) -> u64 {
    match value.and_then(|text| text.parse::<i64>().ok()) {
        Some(parsed) => u64::try_from(parsed).unwrap_or(DEFAULT_OFFSET),
        None => DEFAULT_OFFSET,
    }
}

/// Parses `limit`, falling back to `DEFAULT_LIMIT`, then clamps it.
pub fn normalize_limit(value: Option<&str>) -> u32 {
    match value.and_then(|text| text.parse::<i64>().ok()) {
        Some(parsed) => clamp_limit(parsed),
        None => DEFAULT_LIMIT,
    }
}

/// Clamps a parsed limit into `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(limit: i64) -> u32 {
    if limit > i64::from(MAX_LIMIT) {
        MAX_LIMIT
    } else if limit < i64::from(MIN_LIMIT) {
        MIN_LIMIT
    } else {
        // In range, so the conversion cannot fail.
        u32::try_from(limit).unwrap_or(MIN_LIMIT)
    }
}

/// Parses `priceLessThan`; anything that is not a finite decimal is absent.
pub fn parse_price_bound(value: Option<&str>) -> Option<Decimal> {
    let text = value?;
    // Digit-group separators are not part of the accepted number syntax.
    if text.is_empty() || text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
