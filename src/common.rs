//! Helpers shared by services and handlers: paging normalization and
//! record code generation.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

/// Prefix used for generated product ids when the name yields no initials.
const FALLBACK_PRODUCT_PREFIX: &str = "P";

/// A normalized, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// `page` below 1 becomes 1; a `limit` of 0 or above `max_limit`
    /// falls back to `default_limit`. `page` is capped so the row offset
    /// `(page - 1) * limit` stays within `i64::MAX`.
    pub fn normalize(page: u64, limit: u64, default_limit: u64, max_limit: u64) -> Self {
        let limit = if limit == 0 || limit > max_limit {
            default_limit.max(1)
        } else {
            limit
        };
        let last_page = (i64::MAX as u64 / limit).max(1);
        let page = page.clamp(1, last_page);
        Self { page, limit }
    }

    /// Zero-based page index for `Paginator::fetch_page`.
    pub fn index(&self) -> u64 {
        self.page - 1
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

/// Builds a record code: uppercased `prefix`, the first and last digit of
/// the year, `MMDD`, then six random digits. Product codes use the same
/// six-digit suffix as movement codes rather than a shorter one.
pub fn generate_code<R: Rng + ?Sized>(prefix: &str, at: DateTime<Utc>, rng: &mut R) -> String {
    let year = at.year().to_string();
    let first = year.chars().next().unwrap_or('0');
    let last = year.chars().last().unwrap_or('0');
    let suffix: u32 = rng.gen_range(0..1_000_000);

    format!(
        "{}{}{}{:02}{:02}{:06}",
        prefix.to_uppercase(),
        first,
        last,
        at.month(),
        at.day(),
        suffix
    )
}

/// Movement code for "now" with the configured prefix.
pub fn new_movement_code(prefix: &str) -> String {
    generate_code(prefix, Utc::now(), &mut rand::thread_rng())
}

/// Product code for "now" derived from the initials of `product_name`.
pub fn new_product_code(product_name: &str) -> String {
    let initials = name_initials(product_name);
    let prefix = if initials.is_empty() {
        FALLBACK_PRODUCT_PREFIX.to_string()
    } else {
        initials
    };
    generate_code(&prefix, Utc::now(), &mut rand::thread_rng())
}

/// First alphanumeric character of each whitespace-separated word.
fn name_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_ascii_alphanumeric()))
        .collect()
}
