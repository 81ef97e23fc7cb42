//! Offset pagination primitives shared by recordkeeper list endpoints.
//!
//! List endpoints accept a 1-based `page` number and a page size. Both arrive
//! as raw query-string values and are parsed leniently: any numeric literal
//! whose value is an integer (`"2"`, `" 2 "`, `"2.0"`, `"1e1"`, `"0x10"`) is
//! accepted, anything else is rejected.
//! A parsed [`PageRequest`] exposes the `offset`/`limit` window handed to
//! storage adapters, and [`Page`] pairs one window of items with the total
//! number of matching items.
//!
//! # Examples
//!
//! ```
//! use pagination::PageRequest;
//!
//! let request = PageRequest::parse(Some("3"), Some("10")).expect("valid request");
//! assert_eq!(request.offset(), 20);
//! assert_eq!(request.limit(), 10);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Page number used when the client omits one.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the client omits one.
pub const DEFAULT_PER_PAGE: u64 = 5;

/// Identifies which pagination input failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageField {
    /// The 1-based page number.
    Page,
    /// The number of items per page.
    PerPage,
}

impl PageField {
    /// Stable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::PerPage => "per_page",
        }
    }
}

impl fmt::Display for PageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures raised while building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The raw value is not an integer-valued number.
    #[error("{field} must be an integer")]
    NotAnInteger {
        /// Offending input.
        field: PageField,
    },
    /// The value parsed but is smaller than 1.
    #[error("{field} must be at least 1")]
    BelowMinimum {
        /// Offending input.
        field: PageField,
    },
    /// The requested window starts beyond the addressable range.
    #[error("page window is out of range")]
    Overflow,
}

/// Validated offset pagination request.
///
/// ## Invariants
/// - `page >= 1` and `per_page >= 1`.
/// - `(page - 1) * per_page` fits in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request from already-numeric values.
    ///
    /// # Errors
    /// Returns [`PageRequestError::BelowMinimum`] for zero values and
    /// [`PageRequestError::Overflow`] when the offset cannot be represented.
    pub fn new(page: u64, per_page: u64) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError::BelowMinimum {
                field: PageField::Page,
            });
        }
        if per_page < 1 {
            return Err(PageRequestError::BelowMinimum {
                field: PageField::PerPage,
            });
        }
        (page - 1)
            .checked_mul(per_page)
            .ok_or(PageRequestError::Overflow)?;
        Ok(Self { page, per_page })
    }

    /// Parse raw query-string values, applying defaults for missing inputs.
    ///
    /// Both values are checked for integer shape before either is range
    /// checked, so a request with one malformed and one zero value reports
    /// the malformed one.
    ///
    /// # Errors
    /// Returns [`PageRequestError::NotAnInteger`] when a value is not an
    /// integer-valued number, otherwise the errors of [`PageRequest::new`].
    pub fn parse(page: Option<&str>, per_page: Option<&str>) -> Result<Self, PageRequestError> {
        let raw_page = parse_field(page, PageField::Page, DEFAULT_PAGE)?;
        let raw_per_page = parse_field(per_page, PageField::PerPage, DEFAULT_PER_PAGE)?;
        Self::new(
            raw_page.into_count(PageField::Page)?,
            raw_per_page.into_count(PageField::PerPage)?,
        )
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of items to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        // Construction guarantees the product fits.
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page
    }
}

fn parse_field(
    raw: Option<&str>,
    field: PageField,
    default: u64,
) -> Result<Integral, PageRequestError> {
    raw.map_or(
        Ok(Integral::Value {
            negative: false,
            magnitude: default,
        }),
        |value| parse_integral(value).ok_or(PageRequestError::NotAnInteger { field }),
    )
}

/// Integer value carried by a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Integral {
    Value { negative: bool, magnitude: u64 },
    /// Integer-valued but beyond `u64`.
    TooLarge { negative: bool },
}

impl Integral {
    const fn into_count(self, field: PageField) -> Result<u64, PageRequestError> {
        match self {
            Self::Value {
                negative: false,
                magnitude,
            } => Ok(magnitude),
            Self::Value {
                negative: true,
                magnitude,
            } => {
                if magnitude == 0 {
                    Ok(0)
                } else {
                    Err(PageRequestError::BelowMinimum { field })
                }
            }
            Self::TooLarge { negative: true } => Err(PageRequestError::BelowMinimum { field }),
            Self::TooLarge { negative: false } => Err(PageRequestError::Overflow),
        }
    }
}

/// Read a numeric literal and return its value when that value is an
/// integer.
///
/// Accepts surrounding whitespace, an optional sign, decimal digits with an
/// optional fraction and exponent (`"2"`, `"2.50e1"`, `".5e1"`), and unsigned
/// `0x`/`0o`/`0b` literals. Blank input reads as zero. The check is exact, so
/// `"1.5"` and `"1e-1"` are rejected while `"1.50e1"` is accepted.
fn parse_integral(raw: &str) -> Option<Integral> {
    let literal = raw.trim();
    if literal.is_empty() {
        return Some(Integral::Value {
            negative: false,
            magnitude: 0,
        });
    }
    if let Some(magnitude) = parse_prefixed(literal) {
        return Some(Integral::Value {
            negative: false,
            magnitude,
        });
    }

    let (negative, unsigned) = literal.strip_prefix('-').map_or_else(
        || (false, literal.strip_prefix('+').unwrap_or(literal)),
        |rest| (true, rest),
    );
    let (mantissa, exponent_text) = unsigned.split_once(['e', 'E']).unwrap_or((unsigned, "0"));
    let exponent = exponent_text.parse::<i64>().ok()?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }

    let digits = format!("{whole}{fraction}");
    let significant = digits.trim_start_matches('0');
    let stripped = significant.trim_end_matches('0');
    if stripped.is_empty() {
        return Some(Integral::Value {
            negative,
            magnitude: 0,
        });
    }

    // Value is `stripped * 10^scale`; a negative scale leaves a fraction.
    let trailing_zeros = i64::try_from(significant.len() - stripped.len()).ok()?;
    let fraction_len = i64::try_from(fraction.len()).ok()?;
    let scale = exponent
        .checked_sub(fraction_len)?
        .checked_add(trailing_zeros)?;
    if scale < 0 {
        return None;
    }

    let magnitude = stripped.parse::<u64>().ok().and_then(|base| {
        u32::try_from(scale)
            .ok()
            .and_then(|power| 10_u64.checked_pow(power))
            .and_then(|factor| base.checked_mul(factor))
    });
    Some(magnitude.map_or(Integral::TooLarge { negative }, |value| {
        Integral::Value {
            negative,
            magnitude: value,
        }
    }))
}

/// Unsigned hexadecimal, octal or binary literal such as `"0x1f"`.
fn parse_prefixed(literal: &str) -> Option<u64> {
    let (radix, digits) = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| {
            literal
                .get(..2)
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .and_then(|_| literal.get(2..))
                .map(|digits| (radix, digits))
        })?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_alphanumeric()) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

/// One window of results plus the total number of matching items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items inside the requested window.
    pub items: Vec<T>,
    /// Total number of items matching the query, ignoring the window.
    pub count: u64,
}

impl<T> Page<T> {
    /// Pair a window of items with the unpaginated total.
    #[must_use]
    pub const fn new(items: Vec<T>, count: u64) -> Self {
        Self { items, count }
    }

    /// Transform every item while keeping the total.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
        }
    }
}
