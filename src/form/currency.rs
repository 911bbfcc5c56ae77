//! Locale-aware currency mask for text inputs.
//!
//! The user types freely; every keystroke re-masks the whole field. Digits
//! are the only thing that matters — `"350000"`, `"3.500,00"` and
//! `"R$ 3500,00"` all carry the same value. The digit string is read as
//! integer cents (two implicit decimals), displayed with the locale's
//! separators, and stored as the canonical decimal-point string the backend
//! expects. Storage is derived from the display by swapping separators,
//! never by locale-naive parsing of the masked text.
//!
//! An empty input means "unset", not zero.

use crate::config::CurrencyLocale;

/// Digit strings longer than this are truncated before the cents
/// conversion; 15 digits is beyond any plausible price and keeps the value
/// comfortably inside `u64`.
const MAX_DIGITS: usize = 15;

// =============================================================================
// MASKING
// =============================================================================

/// Extract the digit payload of a raw input string.
#[must_use]
pub fn digits_of(raw: &str) -> String {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.truncate(MAX_DIGITS);
    digits
}

/// Mask a raw keystroke string into the locale display form, or `""` when
/// the input carries no digits.
#[must_use]
pub fn mask(raw: &str, locale: &CurrencyLocale) -> String {
    match cents_of(raw) {
        Some(cents) => format_cents(cents, locale),
        None => String::new(),
    }
}

/// Integer-cents value of a raw input, `None` when there are no digits.
#[must_use]
pub fn cents_of(raw: &str) -> Option<u64> {
    let digits = digits_of(raw);
    if digits.is_empty() {
        return None;
    }
    // MAX_DIGITS keeps this in range.
    digits.parse::<u64>().ok()
}

/// Format integer cents with the locale's separators and exactly two
/// decimal digits.
#[must_use]
pub fn format_cents(cents: u64, locale: &CurrencyLocale) -> String {
    let whole = cents / 100;
    let frac = cents % 100;

    let whole_digits = whole.to_string();
    let mut grouped = String::with_capacity(whole_digits.len() + whole_digits.len() / 3 + 3);
    for (i, ch) in whole_digits.chars().enumerate() {
        if i > 0 && (whole_digits.len() - i) % 3 == 0 {
            grouped.push(locale.thousands);
        }
        grouped.push(ch);
    }
    format!("{grouped}{}{frac:02}", locale.decimal)
}

/// Canonical decimal-point storage string for a masked display value,
/// derived by separator swap. `None` for an empty display.
#[must_use]
pub fn storage_of(display: &str, locale: &CurrencyLocale) -> Option<String> {
    if display.is_empty() {
        return None;
    }
    let mut storage = String::with_capacity(display.len());
    for ch in display.chars() {
        if ch == locale.thousands {
            continue;
        }
        if ch == locale.decimal {
            storage.push('.');
        } else {
            storage.push(ch);
        }
    }
    Some(storage)
}

// =============================================================================
// FIELD
// =============================================================================

/// Display/storage pair backing one currency text input.
///
/// `display` is what the text field shows; `storage` is the canonical
/// numeric string sent to the backend. They only change together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyField {
    display: String,
    storage: Option<String>,
}

impl CurrencyField {
    /// Re-mask from a raw keystroke string.
    pub fn set_input(&mut self, raw: &str, locale: &CurrencyLocale) {
        self.display = mask(raw, locale);
        self.storage = storage_of(&self.display, locale);
    }

    /// Prefill from a numeric amount already persisted on the backend
    /// (edit-mode hydration). Non-finite or negative amounts leave the
    /// field unset.
    pub fn hydrate(&mut self, amount: f64, locale: &CurrencyLocale) {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents < 0.0 {
            self.clear();
            return;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cents = cents as u64;
        self.display = format_cents(cents, locale);
        self.storage = storage_of(&self.display, locale);
    }

    pub fn clear(&mut self) {
        self.display.clear();
        self.storage = None;
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn storage(&self) -> Option<&str> {
        self.storage.as_deref()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.storage.is_some()
    }

    /// Storage value parsed as a number, for validation.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.storage.as_deref().and_then(|s| s.parse::<f64>().ok())
    }
}

#[cfg(test)]
#[path = "currency_test.rs"]
mod tests;
