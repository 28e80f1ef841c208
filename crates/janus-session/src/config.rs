//! # Session Configuration
//!
//! Tenant-level settings read once when a session starts.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`JANUS_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after a session is created.

use serde::{Deserialize, Serialize};

use janus_core::{DraftDefaults, Money, PaymentTerms, TaxRate, DEFAULT_TENANT_ID};

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Tenant the documents are filed under.
    pub tenant_id: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Tax rate preset on new lines.
    pub default_tax_rate: TaxRate,

    /// Terms preselected on new invoices.
    pub default_terms: PaymentTerms,

    /// How many undo steps a session keeps.
    pub history_limit: usize,
}

impl Default for SessionConfig {
    /// Development defaults: USD, no default tax, Net 30, 50 undo steps.
    fn default() -> Self {
        SessionConfig {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            default_tax_rate: TaxRate::zero(),
            default_terms: PaymentTerms::Net30,
            history_limit: 50,
        }
    }
}

impl SessionConfig {
    /// Builds the configuration from the process environment.
    ///
    /// ## Environment Variables
    /// - `JANUS_TENANT_ID`: Override tenant ID
    /// - `JANUS_CURRENCY_CODE` / `JANUS_CURRENCY_SYMBOL`: Display currency
    /// - `JANUS_DEFAULT_TAX_RATE`: Percent preset on new lines (e.g. "5")
    /// - `JANUS_DEFAULT_TERMS`: Invoice terms (e.g. "net_15")
    /// - `JANUS_HISTORY_LIMIT`: Undo depth
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] with an explicit variable source.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SessionConfig::default();

        if let Some(tenant_id) = lookup("JANUS_TENANT_ID") {
            config.tenant_id = tenant_id;
        }

        if let Some(code) = lookup("JANUS_CURRENCY_CODE") {
            config.currency_code = code;
        }

        if let Some(symbol) = lookup("JANUS_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(rate) = lookup("JANUS_DEFAULT_TAX_RATE") {
            config.default_tax_rate = TaxRate::parse_percent_lenient(&rate);
        }

        if let Some(terms) = lookup("JANUS_DEFAULT_TERMS").and_then(|t| PaymentTerms::parse(&t)) {
            config.default_terms = terms;
        }

        if let Some(limit) = lookup("JANUS_HISTORY_LIMIT").and_then(|l| l.trim().parse().ok()) {
            config.history_limit = limit;
        }

        config
    }

    /// Presets handed to every new draft.
    pub fn draft_defaults(&self) -> DraftDefaults {
        DraftDefaults {
            terms: self.default_terms,
            tax_rate: self.default_tax_rate,
        }
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust
    /// use janus_core::Money;
    /// use janus_session::SessionConfig;
    ///
    /// let config = SessionConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(123_456)), "$1,234.56");
    /// assert_eq!(config.format_currency(Money::from_cents(-5)), "-$0.05");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let whole = (cents / 100).unsigned_abs().to_string();
        let frac = (cents % 100).unsigned_abs();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            grouped,
            frac
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_currency() {
        let config = SessionConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(1)), "$0.01");
        assert_eq!(config.format_currency(Money::zero()), "$0.00");
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-$12.34");
        assert_eq!(
            config.format_currency(Money::from_cents(123_456_789)),
            "$1,234,567.89"
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("JANUS_TENANT_ID", "acme"),
            ("JANUS_CURRENCY_SYMBOL", "€"),
            ("JANUS_DEFAULT_TAX_RATE", "7.5"),
            ("JANUS_DEFAULT_TERMS", "Net 15"),
            ("JANUS_HISTORY_LIMIT", "5"),
        ]));

        assert_eq!(config.tenant_id, "acme");
        assert_eq!(config.default_tax_rate.bps(), 750);
        assert_eq!(config.default_terms, PaymentTerms::Net15);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.format_currency(Money::from_cents(500)), "€5.00");
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("JANUS_DEFAULT_TERMS", "whenever"),
            ("JANUS_HISTORY_LIMIT", "lots"),
        ]));
        assert_eq!(config, SessionConfig::default());
    }
}
