//! Pricing tier records as delivered by the subscription service.
//!
//! Tiers carry two derived keys used everywhere else in the crate:
//! - the purchase ordinal (1st, 2nd, 3rd purchase...)
//! - the duration in whole months

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordinal embedded in legacy tier names, e.g. "Lần mua thứ 3".
static ORDINAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Lần mua thứ ([0-9]+)").expect("ordinal pattern is valid"));

const DAYS_PER_MONTH: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub id: String,
    pub tier_name: String,
    pub duration_days: u32,
    pub price_vnd: u64,
    /// Explicit ordinal. Older records leave this out and encode it in `tier_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_ordinal: Option<u32>,
}

impl PricingTier {
    pub fn new(id: &str, tier_name: &str, duration_days: u32, price_vnd: u64) -> Self {
        PricingTier {
            id: id.to_string(),
            tier_name: tier_name.to_string(),
            duration_days,
            price_vnd,
            purchase_ordinal: None,
        }
    }

    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.purchase_ordinal = Some(ordinal);
        self
    }

    /// Which purchase this tier prices. Defaults to 1 (base tier) when the
    /// name carries no ordinal.
    pub fn purchase_ordinal(&self) -> u32 {
        if let Some(ordinal) = self.purchase_ordinal {
            return ordinal;
        }

        tracing::warn!(
            tier_id = %self.id,
            tier_name = %self.tier_name,
            "tier has no purchase_ordinal field, parsing it from the name"
        );
        Self::extract_ordinal(&self.tier_name).unwrap_or(1)
    }

    /// Duration rounded half-up to whole months (105 days -> 4).
    pub fn duration_months(&self) -> u32 {
        ((u64::from(self.duration_days) + u64::from(DAYS_PER_MONTH / 2)) / u64::from(DAYS_PER_MONTH)) as u32
    }

    fn extract_ordinal(text: &str) -> Option<u32> {
        ORDINAL_PATTERN
            .captures(text)?
            .get(1)?
            .as_str()
            .parse()
            .ok()
    }
}

/// Coerce whatever the service sent into a tier list.
///
/// Anything that is not an array of well-formed tiers becomes an empty list.
pub fn tiers_from_value(value: &Value) -> Vec<PricingTier> {
    if !value.is_array() {
        tracing::warn!(kind = json_kind(value), "expected a tier array, treating as empty");
        return Vec::new();
    }

    match serde_json::from_value::<Vec<PricingTier>>(value.clone()) {
        Ok(tiers) => tiers,
        Err(e) => {
            tracing::warn!(error = %e, "malformed tier list, treating as empty");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
