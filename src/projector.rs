//! Next-purchase projection
//!
//! The subscription service reports the user's purchase counters and the
//! tiers that apply to their next paid purchase. This module turns that into
//! the options a purchase form offers.

use serde::{Deserialize, Serialize};

use crate::tiers::PricingTier;

/// Label of the single disabled option shown when no tier applies.
pub const NO_TIER_AVAILABLE_LABEL: &str = "Không có gói nào khả dụng";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTierInfo {
    pub total_purchases: u32,
    pub paid_purchases: u32,
    pub next_paid_purchase_count: u32,
    pub has_free_subscription: bool,
    #[serde(default)]
    pub next_tier: Vec<PricingTier>,
}

impl NextTierInfo {
    /// Project the next purchase locally from the full tier list, for services
    /// that only report counters.
    pub fn project_from_tiers(
        tiers: &[PricingTier],
        total_purchases: u32,
        paid_purchases: u32,
        has_free_subscription: bool,
    ) -> Self {
        let next_paid_purchase_count = paid_purchases.saturating_add(1);
        let next_tier = tiers
            .iter()
            .filter(|t| t.purchase_ordinal() == next_paid_purchase_count)
            .cloned()
            .collect();

        NextTierInfo {
            total_purchases,
            paid_purchases,
            next_paid_purchase_count,
            has_free_subscription,
            next_tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierOption {
    pub id: Option<String>,
    pub label: String,
    pub price_vnd: Option<u64>,
    pub disabled: bool,
}

impl TierOption {
    fn from_tier(tier: &PricingTier) -> Self {
        TierOption {
            id: Some(tier.id.clone()),
            label: format!("{} - {} VNĐ", tier.tier_name, format_vnd(tier.price_vnd)),
            price_vnd: Some(tier.price_vnd),
            disabled: false,
        }
    }

    fn placeholder() -> Self {
        TierOption {
            id: None,
            label: NO_TIER_AVAILABLE_LABEL.to_string(),
            price_vnd: None,
            disabled: true,
        }
    }
}

/// One option per candidate tier, or a single disabled placeholder.
pub fn tier_options(info: &NextTierInfo) -> Vec<TierOption> {
    if info.next_tier.is_empty() {
        return vec![TierOption::placeholder()];
    }
    info.next_tier.iter().map(TierOption::from_tier).collect()
}

/// Counters plus purchase options, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextTierSummary {
    pub total_purchases: u32,
    pub paid_purchases: u32,
    pub next_paid_purchase_count: u32,
    pub has_free_subscription: bool,
    pub options: Vec<TierOption>,
    pub selectable: bool,
}

impl NextTierSummary {
    pub fn project(info: &NextTierInfo) -> Self {
        let options = tier_options(info);
        let selectable = options.iter().any(|o| !o.disabled);

        NextTierSummary {
            total_purchases: info.total_purchases,
            paid_purchases: info.paid_purchases,
            next_paid_purchase_count: info.next_paid_purchase_count,
            has_free_subscription: info.has_free_subscription,
            options,
            selectable,
        }
    }
}

/// Format a đồng amount with `.` as the thousands separator (199000 -> "199.000").
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
