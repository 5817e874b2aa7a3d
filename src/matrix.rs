//! Price grid construction
//!
//! Turns the flat tier list into a purchase-ordinal x duration-month table:
//! - rows are the distinct purchase ordinals, ascending
//! - columns are the distinct durations in months, ascending
//! - cells hold the price, or nothing when no tier covers the pair

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde_json::Value;

use crate::projector::format_vnd;
use crate::tiers::{tiers_from_value, PricingTier};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceMatrix {
    purchase_ordinals: Vec<u32>,
    duration_months: Vec<u32>,
    cells: HashMap<(u32, u32), u64>,
}

impl PriceMatrix {
    /// Build the grid from `tiers`.
    ///
    /// When two tiers land on the same (ordinal, months) pair the later one in
    /// input order wins.
    pub fn build(tiers: &[PricingTier]) -> Self {
        let mut ordinals = BTreeSet::new();
        let mut months = BTreeSet::new();
        let mut cells = HashMap::new();

        for tier in tiers {
            let ordinal = tier.purchase_ordinal();
            let month = tier.duration_months();
            ordinals.insert(ordinal);
            months.insert(month);

            if let Some(previous) = cells.insert((ordinal, month), tier.price_vnd) {
                // Almost always a data-entry mistake upstream.
                tracing::warn!(
                    tier_id = %tier.id,
                    ordinal,
                    months = month,
                    previous,
                    replacement = tier.price_vnd,
                    "duplicate tier for the same purchase and duration, keeping the later one"
                );
            }
        }

        let matrix = PriceMatrix {
            purchase_ordinals: ordinals.into_iter().collect(),
            duration_months: months.into_iter().collect(),
            cells,
        };
        tracing::debug!(
            rows = matrix.purchase_ordinals.len(),
            columns = matrix.duration_months.len(),
            cells = matrix.cells.len(),
            "built price matrix"
        );
        matrix
    }

    /// Build from raw service JSON, treating anything malformed as no tiers.
    pub fn from_value(value: &Value) -> Self {
        Self::build(&tiers_from_value(value))
    }

    pub fn purchase_ordinals(&self) -> &[u32] {
        &self.purchase_ordinals
    }

    pub fn duration_months(&self) -> &[u32] {
        &self.duration_months
    }

    pub fn cell(&self, ordinal: u32, months: u32) -> Option<u64> {
        self.cells.get(&(ordinal, months)).copied()
    }

    /// Every column of one row, in column order.
    pub fn row(&self, ordinal: u32) -> impl Iterator<Item = (u32, Option<u64>)> + '_ {
        self.duration_months
            .iter()
            .map(move |&months| (months, self.cell(ordinal, months)))
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Display for PriceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FIRST_COL: usize = 16;
        const COL: usize = 14;

        write!(f, "{:<FIRST_COL$}", "Lần mua")?;
        for months in &self.duration_months {
            write!(f, "{:>COL$}", format!("{} tháng", months))?;
        }
        writeln!(f)?;

        for &ordinal in &self.purchase_ordinals {
            write!(f, "{:<FIRST_COL$}", format!("Lần mua thứ {}", ordinal))?;
            for (_, price) in self.row(ordinal) {
                let text = price.map(format_vnd).unwrap_or_else(|| "-".to_string());
                write!(f, "{:>COL$}", text)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
