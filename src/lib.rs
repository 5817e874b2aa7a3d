//! Subscription pricing for the stock-investment platform.
//!
//! The price grid ([`matrix`]) and the next-purchase options ([`projector`])
//! are pure transforms over data fetched by [`client`] and kept between runs
//! by [`store`].

pub mod client;
pub mod config;
pub mod error;
pub mod matrix;
pub mod projector;
pub mod store;
pub mod tiers;

pub use error::{Error, Result};
pub use matrix::PriceMatrix;
pub use projector::{format_vnd, tier_options, NextTierInfo, NextTierSummary, TierOption};
pub use store::PricingSnapshot;
pub use tiers::{tiers_from_value, PricingTier};
