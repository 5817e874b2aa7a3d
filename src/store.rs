use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::matrix::PriceMatrix;
use crate::projector::{NextTierInfo, NextTierSummary};
use crate::tiers::PricingTier;

/// Last pricing data fetched from the service, persisted between runs.
///
/// Loaded once at startup and saved after each successful refresh; nothing
/// else touches the file.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PricingSnapshot {
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
    #[serde(default)]
    pub next_tier: Option<NextTierInfo>,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    path: PathBuf,
}

impl PricingSnapshot {
    /// Load a snapshot from `path`. If missing or invalid, returns an empty snapshot.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let empty = || PricingSnapshot {
            path: path.to_path_buf(),
            ..PricingSnapshot::default()
        };

        match fs::read_to_string(path) {
            Ok(s) => match serde_json::from_str::<PricingSnapshot>(&s) {
                Ok(mut snapshot) => {
                    snapshot.path = path.to_path_buf();
                    tracing::info!(
                        path = %path.display(),
                        tiers = snapshot.tiers.len(),
                        "loaded pricing snapshot"
                    );
                    snapshot
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not parse snapshot, starting fresh");
                    empty()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => empty(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read snapshot, starting fresh");
                empty()
            }
        }
    }

    /// Write the snapshot to a temp file and rename it over the target.
    pub fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "saved pricing snapshot");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn replace(&mut self, tiers: Vec<PricingTier>, next_tier: Option<NextTierInfo>) {
        self.tiers = tiers;
        self.next_tier = next_tier;
        self.fetched_at = Some(Utc::now());
    }

    /// Apply a refresh where the next-tier fetch may have failed. A `None`
    /// keeps the previously known next tier.
    pub fn refresh_with(&mut self, tiers: Vec<PricingTier>, next_tier: Option<NextTierInfo>) {
        let next_tier = next_tier.or_else(|| self.next_tier.take());
        self.replace(tiers, next_tier);
    }

    /// True if never fetched, or fetched more than `max_age` before `now`.
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.fetched_at {
            Some(at) => now - at > max_age,
            None => true,
        }
    }

    pub fn matrix(&self) -> PriceMatrix {
        PriceMatrix::build(&self.tiers)
    }

    pub fn summary(&self) -> Option<NextTierSummary> {
        self.next_tier.as_ref().map(NextTierSummary::project)
    }
}
