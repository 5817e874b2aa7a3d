use chrono::Utc;
use tracing_subscriber::EnvFilter;

use vnstock_pricing::client::PricingClient;
use vnstock_pricing::config::{AppConfig, ConfigError, LogConfig, ValidationError};
use vnstock_pricing::{NextTierSummary, PricingSnapshot, Result};

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn refresh(client: &PricingClient, snapshot: &mut PricingSnapshot) -> Result<()> {
    let tiers = client.fetch_tiers().await?;
    let next_tier = match client.fetch_next_tier().await {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!(error = %e, "next tier unavailable, keeping the previous one");
            None
        }
    };
    snapshot.refresh_with(tiers, next_tier);
    if let Err(e) = snapshot.save() {
        tracing::error!(error = %e, "could not save snapshot, fetched data kept in memory only");
    }
    Ok(())
}

fn print_summary(summary: &NextTierSummary) {
    println!("Tổng số lần mua: {}", summary.total_purchases);
    println!("Số lần mua có phí: {}", summary.paid_purchases);
    println!("Lần mua tiếp theo: {}", summary.next_paid_purchase_count);
    println!(
        "Gói miễn phí: {}",
        if summary.has_free_subscription { "có" } else { "không" }
    );
    for option in &summary.options {
        let marker = if option.disabled { " (không thể chọn)" } else { "" };
        println!("  - {}{}", option.label, marker);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.log);
    config.validate().map_err(ConfigError::from)?;

    let mut snapshot = PricingSnapshot::load(&config.cache.path);
    let max_age = config
        .cache
        .max_age()
        .ok_or(ConfigError::from(ValidationError::InvalidMaxAge))?;

    if snapshot.is_stale(max_age, Utc::now()) {
        let client = PricingClient::new(&config.service)?;
        if let Err(e) = refresh(&client, &mut snapshot).await {
            tracing::error!(error = %e, "fetch failed, using last saved snapshot");
        }
    }

    match snapshot.fetched_at {
        Some(at) => println!("Bảng giá (cập nhật {}):", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("Bảng giá (chưa có dữ liệu):"),
    }
    print!("{}", snapshot.matrix());

    if let Some(summary) = snapshot.summary() {
        println!();
        print_summary(&summary);
    }

    Ok(())
}
