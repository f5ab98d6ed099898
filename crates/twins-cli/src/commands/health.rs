use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use twins_application::{AvailabilityMonitor, ProbeOutcome};
use twins_core::availability::AvailabilitySignal;
use twins_core::config::TwinsConfig;
use twins_core::service::GenerationService;

pub async fn check(service: Arc<dyn GenerationService>, config: &TwinsConfig) -> Result<()> {
    let monitor = AvailabilityMonitor::new(service, config.availability.probe_interval());

    match monitor.probe().await {
        ProbeOutcome::Checked(AvailabilitySignal::Available) => {
            println!("{} {}", "available".green().bold(), config.service.base_url);
            Ok(())
        }
        outcome => {
            println!("{} {}", "unavailable".red().bold(), config.service.base_url);
            anyhow::bail!("health check failed: {:?}", outcome)
        }
    }
}
