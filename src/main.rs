use std::io::Write;

use slot_finder::{Config, SlotFinder, SlotResponse};
use tracing::{error, info, span, warn};
use tracing_subscriber::EnvFilter;

/// Reads the date and pincodes from the environment, queries the
/// availability API for each pincode and prints every response body that
/// came back. Failures and timeouts are logged, not printed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    info!(
        "Searching slots on {} for {} pincode(s)",
        config.date,
        config.pincodes.len()
    );

    let finder = SlotFinder::from_config(&config)?;
    let report = finder.query(&config.date, config.pincodes.clone()).await;

    let mut stdout = std::io::stdout().lock();
    for response in &report.responses {
        print_response(&mut stdout, response)?;
    }
    stdout.flush()?;

    for failed in &report.failures {
        warn!("Pincode {}: request failed: {}", failed.pincode, failed.error);
    }
    for failed in &report.timeouts {
        warn!("Pincode {}: timed out", failed.pincode);
    }

    span!(tracing::Level::INFO, "summary").in_scope(|| {
        info!(
            "{} response(s), {} failure(s), {} timeout(s), {} slot(s) in total",
            report.responses.len(),
            report.failures.len(),
            report.timeouts.len(),
            report.total_slots()
        );
    });

    Ok(())
}

/// Pretty-prints the decoded body, or the raw text when it is not JSON.
fn print_response(out: &mut impl Write, response: &SlotResponse) -> anyhow::Result<()> {
    match response.json() {
        Ok(body) => writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?,
        Err(e) => {
            error!(
                "Pincode {} returned a non-JSON body (status {}): {}",
                response.pincode, response.status, e
            );
            writeln!(out, "{}", response.body)?;
        }
    }
    Ok(())
}
