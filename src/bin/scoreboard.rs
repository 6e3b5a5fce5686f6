//! Live props board: polls one league's predictions and logs the best edges.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtside_dashboard::constants::{DEFAULT_LEAGUE, POLL_INTERVAL_SECS};
use courtside_dashboard::dashboard::{
    extract_props, filter_and_sort, DashboardClient, Poller, PredictionsOutcome, PropFilter,
    SortKey,
};

const TOP_PROPS: usize = 5;

/// Refresh period in seconds; zero or unparseable values use the default
fn poll_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(POLL_INTERVAL_SECS)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scoreboard=info,courtside_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let league = std::env::var("LEAGUE").unwrap_or_else(|_| DEFAULT_LEAGUE.to_string());
    let every = poll_secs(std::env::var("POLL_SECS").ok().as_deref());

    let client = DashboardClient::new(base_url.as_str())?;
    tracing::info!("Polling {} for {} every {}s", base_url, league, every);

    let poller = Poller::start(Duration::from_secs(every), move || {
        let client = client.clone();
        let league = league.clone();
        async move {
            match client.predictions(&league, None, None).await? {
                PredictionsOutcome::Ready(payload) => {
                    let updated = payload
                        .get("lastUpdated")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown")
                        .to_string();
                    let props = filter_and_sort(
                        extract_props(&payload),
                        &PropFilter::default(),
                        SortKey::EdgePct,
                    );

                    tracing::info!("{}: {} props (updated {})", league, props.len(), updated);
                    for prop in props.iter().take(TOP_PROPS) {
                        tracing::info!(
                            "  {:<24} {:<14} line {:>5.1}  proj {:>5.1}  edge {:+.1} ({:+.1}%)",
                            prop.name,
                            prop.team,
                            prop.line,
                            prop.projection,
                            prop.edge,
                            prop.edge_pct
                        );
                    }
                }
                PredictionsOutcome::Unavailable(body) => {
                    tracing::warn!("{}: {} ({})", body.league, body.error, body.details);
                }
            }
            Ok::<(), courtside_dashboard::dashboard::ClientError>(())
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    poller.stop().await;

    Ok(())
}
