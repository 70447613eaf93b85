use abuja_watch::config::AppConfig;
use abuja_watch::error::AppError;
use abuja_watch::monitoring::{DashboardReport, IncidentFeed, LgaSummary};
use abuja_watch::telemetry;
use chrono::Utc;
use clap::Args;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

#[derive(Args, Debug, Default)]
pub(crate) struct WatchArgs {
    /// Base URL of a running monitoring service
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    /// Seconds between polls (defaults to APP_POLL_INTERVAL_SECS)
    #[arg(long)]
    pub(crate) interval: Option<u64>,
    /// Bearer token sent with every poll
    #[arg(long)]
    pub(crate) token: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Base URL of a running monitoring service
    #[arg(long)]
    pub(crate) base_url: Option<String>,
    /// Bearer token sent with the request
    #[arg(long)]
    pub(crate) token: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum WatchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("poll interval must be at least one second")]
    ZeroInterval,
}

impl From<WatchError> for AppError {
    fn from(value: WatchError) -> Self {
        AppError::Watch(Box::new(value))
    }
}

fn default_base_url(config: &AppConfig) -> String {
    format!("http://{}:{}", config.server.host, config.server.port)
}

/// HTTP client for the public dashboard endpoints.
pub(crate) struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DashboardClient {
    pub(crate) fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WatchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| WatchError::Request {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, WatchError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|source| WatchError::Request {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Status { url, status });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| WatchError::Request { url, source })
    }

    /// Fetches the council summaries and incident feed, then aggregates locally.
    pub(crate) async fn snapshot(&self) -> Result<DashboardReport, WatchError> {
        let summaries: Vec<LgaSummary> = self.get_json("/api/area-councils").await?;
        let feed: IncidentFeed = self.get_json("/api/incidents").await?;
        Ok(DashboardReport::from_summaries(
            summaries,
            &feed.incidents,
            Utc::now(),
        ))
    }
}

/// Holds the last good snapshot across polls.
pub(crate) struct Watcher {
    client: DashboardClient,
    latest: Option<DashboardReport>,
}

impl Watcher {
    pub(crate) fn new(client: DashboardClient) -> Self {
        Self {
            client,
            latest: None,
        }
    }

    pub(crate) fn latest(&self) -> Option<&DashboardReport> {
        self.latest.as_ref()
    }

    /// A failed poll leaves the previous snapshot in place.
    pub(crate) async fn poll(&mut self) -> bool {
        match self.client.snapshot().await {
            Ok(report) => {
                info!(
                    wards_reported = report.overview.wards_reported,
                    incidents = report.security.total_incidents,
                    "dashboard snapshot refreshed"
                );
                self.latest = Some(report);
                true
            }
            Err(error) => {
                warn!(%error, stale = self.latest.is_some(), "dashboard poll failed");
                false
            }
        }
    }
}

pub(crate) async fn run_watch(args: WatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let period = match args.interval {
        Some(0) => return Err(WatchError::ZeroInterval.into()),
        Some(secs) => Duration::from_secs(secs),
        None => config.poll.interval(),
    };
    let base_url = args.base_url.unwrap_or_else(|| default_base_url(&config));
    let client = DashboardClient::new(base_url.clone(), args.token, config.poll.timeout())?;
    let mut watcher = Watcher::new(client);

    info!(%base_url, period_secs = period.as_secs(), "watching dashboard");
    watch_until(&mut watcher, period, async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    })
    .await;
    info!("watch stopped");
    Ok(())
}

/// Polls on every tick until `shutdown` resolves, even in the middle of a poll.
pub(crate) async fn watch_until<F>(watcher: &mut Watcher, period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => return,
        }
        // Awaited before the next tick, so polls never overlap.
        let refreshed = tokio::select! {
            refreshed = watcher.poll() => refreshed,
            _ = &mut shutdown => return,
        };
        if refreshed {
            if let Some(report) = watcher.latest() {
                render_dashboard(report);
            }
        }
    }
}

pub(crate) async fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let base_url = args.base_url.unwrap_or_else(|| default_base_url(&config));
    let client = DashboardClient::new(base_url, args.token, config.poll.timeout())?;
    let report = client.snapshot().await?;
    render_dashboard(&report);
    Ok(())
}

pub(crate) fn render_dashboard(report: &DashboardReport) {
    let overview = &report.overview;
    let integrity = &report.process_integrity;
    let totals = &report.totals;

    println!("\nFCT collation dashboard ({})", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "- {}/{} wards reported across {}/{} area councils | {:.1}% compliance",
        overview.wards_reported,
        overview.total_wards,
        overview.lgas_reported,
        overview.total_lgas,
        overview.compliance_percent
    );
    println!(
        "- Integrity {:.1} (timeliness {:.1}, access {:.1}, compliance {:.1})",
        integrity.overall_integrity_score,
        integrity.timeliness_score,
        integrity.access_score,
        integrity.compliance_score
    );
    println!(
        "- Turnout {:.1}% | {} cancelled PUs | {} voters disenfranchised",
        report.turnout.overall_turnout, report.turnout.cancelled_pus, report.turnout.lost_voters
    );
    println!(
        "- {} incidents ({} active, {} resolved)",
        report.security.total_incidents, totals.active_incidents, totals.resolved_incidents
    );
    match report.results.leading_party {
        Some(party) => println!(
            "- Leading: {} by {} votes of {} valid",
            party, report.results.margin_of_victory, report.results.total_valid_votes
        ),
        None => println!("- No results collated yet"),
    }
    if !report.red_flags.flagged_locations.is_empty() {
        println!(
            "- Flagged: {}",
            report.red_flags.flagged_locations.join(", ")
        );
    }

    println!("Area councils:");
    for lga in &report.area_councils {
        println!(
            "  - {} [{}]: {}/{} wards | turnout {:.1}% | compliance {} | {} incidents | risk {}",
            lga.name,
            lga.short_name,
            lga.wards_reported,
            lga.wards,
            lga.turnout_percent,
            lga.compliance_score
                .map_or_else(|| "n/a".to_string(), |score| format!("{score:.1}")),
            lga.incident_count,
            lga.risk_level.label()
        );
    }
}
