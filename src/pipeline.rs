use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::config::DashboardConfig;
use crate::error::RadarResult;
use crate::generator;
use crate::metrics;
use crate::models::{Booking, ImpactMetrics, Metrics, RiskTier, ScoredBooking};
use crate::risk;

/// One refresh worth of scored bookings and the figures derived from them.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub bookings: Vec<ScoredBooking>,
    pub metrics: Metrics,
    pub impact: ImpactMetrics,
}

pub fn run(config: &DashboardConfig) -> RadarResult<Dashboard> {
    run_at(config, Local::now().naive_local())
}

pub fn run_at(config: &DashboardConfig, now: NaiveDateTime) -> RadarResult<Dashboard> {
    config.validate()?;
    let bookings = generator::generate_at(config.count, config.seed, now);
    score_and_aggregate(bookings, config)
}

/// Scores bookings from any source (generated or imported). Count and seed
/// only matter to the generator, so just the rates are checked here.
pub fn score_and_aggregate(
    bookings: Vec<Booking>,
    config: &DashboardConfig,
) -> RadarResult<Dashboard> {
    config.validate_rates()?;
    let mut scored = risk::assess_all(bookings);
    scored.sort_by_key(|b| b.booking.start_time);

    let metrics = metrics::aggregate(&scored);
    let impact = metrics::impact(&scored, config.rates);

    info!(
        total = metrics.total_bookings,
        high = metrics.high_risk_count,
        revenue_at_risk = metrics.revenue_at_risk,
        protected = impact.protected,
        "scored bookings"
    );

    Ok(Dashboard {
        bookings: scored,
        metrics,
        impact,
    })
}

impl Dashboard {
    pub fn visible<'a>(&'a self, only_high: bool) -> impl Iterator<Item = &'a ScoredBooking> + 'a {
        self.bookings
            .iter()
            .filter(move |b| !only_high || b.risk == RiskTier::High)
    }
}
