use crate::models::{ImpactMetrics, Metrics, ReductionRates, RiskTier, ScoredBooking};

/// Reduction assumed for the headline protected-revenue figure.
pub const HEADLINE_REDUCTION: f64 = 0.25;

pub fn aggregate(scored: &[ScoredBooking]) -> Metrics {
    let high: Vec<&ScoredBooking> = scored.iter().filter(|b| b.risk == RiskTier::High).collect();

    let revenue_at_risk: u64 = high.iter().map(|b| u64::from(b.booking.price)).sum();
    let minutes_at_risk: u64 = high.iter().map(|b| u64::from(b.booking.duration_min)).sum();

    Metrics {
        total_bookings: scored.len(),
        high_risk_count: high.len(),
        revenue_at_risk,
        hours_at_risk: minutes_to_hours(minutes_at_risk),
        expected_protected: (revenue_at_risk as f64 * HEADLINE_REDUCTION) as u64,
    }
}

pub fn impact(scored: &[ScoredBooking], rates: ReductionRates) -> ImpactMetrics {
    let revenue_high = revenue_for(scored, RiskTier::High);
    let revenue_med = revenue_for(scored, RiskTier::Medium);
    ImpactMetrics {
        revenue_high,
        revenue_med,
        rates,
        protected: protected_revenue(revenue_high, revenue_med, rates),
    }
}

pub fn revenue_for(scored: &[ScoredBooking], tier: RiskTier) -> u64 {
    scored
        .iter()
        .filter(|b| b.risk == tier)
        .map(|b| u64::from(b.booking.price))
        .sum()
}

/// Truncates toward zero, like an integer cast of the float estimate.
pub fn protected_revenue(revenue_high: u64, revenue_med: u64, rates: ReductionRates) -> u64 {
    let estimate = revenue_high as f64 * rates.r_high + revenue_med as f64 * rates.r_med;
    estimate as u64
}

/// Minutes to hours at one decimal, ties to even.
///
/// Done in integer tenths so quarter-hour totals (x.25, x.75) land exactly
/// on the tie and round the same way a binary float `round(h, 1)` does.
/// Exact only for multiples of 15 minutes, which is all the catalog produces;
/// other ties (3, 9, ... minutes) can differ from float rounding.
fn minutes_to_hours(minutes: u64) -> f64 {
    let tenths = minutes / 6;
    let remainder = minutes % 6;
    let rounded = match (remainder * 2).cmp(&6) {
        std::cmp::Ordering::Less => tenths,
        std::cmp::Ordering::Greater => tenths + 1,
        std::cmp::Ordering::Equal => tenths + (tenths % 2),
    };
    rounded as f64 / 10.0
}
