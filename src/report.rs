use std::fmt::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::DashboardConfig;
use crate::models::ScoredBooking;
use crate::pipeline::Dashboard;
use crate::risk::{self, HIGH_THRESHOLD, MEDIUM_THRESHOLD, RULES};

const EXAMPLE_COUNT: usize = 3;
const CURRENCY: &str = "SAR";

/// Up to `k` distinct bookings picked with a stream seeded only by `seed`.
pub fn sample(scored: &[ScoredBooking], k: usize, seed: u64) -> Vec<&ScoredBooking> {
    let mut rng = StdRng::seed_from_u64(seed);
    let amount = k.min(scored.len());
    if amount == 0 {
        return Vec::new();
    }
    rand::seq::index::sample(&mut rng, scored.len(), amount)
        .into_iter()
        .map(|index| &scored[index])
        .collect()
}

pub fn build_report(config: &DashboardConfig, dashboard: &Dashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Nails No-Show Radar");
    let _ = writeln!(
        output,
        "Generated for {} bookings (seed {})",
        dashboard.metrics.total_bookings, config.seed
    );
    let _ = writeln!(output);

    write_today(&mut output, config, dashboard);
    write_risk_logic(&mut output, config, dashboard);
    write_impact(&mut output, dashboard);

    output
}

fn write_today(output: &mut String, config: &DashboardConfig, dashboard: &Dashboard) {
    let m = &dashboard.metrics;

    let _ = writeln!(output, "## Today");
    let _ = writeln!(output, "- Bookings today: {}", m.total_bookings);
    let _ = writeln!(output, "- High-risk bookings: {}", m.high_risk_count);
    let _ = writeln!(output, "- Revenue at risk: {} {CURRENCY}", m.revenue_at_risk);
    let _ = writeln!(output, "- Hours at risk: {:.1} h", m.hours_at_risk);
    let _ = writeln!(
        output,
        "- Expected protected revenue: {} {CURRENCY}",
        m.expected_protected
    );
    let _ = writeln!(output);

    if config.only_high {
        let _ = writeln!(output, "### Bookings (high risk only)");
    } else {
        let _ = writeln!(output, "### Bookings");
    }

    let rows: Vec<&ScoredBooking> = dashboard.visible(config.only_high).collect();
    if rows.is_empty() {
        let _ = writeln!(output, "No bookings to show.");
    } else {
        let _ = writeln!(
            output,
            "| Start | Service | Tech | Minutes | Price | Visits | No-shows | Peak | Risk | Score | Action |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|---|---|---|---|---|---|");
        for scored in rows {
            let b = &scored.booking;
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                b.start_time.format("%H:%M"),
                b.service,
                b.tech,
                b.duration_min,
                b.price,
                b.visits_count,
                b.past_no_shows,
                yes_no(b.is_peak_hour),
                scored.risk,
                scored.risk_score,
                scored.action
            );
        }
    }
    let _ = writeln!(output);
}

fn write_risk_logic(output: &mut String, config: &DashboardConfig, dashboard: &Dashboard) {
    let _ = writeln!(output, "## Risk logic");
    let _ = writeln!(
        output,
        "Each signal adds its points; High from {HIGH_THRESHOLD}, Medium from {MEDIUM_THRESHOLD}, Low below."
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "| Signal | Points |");
    let _ = writeln!(output, "|---|---|");
    for rule in RULES {
        let _ = writeln!(output, "| {} | +{} |", rule.label, rule.points);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "### Examples");
    let examples = sample(&dashboard.bookings, EXAMPLE_COUNT, config.seed);
    if examples.is_empty() {
        let _ = writeln!(output, "No bookings to sample.");
    }
    for scored in examples {
        let b = &scored.booking;
        let fired: Vec<String> = risk::explain(b)
            .iter()
            .map(|rule| format!("{} (+{})", rule.label, rule.points))
            .collect();
        let reasons = if fired.is_empty() {
            "no signals".to_string()
        } else {
            fired.join(", ")
        };
        let _ = writeln!(
            output,
            "- {} ({} min, {} {CURRENCY}, {} visits, {} no-shows, peak {}): score {} {} -> {}; {}",
            b.service,
            b.duration_min,
            b.price,
            b.visits_count,
            b.past_no_shows,
            yes_no(b.is_peak_hour),
            scored.risk_score,
            scored.risk,
            scored.action,
            reasons
        );
    }
    let _ = writeln!(output);
}

fn write_impact(output: &mut String, dashboard: &Dashboard) {
    let impact = &dashboard.impact;
    let _ = writeln!(output, "## Expected impact");
    let _ = writeln!(
        output,
        "Assumed no-show reduction: {:.0}% for High, {:.0}% for Medium.",
        impact.rates.r_high * 100.0,
        impact.rates.r_med * 100.0
    );
    let _ = writeln!(output, "- High-risk revenue: {} {CURRENCY}", impact.revenue_high);
    let _ = writeln!(output, "- Medium-risk revenue: {} {CURRENCY}", impact.revenue_med);
    let _ = writeln!(output, "- Protected revenue: {} {CURRENCY}", impact.protected);
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
