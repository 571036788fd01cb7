use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: &'static str,
    pub duration_min: u32,
    pub price_choices: &'static [u32],
}

pub const SERVICE_CATALOG: &[ServiceSpec] = &[
    ServiceSpec {
        name: "Manicure",
        duration_min: 45,
        price_choices: &[70, 90, 110],
    },
    ServiceSpec {
        name: "Pedicure",
        duration_min: 60,
        price_choices: &[90, 120, 150],
    },
    ServiceSpec {
        name: "Gel Polish",
        duration_min: 60,
        price_choices: &[120, 150, 180],
    },
    ServiceSpec {
        name: "Gel Extensions",
        duration_min: 90,
        price_choices: &[200, 240, 280],
    },
    ServiceSpec {
        name: "Acrylic Set",
        duration_min: 120,
        price_choices: &[260, 320, 380],
    },
    ServiceSpec {
        name: "Manicure + Pedicure",
        duration_min: 105,
        price_choices: &[180, 220, 260],
    },
];

pub const TECHS: &[&str] = &["Asma", "Hessa", "Aisha", "Razan"];

pub fn find_service(name: &str) -> Option<&'static ServiceSpec> {
    SERVICE_CATALOG.iter().find(|service| service.name == name)
}

/// A raw booking as produced by the generator, before any scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: u32,
    pub customer_id: u32,
    pub start_time: NaiveDateTime,
    pub service: String,
    pub duration_min: u32,
    pub tech: String,
    pub price: u32,
    pub created_hours_before: u32,
    pub visits_count: u32,
    pub past_no_shows: u32,
    pub last_visit_days_ago: u32,
    pub is_peak_hour: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredBooking {
    pub booking: Booking,
    pub risk_score: u32,
    pub risk: RiskTier,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_bookings: usize,
    pub high_risk_count: usize,
    pub revenue_at_risk: u64,
    pub hours_at_risk: f64,
    pub expected_protected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReductionRates {
    pub r_high: f64,
    pub r_med: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactMetrics {
    pub revenue_high: u64,
    pub revenue_med: u64,
    pub rates: ReductionRates,
    pub protected: u64,
}
