use crate::models::{Booking, RiskTier, ScoredBooking};

pub const HIGH_THRESHOLD: u32 = 65;
pub const MEDIUM_THRESHOLD: u32 = 35;

pub const ACTION_DEPOSIT: &str = "request deposit, then confirm via messaging";
pub const ACTION_CONFIRM_REPLY: &str =
    "messaging: please confirm appointment (reply 1 to confirm / 0 to cancel)";
pub const ACTION_EXTRA_CONFIRMATION: &str = "additional confirmation via messaging";
pub const ACTION_REMINDER_AND_CONFIRM: &str = "extra reminder + messaging confirmation";
pub const ACTION_EXTRA_REMINDER: &str = "extra reminder";
pub const ACTION_STANDARD_REMINDER: &str = "standard reminder";

/// One additive scoring rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub label: &'static str,
    pub points: u32,
    applies: fn(&Booking) -> bool,
}

impl Rule {
    pub fn applies(&self, booking: &Booking) -> bool {
        (self.applies)(booking)
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        label: "previous no-show on record",
        points: 40,
        applies: |b| b.past_no_shows >= 1,
    },
    Rule {
        label: "first visit",
        points: 20,
        applies: |b| b.visits_count == 0,
    },
    Rule {
        label: "last visit over 120 days ago",
        points: 10,
        applies: |b| b.last_visit_days_ago > 120,
    },
    Rule {
        label: "booked less than 3 hours ahead",
        points: 15,
        applies: |b| b.created_hours_before < 3,
    },
    Rule {
        label: "session of 90 minutes or more",
        points: 10,
        applies: |b| b.duration_min >= 90,
    },
    Rule {
        label: "peak hour",
        points: 10,
        applies: |b| b.is_peak_hour,
    },
    Rule {
        label: "price of 240 or more",
        points: 15,
        applies: |b| b.price >= 240,
    },
];

pub fn score(booking: &Booking) -> u32 {
    explain(booking).iter().map(|rule| rule.points).sum()
}

/// Rules that fire for `booking`, in table order.
pub fn explain(booking: &Booking) -> Vec<&'static Rule> {
    RULES.iter().filter(|rule| rule.applies(booking)).collect()
}

pub fn classify(score: u32) -> RiskTier {
    match score {
        s if s >= HIGH_THRESHOLD => RiskTier::High,
        s if s >= MEDIUM_THRESHOLD => RiskTier::Medium,
        _ => RiskTier::Low,
    }
}

pub fn recommend(booking: &Booking, tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => {
            // Deposits are reserved for long or expensive sessions, or
            // pricey ones that occupy a peak slot.
            let heavy = booking.duration_min >= 90
                || booking.price >= 300
                || (booking.is_peak_hour && booking.price >= 240);

            if heavy {
                ACTION_DEPOSIT
            } else if booking.created_hours_before <= 4 {
                ACTION_CONFIRM_REPLY
            } else {
                ACTION_EXTRA_CONFIRMATION
            }
        }
        RiskTier::Medium if booking.is_peak_hour => ACTION_REMINDER_AND_CONFIRM,
        RiskTier::Medium => ACTION_EXTRA_REMINDER,
        RiskTier::Low => ACTION_STANDARD_REMINDER,
    }
}

pub fn assess(booking: Booking) -> ScoredBooking {
    let risk_score = score(&booking);
    let risk = classify(risk_score);
    let action = recommend(&booking, risk);
    ScoredBooking {
        booking,
        risk_score,
        risk,
        action,
    }
}

pub fn assess_all(bookings: Vec<Booking>) -> Vec<ScoredBooking> {
    bookings.into_iter().map(assess).collect()
}
