//! Synthetic booking generator.
//!
//! All draws come from one seeded stream, consumed in a fixed order per
//! booking, so a given `(count, seed, now)` always yields the same bookings.

use std::ops::RangeInclusive;

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::{Booking, SERVICE_CATALOG, TECHS};

const NO_SHOW_HISTORY_PROBABILITY: f64 = 0.15;
const HOURS_UNTIL_START: RangeInclusive<i64> = 1..=12;

pub(crate) const PEAK_HOURS: RangeInclusive<u32> = 17..=21;
pub(crate) const CUSTOMER_IDS: RangeInclusive<u32> = 1..=25;
pub(crate) const CREATED_HOURS_BEFORE: RangeInclusive<u32> = 1..=72;
pub(crate) const VISITS_COUNT: RangeInclusive<u32> = 0..=12;
pub(crate) const PAST_NO_SHOWS: RangeInclusive<u32> = 0..=2;
pub(crate) const LAST_VISIT_DAYS_AGO: RangeInclusive<u32> = 3..=180;

pub fn generate(count: usize, seed: u64) -> Vec<Booking> {
    generate_at(count, seed, Local::now().naive_local())
}

pub fn generate_at(count: usize, seed: u64, now: NaiveDateTime) -> Vec<Booking> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bookings = generate_with(count, &mut rng, now);
    debug!(count, seed, %now, "generated bookings");
    bookings
}

pub fn generate_with<R: Rng + ?Sized>(count: usize, rng: &mut R, now: NaiveDateTime) -> Vec<Booking> {
    (0..count)
        .map(|index| draw_booking(rng, index as u32 + 1, now))
        .collect()
}

fn draw_booking<R: Rng + ?Sized>(rng: &mut R, booking_id: u32, now: NaiveDateTime) -> Booking {
    let hours_until = rng.gen_range(HOURS_UNTIL_START);
    let start_time = now + Duration::hours(hours_until);

    let service = &SERVICE_CATALOG[rng.gen_range(0..SERVICE_CATALOG.len())];
    let price = service.price_choices[rng.gen_range(0..service.price_choices.len())];

    let created_hours_before = rng.gen_range(CREATED_HOURS_BEFORE);
    let visits_count = rng.gen_range(VISITS_COUNT);

    let past_no_shows = if rng.gen::<f64>() < NO_SHOW_HISTORY_PROBABILITY {
        rng.gen_range(1..=*PAST_NO_SHOWS.end())
    } else {
        0
    };

    let last_visit_days_ago = rng.gen_range(LAST_VISIT_DAYS_AGO);
    let customer_id = rng.gen_range(CUSTOMER_IDS);
    let tech = TECHS[rng.gen_range(0..TECHS.len())];

    Booking {
        booking_id,
        customer_id,
        start_time,
        service: service.name.to_string(),
        duration_min: service.duration_min,
        tech: tech.to_string(),
        price,
        created_hours_before,
        visits_count,
        past_no_shows,
        last_visit_days_ago,
        is_peak_hour: PEAK_HOURS.contains(&start_time.hour()),
    }
}
