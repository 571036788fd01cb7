use std::io::{Read, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::Context;
use chrono::Timelike;
use serde::Serialize;

use crate::error::{RadarError, RadarResult};
use crate::generator::{
    CREATED_HOURS_BEFORE, CUSTOMER_IDS, LAST_VISIT_DAYS_AGO, PAST_NO_SHOWS, PEAK_HOURS,
    VISITS_COUNT,
};
use crate::models::{find_service, Booking, RiskTier, ScoredBooking, TECHS};

#[derive(Serialize)]
struct ScoredRow<'a> {
    booking_id: u32,
    customer_id: u32,
    start_time: chrono::NaiveDateTime,
    service: &'a str,
    duration_min: u32,
    tech: &'a str,
    price: u32,
    created_hours_before: u32,
    visits_count: u32,
    past_no_shows: u32,
    last_visit_days_ago: u32,
    is_peak_hour: bool,
    risk_score: u32,
    risk: RiskTier,
    action: &'a str,
}

impl<'a> From<&'a ScoredBooking> for ScoredRow<'a> {
    fn from(scored: &'a ScoredBooking) -> Self {
        let b = &scored.booking;
        ScoredRow {
            booking_id: b.booking_id,
            customer_id: b.customer_id,
            start_time: b.start_time,
            service: &b.service,
            duration_min: b.duration_min,
            tech: &b.tech,
            price: b.price,
            created_hours_before: b.created_hours_before,
            visits_count: b.visits_count,
            past_no_shows: b.past_no_shows,
            last_visit_days_ago: b.last_visit_days_ago,
            is_peak_hour: b.is_peak_hour,
            risk_score: scored.risk_score,
            risk: scored.risk,
            action: scored.action,
        }
    }
}

pub fn write_bookings<W: Write>(writer: W, bookings: &[Booking]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for booking in bookings {
        writer.serialize(booking)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_scored<W: Write>(writer: W, scored: &[ScoredBooking]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in scored.iter().map(ScoredRow::from) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads raw bookings, rejecting the first row that could not have come
/// from the generator: unknown service, tech or price, a value outside the
/// generated ranges, a peak flag that disagrees with the start hour, or a
/// booking id that does not increase.
pub fn read_bookings<R: Read>(reader: R) -> RadarResult<Vec<Booking>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|err| RadarError::malformed(1, err.to_string()))?
        .clone();

    let mut bookings: Vec<Booking> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| {
            let line = err.position().map(|pos| pos.line()).unwrap_or(0);
            RadarError::malformed(line, err.to_string())
        })?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let booking: Booking = record
            .deserialize(Some(&headers))
            .map_err(|err| RadarError::malformed(line, err.to_string()))?;

        check_booking(&booking, bookings.last(), line)?;
        bookings.push(booking);
    }

    Ok(bookings)
}

pub fn import_bookings(path: &Path) -> anyhow::Result<Vec<Booking>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let bookings = read_bookings(file)
        .with_context(|| format!("failed to import bookings from {}", path.display()))?;
    Ok(bookings)
}

fn check_booking(booking: &Booking, previous: Option<&Booking>, line: u64) -> RadarResult<()> {
    let service = find_service(&booking.service).ok_or_else(|| {
        RadarError::malformed(line, format!("unknown service {:?}", booking.service))
    })?;

    if service.duration_min != booking.duration_min {
        return Err(RadarError::malformed(
            line,
            format!(
                "{} lasts {} minutes, not {}",
                service.name, service.duration_min, booking.duration_min
            ),
        ));
    }

    if !service.price_choices.contains(&booking.price) {
        return Err(RadarError::malformed(
            line,
            format!(
                "{} is not priced at {} (choices {:?})",
                service.name, booking.price, service.price_choices
            ),
        ));
    }

    if !TECHS.contains(&booking.tech.as_str()) {
        return Err(RadarError::malformed(
            line,
            format!("unknown tech {:?}", booking.tech),
        ));
    }

    check_range(line, "customer_id", booking.customer_id, CUSTOMER_IDS)?;
    check_range(
        line,
        "created_hours_before",
        booking.created_hours_before,
        CREATED_HOURS_BEFORE,
    )?;
    check_range(line, "visits_count", booking.visits_count, VISITS_COUNT)?;
    check_range(line, "past_no_shows", booking.past_no_shows, PAST_NO_SHOWS)?;
    check_range(
        line,
        "last_visit_days_ago",
        booking.last_visit_days_ago,
        LAST_VISIT_DAYS_AGO,
    )?;

    let hour = booking.start_time.hour();
    if booking.is_peak_hour != PEAK_HOURS.contains(&hour) {
        return Err(RadarError::malformed(
            line,
            format!(
                "is_peak_hour is {} but the booking starts at {:02}:00",
                booking.is_peak_hour, hour
            ),
        ));
    }

    if let Some(previous) = previous {
        if booking.booking_id <= previous.booking_id {
            return Err(RadarError::malformed(
                line,
                format!(
                    "booking_id {} does not follow {}",
                    booking.booking_id, previous.booking_id
                ),
            ));
        }
    }

    Ok(())
}

fn check_range(
    line: u64,
    field: &str,
    value: u32,
    range: RangeInclusive<u32>,
) -> RadarResult<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(RadarError::malformed(
        line,
        format!(
            "{field} {value} is outside {}..={}",
            range.start(),
            range.end()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_at;
    use crate::risk::assess_all;
    use chrono::NaiveDate;

    const HEADER: &str = "booking_id,customer_id,start_time,service,duration_min,tech,price,\
created_hours_before,visits_count,past_no_shows,last_visit_days_ago,is_peak_hour";

    fn sample_bookings() -> Vec<Booking> {
        let now = NaiveDate::from_ymd_opt(2026, 3, 14)
            .and_then(|d| d.and_hms_opt(10, 15, 0))
            .unwrap();
        generate_at(8, 21, now)
    }

    #[test]
    fn exported_bookings_import_unchanged() {
        let bookings = sample_bookings();
        let mut buffer = Vec::new();
        write_bookings(&mut buffer, &bookings).unwrap();

        let imported = read_bookings(buffer.as_slice()).unwrap();
        assert_eq!(imported, bookings);
    }

    #[test]
    fn scored_export_appends_risk_columns() {
        let scored = assess_all(sample_bookings());
        let mut buffer = Vec::new();
        write_scored(&mut buffer, &scored).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, format!("{HEADER},risk_score,risk,action"));
        assert_eq!(text.lines().count(), scored.len() + 1);
    }

    #[test]
    fn missing_column_is_malformed() {
        let input = "booking_id,customer_id,start_time,service\n\
1,4,2026-03-14T18:00:00,Manicure\n";
        match read_bookings(input.as_bytes()) {
            Err(RadarError::MalformedRecord { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("missing field"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_service_is_malformed() {
        let input = format!("{HEADER}\n1,4,2026-03-14T18:00:00,Pedicure,60,Asma,90,5,2,0,40,true\n\
2,5,2026-03-14T19:00:00,Hair Cut,30,Asma,50,5,2,0,40,true\n");
        assert!(matches!(
            read_bookings(input.as_bytes()),
            Err(RadarError::MalformedRecord { line: 3, .. })
        ));
    }

    #[test]
    fn wrong_duration_is_malformed() {
        let input = format!("{HEADER}\n1,4,2026-03-14T18:00:00,Acrylic Set,60,Asma,320,5,2,0,40,true\n");
        assert!(matches!(
            read_bookings(input.as_bytes()),
            Err(RadarError::MalformedRecord { line: 2, .. })
        ));
    }

    const VALID_ROW: &str = "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,40,true";

    fn assert_rejected(row: &str, needle: &str) {
        let input = format!("{HEADER}\n{row}\n");
        match read_bookings(input.as_bytes()) {
            Err(RadarError::MalformedRecord { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains(needle), "{reason}");
            }
            other => panic!("unexpected result for {row}: {other:?}"),
        }
    }

    #[test]
    fn catalog_row_is_accepted() {
        let input = format!("{HEADER}\n{VALID_ROW}\n");
        let bookings = read_bookings(input.as_bytes()).unwrap();
        assert_eq!(bookings.len(), 1);
        assert!(bookings[0].is_peak_hour);
    }

    #[test]
    fn price_outside_service_choices_is_malformed() {
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,5,5,2,0,40,true",
            "not priced at 5",
        );
    }

    #[test]
    fn unknown_tech_is_malformed() {
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Nobody,90,5,2,0,40,true",
            "unknown tech",
        );
    }

    #[test]
    fn customer_id_outside_range_is_malformed() {
        assert_rejected(
            "1,99,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,40,true",
            "customer_id 99",
        );
        assert_rejected(
            "1,0,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,40,true",
            "customer_id 0",
        );
    }

    #[test]
    fn created_hours_before_outside_range_is_malformed() {
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,0,2,0,40,true",
            "created_hours_before 0",
        );
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,73,2,0,40,true",
            "created_hours_before 73",
        );
    }

    #[test]
    fn visits_count_above_range_is_malformed() {
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,13,0,40,true",
            "visits_count 13",
        );
    }

    #[test]
    fn past_no_shows_above_range_is_malformed() {
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,3,40,true",
            "past_no_shows 3",
        );
    }

    #[test]
    fn last_visit_outside_range_is_malformed() {
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,2,true",
            "last_visit_days_ago 2",
        );
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,181,true",
            "last_visit_days_ago 181",
        );
    }

    #[test]
    fn peak_flag_must_match_start_hour() {
        assert_rejected(
            "1,4,2026-03-14T09:00:00,Manicure,45,Asma,90,5,2,0,40,true",
            "is_peak_hour is true",
        );
        assert_rejected(
            "1,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,40,false",
            "is_peak_hour is false",
        );
    }

    #[test]
    fn row_breaking_every_range_is_rejected_before_scoring() {
        let input = format!("{HEADER}\n1,99,2026-03-14T09:00:00,Manicure,45,Nobody,5,0,500,7,9999,true\n");
        assert!(matches!(
            read_bookings(input.as_bytes()),
            Err(RadarError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn repeated_booking_id_is_malformed() {
        let input = format!("{HEADER}\n3,4,2026-03-14T18:00:00,Manicure,45,Asma,90,5,2,0,40,true\n\
3,9,2026-03-14T19:00:00,Manicure,45,Razan,70,5,2,0,40,true\n");
        assert!(matches!(
            read_bookings(input.as_bytes()),
            Err(RadarError::MalformedRecord { line: 3, .. })
        ));
    }

    #[test]
    fn unparsable_value_is_malformed() {
        let input = format!("{HEADER}\n1,4,2026-03-14T18:00:00,Manicure,45,Asma,ninety,5,2,0,40,true\n");
        assert!(matches!(
            read_bookings(input.as_bytes()),
            Err(RadarError::MalformedRecord { line: 2, .. })
        ));
    }
}
