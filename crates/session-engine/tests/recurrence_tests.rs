//! Tests for recurring series generation.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use session_engine::recurrence::week_anchor;
use session_engine::{
    generate_recurring, generate_recurring_with_config, weekday_from_index, BookingInterval,
    BookingStatus, RecurrenceRequest, ResolverConfig, ScheduleError, SessionDetails,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn time(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

/// Tuesdays 15:00-15:50 for `weeks` weeks, anchored on Monday 2025-01-06.
fn tuesday_request(weeks: u32) -> RecurrenceRequest {
    RecurrenceRequest::new(
        "P1",
        date(2025, 1, 6),
        vec![Weekday::Tue],
        time(15, 0),
        Some(time(15, 50)),
        weeks,
    )
}

// ── End-to-end scenarios ────────────────────────────────────────────────────

#[test]
fn three_tuesdays_on_empty_agenda() {
    let result = generate_recurring(&[], &tuesday_request(3)).unwrap();

    let dates: Vec<NaiveDate> = result.accepted.iter().map(|b| b.date).collect();
    assert_eq!(
        dates,
        vec![date(2025, 1, 7), date(2025, 1, 14), date(2025, 1, 21)]
    );
    assert!(result.skipped.is_empty());
    for b in &result.accepted {
        assert_eq!(b.subject_key, "P1");
        assert_eq!(b.start_time(), Some(time(15, 0)));
        assert_eq!(b.end_time(), Some(time(15, 50)));
        assert_eq!(b.id, None, "generated bookings are not persisted");
    }
}

#[test]
fn conflicting_week_is_skipped() {
    let existing = vec![
        BookingInterval::new("P1", date(2025, 1, 14), time(15, 0), Some(time(15, 50)))
            .unwrap()
            .with_id("S-20250101090000000"),
    ];

    let result = generate_recurring(&existing, &tuesday_request(3)).unwrap();

    let dates: Vec<NaiveDate> = result.accepted.iter().map(|b| b.date).collect();
    assert_eq!(dates, vec![date(2025, 1, 7), date(2025, 1, 21)]);

    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].date, date(2025, 1, 14));
    assert_eq!(result.skipped[0].conflicts, existing);
    assert_eq!(result.summary(), "2 of 3 sessions booked, 1 skipped");
}

#[test]
fn cancelled_existing_booking_does_not_skip() {
    let existing = vec![
        BookingInterval::new("P1", date(2025, 1, 14), time(15, 0), Some(time(15, 50)))
            .unwrap()
            .with_status(BookingStatus::Cancelled),
    ];

    let result = generate_recurring(&existing, &tuesday_request(3)).unwrap();
    assert_eq!(result.accepted.len(), 3);
    assert!(result.skipped.is_empty());
}

#[test]
fn other_patient_does_not_skip() {
    let existing =
        vec![BookingInterval::new("P2", date(2025, 1, 14), time(15, 0), Some(time(15, 50))).unwrap()];

    let result = generate_recurring(&existing, &tuesday_request(3)).unwrap();
    assert_eq!(result.accepted.len(), 3);
}

#[test]
fn anchor_is_the_calendar_week_not_the_start_date() {
    // Start on Thursday 2025-01-09 asking for Tuesdays: the first Tuesday is
    // 2025-01-07, inside the anchor week, even though it precedes the start date.
    let mut request = tuesday_request(2);
    request.start_date = date(2025, 1, 9);

    let result = generate_recurring(&[], &request).unwrap();
    let dates: Vec<NaiveDate> = result.accepted.iter().map(|b| b.date).collect();
    assert_eq!(dates, vec![date(2025, 1, 7), date(2025, 1, 14)]);
}

#[test]
fn weekdays_generated_in_ascending_order() {
    let request = RecurrenceRequest::new(
        "P1",
        date(2025, 1, 6),
        vec![Weekday::Fri, Weekday::Mon, Weekday::Wed],
        time(8, 0),
        Some(time(8, 45)),
        2,
    );

    let result = generate_recurring(&[], &request).unwrap();
    let days: Vec<Weekday> = result.accepted.iter().map(|b| b.date.weekday()).collect();
    assert_eq!(
        days,
        vec![
            Weekday::Mon,
            Weekday::Wed,
            Weekday::Fri,
            Weekday::Mon,
            Weekday::Wed,
            Weekday::Fri
        ]
    );
}

#[test]
fn pass_through_fields_are_copied() {
    let details = SessionDetails {
        professional: "Terapeuta".to_string(),
        kind: "Terapia".to_string(),
        goals: "fine motor".to_string(),
        notes: "bring toys".to_string(),
        attachments_url: String::new(),
    };
    let request = tuesday_request(2)
        .with_status(BookingStatus::Confirmed)
        .with_details(details.clone());

    let result = generate_recurring(&[], &request).unwrap();
    for b in &result.accepted {
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.details, details);
    }
}

#[test]
fn point_series_conflicts_on_identical_start_only() {
    let existing = vec![
        BookingInterval::new("P1", date(2025, 1, 7), time(15, 0), None).unwrap(),
        BookingInterval::new("P1", date(2025, 1, 14), time(15, 10), None).unwrap(),
    ];
    let request = RecurrenceRequest::new(
        "P1",
        date(2025, 1, 6),
        vec![Weekday::Tue],
        time(15, 0),
        None,
        2,
    );

    let result = generate_recurring(&existing, &request).unwrap();
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].date, date(2025, 1, 7));
    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].date, date(2025, 1, 14));
}

#[test]
fn every_week_blocked_yields_only_skips() {
    let existing: Vec<BookingInterval> = [7, 14, 21]
        .iter()
        .map(|&d| {
            BookingInterval::new("P1", date(2025, 1, d), time(14, 30), Some(time(15, 30))).unwrap()
        })
        .collect();

    let result = generate_recurring(&existing, &tuesday_request(3)).unwrap();
    assert!(result.accepted.is_empty());
    assert_eq!(result.skipped.len(), 3);
    assert_eq!(result.summary(), "0 of 3 sessions booked, 3 skipped");
}

#[test]
fn series_crosses_month_and_year() {
    let request = RecurrenceRequest::new(
        "P1",
        date(2024, 12, 23),
        vec![Weekday::Tue],
        time(10, 0),
        Some(time(10, 50)),
        3,
    );

    let result = generate_recurring(&[], &request).unwrap();
    let dates: Vec<NaiveDate> = result.accepted.iter().map(|b| b.date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 12, 24), date(2024, 12, 31), date(2025, 1, 7)]
    );
}

#[test]
fn output_is_deterministic() {
    let existing =
        vec![BookingInterval::new("P1", date(2025, 1, 14), time(15, 0), Some(time(15, 50))).unwrap()];
    let a = generate_recurring(&existing, &tuesday_request(5)).unwrap();
    let b = generate_recurring(&existing, &tuesday_request(5)).unwrap();
    assert_eq!(a, b);
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn empty_weekday_set_rejected() {
    let mut request = tuesday_request(3);
    request.weekdays.clear();

    assert_eq!(
        generate_recurring(&[], &request).unwrap_err(),
        ScheduleError::EmptyWeekdaySet
    );
}

#[test]
fn zero_weeks_rejected() {
    assert_eq!(
        generate_recurring(&[], &tuesday_request(0)).unwrap_err(),
        ScheduleError::NonPositiveRepeatCount
    );
}

#[test]
fn inverted_interval_rejected() {
    let mut request = tuesday_request(3);
    request.end = Some(time(14, 0));

    assert_eq!(
        generate_recurring(&[], &request).unwrap_err(),
        ScheduleError::InvalidInterval {
            start: time(15, 0),
            end: time(14, 0)
        }
    );
}

#[test]
fn oversized_series_rejected() {
    let config = ResolverConfig { max_occurrences: 10 };
    let mut request = tuesday_request(6);
    request.weekdays = vec![Weekday::Tue, Weekday::Thu];

    assert_eq!(
        generate_recurring_with_config(&[], &request, &config).unwrap_err(),
        ScheduleError::LimitExceeded {
            requested: 12,
            limit: 10
        }
    );

    // Exactly at the limit is fine.
    request.repeat_weeks = 5;
    let result = generate_recurring_with_config(&[], &request, &config).unwrap();
    assert_eq!(result.accepted.len(), 10);
}

#[test]
fn default_limit_applies() {
    let request = tuesday_request(521);
    assert!(matches!(
        generate_recurring(&[], &request),
        Err(ScheduleError::LimitExceeded { requested: 521, limit: 520 })
    ));
}

#[test]
fn series_past_max_date_is_rejected() {
    let config = ResolverConfig {
        max_occurrences: usize::MAX,
    };
    let start = NaiveDate::MAX - chrono::Duration::days(3);
    let request = RecurrenceRequest::new(
        "P1",
        start,
        vec![Weekday::Mon, Weekday::Sun],
        time(15, 0),
        None,
        2,
    );

    assert!(matches!(
        generate_recurring_with_config(&[], &request, &config),
        Err(ScheduleError::DateOutOfRange(_))
    ));
}

#[test]
fn series_ending_on_max_date_is_allowed() {
    let max = NaiveDate::MAX;
    let request = RecurrenceRequest::new(
        "P1",
        max,
        vec![max.weekday()],
        time(15, 0),
        None,
        1,
    );

    let result = generate_recurring(&[], &request).unwrap();
    assert_eq!(result.accepted.len(), 1);
    assert_eq!(result.accepted[0].date, max);
}

#[test]
fn anchor_before_min_date_is_rejected() {
    for offset in 0..7 {
        let day = NaiveDate::MIN + chrono::Duration::days(offset);
        let back = day.weekday().num_days_from_monday() as i64;
        let anchor = week_anchor(day);
        if back <= offset {
            assert_eq!(anchor.unwrap().weekday(), Weekday::Mon, "{day}");
        } else {
            assert_eq!(
                anchor.unwrap_err(),
                ScheduleError::DateOutOfRange(day.to_string()),
                "{day}"
            );
        }
    }
}

#[test]
fn weekday_indices_are_monday_based() {
    assert_eq!(weekday_from_index(0).unwrap(), Weekday::Mon);
    assert_eq!(weekday_from_index(1).unwrap(), Weekday::Tue);
    assert_eq!(weekday_from_index(6).unwrap(), Weekday::Sun);
    assert_eq!(
        weekday_from_index(7).unwrap_err(),
        ScheduleError::InvalidWeekday(7)
    );
}
