//! Round-robin planning of synthetic test bookings.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::config::BookingDefaults;
use crate::platform::{BookingClient, NewBooking};

/// Upper bound on test bookings per call.
pub const MAX_TEST_BOOKINGS: u32 = 10;

/// Bookings are spread over this many consecutive days, starting tomorrow.
const SPREAD_DAYS: u64 = 7;

/// Plan `count` bookings rotating through staff and services independently.
///
/// Booking `i` uses `staff_ids[i % staff]`, `service_ids[i % services]` and is
/// placed `1 + i % 7` days after `today`. Returns an empty plan if either id
/// list is empty.
pub fn plan_test_bookings(
    staff_ids: &[u64],
    service_ids: &[u64],
    count: u32,
    today: NaiveDate,
    defaults: BookingDefaults,
) -> Vec<NewBooking> {
    if staff_ids.is_empty() || service_ids.is_empty() {
        return Vec::new();
    }
    let time = NaiveTime::from_hms_opt(defaults.hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);

    (0..count as usize)
        .map(|i| {
            let day = today
                .checked_add_days(Days::new(1 + (i as u64) % SPREAD_DAYS))
                .unwrap_or(today);
            let n = i + 1;
            NewBooking {
                staff_id: staff_ids[i % staff_ids.len()],
                service_id: service_ids[i % service_ids.len()],
                datetime: day.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string(),
                seance_length: defaults.seance_length_secs,
                client: BookingClient {
                    name: format!("Test Client {n}"),
                    phone: format!("+1555000{n:04}"),
                },
                comment: Some("Onboarding test booking".to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 30).unwrap()
    }

    #[test]
    fn rotation_is_independent_per_list() {
        let plan = plan_test_bookings(&[1, 2, 3], &[10, 11], 6, today(), BookingDefaults::default());
        let staff: Vec<u64> = plan.iter().map(|b| b.staff_id).collect();
        let services: Vec<u64> = plan.iter().map(|b| b.service_id).collect();
        assert_eq!(staff, vec![1, 2, 3, 1, 2, 3]);
        assert_eq!(services, vec![10, 11, 10, 11, 10, 11]);
    }

    #[test]
    fn dates_wrap_after_a_week() {
        let plan = plan_test_bookings(&[1], &[10], 9, today(), BookingDefaults::default());
        assert_eq!(plan[0].datetime, "2026-03-31T10:00:00");
        assert_eq!(plan[6].datetime, "2026-04-06T10:00:00");
        assert_eq!(plan[7].datetime, "2026-03-31T10:00:00");
        assert_eq!(plan[8].datetime, "2026-04-01T10:00:00");
    }

    #[test]
    fn synthetic_clients_are_numbered_from_one() {
        let plan = plan_test_bookings(&[1], &[10], 2, today(), BookingDefaults::default());
        assert_eq!(plan[0].client.name, "Test Client 1");
        assert_eq!(plan[0].client.phone, "+15550000001");
        assert_eq!(plan[1].client.name, "Test Client 2");
        assert_eq!(plan[1].client.phone, "+15550000002");
    }

    #[test]
    fn uses_configured_time_and_length() {
        let defaults = BookingDefaults {
            hour: 15,
            seance_length_secs: 1800,
        };
        let plan = plan_test_bookings(&[1], &[10], 1, today(), defaults);
        assert!(plan[0].datetime.ends_with("T15:00:00"));
        assert_eq!(plan[0].seance_length, 1800);
    }

    #[test]
    fn empty_ids_plan_nothing() {
        assert!(plan_test_bookings(&[], &[10], 3, today(), BookingDefaults::default()).is_empty());
        assert!(plan_test_bookings(&[1], &[], 3, today(), BookingDefaults::default()).is_empty());
    }
}
