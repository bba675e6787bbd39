use chrono::NaiveDate;

use crate::entities::booking::BookingStatus;
use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

/// Number of billable days for a rental period.
///
/// Dates are date-only, so the span is always a whole number of days and any
/// partial day has already been rounded up by the caller picking an end date.
/// `validate_rent_dates` guarantees `end > start`, so the result is >= 1.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Total price for renting a vehicle over the given period.
pub fn total_price(start: NaiveDate, end: NaiveDate, daily_rent_price: i32) -> i64 {
    rental_days(start, end) * i64::from(daily_rent_price)
}

/// The rent period must be a non-empty forward span.
pub fn validate_rent_dates(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end <= start {
        return Err(AppError::BadRequest(
            "rent_end_date must be after rent_start_date".to_string(),
        ));
    }
    Ok(())
}

/// Permission table for booking status transitions, consulted once by the
/// lifecycle engine instead of re-deriving role rules per endpoint.
/// Customers may only cancel (their own bookings, checked separately);
/// admins may only mark bookings returned.
pub fn transition_allowed(role: UserRole, requested: BookingStatus) -> bool {
    matches!(
        (role, requested),
        (UserRole::Customer, BookingStatus::Cancelled) | (UserRole::Admin, BookingStatus::Returned)
    )
}

/// Cancelled and returned are absorbing: a booking that has left `active`
/// admits no further transition.
pub fn is_terminal(status: BookingStatus) -> bool {
    matches!(status, BookingStatus::Cancelled | BookingStatus::Returned)
}

/// Cancellation is only permitted strictly before the rent period begins.
pub fn can_cancel_on(today: NaiveDate, rent_start_date: NaiveDate) -> bool {
    today < rent_start_date
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_one_day_span_bills_one_day() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 2);
        assert_eq!(rental_days(start, end), 1);
        assert_eq!(total_price(start, end, 100), 100);
    }

    #[test]
    fn test_two_day_span_bills_two_days() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 3);
        assert_eq!(total_price(start, end, 100), 200);
    }

    #[test]
    fn test_price_does_not_overflow_i32() {
        // A year at the i32 max daily rate still fits in i64.
        let start = date(2024, 1, 1);
        let end = date(2025, 1, 1);
        assert_eq!(
            total_price(start, end, i32::MAX),
            366 * i64::from(i32::MAX)
        );
    }

    #[test]
    fn test_rejects_empty_or_backward_spans() {
        let day = date(2024, 5, 10);
        assert!(validate_rent_dates(day, day).is_err());
        assert!(validate_rent_dates(day, date(2024, 5, 9)).is_err());
        assert!(validate_rent_dates(day, date(2024, 5, 11)).is_ok());
    }

    #[test]
    fn test_transition_permission_table() {
        // Customers cancel, admins return.
        assert!(transition_allowed(UserRole::Customer, BookingStatus::Cancelled));
        assert!(transition_allowed(UserRole::Admin, BookingStatus::Returned));

        // Everything else is denied, including re-activating.
        assert!(!transition_allowed(UserRole::Customer, BookingStatus::Returned));
        assert!(!transition_allowed(UserRole::Admin, BookingStatus::Cancelled));
        assert!(!transition_allowed(UserRole::Customer, BookingStatus::Active));
        assert!(!transition_allowed(UserRole::Admin, BookingStatus::Active));
    }

    #[test]
    fn test_terminal_states_absorb() {
        // Only an active booking may transition; a cancelled or returned one
        // is refused before the permission table is even consulted.
        assert!(!is_terminal(BookingStatus::Active));
        assert!(is_terminal(BookingStatus::Cancelled));
        assert!(is_terminal(BookingStatus::Returned));
    }

    #[test]
    fn test_cancellation_window() {
        let start = date(2024, 6, 15);
        assert!(can_cancel_on(date(2024, 6, 14), start));
        // Day-of and later are too late.
        assert!(!can_cancel_on(start, start));
        assert!(!can_cancel_on(date(2024, 6, 16), start));
    }
}
