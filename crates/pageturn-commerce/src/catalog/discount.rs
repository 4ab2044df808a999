//! Time-windowed discount types.

use crate::ids::{BookId, DiscountId};
use crate::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A sale price for one book over a date window.
///
/// Several discounts may exist for a book over time and their windows may
/// overlap. Which one applies on a given date is decided by
/// [`crate::catalog::active_discount`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    /// Unique discount identifier.
    pub id: DiscountId,
    /// Discounted book.
    pub book_id: BookId,
    /// First day the discount applies.
    pub start_date: NaiveDate,
    /// Last day the discount applies (None = open-ended).
    pub end_date: Option<NaiveDate>,
    /// Sale price while active.
    pub discount_price: Money,
}

impl Discount {
    /// Check whether `date` falls inside the window. Both ends are inclusive.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }

    /// Check if the discount has ended before `date`.
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn discount(start: NaiveDate, end: Option<NaiveDate>) -> Discount {
        Discount {
            id: DiscountId::new(1),
            book_id: BookId::new(1),
            start_date: start,
            end_date: end,
            discount_price: Money::new(750, Currency::USD),
        }
    }

    #[test]
    fn test_window_inclusive_bounds() {
        let d = discount(date(2024, 3, 1), Some(date(2024, 3, 31)));
        assert!(d.is_active_on(date(2024, 3, 1)));
        assert!(d.is_active_on(date(2024, 3, 31)));
        assert!(!d.is_active_on(date(2024, 2, 29)));
        assert!(!d.is_active_on(date(2024, 4, 1)));
    }

    #[test]
    fn test_open_ended_window() {
        let d = discount(date(2024, 3, 1), None);
        assert!(d.is_active_on(date(2030, 1, 1)));
        assert!(!d.is_expired_on(date(2030, 1, 1)));
    }

    #[test]
    fn test_expired() {
        let d = discount(date(2024, 3, 1), Some(date(2024, 3, 31)));
        assert!(d.is_expired_on(date(2024, 4, 1)));
        assert!(!d.is_expired_on(date(2024, 3, 31)));
    }
}
