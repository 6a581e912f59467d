/// Largest order a row may be given explicitly; one past it stays free for appends
pub const MAX_ORDER: i32 = i32::MAX - 1;

/// Order value for a new row, given the current maximum order among its siblings
///
/// Rows with no siblings start at 0. `None` when the scope has no order left.
pub fn next_order(current_max: Option<i32>) -> Option<i32> {
    match current_max {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}

/// Whether `order` may be assigned explicitly
pub fn is_valid_order(order: i32) -> bool {
    (0..=MAX_ORDER).contains(&order)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_row_starts_at_zero() {
        assert_eq!(next_order(None), Some(0));
    }

    #[test]
    fn test_follows_the_current_maximum() {
        assert_eq!(next_order(Some(0)), Some(1));
        assert_eq!(next_order(Some(7)), Some(8));
    }

    #[test]
    fn test_no_order_after_the_last_value() {
        assert_eq!(next_order(Some(MAX_ORDER)), Some(i32::MAX));
        assert_eq!(next_order(Some(i32::MAX)), None);
    }

    #[test]
    fn test_explicit_orders_are_non_negative() {
        assert!(is_valid_order(0));
        assert!(is_valid_order(MAX_ORDER));
        assert!(!is_valid_order(-1));
        assert!(!is_valid_order(i32::MAX));
    }
}
