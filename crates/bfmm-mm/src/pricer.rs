//! Depth-weighted limit price derivation.

use crate::error::{MmError, MmResult};
use bfmm_core::{BookSide, Price, PriceLevel, Size};

/// Walk `levels` (best first) accumulating resting size and return the
/// price of the level sitting just before the accumulation crosses
/// `threshold`, offset by `margin` away from the touch.
///
/// The margin pushes asks up and bids down, so the quote rests behind
/// enough liquidity to avoid being first in line on adverse moves. When
/// the threshold is deeper than the whole book, the worst level's raw
/// price is returned with no margin applied.
pub fn depth_limit_price(
    levels: &[PriceLevel],
    side: BookSide,
    threshold: Size,
    margin: i64,
) -> MmResult<Price> {
    let first = levels.first().ok_or(MmError::InvalidBook)?;
    let mut reference = first.price;
    let mut cumulative = first.size;

    for level in &levels[1..] {
        if cumulative.inner() >= threshold.inner() {
            let delta = match side {
                BookSide::Ask => margin,
                BookSide::Bid => -margin,
            };
            return Ok(reference.offset(delta));
        }
        reference = level.price;
        cumulative = cumulative + level.size;
    }

    // Deep-book fallback.
    Ok(levels[levels.len() - 1].price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> Vec<PriceLevel> {
        vec![
            PriceLevel::new(Price::new(100), Size::new(dec!(2))),
            PriceLevel::new(Price::new(99), Size::new(dec!(3))),
            PriceLevel::new(Price::new(98), Size::new(dec!(10))),
        ]
    }

    #[test]
    fn test_threshold_crossed_mid_book() {
        // 2 < 4, 2 + 3 >= 4: reference is the second level.
        let price =
            depth_limit_price(&book(), BookSide::Ask, Size::new(dec!(4)), 1).unwrap();
        assert_eq!(price, Price::new(100));
    }

    #[test]
    fn test_margin_direction_for_bids() {
        let price =
            depth_limit_price(&book(), BookSide::Bid, Size::new(dec!(4)), 1).unwrap();
        assert_eq!(price, Price::new(98));
    }

    #[test]
    fn test_deep_book_fallback_has_no_margin() {
        let price =
            depth_limit_price(&book(), BookSide::Ask, Size::new(dec!(100)), 1).unwrap();
        assert_eq!(price, Price::new(98));
    }

    #[test]
    fn test_single_level_book_falls_back() {
        let levels = vec![PriceLevel::new(Price::new(100), Size::new(dec!(2)))];
        let price =
            depth_limit_price(&levels, BookSide::Ask, Size::new(dec!(1)), 5).unwrap();
        assert_eq!(price, Price::new(100));
    }

    #[test]
    fn test_empty_book_is_an_error() {
        assert!(matches!(
            depth_limit_price(&[], BookSide::Ask, Size::new(dec!(1)), 1),
            Err(MmError::InvalidBook)
        ));
    }

    #[test]
    fn test_zero_margin() {
        let price =
            depth_limit_price(&book(), BookSide::Ask, Size::new(dec!(4)), 0).unwrap();
        assert_eq!(price, Price::new(99));
    }
}
