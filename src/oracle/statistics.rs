//! Cross-source statistics: average price and per-source slippage.

use crate::error::{QuoteError, QuoteResult};
use crate::types::{AveragePair, Quote, Side, SlippageEntry};

/// Arithmetic mean of buy and sell prices across all quotes
pub fn average(quotes: &[Quote]) -> QuoteResult<AveragePair> {
    if quotes.is_empty() {
        return Err(QuoteError::EmptyQuoteSet);
    }

    let count = quotes.len() as f64;
    let (buy_sum, sell_sum) = quotes
        .iter()
        .fold((0.0, 0.0), |(buy, sell), q| (buy + q.buy_price, sell + q.sell_price));

    Ok(AveragePair {
        average_buy_price: buy_sum / count,
        average_sell_price: sell_sum / count,
    })
}

/// Percentage deviation of each quote from `average`, in input order
pub fn slippage(quotes: &[Quote], average: &AveragePair) -> QuoteResult<Vec<SlippageEntry>> {
    if average.average_buy_price == 0.0 {
        return Err(QuoteError::DegenerateAverage { side: Side::Buy });
    }
    if average.average_sell_price == 0.0 {
        return Err(QuoteError::DegenerateAverage { side: Side::Sell });
    }

    Ok(quotes
        .iter()
        .map(|q| SlippageEntry {
            buy_price_slippage: percent_deviation(q.buy_price, average.average_buy_price),
            sell_price_slippage: percent_deviation(q.sell_price, average.average_sell_price),
            source: q.source.clone(),
        })
        .collect())
}

fn percent_deviation(price: f64, average: f64) -> f64 {
    (price - average) / average * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePair;

    fn quote(buy: f64, sell: f64, source: &str) -> Quote {
        Quote::new(PricePair::new(buy, sell), source)
    }

    fn mean_abs_buy_slippage(quotes: &[Quote]) -> f64 {
        let avg = average(quotes).unwrap();
        let entries = slippage(quotes, &avg).unwrap();
        entries.iter().map(|e| e.buy_price_slippage.abs()).sum::<f64>() / entries.len() as f64
    }

    #[test]
    fn test_average_is_arithmetic_mean() {
        let quotes = vec![
            quote(900.0, 920.0, "a"),
            quote(910.0, 925.0, "b"),
            quote(920.0, 930.0, "c"),
        ];
        let avg = average(&quotes).unwrap();

        assert_eq!(avg.average_buy_price, 910.0);
        assert_eq!(avg.average_sell_price, 925.0);
    }

    #[test]
    fn test_average_of_single_quote_is_that_quote() {
        let avg = average(&[quote(5.25, 5.31, "a")]).unwrap();
        assert_eq!(avg.average_buy_price, 5.25);
        assert_eq!(avg.average_sell_price, 5.31);
    }

    #[test]
    fn test_average_of_empty_set_fails() {
        assert_eq!(average(&[]), Err(QuoteError::EmptyQuoteSet));
    }

    #[test]
    fn test_slippage_is_zero_at_the_average() {
        let quotes = vec![quote(1.0, 3.0, "a"), quote(2.0, 4.0, "b"), quote(3.0, 5.0, "c")];
        let avg = average(&quotes).unwrap();
        let entries = slippage(&quotes, &avg).unwrap();

        assert_eq!(entries[1].buy_price_slippage, 0.0);
        assert_eq!(entries[1].sell_price_slippage, 0.0);
        assert_eq!(entries[0].buy_price_slippage, -50.0);
        assert_eq!(entries[2].buy_price_slippage, 50.0);
    }

    #[test]
    fn test_slippage_preserves_order_and_sources() {
        let quotes = vec![
            quote(900.0, 920.0, "ambito"),
            quote(910.0, 925.0, "dolarhoy"),
            quote(920.0, 930.0, "cronista"),
        ];
        let avg = average(&quotes).unwrap();
        let entries = slippage(&quotes, &avg).unwrap();

        let sources: Vec<&str> = entries.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["ambito", "dolarhoy", "cronista"]);
        assert!((entries[0].buy_price_slippage - (-1.0989010989)).abs() < 1e-6);
    }

    #[test]
    fn test_slippage_rejects_zero_average() {
        let quotes = vec![quote(0.0, 0.0, "a"), quote(0.0, 0.0, "b")];
        let avg = average(&quotes).unwrap();

        assert_eq!(
            slippage(&quotes, &avg),
            Err(QuoteError::DegenerateAverage { side: Side::Buy })
        );

        let sell_only = AveragePair {
            average_buy_price: 1.0,
            average_sell_price: 0.0,
        };
        assert_eq!(
            slippage(&quotes, &sell_only),
            Err(QuoteError::DegenerateAverage { side: Side::Sell })
        );
    }

    #[test]
    fn test_slippage_shrinks_with_spread() {
        let wide = vec![quote(80.0, 90.0, "a"), quote(120.0, 130.0, "b")];
        let narrow = vec![quote(99.0, 109.0, "a"), quote(101.0, 111.0, "b")];

        assert!(mean_abs_buy_slippage(&narrow) < mean_abs_buy_slippage(&wide));
    }

    #[test]
    fn test_sentinel_quote_pulls_average_down() {
        let quotes = vec![quote(10.0, 12.0, "a"), quote(0.0, 0.0, "down")];
        let avg = average(&quotes).unwrap();
        let entries = slippage(&quotes, &avg).unwrap();

        assert_eq!(avg.average_buy_price, 5.0);
        assert_eq!(entries[1].buy_price_slippage, -100.0);
    }
}
