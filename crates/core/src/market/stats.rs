use crate::market::types::InstrumentMarketStats;
use crate::profile::round2;

/// Summarizes a closing-price series. Empty input yields the "No data" marker.
pub fn summarize(closes: &[f64]) -> InstrumentMarketStats {
    let (Some(&first), Some(&last)) = (closes.first(), closes.last()) else {
        return InstrumentMarketStats::no_data();
    };

    let high = closes.iter().copied().fold(f64::MIN, f64::max);
    let low = closes.iter().copied().fold(f64::MAX, f64::min);
    let return_pct = if first != 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };

    InstrumentMarketStats::Stats {
        current_price: round2(last),
        year_high: round2(high),
        year_low: round2(low),
        volatility: round2(sample_std_dev(closes)),
        one_year_return_percent: round2(return_pct),
    }
}

/// Sample (n - 1) standard deviation; 0.0 for fewer than two points.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
