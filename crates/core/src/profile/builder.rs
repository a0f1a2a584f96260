use crate::domain::recommendation::{
    AllocationTable, ClassRecommendation, InstrumentAllocation, Recommendation,
};
use crate::profile::catalog::{InstrumentCatalog, PICKS_PER_CLASS};
use crate::profile::round2;

/// Splits each non-zero class allocation equally over its first catalog picks.
pub fn build(allocation: &AllocationTable, catalog: &dyn InstrumentCatalog) -> Recommendation {
    let mut classes = Vec::new();

    for (class, percent) in allocation.iter() {
        if percent == 0 {
            continue;
        }

        let picks = catalog.instruments_for(class);
        let picks = &picks[..picks.len().min(PICKS_PER_CLASS)];
        if picks.is_empty() {
            // Startup validation rejects this; skip rather than divide by zero.
            tracing::warn!(asset_class = %class, "no instruments in catalog; skipping class");
            continue;
        }

        let weight = round2(f64::from(percent) / picks.len() as f64);
        let instruments = picks
            .iter()
            .map(|i| InstrumentAllocation {
                symbol: i.symbol.to_string(),
                display_name: i.display_name.to_string(),
                weight_percent: weight,
            })
            .collect();

        classes.push(ClassRecommendation {
            asset_class: class,
            allocation_percent: percent,
            instruments,
        });
    }

    Recommendation { classes }
}
