pub mod builder;
pub mod catalog;
pub mod policy;
pub mod scorer;

/// Round half away from zero to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Checks the static policy and catalog tables. Call once at startup.
pub fn validate_static_config() -> anyhow::Result<()> {
    policy::validate_tiers()?;
    catalog::validate()?;
    Ok(())
}
