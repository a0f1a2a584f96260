use crate::domain::recommendation::AllocationTable;
use crate::domain::risk::{RiskScore, RiskTier};

pub const CONSERVATIVE: AllocationTable = AllocationTable {
    equity: 20,
    bonds: 50,
    real_estate: 5,
    gold: 20,
    crypto: 5,
};

pub const BALANCED: AllocationTable = AllocationTable {
    equity: 40,
    bonds: 20,
    real_estate: 10,
    gold: 20,
    crypto: 10,
};

pub const AGGRESSIVE: AllocationTable = AllocationTable {
    equity: 60,
    bonds: 10,
    real_estate: 5,
    gold: 5,
    crypto: 20,
};

impl RiskTier {
    pub fn allocation(self) -> AllocationTable {
        match self {
            RiskTier::Conservative => CONSERVATIVE,
            RiskTier::Balanced => BALANCED,
            RiskTier::Aggressive => AGGRESSIVE,
        }
    }
}

pub fn allocate(score: RiskScore) -> AllocationTable {
    RiskTier::classify(score).allocation()
}

pub fn validate_tiers() -> anyhow::Result<()> {
    for tier in [RiskTier::Conservative, RiskTier::Balanced, RiskTier::Aggressive] {
        let total = tier.allocation().total();
        anyhow::ensure!(
            total == 100,
            "allocation for {tier:?} must sum to 100 (got {total})"
        );
    }
    Ok(())
}
