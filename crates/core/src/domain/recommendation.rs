use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of asset classes. Declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Equity,
    Bonds,
    #[serde(rename = "Real_Estate")]
    RealEstate,
    Gold,
    Crypto,
}

impl AssetClass {
    pub const ALL: [AssetClass; 5] = [
        AssetClass::Equity,
        AssetClass::Bonds,
        AssetClass::RealEstate,
        AssetClass::Gold,
        AssetClass::Crypto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Bonds => "Bonds",
            AssetClass::RealEstate => "Real_Estate",
            AssetClass::Gold => "Gold",
            AssetClass::Crypto => "Crypto",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target percentage per asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTable {
    #[serde(rename = "Equity")]
    pub equity: u32,
    #[serde(rename = "Bonds")]
    pub bonds: u32,
    #[serde(rename = "Real_Estate")]
    pub real_estate: u32,
    #[serde(rename = "Gold")]
    pub gold: u32,
    #[serde(rename = "Crypto")]
    pub crypto: u32,
}

impl AllocationTable {
    pub fn percent(&self, class: AssetClass) -> u32 {
        match class {
            AssetClass::Equity => self.equity,
            AssetClass::Bonds => self.bonds,
            AssetClass::RealEstate => self.real_estate,
            AssetClass::Gold => self.gold,
            AssetClass::Crypto => self.crypto,
        }
    }

    /// `(class, percent)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, u32)> + '_ {
        AssetClass::ALL.into_iter().map(move |c| (c, self.percent(c)))
    }

    pub fn total(&self) -> u32 {
        self.iter().map(|(_, p)| p).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAllocation {
    pub symbol: String,
    pub display_name: String,
    pub weight_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecommendation {
    pub asset_class: AssetClass,
    pub allocation_percent: u32,
    pub instruments: Vec<InstrumentAllocation>,
}

/// Per-class instrument picks. Only classes with a non-zero allocation are
/// present, in `AssetClass` declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendation {
    pub classes: Vec<ClassRecommendation>,
}

impl Recommendation {
    pub fn get(&self, class: AssetClass) -> Option<&[InstrumentAllocation]> {
        self.classes
            .iter()
            .find(|c| c.asset_class == class)
            .map(|c| c.instruments.as_slice())
    }

    pub fn asset_classes(&self) -> impl Iterator<Item = AssetClass> + '_ {
        self.classes.iter().map(|c| c.asset_class)
    }

    /// Every symbol across all classes, in output order. May repeat.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes
            .iter()
            .flat_map(|c| c.instruments.iter().map(|i| i.symbol.as_str()))
    }
}
