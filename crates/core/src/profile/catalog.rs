use crate::domain::recommendation::AssetClass;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub symbol: &'static str,
    pub display_name: &'static str,
}

const fn etf(symbol: &'static str, display_name: &'static str) -> Instrument {
    Instrument {
        symbol,
        display_name,
    }
}

const EQUITY: &[Instrument] = &[
    etf("VTI", "Vanguard Total Stock Market ETF"),
    etf("VOO", "Vanguard S&P 500 ETF"),
    etf("QQQ", "Invesco QQQ Trust"),
];

const BONDS: &[Instrument] = &[
    etf("BND", "Vanguard Total Bond Market ETF"),
    etf("TLT", "iShares 20+ Year Treasury Bond ETF"),
    etf("LQD", "iShares Investment Grade Bond ETF"),
];

const REAL_ESTATE: &[Instrument] = &[
    etf("VNQ", "Vanguard Real Estate ETF"),
    etf("SCHH", "Schwab U.S. REIT ETF"),
    etf("IYR", "iShares U.S. Real Estate ETF"),
];

const GOLD: &[Instrument] = &[
    etf("GLD", "SPDR Gold Shares"),
    etf("IAU", "iShares Gold Trust"),
    etf("SGOL", "Aberdeen Standard Gold ETF"),
];

const CRYPTO: &[Instrument] = &[
    etf("BITO", "ProShares Bitcoin Strategy ETF"),
    etf("WGMI", "Valkyrie Bitcoin Miners ETF"),
    etf("BCHN", "Grayscale Bitcoin Cash Trust"),
];

/// Maximum number of instruments picked per asset class.
pub const PICKS_PER_CLASS: usize = 3;

pub trait InstrumentCatalog {
    fn instruments_for(&self, class: AssetClass) -> &[Instrument];
}

/// Built-in ETF catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl InstrumentCatalog for StaticCatalog {
    fn instruments_for(&self, class: AssetClass) -> &[Instrument] {
        instruments_for(class)
    }
}

pub fn instruments_for(class: AssetClass) -> &'static [Instrument] {
    match class {
        AssetClass::Equity => EQUITY,
        AssetClass::Bonds => BONDS,
        AssetClass::RealEstate => REAL_ESTATE,
        AssetClass::Gold => GOLD,
        AssetClass::Crypto => CRYPTO,
    }
}

pub fn validate() -> anyhow::Result<()> {
    for class in AssetClass::ALL {
        let list = instruments_for(class);
        anyhow::ensure!(!list.is_empty(), "catalog has no instruments for {class}");
        for i in list {
            anyhow::ensure!(
                !i.symbol.trim().is_empty() && !i.display_name.trim().is_empty(),
                "catalog entry for {class} has an empty symbol or name"
            );
        }
    }
    Ok(())
}
