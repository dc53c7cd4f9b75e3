//! Broker fee schedules
//!
//! Each schedule prices one leg of a trade; the round trip is two legs.

use super::FeeSchedule;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Per-contract commission with a per-order minimum (US options)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PerContractFees {
    /// Minimum charge per leg
    #[serde(default = "default_contract_floor")]
    pub floor: Decimal,
    /// Blended commission + platform + regulatory charge per contract
    #[serde(default = "default_contract_rate")]
    pub rate: Decimal,
}

fn default_contract_floor() -> Decimal {
    dec!(2.00)
}
fn default_contract_rate() -> Decimal {
    dec!(0.80)
}

impl Default for PerContractFees {
    fn default() -> Self {
        Self {
            floor: default_contract_floor(),
            rate: default_contract_rate(),
        }
    }
}

impl FeeSchedule for PerContractFees {
    fn one_way(&self, quantity: u32, _notional: Decimal) -> Decimal {
        (Decimal::from(quantity) * self.rate).max(self.floor)
    }

    fn name(&self) -> &'static str {
        "per_contract"
    }
}

/// Per-share commission with a per-order minimum (US equities)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PerShareFees {
    #[serde(default = "default_share_floor")]
    pub floor: Decimal,
    #[serde(default = "default_share_rate")]
    pub rate: Decimal,
}

fn default_share_floor() -> Decimal {
    dec!(2.00)
}
fn default_share_rate() -> Decimal {
    dec!(0.01)
}

impl Default for PerShareFees {
    fn default() -> Self {
        Self {
            floor: default_share_floor(),
            rate: default_share_rate(),
        }
    }
}

impl FeeSchedule for PerShareFees {
    fn one_way(&self, quantity: u32, _notional: Decimal) -> Decimal {
        (Decimal::from(quantity) * self.rate).max(self.floor)
    }

    fn name(&self) -> &'static str {
        "per_share"
    }
}

/// Ad valorem commission plus fixed platform and settlement charges (HK)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdValoremFees {
    /// Minimum commission per leg
    #[serde(default)]
    pub floor: Decimal,
    /// Commission as a fraction of notional
    #[serde(default = "default_ad_valorem_rate")]
    pub ad_valorem_rate: Decimal,
    /// Flat platform fee per leg
    #[serde(default = "default_platform_fee")]
    pub platform_fee: Decimal,
    /// Flat settlement/clearing fee per leg
    #[serde(default)]
    pub settlement_fee: Decimal,
}

fn default_ad_valorem_rate() -> Decimal {
    dec!(0.0003)
}
fn default_platform_fee() -> Decimal {
    dec!(15.00)
}

impl Default for AdValoremFees {
    fn default() -> Self {
        Self {
            floor: Decimal::ZERO,
            ad_valorem_rate: default_ad_valorem_rate(),
            platform_fee: default_platform_fee(),
            settlement_fee: Decimal::ZERO,
        }
    }
}

impl FeeSchedule for AdValoremFees {
    fn one_way(&self, _quantity: u32, notional: Decimal) -> Decimal {
        let commission = (notional.abs() * self.ad_valorem_rate).max(self.floor);
        commission + self.platform_fee + self.settlement_fee
    }

    fn name(&self) -> &'static str {
        "ad_valorem"
    }
}
