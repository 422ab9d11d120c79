//! Income rates and commission splitting for course sales.
//!
//! Rates are expressed in basis points (1/100 of a percent) so they can be
//! stored as integers. Commissions round down to the minor unit and the
//! platform keeps whatever remains, which keeps every split exact.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reporting::SaleChannel;
use crate::types::MinorUnits;

/// 100% expressed in basis points.
pub const FULL_BPS: i32 = 10_000;

/// Who an income rate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeRateKind {
    Seller,
    Affiliate,
    Instructor,
}

impl IncomeRateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Affiliate => "affiliate",
            Self::Instructor => "instructor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "seller" => Some(Self::Seller),
            "affiliate" => Some(Self::Affiliate),
            "instructor" => Some(Self::Instructor),
            _ => None,
        }
    }
}

/// The currently configured income rates, in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    pub seller_bps: i32,
    pub affiliate_bps: i32,
    pub instructor_bps: i32,
}

impl Rates {
    pub fn get(&self, kind: IncomeRateKind) -> i32 {
        match kind {
            IncomeRateKind::Seller => self.seller_bps,
            IncomeRateKind::Affiliate => self.affiliate_bps,
            IncomeRateKind::Instructor => self.instructor_bps,
        }
    }

    pub fn set(&mut self, kind: IncomeRateKind, bps: i32) {
        match kind {
            IncomeRateKind::Seller => self.seller_bps = bps,
            IncomeRateKind::Affiliate => self.affiliate_bps = bps,
            IncomeRateKind::Instructor => self.instructor_bps = bps,
        }
    }

    /// Rate applied to the reseller side of a sale made through `channel`.
    pub fn for_channel(&self, channel: SaleChannel) -> i32 {
        match channel {
            SaleChannel::Seller => self.seller_bps,
            SaleChannel::Affiliate => self.affiliate_bps,
            SaleChannel::Own => 0,
        }
    }
}

/// How a single sale amount is divided between the parties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaleSplit {
    pub seller: MinorUnits,
    pub affiliate: MinorUnits,
    pub instructor: MinorUnits,
    pub platform: MinorUnits,
}

/// Commission on `amount` at `bps` basis points, rounded down.
pub fn commission(amount: MinorUnits, bps: i32) -> MinorUnits {
    if amount <= 0 || bps <= 0 {
        return 0;
    }
    let value = i128::from(amount) * i128::from(bps) / i128::from(FULL_BPS);
    value as MinorUnits
}

/// Split a sale between reseller, instructor and platform.
///
/// Assumes `rates` passed [`validate_rates`]; the platform share is then
/// never negative.
pub fn split_sale(amount: MinorUnits, channel: SaleChannel, rates: &Rates) -> SaleSplit {
    let reseller = commission(amount, rates.for_channel(channel));
    let instructor = commission(amount, rates.instructor_bps);
    let (seller, affiliate) = match channel {
        SaleChannel::Seller => (reseller, 0),
        SaleChannel::Affiliate => (0, reseller),
        SaleChannel::Own => (0, 0),
    };
    SaleSplit {
        seller,
        affiliate,
        instructor,
        platform: amount - seller - affiliate - instructor,
    }
}

/// Validate a single rate value.
pub fn validate_bps(bps: i32) -> Result<(), CoreError> {
    if !(0..=FULL_BPS).contains(&bps) {
        return Err(CoreError::Validation(format!(
            "Rate must be between 0 and {FULL_BPS} basis points, got {bps}"
        )));
    }
    Ok(())
}

/// Validate a full rate table.
///
/// The instructor share plus the larger of the two reseller shares must not
/// exceed 100%, since at most one reseller is paid per sale.
pub fn validate_rates(rates: &Rates) -> Result<(), CoreError> {
    validate_bps(rates.seller_bps)?;
    validate_bps(rates.affiliate_bps)?;
    validate_bps(rates.instructor_bps)?;
    let worst = rates.instructor_bps + rates.seller_bps.max(rates.affiliate_bps);
    if worst > FULL_BPS {
        return Err(CoreError::Validation(
            "Instructor and reseller rates together exceed 100%".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn rates() -> Rates {
        Rates {
            seller_bps: 1_000,
            affiliate_bps: 500,
            instructor_bps: 6_000,
        }
    }

    #[test]
    fn commission_rounds_down() {
        // 10% of 999 = 99.9
        assert_eq!(commission(999, 1_000), 99);
        assert_eq!(commission(1_000, 1_000), 100);
    }

    #[test]
    fn commission_zero_for_non_positive_inputs() {
        assert_eq!(commission(0, 1_000), 0);
        assert_eq!(commission(-50, 1_000), 0);
        assert_eq!(commission(500, 0), 0);
    }

    #[test]
    fn commission_handles_large_amounts() {
        assert_eq!(commission(i64::MAX / 2, FULL_BPS), i64::MAX / 2);
    }

    #[test]
    fn seller_sale_split_is_exact() {
        let split = split_sale(12_345, SaleChannel::Seller, &rates());
        assert_eq!(split.seller, 1_234);
        assert_eq!(split.affiliate, 0);
        assert_eq!(split.instructor, 7_407);
        assert_eq!(
            split.seller + split.affiliate + split.instructor + split.platform,
            12_345
        );
    }

    #[test]
    fn affiliate_sale_pays_affiliate_only() {
        let split = split_sale(10_000, SaleChannel::Affiliate, &rates());
        assert_eq!(split.seller, 0);
        assert_eq!(split.affiliate, 500);
        assert_eq!(split.instructor, 6_000);
        assert_eq!(split.platform, 3_500);
    }

    #[test]
    fn own_sale_pays_no_reseller() {
        let split = split_sale(10_000, SaleChannel::Own, &rates());
        assert_eq!(split.seller + split.affiliate, 0);
        assert_eq!(split.platform, 4_000);
    }

    #[test]
    fn rate_kind_parse_round_trips() {
        for kind in [
            IncomeRateKind::Seller,
            IncomeRateKind::Affiliate,
            IncomeRateKind::Instructor,
        ] {
            assert_eq!(IncomeRateKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(IncomeRateKind::parse("platform"), None);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert_matches!(validate_bps(-1), Err(CoreError::Validation(_)));
        assert_matches!(validate_bps(10_001), Err(CoreError::Validation(_)));
        assert!(validate_bps(0).is_ok());
        assert!(validate_bps(10_000).is_ok());
    }

    #[test]
    fn validate_rejects_overcommitted_table() {
        let table = Rates {
            seller_bps: 5_000,
            affiliate_bps: 100,
            instructor_bps: 6_000,
        };
        assert_matches!(validate_rates(&table), Err(CoreError::Validation(_)));
        assert!(validate_rates(&rates()).is_ok());
    }

    #[test]
    fn set_and_get_are_symmetric() {
        let mut table = Rates::default();
        table.set(IncomeRateKind::Affiliate, 750);
        assert_eq!(table.get(IncomeRateKind::Affiliate), 750);
        assert_eq!(table.for_channel(SaleChannel::Affiliate), 750);
        assert_eq!(table.for_channel(SaleChannel::Own), 0);
    }
}
