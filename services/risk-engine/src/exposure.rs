//! PV01 sensitivity calculations
//!
//! Unit PV01 is computed once per instrument from coupon, yield and
//! maturity by discounting the coupon schedule at the base yield and at the
//! yield bumped by one basis point. The table is static for a run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use types::errors::ServiceError;
use types::risk::Pv01;

/// One basis point.
pub const BASIS_POINT: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Present value of a fixed-coupon bond.
///
/// `price = Σ c / (1 + y/f)^t + face / (1 + y/f)^n`, `n = years × f`.
pub fn bond_price(
    face: Decimal,
    coupon: Decimal,
    yield_rate: Decimal,
    years: u32,
    frequency: u32,
) -> Decimal {
    let frequency_d = Decimal::from(frequency);
    let coupon_cash = face * coupon / frequency_d;
    let growth = Decimal::ONE + yield_rate / frequency_d;

    let mut discount = Decimal::ONE;
    let mut value = Decimal::ZERO;
    for _ in 0..years * frequency {
        discount /= growth;
        value += coupon_cash * discount;
    }
    value + face * discount
}

/// Finite-difference PV01: `price(y) - price(y + 1bp)`.
pub fn pv01(
    face: Decimal,
    coupon: Decimal,
    yield_rate: Decimal,
    years: u32,
    frequency: u32,
) -> Decimal {
    bond_price(face, coupon, yield_rate, years, frequency)
        - bond_price(face, coupon, yield_rate + BASIS_POINT, years, frequency)
}

/// Static unit PV01 per instrument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensitivityTable {
    unit_pv01: BTreeMap<String, Decimal>,
}

impl SensitivityTable {
    pub fn new(unit_pv01: BTreeMap<String, Decimal>) -> Self {
        Self { unit_pv01 }
    }

    /// Unit PV01 of the on-the-run Treasuries at face 1000, semi-annual
    /// coupons.
    pub fn treasuries() -> Self {
        let face = Decimal::from(1000);
        // (cusip, coupon, yield, years) with rates in 1/100_000
        let inputs: [(&str, i64, i64, u32); 7] = [
            ("9128283H1", 1750, 4640, 2),
            ("9128283L2", 1875, 4400, 3),
            ("912828M80", 2000, 4120, 5),
            ("9128283J7", 2125, 4300, 7),
            ("9128283F5", 2250, 4280, 10),
            ("912810TW8", 2500, 4610, 20),
            ("912810RZ3", 2750, 4430, 30),
        ];

        let unit_pv01 = inputs
            .iter()
            .map(|&(id, coupon, yield_rate, years)| {
                let value = pv01(
                    face,
                    Decimal::new(coupon, 5),
                    Decimal::new(yield_rate, 5),
                    years,
                    2,
                );
                (id.to_string(), value)
            })
            .collect();

        Self { unit_pv01 }
    }

    /// Unit PV01 of `instrument_id`.
    pub fn unit(&self, instrument_id: &str) -> Result<Decimal, ServiceError> {
        self.unit_pv01
            .get(instrument_id)
            .copied()
            .ok_or_else(|| ServiceError::not_found(instrument_id))
    }

    pub fn len(&self) -> usize {
        self.unit_pv01.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_pv01.is_empty()
    }
}

/// Sum of `pv01 × quantity` over a set of risk records.
pub fn total_exposure<'a, P: 'a>(records: impl IntoIterator<Item = &'a Pv01<P>>) -> Decimal {
    records
        .into_iter()
        .fold(Decimal::ZERO, |acc, risk| acc + risk.exposure())
}
