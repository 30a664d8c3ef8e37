/// How a brokerage amount is computed from quantity, value and rate.
///
/// Both policies have shipped: the current books bill a flat amount per
/// unit, while older revisions billed a percentage of the transaction
/// value. They are different business rules, not two spellings of one;
/// which one is authoritative is decided per invoice, so both stay
/// selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatePolicy {
    /// `rate` is a currency amount per unit: brokerage = qty × rate.
    #[default]
    PerUnit,
    /// `rate` is a percentage of value: brokerage = qty × price × rate / 100.
    PercentOfValue,
}

impl RatePolicy {
    /// Brokerage for one line item.
    pub fn line_amount(&self, qty: f64, price: f64, rate: f64) -> f64 {
        match self {
            Self::PerUnit => qty * rate,
            Self::PercentOfValue => qty * price * rate / 100.0,
        }
    }

    /// Brokerage over a whole filtered set. `total_value` is Σ qty × price,
    /// only consulted by the percentage policy.
    pub fn total(&self, total_qty: f64, total_value: f64, rate: f64) -> f64 {
        match self {
            Self::PerUnit => total_qty * rate,
            Self::PercentOfValue => total_value * rate / 100.0,
        }
    }
}
