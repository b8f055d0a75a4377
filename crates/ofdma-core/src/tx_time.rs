use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Logical transmission time with nanosecond resolution.
/// Signed, since a remaining TXOP budget minus a response time can go negative.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TxTime(i64);

impl TxTime {
    pub const ZERO: TxTime = TxTime(0);

    pub const fn from_nanos(ns: i64) -> Self {
        TxTime(ns)
    }

    pub const fn from_micros(us: i64) -> Self {
        TxTime(us * 1_000)
    }

    pub const fn from_millis(ms: i64) -> Self {
        TxTime(ms * 1_000_000)
    }

    pub fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_strictly_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for TxTime {
    type Output = TxTime;
    fn add(self, rhs: TxTime) -> TxTime {
        TxTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TxTime {
    type Output = TxTime;
    fn sub(self, rhs: TxTime) -> TxTime {
        TxTime(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for TxTime {
    fn add_assign(&mut self, rhs: TxTime) {
        *self = *self + rhs;
    }
}

impl SubAssign for TxTime {
    fn sub_assign(&mut self, rhs: TxTime) {
        *self = *self - rhs;
    }
}

impl Neg for TxTime {
    type Output = TxTime;
    fn neg(self) -> TxTime {
        TxTime(self.0.saturating_neg())
    }
}

impl fmt::Display for TxTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0 as f64 / 1_000.0)
    }
}

impl fmt::Debug for TxTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_can_go_negative() {
        let remaining = TxTime::from_micros(100);
        let response = TxTime::from_micros(150);
        let budget = remaining - response;
        assert!(budget.is_negative());
        assert_eq!(budget, -TxTime::from_micros(50));
        assert!(!TxTime::ZERO.is_strictly_positive());
    }

    #[test]
    fn test_units() {
        assert_eq!(TxTime::from_millis(1), TxTime::from_micros(1000));
        assert_eq!(TxTime::from_micros(5484).as_nanos(), 5_484_000);
        let max = TxTime::from_nanos(i64::MAX);
        assert_eq!(max + TxTime::from_micros(1), max);
    }
}
