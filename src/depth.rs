use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type DepthType = f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Units {
    Metric,
    Imperial,
}

pub trait Unit<T = f64>: Sized {
    fn from_units(val: T, units: Units) -> Self;
    fn to_units(&self, units: Units) -> T;
}

/// A depth below the surface, stored internally as meters.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Depth {
    m: DepthType,
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.m)
    }
}

impl PartialEq for Depth {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m
    }
}

impl PartialOrd for Depth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.m.partial_cmp(&other.m)
    }
}

impl Add for Depth {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { m: self.m + rhs.m }
    }
}

impl Sub for Depth {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { m: self.m - rhs.m }
    }
}

impl Mul<f64> for Depth {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self { m: self.m * rhs }
    }
}

impl Div<f64> for Depth {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self { m: self.m / rhs }
    }
}

impl AddAssign for Depth {
    fn add_assign(&mut self, rhs: Self) {
        self.m += rhs.m;
    }
}

impl Unit for Depth {
    fn from_units(val: DepthType, units: Units) -> Self {
        match units {
            Units::Metric => Self::from_meters(val),
            Units::Imperial => Self::from_feet(val),
        }
    }

    fn to_units(&self, units: Units) -> DepthType {
        match units {
            Units::Metric => self.as_meters(),
            Units::Imperial => self.as_feet(),
        }
    }
}

impl Depth {
    pub fn zero() -> Self {
        Self { m: 0. }
    }

    pub fn from_meters<T: Into<DepthType>>(val: T) -> Self {
        Self { m: val.into() }
    }

    pub fn from_feet<T: Into<DepthType>>(val: T) -> Self {
        Self {
            m: Self::ft_to_m(val.into()),
        }
    }

    pub fn as_meters(&self) -> DepthType {
        self.m
    }

    pub fn as_feet(&self) -> DepthType {
        Self::m_to_ft(self.m)
    }

    /// Rounded down to the nearest meter, never negative.
    pub fn floor_meters(&self) -> i32 {
        self.m.floor().max(0.) as i32
    }

    pub fn min(self, other: Self) -> Self {
        if self.m <= other.m {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self.m >= other.m {
            self
        } else {
            other
        }
    }

    fn m_to_ft(m: DepthType) -> DepthType {
        m * 3.28084
    }

    fn ft_to_m(ft: DepthType) -> DepthType {
        ft * 0.3048
    }
}
