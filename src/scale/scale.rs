use crate::api::Dtl;
use crate::api::DtlError;
use crate::DTL_EPS;

/// a per-criterion affine user scale. the engine always works on
/// [0, 1]; user values map in and out through this pair. a scale with
/// min > max is reversed (lower is better); a collapsed scale is a
/// Dirac and cannot convert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    pub fn unit() -> Self {
        Self { min: 0., max: 1. }
    }
    pub fn new(min: f64, max: f64) -> Dtl<Self> {
        match min.is_finite() && max.is_finite() {
            true => Ok(Self { min, max }),
            false => Err(DtlError::BadScale),
        }
    }
    pub fn min(&self) -> f64 {
        self.min
    }
    pub fn max(&self) -> f64 {
        self.max
    }
    pub fn reversed(&self) -> bool {
        self.min > self.max
    }
    /// signed span, negative on a reversed scale
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
    pub fn width(&self) -> f64 {
        self.span().abs()
    }
    pub fn dirac(&self) -> bool {
        self.width() < DTL_EPS
    }

    /// user value into the normalised core
    pub fn to_norm(&self, user: f64) -> Dtl<f64> {
        match self.dirac() {
            true => Err(DtlError::BadScale),
            false => Ok((user - self.min) / self.span()),
        }
    }
    /// normalised value back onto the user scale
    pub fn to_user(&self, norm: f64) -> f64 {
        self.min + norm * self.span()
    }
    /// whether a user value lies on the scale, within the horizon
    pub fn contains(&self, user: f64) -> bool {
        let (lo, hi) = match self.reversed() {
            true => (self.max, self.min),
            false => (self.min, self.max),
        };
        user >= lo - DTL_EPS && user <= hi + DTL_EPS
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
