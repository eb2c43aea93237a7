/// the first three moments of a random variable: mean, variance, and
/// third central moment. everything the evaluator needs survives in
/// this triple.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub m1: f64,
    pub m2: f64,
    pub m3: f64,
}

impl Moments {
    pub const ZERO: Moments = Moments {
        m1: 0.,
        m2: 0.,
        m3: 0.,
    };

    pub fn dirac(m1: f64) -> Self {
        Self { m1, m2: 0., m3: 0. }
    }

    /// sum of two independent variables
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            m1: self.m1 + other.m1,
            m2: self.m2 + other.m2,
            m3: self.m3 + other.m3,
        }
    }
    /// difference of two independent variables
    pub fn minus(&self, other: &Self) -> Self {
        Self {
            m1: self.m1 - other.m1,
            m2: self.m2 + other.m2,
            m3: self.m3 - other.m3,
        }
    }
    /// affine scaling a·X
    pub fn scale(&self, a: f64) -> Self {
        Self {
            m1: a * self.m1,
            m2: a * a * self.m2,
            m3: a * a * a * self.m3,
        }
    }

    /// raw second moment E[X²]
    pub fn raw2(&self) -> f64 {
        self.m2 + self.m1 * self.m1
    }
    /// raw third moment E[X³]
    pub fn raw3(&self) -> f64 {
        self.m3 + 3. * self.m1 * self.m2 + self.m1.powi(3)
    }
    /// standardized skewness, zero on a degenerate variance
    pub fn skew(&self) -> f64 {
        match self.m2 > f64::EPSILON {
            true => self.m3 / self.m2.powf(1.5),
            false => 0.,
        }
    }
}

impl crate::Arbitrary for Moments {
    fn random() -> Self {
        let m2 = rand::random::<f64>() * 0.05 + 1e-4;
        Self {
            m1: rand::random::<f64>(),
            m2,
            m3: (rand::random::<f64>() - 0.5) * m2.powf(1.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_raw_central_conversion_consistent() {
        let m = Moments {
            m1: 0.3,
            m2: 0.02,
            m3: 0.001,
        };
        // recompute centrals from raws
        let m2 = m.raw2() - m.m1 * m.m1;
        let m3 = m.raw3() - 3. * m.m1 * m.raw2() + 2. * m.m1.powi(3);
        assert!((m2 - m.m2).abs() < 1e-12);
        assert!((m3 - m.m3).abs() < 1e-12);
    }
    #[test]
    fn is_scaling_cubic_in_the_third() {
        let m = Moments {
            m1: 1.,
            m2: 1.,
            m3: 1.,
        };
        let s = m.scale(-2.);
        assert!(s.m1 == -2.);
        assert!(s.m2 == 4.);
        assert!(s.m3 == -8.);
    }
    #[test]
    fn is_difference_variance_additive() {
        let a = Moments {
            m1: 0.5,
            m2: 0.01,
            m3: 0.,
        };
        let b = Moments {
            m1: 0.2,
            m2: 0.02,
            m3: 0.,
        };
        let d = a.minus(&b);
        assert!((d.m1 - 0.3).abs() < 1e-12);
        assert!((d.m2 - 0.03).abs() < 1e-12);
    }
}
