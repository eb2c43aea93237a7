use crate::bnormal::owen;
use crate::bnormal::phi;
use crate::moment::moments::Moments;
use crate::HULL_EPS;

/// fraction of the untruncated mass the hull must cover before the
/// fit is reported as weak
const STRONG_MASS: f64 = 0.9;
/// degenerate variance horizon: below it the fit is a point mass
const VAR_EPS: f64 = 1e-12;

/// the truncated, moderated skew-normal fitted to a moment triple.
///
/// the skew is clamped to |γ| ≤ 0.955 through a two-piece map, the
/// shape follows from the method of moments, and the whole density is
/// renormalised over the expected-value hull so that the closed hull
/// carries mass exactly one. a hull narrower than the collapse horizon
/// degrades the fit to a Dirac at the midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Bnormal {
    location: f64,
    scale: f64,
    alpha: f64,
    moments: Moments,
    lo: f64,
    up: f64,
    flo: f64,
    fup: f64,
    point: Option<f64>,
}

impl Bnormal {
    pub fn fit(moments: Moments, lo: f64, up: f64) -> Self {
        assert!(lo <= up + HULL_EPS);
        if up - lo < HULL_EPS || moments.m2 < VAR_EPS {
            let point = moments.m1.clamp(lo.min(up), up.max(lo));
            return Self {
                location: point,
                scale: 0.,
                alpha: 0.,
                moments,
                lo,
                up,
                flo: 0.,
                fup: 1.,
                point: Some(point),
            };
        }
        let skew = Self::moderate(moments.skew());
        let tau = skew.abs().powf(2. / 3.);
        let dpi = 2. * ((4. - std::f64::consts::PI) / 2.).powf(2. / 3.);
        let delta = skew.signum()
            * (std::f64::consts::PI * tau / (2. * tau + dpi)).sqrt();
        let alpha = delta / (1. - delta * delta).sqrt();
        let scale = (moments.m2 / (1. - 2. * delta * delta / std::f64::consts::PI)).sqrt();
        let location =
            moments.m1 - scale * delta * (2. / std::f64::consts::PI).sqrt();
        let mut this = Self {
            location,
            scale,
            alpha,
            moments,
            lo,
            up,
            flo: 0.,
            fup: 1.,
            point: None,
        };
        this.flo = this.plain(lo);
        this.fup = this.plain(up);
        if this.fup - this.flo < HULL_EPS {
            // the hull sits in a flat tail; a point mass is all that
            // survives the truncation
            let point = moments.m1.clamp(lo, up);
            this.point = Some(point);
        }
        this
    }

    /// the two-piece skew clamp: identity below 0.9, compressed on
    /// [0.9, 2], saturated at 0.955 above
    fn moderate(skew: f64) -> f64 {
        let g = skew.abs();
        let g = if g <= 0.9 {
            g
        } else if g <= 2. {
            (17.1 + g) / 20.
        } else {
            0.955
        };
        g * skew.signum()
    }

    /// untruncated cdf Φ(z) − 2T(z, α)
    fn plain(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        (phi::cdf(z) - 2. * owen::t(z, self.alpha)).clamp(0., 1.)
    }
    /// untruncated density
    fn slope(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        2. / self.scale * phi::pdf(z) * phi::cdf(self.alpha * z)
    }

    /// cdf truncated to the hull: 0 at the lower end, 1 at the upper
    pub fn cdf(&self, x: f64) -> f64 {
        if let Some(point) = self.point {
            return if x < point - HULL_EPS {
                0.
            } else if x > point + HULL_EPS {
                1.
            } else {
                0.5
            };
        }
        if x <= self.lo {
            0.
        } else if x >= self.up {
            1.
        } else {
            (self.plain(x) - self.flo) / (self.fup - self.flo)
        }
    }

    /// density truncated to the hull
    pub fn density(&self, x: f64) -> f64 {
        if self.point.is_some() {
            return if (x - self.point.expect("point")).abs() <= HULL_EPS {
                f64::MAX
            } else {
                0.
            };
        }
        if x < self.lo || x > self.up {
            0.
        } else {
            self.slope(x) / (self.fup - self.flo)
        }
    }

    /// inverse of the truncated cdf by safeguarded Newton
    pub fn inv_cdf(&self, p: f64) -> f64 {
        if let Some(point) = self.point {
            return point;
        }
        let p = p.clamp(0., 1.);
        let (mut lo, mut up) = (self.lo, self.up);
        let mut x = self.moments.m1.clamp(lo, up);
        for _ in 0..64 {
            let f = self.cdf(x) - p;
            if f.abs() < 1e-12 {
                return x;
            }
            if f > 0. {
                up = x;
            } else {
                lo = x;
            }
            let d = self.density(x);
            let newton = x - f / d;
            x = if d > 1e-12 && newton > lo && newton < up {
                newton
            } else {
                (lo + up) / 2.
            };
        }
        x
    }

    pub fn mass_below(&self, x: f64) -> f64 {
        self.cdf(x)
    }
    pub fn mass_above(&self, x: f64) -> f64 {
        1. - self.cdf(x)
    }
    pub fn mass_range(&self, lo: f64, up: f64) -> f64 {
        (self.cdf(up) - self.cdf(lo)).max(0.)
    }

    /// a Dirac carries infinite density and answers mass queries by
    /// the half-split convention
    pub fn dirac(&self) -> bool {
        self.point.is_some()
    }
    /// hull coverage below 90% of the untruncated mass
    pub fn weak(&self) -> bool {
        self.point.is_none() && self.fup - self.flo < STRONG_MASS
    }

    pub fn location(&self) -> f64 {
        self.location
    }
    pub fn scale(&self) -> f64 {
        self.scale
    }
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
    pub fn moments(&self) -> Moments {
        self.moments
    }
    pub fn hull(&self) -> (f64, f64) {
        (self.lo, self.up)
    }
}
