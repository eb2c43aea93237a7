use crate::api::Dtl;
use crate::api::DtlError;
use crate::eval::cache::Entry;
use crate::Belief;
use crate::Mass;
use crate::MAX_SUPPORT_LEVEL;
use crate::MIN_SUPPORT_LEVEL;

/// mass and support queries over a cached evaluation.
///
/// belief levels are served directly inside
/// [MIN_SUPPORT_LEVEL, MAX_SUPPORT_LEVEL]; outside, the support
/// interval is filled to [0, 1] by quadratic extrapolation between
/// the nearest served level and the hull (or the median).

pub fn mass_below(entry: &Entry, level: f64) -> Mass {
    entry.bn.mass_below(level)
}
pub fn mass_above(entry: &Entry, level: f64) -> Mass {
    entry.bn.mass_above(level)
}
pub fn mass_range(entry: &Entry, lo: f64, up: f64) -> Dtl<Mass> {
    match lo <= up {
        true => Ok(entry.bn.mass_range(lo, up)),
        false => Err(DtlError::BadBounds),
    }
}
pub fn mass_density(entry: &Entry, level: f64) -> Mass {
    entry.bn.density(level)
}

/// the central support interval carrying the given belief mass
pub fn support_interval(entry: &Entry, belief: Belief) -> Dtl<(f64, f64)> {
    if !(0. ..=1.).contains(&belief) {
        return Err(DtlError::BadBounds);
    }
    let bn = &entry.bn;
    if belief > MAX_SUPPORT_LEVEL {
        let (lo, up) = served(entry, MAX_SUPPORT_LEVEL);
        let t = (belief - MAX_SUPPORT_LEVEL) / (1. - MAX_SUPPORT_LEVEL);
        let t2 = t * t;
        return Ok((lo + (entry.lo - lo) * t2, up + (entry.up - up) * t2));
    }
    if belief < MIN_SUPPORT_LEVEL {
        let (lo, up) = served(entry, MIN_SUPPORT_LEVEL);
        let median = bn.inv_cdf(0.5);
        let t = (MIN_SUPPORT_LEVEL - belief) / MIN_SUPPORT_LEVEL;
        let t2 = t * t;
        return Ok((lo + (median - lo) * t2, up + (median - up) * t2));
    }
    Ok(served(entry, belief))
}

fn served(entry: &Entry, belief: Belief) -> (f64, f64) {
    let bn = &entry.bn;
    (
        bn.inv_cdf((1. - belief) / 2.),
        bn.inv_cdf((1. + belief) / 2.),
    )
}

pub fn support_lower(entry: &Entry, belief: Belief) -> Dtl<f64> {
    support_interval(entry, belief).map(|(lo, _)| lo)
}
pub fn support_upper(entry: &Entry, belief: Belief) -> Dtl<f64> {
    support_interval(entry, belief).map(|(_, up)| up)
}

/// the risk-aversion value: the expected value at the cdf level
/// 1 − 2^{−|r|}, read off the upper tail for positive r and the lower
/// tail for negative r. within |r| < 1 the formula's level crosses the
/// median, so the target is held there.
pub fn aversion(entry: &Entry, r: f64) -> Dtl<f64> {
    if !(-10. ..=10.).contains(&r) {
        return Err(DtlError::BadMode);
    }
    let level = 1. - (2f64).powf(-r.abs());
    let p = match () {
        _ if r.abs() < 1. => 0.5,
        _ if r > 0. => level,
        _ => 1. - level,
    };
    Ok(entry.bn.inv_cdf(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bnormal::bnormal::Bnormal;
    use crate::moment::moments::Moments;
    use crate::moment::rule::Rule;
    use crate::MAX_SUPPORT_LEVEL;

    fn entry() -> Entry {
        let m = Moments {
            m1: 0.5,
            m2: 0.01,
            m3: 0.0001,
        };
        Entry {
            rule: Rule::Psi,
            pair: (1, 0),
            bn: Bnormal::fit(m, 0., 1.),
            lo: 0.,
            mid: 0.5,
            up: 1.,
        }
    }

    #[test]
    fn is_mass_split_complementary() {
        let e = entry();
        for level in [0.2, 0.5, 0.8] {
            let split = mass_above(&e, level) + mass_below(&e, level);
            assert!((split - 1.).abs() < 1e-6);
        }
    }
    #[test]
    fn is_support_round_trip_tight() {
        let e = entry();
        for belief in [0.5, 0.7, 0.9, MAX_SUPPORT_LEVEL] {
            let (lo, up) = support_interval(&e, belief).unwrap();
            let back = mass_above(&e, lo) + mass_below(&e, up);
            assert!((back - (1. + belief)).abs() < 1e-4);
        }
    }
    #[test]
    fn is_extrapolation_filling_the_ends() {
        let e = entry();
        let (lo, up) = support_interval(&e, 1.).unwrap();
        assert!((lo - e.lo).abs() < 1e-9);
        assert!((up - e.up).abs() < 1e-9);
        let (lo, up) = support_interval(&e, 0.).unwrap();
        let median = e.bn.inv_cdf(0.5);
        assert!((lo - median).abs() < 1e-6);
        assert!((up - median).abs() < 1e-6);
    }
    #[test]
    fn is_aversion_monotone_in_r() {
        let e = entry();
        let mut last = f64::MIN;
        for r in [-10., -4., -1.5, 0., 1.5, 4., 10.] {
            let v = aversion(&e, r).unwrap();
            assert!(v >= last - 1e-9);
            last = v;
        }
    }
    #[test]
    fn is_aversion_flat_near_zero() {
        let e = entry();
        let median = e.bn.inv_cdf(0.5);
        for r in [-0.9, -0.2, 0., 0.4, 0.9] {
            assert!((aversion(&e, r).unwrap() - median).abs() < 1e-9);
        }
    }
    #[test]
    fn is_out_of_range_refused() {
        let e = entry();
        assert!(aversion(&e, 11.).is_err());
        assert!(support_interval(&e, 1.5).is_err());
        assert!(mass_range(&e, 0.8, 0.2).is_err());
    }
}
