use crate::HULL_EPS;

/// moments of a triangular random variable on [lo, up] with the given
/// mode, and the modal ↔ mean conversions of the value base.
///
/// a midpoint is a mean, never a mode: the fit takes the mean the
/// consolidation produced, recovers the mode, and clamps it into the
/// hull when the mean sits too close to an endpoint for an interior
/// mode to exist.

/// mean of the triangle with the given mode
pub fn mean(lo: f64, mode: f64, up: f64) -> f64 {
    (lo + mode + up) / 3.
}

/// mode recovering the given mean; in [lo, up] only if the mean is
/// within the middle third of the hull
pub fn modal(lo: f64, mean: f64, up: f64) -> f64 {
    3. * mean - lo - up
}

/// whether the recovered mode is admissible
pub fn modality(lo: f64, mean: f64, up: f64) -> bool {
    let mode = modal(lo, mean, up);
    mode >= lo - crate::DTL_EPS && mode <= up + crate::DTL_EPS
}

/// variance of the triangle
pub fn variance(lo: f64, mode: f64, up: f64) -> f64 {
    (lo * lo + mode * mode + up * up - lo * mode - lo * up - mode * up) / 18.
}

/// third central moment of the triangle
pub fn third(lo: f64, mode: f64, up: f64) -> f64 {
    (lo + up - 2. * mode) * (2. * lo - up - mode) * (lo - 2. * up + mode) / 270.
}

/// (variance, third) for a hull and a mean, collapsing to a Dirac on a
/// point hull and clamping the mode where the mean forces it outside
pub fn fit(lo: f64, mean: f64, up: f64) -> (f64, f64) {
    if up - lo < HULL_EPS {
        return (0., 0.);
    }
    let mode = modal(lo, mean, up).clamp(lo, up);
    (variance(lo, mode, up), third(lo, mode, up))
}
