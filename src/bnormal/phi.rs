/// standard normal density and distribution.
///
/// the cdf runs through the Abramowitz–Stegun 7.1.26 rational
/// approximation of erf, good to a few units in the seventh decimal,
/// which is well inside every horizon the engine quotes.

const P: f64 = 0.3275911;
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;

fn erf(x: f64) -> f64 {
    let sign = x.signum();
    let x = x.abs();
    let t = 1. / (1. + P * x);
    let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
    sign * (1. - poly * (-x * x).exp())
}

/// standard normal cdf
pub fn cdf(x: f64) -> f64 {
    0.5 * (1. + erf(x / std::f64::consts::SQRT_2))
}

/// standard normal density
pub fn pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2. * std::f64::consts::PI).sqrt()
}
