use crate::api::Dtl;
use crate::api::DtlError;
use crate::scale::scale::Scale;
use crate::DTL_EPS;

/// the four user-value conversion types: plain scale positions,
/// signed differences, unsigned distances, and differences read
/// against the grain of the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Absolute,
    Difference,
    Distance,
    ReverseDifference,
}

impl TryFrom<i32> for Kind {
    type Error = DtlError;
    fn try_from(mode: i32) -> Dtl<Self> {
        match mode {
            1 => Ok(Kind::Absolute),
            2 => Ok(Kind::Difference),
            3 => Ok(Kind::Distance),
            4 => Ok(Kind::ReverseDifference),
            _ => Err(DtlError::BadMode),
        }
    }
}

/// is the user value in the legal input domain of this conversion
pub fn legal(scale: &Scale, kind: Kind, user: f64) -> bool {
    if scale.dirac() || !user.is_finite() {
        return false;
    }
    let width = scale.width();
    match kind {
        Kind::Absolute => scale.contains(user),
        Kind::Difference | Kind::ReverseDifference => user.abs() <= width + DTL_EPS,
        Kind::Distance => user >= -DTL_EPS && user <= width + DTL_EPS,
    }
}

/// all values legal at once; the slice-taking stand-in for the old
/// variadic checkers
pub fn check(scale: &Scale, kind: Kind, values: &[f64]) -> Dtl<()> {
    match values.iter().all(|v| legal(scale, kind, *v)) {
        true => Ok(()),
        false => Err(DtlError::BadBounds),
    }
}

/// user value into the normalised core
pub fn to_norm(scale: &Scale, kind: Kind, user: f64) -> Dtl<f64> {
    if !legal(scale, kind, user) {
        return Err(DtlError::BadBounds);
    }
    Ok(match kind {
        Kind::Absolute => scale.to_norm(user)?,
        Kind::Difference => user / scale.span(),
        Kind::Distance => (user / scale.span()).abs(),
        Kind::ReverseDifference => -user / scale.span(),
    })
}

/// normalised value back onto the user scale
pub fn to_user(scale: &Scale, kind: Kind, norm: f64) -> Dtl<f64> {
    if scale.dirac() {
        return Err(DtlError::BadScale);
    }
    Ok(match kind {
        Kind::Absolute => scale.to_user(norm),
        Kind::Difference => norm * scale.span(),
        Kind::Distance => (norm * scale.span()).abs(),
        Kind::ReverseDifference => -norm * scale.span(),
    })
}

/// a normalised interval on the user scale; a reversed scale swaps
/// the endpoints to keep them ordered
pub fn to_user_interval(scale: &Scale, kind: Kind, lo: f64, up: f64) -> Dtl<(f64, f64)> {
    let a = to_user(scale, kind, lo)?;
    let b = to_user(scale, kind, up)?;
    Ok(match a <= b {
        true => (a, b),
        false => (b, a),
    })
}
