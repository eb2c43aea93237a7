use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Basis;
use crate::base::midpoint::MidBox;
use crate::eval::evaluator;
use crate::frame::manager::Frame;
use crate::moment::triangle;
use crate::scale::scale::Scale;
use crate::DTL_EPS;

/// margin used to inflate a collapsed scale around zero
const DIRAC_MARGIN: f64 = 0.5;

/// load a criterion's value base from user-scale interval bounds.
///
/// the actual extremes of the input become the criterion scale
/// (reversed if asked), a collapsed scale is inflated before use, and
/// every bound is mapped onto [0, 1]. the return flag reports a scale
/// change; with `renorm` the criterion's weight-tree siblings are
/// rescaled by the span ratio.
pub fn set_av_box(
    frame: &mut Frame,
    crit: usize,
    rev: bool,
    renorm: bool,
    lobox: &[Vec<f64>],
    upbox: &[Vec<f64>],
) -> Dtl<bool> {
    let (scale, old, los, ups) = normalised(frame, crit, rev, lobox, upbox)?;
    let df = frame.df_mut(crit)?;
    let saved_lo = df.base(Basis::V).ibox().los().to_vec();
    let saved_up = df.base(Basis::V).ibox().ups().to_vec();
    df.set_box(Basis::V, &los, &ups)?;
    *df.scale_mut() = scale;
    let changed = old != scale;
    if changed && renorm && !old.dirac() {
        if let Err(trouble) = renorm_weights(frame, crit, scale.width() / old.width()) {
            let df = frame.df_mut(crit)?;
            df.set_box(Basis::V, &saved_lo, &saved_up)?;
            *df.scale_mut() = old;
            return Err(trouble);
        }
    }
    Ok(changed)
}

/// like set_av_box, with modal values converted to means and loaded
/// into the midpoint box. mode 0 takes the values as modes of the
/// triangular fit, mode 1 as means directly.
pub fn set_av_modal(
    frame: &mut Frame,
    crit: usize,
    mode: i32,
    rev: bool,
    renorm: bool,
    lobox: &[Vec<f64>],
    modalx: &[Vec<f64>],
    upbox: &[Vec<f64>],
) -> Dtl<bool> {
    if !(0..=1).contains(&mode) {
        return Err(DtlError::BadMode);
    }
    let changed = set_av_box(frame, crit, rev, renorm, lobox, upbox)?;
    let df = frame.df_mut(crit)?;
    let scale = *df.scale();
    let maps = df.maps().clone();
    shaped(&maps, modalx)?;
    let mut mids = vec![MidBox::SKIP; maps.n_real()];
    for (a, row) in modalx.iter().enumerate() {
        for (r, user) in row.iter().enumerate() {
            let k = maps.real_of(a + 1, r + 1);
            let norm = scale.to_norm(*user)?;
            let hull = &df.base(Basis::V).hull;
            mids[k] = match mode {
                0 => triangle::mean(hull.lo(k), norm, hull.up(k)),
                _ => norm,
            };
        }
    }
    df.set_mbox(Basis::V, &mids, &mids)?;
    Ok(changed)
}

/// user-scale midpoint intervals into the value midpoint box; the
/// empty and skip sentinels pass through unconverted
pub fn set_av_mbox(
    frame: &mut Frame,
    crit: usize,
    lobox: &[Vec<f64>],
    upbox: &[Vec<f64>],
) -> Dtl<()> {
    let df = frame.df_mut(crit)?;
    let scale = *df.scale();
    let maps = df.maps().clone();
    shaped(&maps, lobox)?;
    shaped(&maps, upbox)?;
    let mut los = vec![MidBox::SKIP; maps.n_real()];
    let mut ups = vec![MidBox::SKIP; maps.n_real()];
    for (a, (lrow, urow)) in lobox.iter().zip(upbox.iter()).enumerate() {
        for (r, (lo, up)) in lrow.iter().zip(urow.iter()).enumerate() {
            let k = maps.real_of(a + 1, r + 1);
            if *lo == MidBox::SKIP {
                continue;
            }
            if *lo == MidBox::EMPTY {
                los[k] = MidBox::EMPTY;
                ups[k] = MidBox::EMPTY;
                continue;
            }
            let x = scale.to_norm(*lo)?;
            let y = scale.to_norm(*up)?;
            los[k] = x.min(y);
            ups[k] = x.max(y);
        }
    }
    df.set_mbox(Basis::V, &los, &ups)
}

/// single-value variant aliasing both midpoint bounds
pub fn set_av_mbox1(frame: &mut Frame, crit: usize, midx: &[Vec<f64>]) -> Dtl<()> {
    set_av_mbox(frame, crit, midx, midx)
}

pub fn get_av_crit_scale(frame: &Frame, crit: usize) -> Dtl<Scale> {
    Ok(*frame.df(crit)?.scale())
}

/// span ratio between two criterion scales, weighted by the global
/// weight midpoints in MC mode; a collapsed source has no finite
/// ratio
pub fn scale_ratio(frame: &Frame, c_from: usize, c_to: usize, mode: i32) -> Dtl<f64> {
    let from = *frame.df(c_from)?.scale();
    let to = *frame.df(c_to)?.scale();
    if from.dirac() {
        return Ok(f64::MAX);
    }
    let mut ratio = (to.width() / from.width()).abs();
    if mode != 0 {
        let weights = evaluator::global_weights(frame.weights()?);
        let wf = weights[c_from - 1];
        let wt = weights[c_to - 1];
        if wt.abs() < DTL_EPS {
            return Ok(f64::MAX);
        }
        ratio *= wf / wt;
    }
    Ok(ratio)
}

/// scale of the aggregate output
pub fn get_av_mc_scale(frame: &Frame) -> Scale {
    *frame.mc_scale()
}
pub fn set_av_mc_scale(frame: &mut Frame, scale: Scale) {
    *frame.mc_scale_mut() = scale;
}
pub fn copy_av_mc_scale(frame: &mut Frame, crit: usize) -> Dtl<()> {
    let scale = *frame.df(crit)?.scale();
    *frame.mc_scale_mut() = scale;
    Ok(())
}
pub fn reset_av_mc_scale(frame: &mut Frame) {
    *frame.mc_scale_mut() = Scale::unit();
}

/// derive the scale and the normalised boxes from raw user input
fn normalised(
    frame: &Frame,
    crit: usize,
    rev: bool,
    lobox: &[Vec<f64>],
    upbox: &[Vec<f64>],
) -> Dtl<(Scale, Scale, Vec<f64>, Vec<f64>)> {
    let df = frame.df(crit)?;
    let maps = df.maps();
    shaped(maps, lobox)?;
    shaped(maps, upbox)?;
    let mut floor = f64::MAX;
    let mut ceil = f64::MIN;
    for (lrow, urow) in lobox.iter().zip(upbox.iter()) {
        for (lo, up) in lrow.iter().zip(urow.iter()) {
            if !lo.is_finite() || !up.is_finite() || lo > up {
                return Err(DtlError::BadBounds);
            }
            floor = floor.min(*lo);
            ceil = ceil.max(*up);
        }
    }
    let scale = inflate(floor, ceil, rev)?;
    let mut los = vec![0.; maps.n_real()];
    let mut ups = vec![0.; maps.n_real()];
    for (a, (lrow, urow)) in lobox.iter().zip(upbox.iter()).enumerate() {
        for (r, (lo, up)) in lrow.iter().zip(urow.iter()).enumerate() {
            let k = maps.real_of(a + 1, r + 1);
            let x = scale.to_norm(*lo)?;
            let y = scale.to_norm(*up)?;
            los[k] = x.min(y).clamp(0., 1.);
            ups[k] = x.max(y).clamp(0., 1.);
        }
    }
    Ok((scale, *df.scale(), los, ups))
}

/// the actual extremes as a scale, inflated when they collapse
fn inflate(floor: f64, ceil: f64, rev: bool) -> Dtl<Scale> {
    let (floor, ceil) = match ceil - floor >= DTL_EPS {
        true => (floor, ceil),
        false if floor.abs() > DTL_EPS => (floor.min(2. * floor), floor.max(2. * floor)),
        false => (floor - DIRAC_MARGIN, ceil + DIRAC_MARGIN),
    };
    match rev {
        true => Scale::new(ceil, floor),
        false => Scale::new(floor, ceil),
    }
}

fn shaped(maps: &crate::frame::maps::IndexMaps, rows: &[Vec<f64>]) -> Dtl<()> {
    if rows.len() != maps.n_alts() {
        return Err(DtlError::BadAlternative);
    }
    for (a, row) in rows.iter().enumerate() {
        if row.len() != maps.reals(a + 1) {
            return Err(DtlError::BadNode);
        }
    }
    Ok(())
}

/// rescale the criterion's sibling group on the weight tree by the
/// span ratio, renormalising the siblings and clamping to [0, 1]
fn renorm_weights(frame: &mut Frame, crit: usize, ratio: f64) -> Dtl<()> {
    let wdf = frame.weights_mut()?;
    let maps = wdf.maps().clone();
    let node = maps.r2t(1, crit);
    let group = wdf.alt(1)?.group(node);
    let hull = &wdf.base(Basis::P).hull;
    let own = maps.flat(1, node);
    let before = hull.mid(own);
    let after = (before * ratio).clamp(0., 1.);
    let rest = 1. - before;
    let others = group.len().saturating_sub(1).max(1) as f64;
    let mut los = vec![MidBox::SKIP; maps.n_flat()];
    for member in group {
        let k = maps.flat(1, member);
        let target = match k == own {
            true => after,
            false if rest > DTL_EPS => hull.mid(k) * (1. - after) / rest,
            false => (1. - after) / others,
        };
        los[k] = target.clamp(0., 1.);
    }
    let ups = los.clone();
    wdf.set_mbox(Basis::P, &los, &ups)
}
