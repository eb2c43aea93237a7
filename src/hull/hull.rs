use crate::api::code::Kernel;
use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Base;
use crate::base::statement::Term;
use crate::hull::system::System;
use crate::DTL_EPS;
use crate::HULL_EPS;

/// the orthogonal hull of a constraint base: per-variable minima and
/// maxima over the feasible polytope, plus the consolidated means used
/// by evaluation. the means respect user midpoints where given and sum
/// to one across every sibling group of a simplex basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Hull {
    lo: Vec<f64>,
    up: Vec<f64>,
    mid: Vec<f64>,
    solved: bool,
}

impl Hull {
    pub fn vacant(n: usize) -> Self {
        Self {
            lo: vec![0.; n],
            up: vec![1.; n],
            mid: vec![0.; n],
            solved: false,
        }
    }
    pub fn solved(&self) -> bool {
        self.solved
    }
    pub fn len(&self) -> usize {
        self.lo.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lo.is_empty()
    }
    pub fn lo(&self, k: usize) -> f64 {
        self.lo[k]
    }
    pub fn up(&self, k: usize) -> f64 {
        self.up[k]
    }
    pub fn mid(&self, k: usize) -> f64 {
        self.mid[k]
    }
    pub fn width(&self, k: usize) -> f64 {
        self.up[k] - self.lo[k]
    }
    /// a point hull collapses distribution fits to a Dirac
    pub fn dirac(&self, k: usize) -> bool {
        self.width(k) < HULL_EPS
    }
    pub fn triple(&self, k: usize) -> (f64, f64, f64) {
        (self.lo[k], self.mid[k], self.up[k])
    }
    pub fn los(&self) -> &[f64] {
        &self.lo
    }
    pub fn ups(&self) -> &[f64] {
        &self.up
    }
    pub fn mids(&self) -> &[f64] {
        &self.mid
    }
}

/// the loader: consolidate every constraint of a base into its hull.
///
/// single-term statements fold into the variable bounds; sibling
/// groups propagate their sum-to-one slack in closed form, which is
/// exact while no two-term statement couples variables; when one does,
/// the bounded LP takes over per variable. midpoints never shrink the
/// hull: they are containment-checked and then consolidated into the
/// per-variable means. on any failure the base is left untouched
/// except for the hull, which the caller restores by rerunning after
/// an undo.
pub fn consolidate(
    base: &mut Base,
    groups: &[Vec<usize>],
    resolve: &dyn Fn(&Term) -> usize,
) -> Dtl<()> {
    let n = base.n();
    let (mut lo, mut up) = folded(base, resolve)?;
    propagate(groups, &mut lo, &mut up)?;
    let pairs = pairs(base, resolve);
    if !pairs.is_empty() {
        sharpen(&mut lo, &mut up, groups, &pairs)?;
    }
    let mid = means(base, groups, &lo, &up)?;
    if lo.len() != n || mid.len() != n {
        // recoverable assertion 1: the loader must cover every
        // variable of the base exactly once
        return Err(DtlError::AssertFailed(1));
    }
    base.hull = Hull {
        lo,
        up,
        mid,
        solved: true,
    };
    Ok(())
}

/// unit domain ∩ interval box ∩ single-term statements
fn folded(base: &Base, resolve: &dyn Fn(&Term) -> usize) -> Dtl<(Vec<f64>, Vec<f64>)> {
    let mut lo = base.ibox().los().to_vec();
    let mut up = base.ibox().ups().to_vec();
    for stmt in base.stmts().iter().filter(|s| s.terms.len() == 1) {
        let k = resolve(&stmt.terms[0]);
        lo[k] = lo[k].max(stmt.lobo);
        up[k] = up[k].min(stmt.upbo);
    }
    for k in 0..lo.len() {
        if lo[k] > up[k] + HULL_EPS {
            return Err(DtlError::Inconsistent);
        }
        up[k] = up[k].max(lo[k]);
    }
    Ok((lo, up))
}

/// closed-form sum-to-one slack propagation per sibling group
fn propagate(groups: &[Vec<usize>], lo: &mut [f64], up: &mut [f64]) -> Dtl<()> {
    for group in groups {
        let sl = group.iter().map(|k| lo[*k]).sum::<f64>();
        let su = group.iter().map(|k| up[*k]).sum::<f64>();
        if sl > 1. + HULL_EPS || su < 1. - HULL_EPS {
            return Err(DtlError::Inconsistent);
        }
        for k in group {
            lo[*k] = lo[*k].max(1. - (su - up[*k]));
            up[*k] = up[*k].min(1. - (sl - lo[*k]));
            up[*k] = up[*k].max(lo[*k]);
        }
    }
    Ok(())
}

/// resolved two-term statements as (plus, minus, lobo, upbo)
fn pairs(base: &Base, resolve: &dyn Fn(&Term) -> usize) -> Vec<(usize, usize, f64, f64)> {
    base.stmts()
        .iter()
        .filter(|s| s.terms.len() == 2)
        .map(|s| {
            let (plus, minus) = match s.terms[0].sign > 0. {
                true => (&s.terms[0], &s.terms[1]),
                false => (&s.terms[1], &s.terms[0]),
            };
            (resolve(plus), resolve(minus), s.lobo, s.upbo)
        })
        .collect()
}

/// per-variable min and max by LP once difference statements couple
/// the variables. infeasibility here is user inconsistency; numeric
/// breakdown surfaces as a kernel failure.
fn sharpen(
    lo: &mut [f64],
    up: &mut [f64],
    groups: &[Vec<usize>],
    pairs: &[(usize, usize, f64, f64)],
) -> Dtl<()> {
    let system = System::assemble(lo, up, groups, pairs);
    let mut lp = system.simplex();
    match lp.feasible() {
        Ok(()) => {}
        Err(DtlError::Kernel(Kernel::Infeasible)) => return Err(DtlError::Inconsistent),
        Err(e) => return Err(e),
    }
    for k in 0..system.n() {
        let c = system.objective(k);
        let min = lp.minimize(&c)?;
        let max = lp.maximize(&c)?;
        lo[k] = min.max(lo[k]).min(up[k]);
        up[k] = max.min(up[k]).max(lo[k]);
    }
    Ok(())
}

/// consolidated means: user midpoints are containment-checked against
/// the hull, defaults sit at the hull center, and every simplex group
/// is projected onto its sum-to-one plane within the admissible mean
/// ranges
fn means(base: &Base, groups: &[Vec<usize>], lo: &[f64], up: &[f64]) -> Dtl<Vec<f64>> {
    let n = base.n();
    let mut mlo = vec![0.; n];
    let mut mup = vec![0.; n];
    for k in 0..n {
        match base.mbox().is_set(k) {
            true => {
                let mid = base.mbox().mid(k).expect("slot is set");
                if mid < lo[k] - DTL_EPS || mid > up[k] + DTL_EPS {
                    return Err(DtlError::Inconsistent);
                }
                mlo[k] = base.mbox().lo(k).max(lo[k]);
                mup[k] = base.mbox().up(k).min(up[k]);
                if mlo[k] > mup[k] + DTL_EPS {
                    return Err(DtlError::Inconsistent);
                }
                mup[k] = mup[k].max(mlo[k]);
            }
            false => {
                mlo[k] = lo[k];
                mup[k] = up[k];
            }
        }
    }
    let mut mid = (0..n).map(|k| (mlo[k] + mup[k]) / 2.).collect::<Vec<_>>();
    for group in groups {
        let sum = group.iter().map(|k| mid[*k]).sum::<f64>();
        let need = 1. - sum;
        if need.abs() <= HULL_EPS {
            continue;
        }
        let room = group
            .iter()
            .map(|k| match need > 0. {
                true => mup[*k] - mid[*k],
                false => mid[*k] - mlo[*k],
            })
            .sum::<f64>();
        if room < need.abs() - DTL_EPS {
            return Err(DtlError::Inconsistent);
        }
        for k in group {
            let slack = match need > 0. {
                true => mup[*k] - mid[*k],
                false => mid[*k] - mlo[*k],
            };
            mid[*k] += need * slack / room.max(HULL_EPS);
        }
    }
    Ok(mid)
}
