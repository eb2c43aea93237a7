use crate::api::Dtl;
use crate::api::DtlError;
use crate::base::base::Basis;
use crate::frame::manager::Frame;

/// per-consequence influence: the probability mass a consequence can
/// expect times the value span it can swing over. a consequence deep
/// under unlikely branches with a narrow value hull moves nothing; a
/// likely one with a wide hull is where elicitation effort pays.
pub fn cons_influence(frame: &Frame, crit: i32) -> Dtl<Vec<Vec<f64>>> {
    if crit < 1 {
        return Err(DtlError::BadCriterion);
    }
    let df = frame.df(crit as usize)?;
    let maps = df.maps();
    let phull = &df.base(Basis::P).hull;
    let vhull = &df.base(Basis::V).hull;
    let mut out = vec![];
    for alt in 1..=df.n_alts() {
        let top = df.alt(alt)?;
        let mut row = vec![];
        for r in 1..=maps.reals(alt) {
            let mut node = maps.r2t(alt, r);
            let mut reach = 1.;
            while node != 0 {
                reach *= phull.mid(maps.flat(alt, node));
                node = top.parent(node);
            }
            let span = vhull.width(maps.real_of(alt, r));
            row.push(reach * span);
        }
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::statement::Statement;
    use crate::frame::frame::DecisionFrame;
    use crate::frame::kind::FrameKind;

    #[test]
    fn is_influence_reach_times_span() {
        let mut df = DecisionFrame::flat("flat", &[2]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        df.add_stmt(Basis::P, Statement::interval(1, 1, 0.8, 0.8))
            .unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 1, 0.2, 0.6))
            .unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 2, 0.5, 0.6))
            .unwrap();
        let frame = Frame::single(FrameKind::PS, "flat", df).unwrap();
        let influence = cons_influence(&frame, 1).unwrap();
        assert!((influence[0][0] - 0.8 * 0.4).abs() < 1e-9);
        assert!((influence[0][1] - 0.2 * 0.1).abs() < 1e-9);
    }
    #[test]
    fn is_certain_value_influence_free() {
        let mut df = DecisionFrame::flat("flat", &[1]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 1, 0.4, 0.4))
            .unwrap();
        let frame = Frame::single(FrameKind::PS, "flat", df).unwrap();
        let influence = cons_influence(&frame, 1).unwrap();
        assert!(influence[0][0].abs() < 1e-9);
    }
}
