use crate::api::gate::Abort;
use crate::api::Dtl;
use crate::dominance::dominance;
use crate::eval::evaluator;
use crate::eval::rank;
use crate::frame::manager::Frame;
use crate::moment::rule::Rule;
use serde::Deserialize;
use serde::Serialize;

/// an evaluation bracket as handed to hosts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub lo: f64,
    pub mid: f64,
    pub up: f64,
}

/// one alternative's standing under a criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub alt: usize,
    pub lo: f64,
    pub mid: f64,
    pub up: f64,
    pub mean: f64,
    pub variance: f64,
    pub rank: usize,
}

/// the full frame report the inspect binary serialises
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub frame: String,
    pub kind: String,
    pub criterion: i32,
    pub standings: Vec<Standing>,
    pub dominance: Vec<Vec<i32>>,
}

/// assemble the report for one criterion of a loaded frame
pub fn assemble(frame: &Frame, crit: i32) -> Dtl<Report> {
    let (ranks, _) = rank::rank_alternatives(frame, crit, 0)?;
    let mut standings = vec![];
    for alt in 1..=frame.n_alts() {
        let entry = evaluator::evaluate(frame, crit, Rule::Psi, alt, 0)?;
        standings.push(Standing {
            alt,
            lo: entry.lo,
            mid: entry.mid,
            up: entry.up,
            mean: entry.bn.moments().m1,
            variance: entry.bn.moments().m2,
            rank: ranks[alt - 1],
        });
    }
    let dominance = dominance::dominance_matrix(frame, crit, 2, 0., &Abort::default())?;
    Ok(Report {
        frame: frame.name().to_string(),
        kind: frame.kind().to_string(),
        criterion: crit,
        standings,
        dominance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::base::Basis;
    use crate::base::statement::Statement;
    use crate::frame::frame::DecisionFrame;
    use crate::frame::kind::FrameKind;

    #[test]
    fn is_report_serialisable() {
        let mut df = DecisionFrame::flat("report", &[1, 1]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 1, 0.6, 0.9))
            .unwrap();
        df.add_stmt(Basis::V, Statement::interval(2, 1, 0.1, 0.4))
            .unwrap();
        let frame = Frame::single(FrameKind::PS, "report", df).unwrap();
        let report = assemble(&frame, 1).unwrap();
        assert!(report.standings.len() == 2);
        assert!(report.standings[0].rank == 1);
        let json = serde_json::to_string(&report).expect("serialise report");
        assert!(json.contains("\"dominance\""));
        let back: Report = serde_json::from_str(&json).expect("deserialise report");
        assert!(back.standings.len() == 2);
    }
}
