use crate::base::base::Basis;
use crate::base::statement::Statement;
use crate::base::statement::Term;
use crate::frame::frame::DecisionFrame;
use crate::frame::kind::FrameKind;
use crate::frame::manager::Frame;
use crate::frame::node::NodeKind;
use crate::frame::node::TreeRecord;
use crate::frame::topology::Topology;
use crate::scale::scale::Scale;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use byteorder::BE;
use std::io::Read;
use std::io::Write;
use std::path::Path;

const VERSION: u8 = 1;
/// signature at the head of every snapshot
const MAGIC: &str = const_format::formatcp!("dmc.frame.{}", VERSION);
/// trailer signalling a complete file
const FOOTER: u16 = 0xFFFF;

/// whole-frame binary snapshots.
///
/// the layout walks the frame top down: header, counts, the criterion
/// bitmap, then per decision frame the topology links, both statement
/// lists, both boxes, both midpoint boxes and the criterion scale.
/// loading rebuilds the frame through the ordinary mutation paths, so
/// a statement that no longer fits the topology is skipped and
/// counted rather than trusted.

pub fn save(frame: &Frame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("create snapshot {}", path.display()))?;
    write_frame(&mut file, frame)?;
    file.write_u16::<BE>(FOOTER)?;
    log::info!("snapshot saved ({})", path.display());
    Ok(())
}

/// load a snapshot; the second value counts skipped statements
pub fn load(path: &Path) -> Result<(Frame, usize)> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("open snapshot {}", path.display()))?;
    let (frame, skipped) = read_frame(&mut file)?;
    if file.read_u16::<BE>()? != FOOTER {
        bail!("snapshot truncated");
    }
    log::info!(
        "snapshot loaded ({}, {} links skipped)",
        path.display(),
        skipped
    );
    Ok((frame, skipped))
}

fn write_frame<W: Write>(w: &mut W, frame: &Frame) -> Result<()> {
    write_str(w, MAGIC)?;
    write_str(w, frame.name())?;
    w.write_u8(char::from(frame.kind()) as u8)?;
    w.write_u16::<BE>(frame.n_alts() as u16)?;
    w.write_u16::<BE>(frame.n_crit() as u16)?;
    let mut bitmap = 0u64;
    for crit in 0..=frame.n_crit() {
        if frame.df(crit).is_ok() {
            bitmap |= 1 << crit;
        }
    }
    w.write_u64::<BE>(bitmap)?;
    for crit in 0..=frame.n_crit() {
        if let Ok(df) = frame.df(crit) {
            write_df(w, df)?;
        }
    }
    let scale = frame.mc_scale();
    w.write_f64::<BE>(scale.min())?;
    w.write_f64::<BE>(scale.max())?;
    Ok(())
}

fn read_frame<R: Read>(r: &mut R) -> Result<(Frame, usize)> {
    if read_str(r)? != MAGIC {
        bail!("not a dmc snapshot");
    }
    let name = read_str(r)?;
    let kind = FrameKind::try_from(r.read_u8()? as char)
        .map_err(|_| anyhow::anyhow!("unknown frame type"))?;
    let n_alts = r.read_u16::<BE>()? as usize;
    let n_crit = r.read_u16::<BE>()? as usize;
    let bitmap = r.read_u64::<BE>()?;
    let mut skipped = 0;
    let mut frame = match kind.multicriteria() {
        false => {
            if bitmap & 0b10 == 0 {
                bail!("single-criterion snapshot without criterion 1");
            }
            let (df, n) = read_df(r)?;
            skipped += n;
            Frame::single(kind, &name, df)?
        }
        true => {
            if bitmap & 0b1 == 0 {
                bail!("multi-criterion snapshot without a weight frame");
            }
            let (wdf, n) = read_df(r)?;
            skipped += n;
            let weight = wdf.alts()[0].clone();
            let mut frame = Frame::pm_tree(&name, n_alts, weight)?;
            *frame.weights_mut()? = wdf;
            for crit in 1..=n_crit {
                if bitmap & (1 << crit) != 0 {
                    let (df, n) = read_df(r)?;
                    skipped += n;
                    frame.set_crit(crit, df)?;
                }
            }
            frame
        }
    };
    *frame.mc_scale_mut() = Scale::new(r.read_f64::<BE>()?, r.read_f64::<BE>()?)?;
    Ok((frame, skipped))
}

fn write_df<W: Write>(w: &mut W, df: &DecisionFrame) -> Result<()> {
    write_str(w, df.name())?;
    w.write_u16::<BE>(df.n_alts() as u16)?;
    let multilevel = df.alts().iter().any(|top| top.inters() > 0);
    w.write_u8(multilevel as u8)?;
    for top in df.alts() {
        w.write_u16::<BE>(top.tot() as u16)?;
        if multilevel {
            let (next, down) = top.links();
            for link in next.iter().chain(down.iter()) {
                w.write_u16::<BE>(*link as u16)?;
            }
            for kind in top.kinds() {
                w.write_u8(char::from(kind) as u8)?;
            }
        }
    }
    write_stmts(w, df.base(Basis::P).stmts())?;
    write_stmts(w, df.base(Basis::V).stmts())?;
    write_box(w, df.base(Basis::P).ibox().los(), df.base(Basis::P).ibox().ups())?;
    write_box(w, df.base(Basis::V).ibox().los(), df.base(Basis::V).ibox().ups())?;
    write_box(w, df.base(Basis::P).mbox().los(), df.base(Basis::P).mbox().ups())?;
    write_box(w, df.base(Basis::V).mbox().los(), df.base(Basis::V).mbox().ups())?;
    w.write_f64::<BE>(df.scale().min())?;
    w.write_f64::<BE>(df.scale().max())?;
    Ok(())
}

fn read_df<R: Read>(r: &mut R) -> Result<(DecisionFrame, usize)> {
    let name = read_str(r)?;
    let n_alts = r.read_u16::<BE>()? as usize;
    let multilevel = r.read_u8()? != 0;
    let mut tops = vec![];
    for _ in 0..n_alts {
        let tot = r.read_u16::<BE>()? as usize;
        match multilevel {
            false => tops.push(Topology::flat(tot)?),
            true => {
                let mut next = vec![0usize; tot];
                let mut down = vec![0usize; tot];
                for link in next.iter_mut().chain(down.iter_mut()) {
                    *link = r.read_u16::<BE>()? as usize;
                }
                let mut records = vec![];
                for k in 0..tot {
                    let kind = NodeKind::try_from(r.read_u8()? as char)
                        .map_err(|_| anyhow::anyhow!("unknown node type"))?;
                    records.push(TreeRecord {
                        kind,
                        next: next[k],
                        down: down[k],
                    });
                }
                tops.push(Topology::tree(&records)?);
            }
        }
    }
    let mut df = DecisionFrame::tree(&name, tops)?;
    let p_stmts = read_stmts(r)?;
    let v_stmts = read_stmts(r)?;
    let mut skipped = 0;
    for (basis, stmts) in [(Basis::P, p_stmts), (Basis::V, v_stmts)] {
        for stmt in stmts {
            if df.add_stmt(basis, stmt).is_err() {
                skipped += 1;
            }
        }
    }
    let (plo, pup) = read_box(r)?;
    let (vlo, vup) = read_box(r)?;
    if df.set_box(Basis::P, &plo, &pup).is_err() {
        skipped += 1;
    }
    if df.set_box(Basis::V, &vlo, &vup).is_err() {
        skipped += 1;
    }
    let (pmlo, pmup) = read_box(r)?;
    let (vmlo, vmup) = read_box(r)?;
    if df.set_mbox(Basis::P, &pmlo, &pmup).is_err() {
        skipped += 1;
    }
    if df.set_mbox(Basis::V, &vmlo, &vmup).is_err() {
        skipped += 1;
    }
    *df.scale_mut() = Scale::new(r.read_f64::<BE>()?, r.read_f64::<BE>()?)?;
    Ok((df, skipped))
}

fn write_stmts<W: Write>(w: &mut W, stmts: &[Statement]) -> Result<()> {
    w.write_u16::<BE>(stmts.len() as u16)?;
    for stmt in stmts {
        w.write_u8(stmt.terms.len() as u8)?;
        for term in stmt.terms.iter() {
            w.write_u16::<BE>(term.alt as u16)?;
            w.write_u16::<BE>(term.node as u16)?;
            w.write_i8(term.sign as i8)?;
        }
        w.write_f64::<BE>(stmt.lobo)?;
        w.write_f64::<BE>(stmt.upbo)?;
    }
    Ok(())
}

fn read_stmts<R: Read>(r: &mut R) -> Result<Vec<Statement>> {
    let count = r.read_u16::<BE>()? as usize;
    let mut stmts = vec![];
    for _ in 0..count {
        let n_terms = r.read_u8()? as usize;
        if !(1..=2).contains(&n_terms) {
            bail!("statement with {} terms", n_terms);
        }
        let mut terms = vec![];
        for _ in 0..n_terms {
            terms.push(Term {
                alt: r.read_u16::<BE>()? as usize,
                node: r.read_u16::<BE>()? as usize,
                sign: r.read_i8()? as f64,
            });
        }
        stmts.push(Statement {
            terms,
            lobo: r.read_f64::<BE>()?,
            upbo: r.read_f64::<BE>()?,
        });
    }
    Ok(stmts)
}

fn write_box<W: Write>(w: &mut W, los: &[f64], ups: &[f64]) -> Result<()> {
    w.write_u16::<BE>(los.len() as u16)?;
    for v in los.iter().chain(ups.iter()) {
        w.write_f64::<BE>(*v)?;
    }
    Ok(())
}

fn read_box<R: Read>(r: &mut R) -> Result<(Vec<f64>, Vec<f64>)> {
    let n = r.read_u16::<BE>()? as usize;
    let mut los = vec![0.; n];
    let mut ups = vec![0.; n];
    for v in los.iter_mut().chain(ups.iter_mut()) {
        *v = r.read_f64::<BE>()?;
    }
    Ok((los, ups))
}

fn write_str<W: Write>(w: &mut W, s: &str) -> Result<()> {
    w.write_u16::<BE>(s.len() as u16)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn read_str<R: Read>(r: &mut R) -> Result<String> {
    let len = r.read_u16::<BE>()? as usize;
    if len > 0xFFF {
        bail!("string field too long");
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Frame {
        let mut df = DecisionFrame::flat("snap", &[2, 2]).unwrap();
        df.attach(FrameKind::PS).unwrap();
        df.add_stmt(Basis::P, Statement::interval(1, 1, 0.4, 0.6))
            .unwrap();
        df.add_stmt(Basis::V, Statement::interval(1, 1, 0.6, 0.9))
            .unwrap();
        df.add_mid_stmt(Basis::V, 1, 1, 0.7, 0.7).unwrap();
        Frame::single(FrameKind::PS, "snap", df).unwrap()
    }

    #[test]
    fn is_snapshot_a_round_trip() {
        let dir = std::env::temp_dir().join("dmc_round_trip.dmc");
        let frame = fixture();
        save(&frame, &dir).unwrap();
        let (back, skipped) = load(&dir).unwrap();
        assert!(skipped == 0);
        assert!(back.name() == frame.name());
        assert!(back.kind() == frame.kind());
        let old = frame.df(1).unwrap();
        let new = back.df(1).unwrap();
        assert!(new.base(Basis::P).stmts() == old.base(Basis::P).stmts());
        assert!(new.base(Basis::V).stmts() == old.base(Basis::V).stmts());
        assert!(new.base(Basis::V).mbox() == old.base(Basis::V).mbox());
        std::fs::remove_file(&dir).ok();
    }
    #[test]
    fn is_multicriteria_snapshot_complete() {
        let dir = std::env::temp_dir().join("dmc_pm.dmc");
        let mut frame = Frame::pm_flat("pm", 2, 2, &[1, 1]).unwrap();
        frame.attach().unwrap();
        frame
            .weights_mut()
            .unwrap()
            .add_stmt(Basis::P, Statement::interval(1, 1, 0.2, 0.7))
            .unwrap();
        save(&frame, &dir).unwrap();
        let (back, skipped) = load(&dir).unwrap();
        assert!(skipped == 0);
        assert!(back.n_crit() == 2);
        assert!(back.weights().unwrap().base(Basis::P).stmts().len() == 1);
        std::fs::remove_file(&dir).ok();
    }
    #[test]
    fn is_garbage_rejected() {
        let dir = std::env::temp_dir().join("dmc_garbage.dmc");
        std::fs::write(&dir, b"not a snapshot at all").unwrap();
        assert!(load(&dir).is_err());
        std::fs::remove_file(&dir).ok();
    }
}
