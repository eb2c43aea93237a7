use crate::api::Dtl;
use crate::api::DtlError;
use crate::eval::cache::Cache;
use crate::frame::frame::DecisionFrame;
use crate::frame::kind::FrameKind;
use crate::frame::topology::Topology;
use crate::scale::scale::Scale;
use crate::MAX_CRIT;
use crate::MAX_FRAMES;

/// a user-level frame: the criterion frames, the weight tree on a
/// multi-criterion frame, the evaluation cache and the MC scale.
/// slot 0 of `dfs` is the weight frame; criteria live at 1..=n_crit.
#[derive(Debug, Clone)]
pub struct Frame {
    name: String,
    kind: FrameKind,
    dfs: Vec<Option<DecisionFrame>>,
    n_alts: usize,
    cache: Cache,
    mc_scale: Scale,
    marker: Option<i32>,
}

impl Frame {
    /// single-criterion frame, flat or tree
    pub fn single(kind: FrameKind, name: &str, df: DecisionFrame) -> Dtl<Self> {
        if kind.multicriteria() {
            return Err(DtlError::WrongFrameType);
        }
        let n_alts = df.n_alts();
        Ok(Self {
            name: name.to_string(),
            kind,
            dfs: vec![None, Some(df)],
            n_alts,
            cache: Cache::default(),
            mc_scale: Scale::unit(),
            marker: None,
        })
    }

    /// multi-criterion frame with every criterion flat
    pub fn pm_flat(name: &str, n_alts: usize, n_crit: usize, cons: &[usize]) -> Dtl<Self> {
        if n_crit == 0 || n_crit > MAX_CRIT {
            return Err(DtlError::Overflow);
        }
        if cons.len() != n_alts {
            return Err(DtlError::BadAlternative);
        }
        let weight = DecisionFrame::flat(&format!("{}.weights", name), &[n_crit])?;
        let mut dfs = vec![Some(weight)];
        for c in 1..=n_crit {
            dfs.push(Some(DecisionFrame::flat(&format!("{}.{}", name, c), cons)?));
        }
        Ok(Self {
            name: name.to_string(),
            kind: FrameKind::PM,
            dfs,
            n_alts,
            cache: Cache::default(),
            mc_scale: Scale::unit(),
            marker: None,
        })
    }

    /// multi-criterion frame over an explicit weight tree; criteria
    /// arrive afterwards through the criterion constructors
    pub fn pm_tree(name: &str, n_alts: usize, weight: Topology) -> Dtl<Self> {
        let n_crit = weight.reals();
        if n_crit == 0 || n_crit > MAX_CRIT {
            return Err(DtlError::Overflow);
        }
        let weight = DecisionFrame::tree(&format!("{}.weights", name), vec![weight])?;
        let mut dfs = vec![Some(weight)];
        dfs.resize(n_crit + 1, None);
        Ok(Self {
            name: name.to_string(),
            kind: FrameKind::PM,
            dfs,
            n_alts,
            cache: Cache::default(),
            mc_scale: Scale::unit(),
            marker: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> FrameKind {
        self.kind
    }
    pub fn n_alts(&self) -> usize {
        self.n_alts
    }
    pub fn n_crit(&self) -> usize {
        self.dfs.len() - 1
    }

    /// the criterion frame, 1-based
    pub fn df(&self, crit: usize) -> Dtl<&DecisionFrame> {
        self.dfs
            .get(crit)
            .and_then(|slot| slot.as_ref())
            .ok_or(DtlError::BadCriterion)
    }
    pub fn df_mut(&mut self, crit: usize) -> Dtl<&mut DecisionFrame> {
        self.dfs
            .get_mut(crit)
            .and_then(|slot| slot.as_mut())
            .ok_or(DtlError::BadCriterion)
    }
    /// the weight frame of a multi-criterion frame
    pub fn weights(&self) -> Dtl<&DecisionFrame> {
        match self.kind.multicriteria() {
            true => self.df(0),
            false => Err(DtlError::WrongFrameType),
        }
    }
    pub fn weights_mut(&mut self) -> Dtl<&mut DecisionFrame> {
        match self.kind.multicriteria() {
            true => self.df_mut(0),
            false => Err(DtlError::WrongFrameType),
        }
    }
    pub fn crit_exists(&self, crit: usize) -> bool {
        crit >= 1 && crit <= self.n_crit() && self.dfs[crit].is_some()
    }

    /// install a criterion frame on a multi-criterion frame
    pub fn set_crit(&mut self, crit: usize, df: DecisionFrame) -> Dtl<()> {
        if !self.kind.multicriteria() {
            return Err(DtlError::WrongFrameType);
        }
        if crit < 1 || crit > self.n_crit() {
            return Err(DtlError::BadCriterion);
        }
        if self.dfs[crit].is_some() {
            return Err(DtlError::FrameInUse);
        }
        if df.n_alts() != self.n_alts {
            return Err(DtlError::BadAlternative);
        }
        self.dfs[crit] = Some(df);
        Ok(())
    }
    pub fn delete_crit(&mut self, crit: usize) -> Dtl<()> {
        if !self.kind.multicriteria() {
            return Err(DtlError::WrongFrameType);
        }
        if !self.crit_exists(crit) {
            return Err(DtlError::BadCriterion);
        }
        self.dfs[crit] = None;
        self.cache.invalidate();
        Ok(())
    }

    /// attach every present frame; called when the frame is loaded
    pub fn attach(&mut self) -> Dtl<()> {
        let kind = self.kind;
        for df in self.dfs.iter_mut().flatten() {
            df.attach(kind)?;
        }
        self.marker = Some(1);
        Ok(())
    }
    pub fn detach(&mut self) {
        for df in self.dfs.iter_mut().flatten() {
            df.detach();
        }
        self.marker = None;
    }

    /// move the attached-criterion marker, as the multi-criterion
    /// operations do around criterion-local work
    pub fn mark(&mut self, crit: i32) {
        self.marker = Some(crit);
    }
    pub fn marker(&self) -> Option<i32> {
        self.marker
    }

    /// frame-wide base generation, the cache stamp
    pub fn generation(&self) -> u64 {
        self.dfs.iter().flatten().map(|df| df.generation()).sum()
    }
    /// the cache, reconciled with the current generation
    pub fn cache(&mut self) -> &mut Cache {
        let generation = self.generation();
        self.cache.sync(generation);
        &mut self.cache
    }

    pub fn mc_scale(&self) -> &Scale {
        &self.mc_scale
    }
    pub fn mc_scale_mut(&mut self) -> &mut Scale {
        &mut self.mc_scale
    }
    pub fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

/// the frame registry and the single current-frame slot. at most one
/// frame is loaded at a time; loading attaches, unloading detaches.
#[derive(Debug, Default)]
pub struct Manager {
    slots: Vec<Option<Frame>>,
    loaded: Option<usize>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            slots: (0..MAX_FRAMES).map(|_| None).collect(),
            loaded: None,
        }
    }

    /// park a new frame in the first free slot, 1-based index
    pub fn create(&mut self, frame: Frame) -> Dtl<usize> {
        let free = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(DtlError::Overflow)?;
        self.slots[free] = Some(frame);
        Ok(free + 1)
    }

    pub fn dispose(&mut self, fx: usize) -> Dtl<()> {
        if self.loaded == Some(fx) {
            return Err(DtlError::FrameInUse);
        }
        match self.slot(fx)?.is_some() {
            true => {
                self.slots[fx - 1] = None;
                Ok(())
            }
            false => Err(DtlError::FrameUnknown),
        }
    }

    pub fn load(&mut self, fx: usize) -> Dtl<()> {
        if self.loaded.is_some() {
            return Err(DtlError::FrameInUse);
        }
        let idx = self.index(fx)?;
        let frame = self.slots[idx]
            .as_mut()
            .ok_or(DtlError::FrameUnknown)?;
        frame.attach()?;
        self.loaded = Some(fx);
        Ok(())
    }
    pub fn unload(&mut self) -> Dtl<()> {
        let fx = self.loaded.ok_or(DtlError::FrameNotLoaded)?;
        if let Some(frame) = self.slots[fx - 1].as_mut() {
            frame.detach();
        }
        self.loaded = None;
        Ok(())
    }

    pub fn loaded(&self) -> Option<usize> {
        self.loaded
    }
    pub fn current(&mut self) -> Dtl<&mut Frame> {
        let fx = self.loaded.ok_or(DtlError::FrameNotLoaded)?;
        self.slots[fx - 1].as_mut().ok_or(DtlError::FrameCorrupt)
    }
    pub fn current_ref(&self) -> Dtl<&Frame> {
        let fx = self.loaded.ok_or(DtlError::FrameNotLoaded)?;
        self.slots[fx - 1].as_ref().ok_or(DtlError::FrameCorrupt)
    }
    pub fn get(&self, fx: usize) -> Dtl<&Frame> {
        self.slot(fx)?.as_ref().ok_or(DtlError::FrameUnknown)
    }
    pub fn count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    fn index(&self, fx: usize) -> Dtl<usize> {
        match fx >= 1 && fx <= self.slots.len() {
            true => Ok(fx - 1),
            false => Err(DtlError::FrameUnknown),
        }
    }
    fn slot(&self, fx: usize) -> Dtl<&Option<Frame>> {
        self.index(fx).map(|i| &self.slots[i])
    }
}

impl crate::Arbitrary for Frame {
    fn random() -> Self {
        Frame::single(FrameKind::PS, "random", DecisionFrame::random())
            .expect("single-criterion frames assemble")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps() -> Frame {
        let df = DecisionFrame::flat("two by two", &[2, 2]).unwrap();
        Frame::single(FrameKind::PS, "two by two", df).unwrap()
    }

    #[test]
    fn is_load_exclusive() {
        let mut manager = Manager::new();
        let one = manager.create(ps()).unwrap();
        let two = manager.create(ps()).unwrap();
        manager.load(one).unwrap();
        assert!(manager.load(two) == Err(DtlError::FrameInUse));
        manager.unload().unwrap();
        assert!(manager.load(two).is_ok());
    }
    #[test]
    fn is_loaded_frame_undisposable() {
        let mut manager = Manager::new();
        let fx = manager.create(ps()).unwrap();
        manager.load(fx).unwrap();
        assert!(manager.dispose(fx) == Err(DtlError::FrameInUse));
        manager.unload().unwrap();
        assert!(manager.dispose(fx).is_ok());
        assert!(manager.count() == 0);
    }
    #[test]
    fn is_pm_criterion_slot_guarded() {
        let mut frame = Frame::pm_flat("pm", 2, 2, &[2, 2]).unwrap();
        assert!(frame.crit_exists(1));
        assert!(frame.crit_exists(2));
        assert!(!frame.crit_exists(3));
        let again = DecisionFrame::flat("again", &[2, 2]).unwrap();
        assert!(frame.set_crit(1, again) == Err(DtlError::FrameInUse));
        frame.delete_crit(1).unwrap();
        assert!(!frame.crit_exists(1));
    }
    #[test]
    fn is_weight_frame_pm_only() {
        let frame = ps();
        assert!(frame.weights().is_err());
        let pm = Frame::pm_flat("pm", 2, 3, &[1, 1]).unwrap();
        assert!(pm.weights().unwrap().maps().n_real() == 3);
    }
}
