use super::code::Dtl;
use super::code::DtlError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// cloneable cancellation handle. a host thread raises the flag; the
/// long loops in evaluation, dominance and tornado sweeps poll it
/// between iterations and unwind without partial results.
#[derive(Debug, Clone, Default)]
pub struct Abort(Arc<AtomicBool>);

impl Abort {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
    pub fn raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
    /// polled between iterations of long-running sweeps
    pub fn check(&self) -> Dtl<()> {
        match self.raised() {
            true => Err(DtlError::UserAbort),
            false => Ok(()),
        }
    }
}

/// re-entrancy guard over the public surface. one call at a time; a
/// second entry while the flag is up returns busy immediately.
#[derive(Debug, Default)]
pub struct Gate {
    busy: Arc<AtomicBool>,
    abort: Abort,
}

impl Gate {
    pub fn enter(&self) -> Dtl<Pass> {
        match self.busy.swap(true, Ordering::SeqCst) {
            true => Err(DtlError::Busy),
            false => Ok(Pass {
                busy: self.busy.clone(),
                abort: self.abort.clone(),
            }),
        }
    }
    pub fn abort(&self) -> Abort {
        self.abort.clone()
    }
}

/// proof of entry. owns its handles so the engine stays free to hand
/// out disjoint borrows underneath; releases the gate and clears any
/// leftover abort flag on drop, so every early return leaves the
/// engine callable again.
pub struct Pass {
    busy: Arc<AtomicBool>,
    abort: Abort,
}

impl Pass {
    pub fn check(&self) -> Dtl<()> {
        self.abort.check()
    }
}

impl Drop for Pass {
    fn drop(&mut self) {
        self.abort.clear();
        self.busy.store(false, Ordering::SeqCst);
    }
}
