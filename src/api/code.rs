use crate::Code;

/// result alias used across the public surface
pub type Dtl<T> = Result<T, DtlError>;

/// hull solver sub-causes, surfaced with an offset so the caller can
/// tell the kernel layer apart from ordinary engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    Infeasible,
    Unbounded,
    Singular,
    Cycling,
    Restore,
}

/// the error taxonomy. codes are stable and negative; positive codes
/// are counts and zero is plain success, so the whole i32 range keeps
/// the usual sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtlError {
    Busy,
    NotInit,
    AlreadyInit,
    FrameUnknown,
    FrameInUse,
    FrameNotLoaded,
    WrongFrameType,
    FrameCorrupt,
    BadCriterion,
    BadAlternative,
    BadNode,
    BadStatement,
    BadMode,
    BadBounds,
    BadScale,
    Inconsistent,
    TooNarrow,
    NotEvaluated,
    Overflow,
    OutOfMemory,
    UserAbort,
    AssertFailed(u32),
    MemoryLeak,
    Kernel(Kernel),
}

impl DtlError {
    const KERNEL_OFFSET: Code = -100;

    pub fn code(&self) -> Code {
        match self {
            DtlError::Busy => -1,
            DtlError::NotInit => -2,
            DtlError::AlreadyInit => -3,
            DtlError::FrameUnknown => -4,
            DtlError::FrameInUse => -5,
            DtlError::FrameNotLoaded => -6,
            DtlError::WrongFrameType => -7,
            DtlError::FrameCorrupt => -8,
            DtlError::BadCriterion => -9,
            DtlError::BadAlternative => -10,
            DtlError::BadNode => -11,
            DtlError::BadStatement => -12,
            DtlError::BadMode => -13,
            DtlError::BadBounds => -14,
            DtlError::BadScale => -15,
            DtlError::Inconsistent => -16,
            DtlError::TooNarrow => -17,
            DtlError::NotEvaluated => -18,
            DtlError::Overflow => -19,
            DtlError::OutOfMemory => -20,
            DtlError::UserAbort => -21,
            DtlError::AssertFailed(_) => -22,
            DtlError::MemoryLeak => -23,
            DtlError::Kernel(k) => Self::KERNEL_OFFSET - *k as Code,
        }
    }

    /// severe or not: every negative code is an error
    pub fn is_error(code: Code) -> bool {
        code < 0
    }

    /// stricter predicate: codes the caller brought on themselves.
    /// inconsistency is a user mistake here, not a system failure.
    pub fn is_user_error(code: Code) -> bool {
        matches!(code, -17..=-9)
    }

    /// decoder for hosts that only keep the integer
    pub fn code_text(code: Code) -> &'static str {
        match code {
            0 => "success",
            c if c > 0 => "success (count)",
            -1 => "engine busy",
            -2 => "engine not initialised",
            -3 => "engine already initialised",
            -4 => "unknown frame",
            -5 => "frame in use",
            -6 => "no frame loaded",
            -7 => "wrong frame type",
            -8 => "frame corrupt",
            -9 => "criterion out of range",
            -10 => "alternative out of range",
            -11 => "node out of range",
            -12 => "statement malformed",
            -13 => "mode out of range",
            -14 => "bounds cross",
            -15 => "scale malformed",
            -16 => "constraint base inconsistent",
            -17 => "statement too narrow",
            -18 => "criterion not evaluated",
            -19 => "capacity overflow",
            -20 => "out of memory",
            -21 => "user abort",
            -22 => "recoverable assertion failed",
            -23 => "memory leak at exit",
            c if c <= Self::KERNEL_OFFSET => "hull solver failure",
            _ => "unknown code",
        }
    }
}

impl std::fmt::Display for DtlError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", DtlError::code_text(self.code()), self.code())
    }
}

impl std::error::Error for DtlError {}
