//! Shared error taxonomy.
//!
//! Every subsystem owns a closed `thiserror` enum naming its own failure
//! kinds; each maps into this crate's [`Canonical`] set so callers that
//! don't care about subsystem-specific detail can still branch on "was
//! this EOF", "was this bad-message", etc. See `spec.md` §7 / §9.

/// The small set of conditions every error category can equate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canonical {
    Eof,
    BadMessage,
    ValueTooLarge,
    ArgumentOutOfDomain,
    ResultOutOfRange,
    NotEnoughMemory,
}

/// Implemented by every subsystem error enum to expose its canonical
/// equivalence, if it has one. `None` means the source deliberately leaves
/// the condition unmapped (see the Decompress `padded`/`wrong_length`
/// open question).
pub trait CanonicalError {
    fn canonical(&self) -> Option<Canonical>;
}
