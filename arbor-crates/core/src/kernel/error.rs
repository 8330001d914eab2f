use thiserror::Error;

use super::BranchingId;

/// Errors that arise from committing a description to a space that cannot accept it.
///
/// Both variants indicate a programming error: the description was either corrupted or
/// replayed in a different order than the one in which it was created.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitError {
    #[error("alternative {alternative} is out of range for a choice point with {alternatives} alternatives")]
    IllegalAlternative { alternative: u32, alternatives: u32 },
    #[error("{branching} is not an active branching; descriptions must be committed in the order they were created")]
    NoBranching { branching: BranchingId },
}
