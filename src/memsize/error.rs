use thiserror::Error;

use crate::runtime::gc::ObjectKind;

/// Errors that abort a size traversal.
///
/// Neither variant is recoverable mid-traversal: the whole `object_size`
/// call fails and no partial estimate is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeError {
    /// The object kind has no sizing semantics.
    #[error("cannot estimate the size of a {kind} object")]
    UnsupportedKind { kind: ObjectKind },
    /// The layout table has no entry the dispatcher needs; the table and
    /// the dispatcher's kind set are out of sync.
    #[error("layout table has no constant for `{name}`")]
    MissingLayoutConstant { name: String },
}
