use thiserror::Error;

/// Problems found while validating a dictionary provided from outside.
///
/// Editing operations themselves never fail: out-of-range positions are
/// clamped and stale block identities are ignored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("duplicate dictionary category '{0}'")]
    DuplicateCategory(String),

    #[error("dictionary category '{category}' contains an empty item")]
    EmptyItem { category: String },

    #[error("dictionary item '{item}' in category '{category}' has irregular spacing")]
    IrregularSpacing { category: String, item: String },

    #[error("requirement token must be a single word, got '{0}'")]
    InvalidRequirementToken(String),
}
