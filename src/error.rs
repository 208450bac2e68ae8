use thiserror::Error;

/// Failures of a single dispatch.
///
/// Both are programming errors on the composing side: `send` treats them as
/// fatal, `try_send` hands them back to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store '{store}' exceeded its dispatch depth limit of {limit} (depth {depth})")]
    DispatchDepthExceeded {
        store: String,
        limit: usize,
        depth: usize,
    },

    #[error("store '{store}' produced an async effect but no tokio runtime is available")]
    NoRuntime { store: String },
}
