use std::borrow::Cow;

use tokio::runtime::Handle;

/// Store configuration.
///
/// The defaults keep dispatch unbounded: an effect that keeps re-triggering
/// itself will recurse until the stack runs out.
#[derive(Clone, Debug)]
pub struct StoreOptions {
    label: Cow<'static, str>,
    max_dispatch_depth: Option<usize>,
    runtime: Option<Handle>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("store"),
            max_dispatch_depth: None,
            runtime: None,
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in log records.
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Rejects dispatches nested deeper than `limit` (the outermost `send` is depth 1).
    /// Only a root store enforces it; derived stores dispatch through their root.
    pub fn max_dispatch_depth(mut self, limit: usize) -> Self {
        self.max_dispatch_depth = Some(limit);
        self
    }

    /// Runtime async effects are spawned on. Without one, the runtime of the
    /// dispatching thread is used.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    pub fn get_max_dispatch_depth(&self) -> Option<usize> {
        self.max_dispatch_depth
    }

    pub(crate) fn runtime_handle(&self) -> Option<Handle> {
        self.runtime.clone().or_else(|| Handle::try_current().ok())
    }

    /// Options of a derived store. The depth limit stays with the root.
    pub(crate) fn child(&self, name: &str) -> Self {
        Self {
            label: Cow::Owned(format!("{}/{}", self.label, name)),
            max_dispatch_depth: None,
            runtime: self.runtime.clone(),
        }
    }
}
