use std::sync::Arc;

/// Partial bidirectional projection between an action enum and one of its
/// variants' payloads.
///
/// `extract(embed(a)) == Some(a)` must hold, and `extract` returns `None` for
/// every action not built by `embed`.
pub struct CasePath<Global, Local> {
    extract: Arc<dyn Fn(&Global) -> Option<Local> + Send + Sync>,
    embed: Arc<dyn Fn(Local) -> Global + Send + Sync>,
}

impl<Global, Local> Clone for CasePath<Global, Local> {
    fn clone(&self) -> Self {
        Self {
            extract: self.extract.clone(),
            embed: self.embed.clone(),
        }
    }
}

impl<Global, Local> CasePath<Global, Local>
where
    Global: 'static,
    Local: 'static,
{
    pub fn new(
        extract: impl Fn(&Global) -> Option<Local> + Send + Sync + 'static,
        embed: impl Fn(Local) -> Global + Send + Sync + 'static,
    ) -> Self {
        Self {
            extract: Arc::new(extract),
            embed: Arc::new(embed),
        }
    }

    pub fn extract(&self, global: &Global) -> Option<Local> {
        (self.extract)(global)
    }

    pub fn embed(&self, local: Local) -> Global {
        (self.embed)(local)
    }

    /// Owned embedding function, for mapping effects and senders.
    pub fn embedder(&self) -> impl Fn(Local) -> Global + Send + Sync + 'static {
        let embed = self.embed.clone();
        move |local| embed(local)
    }

    pub fn then<Inner: 'static>(self, inner: CasePath<Local, Inner>) -> CasePath<Global, Inner> {
        let inner_embed = inner.clone();
        let outer_embed = self.clone();
        CasePath::new(
            move |global| self.extract(global).and_then(|local| inner.extract(&local)),
            move |value| outer_embed.embed(inner_embed.embed(value)),
        )
    }
}

impl<T: Clone + 'static> CasePath<T, T> {
    pub fn identity() -> Self {
        Self::new(|action: &T| Some(action.clone()), |action| action)
    }
}

/// Case path for a single-field tuple variant.
///
/// ```ignore
/// let counter: CasePath<AppAction, CounterAction> = case_path!(AppAction::Counter);
/// ```
#[macro_export]
macro_rules! case_path {
    ($($variant:ident)::+) => {
        $crate::CasePath::new(
            |action| match action {
                $($variant)::+(local) => ::std::option::Option::Some(::std::clone::Clone::clone(local)),
                #[allow(unreachable_patterns)]
                _ => ::std::option::Option::None,
            },
            $($variant)::+,
        )
    };
}
