use std::sync::Arc;

/// Bidirectional projection between a whole state and one of its parts.
///
/// A well-behaved lens satisfies `get(set(g, l)) == l` and `set(g, get(g)) == g`.
/// Nothing here can check that at runtime, so cover hand-written lenses with
/// property tests.
pub struct Lens<Global, Local> {
    get: Arc<dyn Fn(&Global) -> Local + Send + Sync>,
    set: Arc<dyn Fn(&mut Global, Local) + Send + Sync>,
}

impl<Global, Local> Clone for Lens<Global, Local> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<Global, Local> Lens<Global, Local>
where
    Global: 'static,
    Local: 'static,
{
    pub fn new(
        get: impl Fn(&Global) -> Local + Send + Sync + 'static,
        set: impl Fn(&mut Global, Local) + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// Lens over a stored field, built from its shared and mutable accessors.
    pub fn field<G, M>(get: G, get_mut: M) -> Self
    where
        Local: Clone,
        G: Fn(&Global) -> &Local + Send + Sync + 'static,
        M: Fn(&mut Global) -> &mut Local + Send + Sync + 'static,
    {
        Self::new(
            move |global| get(global).clone(),
            move |global, local| *get_mut(global) = local,
        )
    }

    pub fn get(&self, global: &Global) -> Local {
        (self.get)(global)
    }

    pub fn set(&self, global: &mut Global, local: Local) {
        (self.set)(global, local)
    }

    /// Extracts the part, hands it out mutably, and writes it back.
    pub fn modify<R>(&self, global: &mut Global, f: impl FnOnce(&mut Local) -> R) -> R {
        let mut local = self.get(global);
        let result = f(&mut local);
        self.set(global, local);
        result
    }

    /// Focuses further into the part.
    pub fn then<Inner: 'static>(self, inner: Lens<Local, Inner>) -> Lens<Global, Inner> {
        let outer = self.clone();
        let inner_get = inner.clone();
        Lens::new(
            move |global| inner_get.get(&self.get(global)),
            move |global, value| outer.modify(global, |local| inner.set(local, value)),
        )
    }
}

impl<T: Clone + 'static> Lens<T, T> {
    pub fn identity() -> Self {
        Self::new(T::clone, |whole, value| *whole = value)
    }
}

/// Field lens from a type and a (possibly nested) field path.
///
/// ```ignore
/// let count: Lens<AppState, i32> = lens!(AppState, count);
/// let street: Lens<User, String> = lens!(User, address.street);
/// ```
#[macro_export]
macro_rules! lens {
    ($global:ty, $($field:ident).+) => {
        $crate::Lens::field(
            |global: &$global| &global.$($field).+,
            |global: &mut $global| &mut global.$($field).+,
        )
    };
}
