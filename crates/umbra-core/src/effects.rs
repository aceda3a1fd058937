use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Cleanup guard. Clones share the same cleanup, which runs at most once.
#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// A guard with nothing to clean up.
    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    /// Makes `hook` run just before the cleanup. No-op once disposed.
    pub(crate) fn before_run(&self, hook: impl FnOnce() + 'static) {
        let mut slot = self.0.borrow_mut();
        if let Some(f) = slot.take() {
            *slot = Some(Box::new(move || {
                hook();
                f()
            }));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl fmt::Debug for Dispose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispose")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Runs `f()` immediately and returns its `Dispose`.
///
/// If a scope is current, the cleanup is also registered with it, so it runs
/// when that scope is disposed at the latest. Running the `Dispose` earlier
/// drops that registration.
pub fn effect<F>(f: F) -> Dispose
where
    F: FnOnce() -> Dispose + 'static,
{
    let d = f();

    if !d.is_disposed()
        && let Some(scope) = crate::scope::current_scope()
    {
        let d2 = d.clone();
        let id = scope.add_disposer(move || d2.run());
        let weak = scope.downgrade();
        d.before_run(move || {
            if let Some(scope) = weak.upgrade() {
                scope.remove_disposer(id);
            }
        });
    }

    d
}
