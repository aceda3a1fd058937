use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Handle of one registered disposer, for removing it before the scope is
/// disposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisposerId(u64);

/// Ownership tree for cleanups. Each provider owns one; providers created
/// while another provider's subtree is running get a child scope.
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    next_id: Cell<u64>,
    // Keyed by a monotonic id, so iteration is registration order.
    disposers: RefCell<BTreeMap<DisposerId, Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
    parent: Weak<ScopeInner>,
}

/// Non-owning scope reference.
#[derive(Clone)]
pub(crate) struct WeakScope(Weak<ScopeInner>);

impl WeakScope {
    pub(crate) fn upgrade(&self) -> Option<Scope> {
        self.0.upgrade().map(|inner| Scope { inner })
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::with_parent(Weak::new())
    }

    fn with_parent(parent: Weak<ScopeInner>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                next_id: Cell::new(0),
                disposers: RefCell::new(BTreeMap::new()),
                children: RefCell::new(Vec::new()),
                parent,
            }),
        }
    }

    /// Runs `f` with this scope as the current one.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        // Restores the previous scope even if `f` unwinds.
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }

        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) -> DisposerId {
        let id = DisposerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.disposers.borrow_mut().insert(id, Box::new(disposer));
        id
    }

    /// Drops a registration without running it. Returns `false` if it
    /// already ran or was removed.
    pub fn remove_disposer(&self, id: DisposerId) -> bool {
        let removed = self.inner.disposers.borrow_mut().remove(&id);
        removed.is_some()
    }

    pub fn child(&self) -> Scope {
        let child = Scope::with_parent(Rc::downgrade(&self.inner));
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Unlinks this scope from its parent, so a parent that outlives it no
    /// longer holds on to it. No-op for root scopes.
    pub fn detach(&self) {
        let Some(parent) = self.inner.parent.upgrade() else {
            return;
        };
        let removed = {
            let mut children = parent.children.borrow_mut();
            children
                .iter()
                .position(|c| Rc::ptr_eq(&c.inner, &self.inner))
                .map(|i| children.remove(i))
        };
        drop(removed);
    }

    pub(crate) fn downgrade(&self) -> WeakScope {
        WeakScope(Rc::downgrade(&self.inner))
    }

    pub fn disposer_count(&self) -> usize {
        self.inner.disposers.borrow().len()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Disposes children first, then runs this scope's disposers in
    /// registration order. The scope stays usable (and empty) afterwards.
    pub fn dispose(&self) {
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for disposer in disposers.into_values() {
            disposer();
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            drop(child);
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers.into_values() {
            disposer();
        }
    }
}
