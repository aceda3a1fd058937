//! # Locals
//!
//! Thread-local, typed values provided to a subtree of consumers. A provider
//! pushes a frame, sets its value, runs the subtree and pops the frame again.
//! Lookups walk the frames from the innermost outwards, so nested providers
//! shadow outer ones.
//!
//! ```rust
//! use umbra_core::locals::{local, with_local};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Accent(&'static str);
//!
//! assert_eq!(local::<Accent>(), None);
//! with_local(Accent("teal"), || {
//!     assert_eq!(local::<Accent>(), Some(Accent("teal")));
//!     with_local(Accent("amber"), || {
//!         assert_eq!(local::<Accent>(), Some(Accent("amber")));
//!     });
//!     assert_eq!(local::<Accent>(), Some(Accent("teal")));
//! });
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static LOCALS_STACK: RefCell<Vec<HashMap<TypeId, Box<dyn Any>>>> = RefCell::new(Vec::new());
}

fn with_locals_frame<R>(f: impl FnOnce() -> R) -> R {
    // Non-panicking frame guard (ensures pop on unwind)
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            LOCALS_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    LOCALS_STACK.with(|st| st.borrow_mut().push(HashMap::new()));
    let _guard = Guard;
    f()
}

fn set_local_boxed(t: TypeId, v: Box<dyn Any>) {
    LOCALS_STACK.with(|st| {
        let mut st = st.borrow_mut();
        if let Some(top) = st.last_mut() {
            top.insert(t, v);
        } else {
            // no frame: create a temporary one
            let mut m = HashMap::new();
            m.insert(t, v);
            st.push(m);
        }
    });
}

/// Provides `value` to everything `f` runs.
pub fn with_local<T: 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    with_locals_frame(|| {
        set_local_boxed(TypeId::of::<T>(), Box::new(value));
        f()
    })
}

/// Innermost provided `T`, if any.
pub fn local<T: Clone + 'static>() -> Option<T> {
    LOCALS_STACK.with(|st| {
        for frame in st.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return Some(t.clone());
            }
        }
        None
    })
}

pub fn local_depth() -> usize {
    LOCALS_STACK.with(|st| st.borrow().len())
}
