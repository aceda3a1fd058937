//! # Provider
//!
//! [`ColorSchemeProvider`] owns the single current-scheme cell for a subtree
//! of consumers. On construction it resolves the initial scheme, seeds its
//! state and (when eligible) starts watching the OS preference channels. OS
//! changes and manual `set` calls go through the same update path: write
//! through to the store when persistence is enabled, then update the cell and
//! notify every subscriber.
//!
//! ```rust
//! use std::rc::Rc;
//! use umbra_core::*;
//!
//! let store = Rc::new(MemoryStore::new());
//! let env = HostEnv::detached().with_storage(store.clone());
//! let provider = ColorSchemeProvider::new(
//!     Some(ColorScheme::Dark),
//!     ConfigOverrides::new().with_use_local_storage(true),
//!     env,
//! );
//! assert_eq!(provider.current(), ColorScheme::Dark);
//!
//! provider.set(ColorScheme::Light);
//! assert_eq!(store.peek(DEFAULT_STORAGE_KEY).as_deref(), Some("light"));
//!
//! let banner = provider.render(&Content::computed(|scheme, _set| format!("{scheme} mode")));
//! assert_eq!(banner, "light mode");
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::locals::with_local;
use crate::resolve::resolve;
use crate::scope::{Scope, current_scope};
use crate::watcher::{UpdateFn, WatchInputs, Watcher, WatcherState};
use crate::{
    ColorScheme, Config, ConfigOverrides, Dispose, KeyValueStore, MediaQueryHost, Persistence,
    Signal, effect,
};

/// The host capabilities a provider may use. Both are optional.
#[derive(Clone, Default)]
pub struct HostEnv {
    pub storage: Persistence,
    pub media: Option<Rc<dyn MediaQueryHost>>,
}

impl HostEnv {
    /// No store and no media host: only the default value applies.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, store: Rc<dyn KeyValueStore>) -> Self {
        self.storage = Persistence::new(store);
        self
    }

    pub fn with_media(mut self, media: Rc<dyn MediaQueryHost>) -> Self {
        self.media = Some(media);
        self
    }
}

impl fmt::Debug for HostEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostEnv")
            .field("storage", &self.storage)
            .field("media", &self.media.is_some())
            .finish()
    }
}

struct ProviderInner {
    config: RefCell<Config>,
    default_value: Cell<ColorScheme>,
    state: Signal<ColorScheme>,
    env: HostEnv,
    watcher: RefCell<Watcher>,
    scope: Scope,
    torn_down: Cell<bool>,
}

impl ProviderInner {
    fn apply(&self, scheme: ColorScheme) {
        if self.torn_down.get() {
            log::debug!("ignoring color scheme update to {scheme} after teardown");
            return;
        }
        {
            let config = self.config.borrow();
            if config.use_local_storage && self.env.storage.is_available() {
                self.env
                    .storage
                    .write(&config.local_storage_key, scheme.as_str());
            }
        }
        self.state.set(scheme);
    }

    fn sync_watcher(self: &Rc<Self>) -> WatcherState {
        let inputs = {
            let config = self.config.borrow();
            WatchInputs {
                default_value: self.default_value.get(),
                listen_window_events: config.listen_window_events,
                use_local_storage: config.use_local_storage,
                storage_available: self.env.storage.is_available(),
            }
        };
        let weak = Rc::downgrade(self);
        let update: UpdateFn = Rc::new(move |scheme: ColorScheme| {
            if let Some(inner) = weak.upgrade() {
                inner.apply(scheme);
            }
        });
        self.watcher.borrow_mut().sync(inputs, update)
    }

    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        // Listeners go first so nothing can fire against a released context.
        self.watcher.borrow_mut().stop();
        self.scope.dispose();
        self.scope.detach();
        self.state.clear_subscribers();
        log::debug!("color scheme provider torn down");
    }
}

/// Cloneable update function handed to consumers.
///
/// Holds the provider weakly; once the provider is torn down, `set` does
/// nothing.
#[derive(Clone)]
pub struct SchemeSetter(Weak<ProviderInner>);

impl SchemeSetter {
    pub fn set(&self, scheme: ColorScheme) {
        match self.0.upgrade() {
            Some(inner) => inner.apply(scheme),
            None => log::debug!("ignoring color scheme update to {scheme}: provider dropped"),
        }
    }

    /// Whether calling `set` can still have an effect.
    pub fn is_live(&self) -> bool {
        self.0.upgrade().is_some_and(|inner| !inner.torn_down.get())
    }
}

impl fmt::Debug for SchemeSetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeSetter")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Live view of a provider: current value, setter, and change subscription.
#[derive(Clone)]
pub struct SchemeHandle {
    state: Signal<ColorScheme>,
    setter: SchemeSetter,
}

impl SchemeHandle {
    pub fn get(&self) -> ColorScheme {
        self.state.get()
    }

    pub fn set(&self, scheme: ColorScheme) {
        self.setter.set(scheme);
    }

    pub fn setter(&self) -> SchemeSetter {
        self.setter.clone()
    }

    pub fn pair(&self) -> (ColorScheme, SchemeSetter) {
        (self.get(), self.setter())
    }

    /// Calls `f` after every update, including ones that keep the value.
    /// Inside [`ColorSchemeProvider::provide`] the subscription is also
    /// released when the provider is torn down.
    pub fn subscribe(&self, f: impl Fn(ColorScheme) + 'static) -> Dispose {
        let state = self.state.clone();
        effect(move || {
            let id = state.subscribe(move |scheme| f(*scheme));
            Dispose::new(move || {
                state.unsubscribe(id);
            })
        })
    }
}

impl fmt::Debug for SchemeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeHandle")
            .field("scheme", &self.get())
            .field("setter", &self.setter)
            .finish()
    }
}

/// Provider content: passed through as-is, or computed from the current pair
/// at every render.
pub enum Content<T> {
    Literal(T),
    Computed(Rc<dyn Fn(ColorScheme, SchemeSetter) -> T>),
}

impl<T> Content<T> {
    pub fn literal(value: T) -> Self {
        Content::Literal(value)
    }

    pub fn computed(f: impl Fn(ColorScheme, SchemeSetter) -> T + 'static) -> Self {
        Content::Computed(Rc::new(f))
    }

    pub fn resolve(&self, scheme: ColorScheme, setter: SchemeSetter) -> T
    where
        T: Clone,
    {
        match self {
            Content::Literal(value) => value.clone(),
            Content::Computed(f) => f(scheme, setter),
        }
    }
}

impl<T: Clone> Clone for Content<T> {
    fn clone(&self) -> Self {
        match self {
            Content::Literal(value) => Content::Literal(value.clone()),
            Content::Computed(f) => Content::Computed(f.clone()),
        }
    }
}

/// Owner of one current-scheme cell. Dropping it tears it down.
pub struct ColorSchemeProvider {
    inner: Rc<ProviderInner>,
}

impl ColorSchemeProvider {
    /// `default_value` falls back to [`ColorScheme::Light`]; unset config
    /// fields fall back to [`Config::default`].
    pub fn new(default_value: Option<ColorScheme>, config: ConfigOverrides, env: HostEnv) -> Self {
        let default_value = default_value.unwrap_or_default();
        let config = Config::merged(&config);

        let resolution = resolve(
            default_value,
            config.use_local_storage,
            &config.local_storage_key,
            &env.storage,
            env.media.as_deref(),
        );
        log::debug!(
            "initial color scheme {} (from {:?})",
            resolution.scheme,
            resolution.tier
        );

        // Nested under whichever provider subtree is currently running.
        let scope = current_scope().map_or_else(Scope::new, |parent| parent.child());

        let inner = Rc::new(ProviderInner {
            config: RefCell::new(config),
            default_value: Cell::new(default_value),
            state: Signal::new(resolution.scheme),
            watcher: RefCell::new(Watcher::new(env.media.clone())),
            env,
            scope,
            torn_down: Cell::new(false),
        });

        let weak = Rc::downgrade(&inner);
        inner.scope.add_disposer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.teardown();
            }
        });

        inner.sync_watcher();
        Self { inner }
    }

    pub fn current(&self) -> ColorScheme {
        self.inner.state.get()
    }

    /// Writes through to the store (when enabled), then updates and notifies.
    /// Setting the current value again still writes and notifies.
    pub fn set(&self, scheme: ColorScheme) {
        self.inner.apply(scheme);
    }

    pub fn setter(&self) -> SchemeSetter {
        SchemeSetter(Rc::downgrade(&self.inner))
    }

    pub fn pair(&self) -> (ColorScheme, SchemeSetter) {
        (self.current(), self.setter())
    }

    pub fn handle(&self) -> SchemeHandle {
        SchemeHandle {
            state: self.inner.state.clone(),
            setter: self.setter(),
        }
    }

    pub fn subscribe(&self, f: impl Fn(ColorScheme) + 'static) -> Dispose {
        self.handle().subscribe(f)
    }

    /// Runs `f` as this provider's subtree: the read primitive and the
    /// wrapping utility see this provider, and providers created inside
    /// become children of it.
    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        let handle = self.handle();
        self.inner.scope.run(|| with_local(handle, f))
    }

    pub fn render<T: Clone>(&self, content: &Content<T>) -> T {
        self.provide(|| content.resolve(self.current(), self.setter()))
    }

    pub fn config(&self) -> Config {
        self.inner.config.borrow().clone()
    }

    pub fn default_value(&self) -> ColorScheme {
        self.inner.default_value.get()
    }

    pub fn watcher_state(&self) -> WatcherState {
        self.inner.watcher.borrow().state()
    }

    /// Replaces the default value and configuration. The current scheme is
    /// kept; the watcher re-evaluates eligibility and, if anything changed,
    /// resubscribes from scratch.
    pub fn reconfigure(
        &self,
        default_value: Option<ColorScheme>,
        config: ConfigOverrides,
    ) -> WatcherState {
        if self.inner.torn_down.get() {
            return WatcherState::Inactive;
        }
        self.inner.default_value.set(default_value.unwrap_or_default());
        *self.inner.config.borrow_mut() = Config::merged(&config);
        self.inner.sync_watcher()
    }

    /// Unsubscribes from the OS, tears down nested providers and releases
    /// consumer subscriptions. Idempotent.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }
}

impl Drop for ColorSchemeProvider {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl fmt::Debug for ColorSchemeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorSchemeProvider")
            .field("current", &self.current())
            .field("default_value", &self.default_value())
            .field("config", &*self.inner.config.borrow())
            .field("watcher", &self.watcher_state())
            .field("env", &self.inner.env)
            .finish()
    }
}
