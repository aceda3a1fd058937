//! OS boundary: the three `prefers-color-scheme` channels.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::{ColorScheme, MediaChannel, SchemeError};

slotmap::new_key_type! {
    /// Handle of one attached change listener.
    pub struct ListenerId;
}

/// Change handler; receives the channel's new match flag.
pub type MediaListener = Rc<dyn Fn(bool)>;

/// Host facility for querying and watching OS color-scheme preferences.
///
/// Channels fire independently. Hosts must not be assumed to fire exactly
/// one matching channel per change.
pub trait MediaQueryHost {
    /// `false` when the umbrella `(prefers-color-scheme)` query is reported
    /// as unsupported.
    fn supports_color_scheme(&self) -> bool;

    /// Current match state of `channel`.
    fn matches(&self, channel: MediaChannel) -> bool;

    fn add_listener(
        &self,
        channel: MediaChannel,
        listener: MediaListener,
    ) -> Result<ListenerId, SchemeError>;

    /// Removing an unknown id is a no-op.
    fn remove_listener(&self, channel: MediaChannel, id: ListenerId);
}

/// Listener table shared by host implementations.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RefCell<SlotMap<ListenerId, (MediaChannel, MediaListener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, channel: MediaChannel, listener: MediaListener) -> ListenerId {
        self.listeners.borrow_mut().insert((channel, listener))
    }

    pub fn remove(&self, channel: MediaChannel, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let on_channel = listeners.get(id).is_some_and(|(c, _)| *c == channel);
        on_channel && listeners.remove(id).is_some()
    }

    /// Delivers a change event to every listener on `channel`. Listeners are
    /// snapshotted first, so they may attach or detach listeners themselves.
    pub fn emit(&self, channel: MediaChannel, matches: bool) -> usize {
        let targets: SmallVec<[MediaListener; 4]> = self
            .listeners
            .borrow()
            .values()
            .filter(|(c, _)| *c == channel)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in &targets {
            listener(matches);
        }
        targets.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_for(&self, channel: MediaChannel) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|(c, _)| *c == channel)
            .count()
    }
}

/// Scriptable in-memory host.
///
/// Starts supported with no channel matching.
pub struct ManualMediaHost {
    supported: Cell<bool>,
    dark: Cell<bool>,
    light: Cell<bool>,
    no_preference: Cell<bool>,
    registry: ListenerRegistry,
}

impl Default for ManualMediaHost {
    fn default() -> Self {
        Self {
            supported: Cell::new(true),
            dark: Cell::new(false),
            light: Cell::new(false),
            no_preference: Cell::new(false),
            registry: ListenerRegistry::new(),
        }
    }
}

impl ManualMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose umbrella query reports "not all".
    pub fn unsupported() -> Self {
        let host = Self::default();
        host.supported.set(false);
        host
    }

    /// A host that currently reports `preference` without firing events.
    pub fn preferring(preference: Option<ColorScheme>) -> Self {
        let host = Self::default();
        host.set_flag(MediaChannel::for_preference(preference), true);
        host
    }

    pub fn set_supported(&self, supported: bool) {
        self.supported.set(supported);
    }

    fn flag(&self, channel: MediaChannel) -> &Cell<bool> {
        match channel {
            MediaChannel::Dark => &self.dark,
            MediaChannel::Light => &self.light,
            MediaChannel::NoPreference => &self.no_preference,
        }
    }

    /// Sets the match flag without notifying anyone.
    pub fn set_flag(&self, channel: MediaChannel, matches: bool) {
        self.flag(channel).set(matches);
    }

    /// Sets the match flag and fires a change event on `channel`, whether or
    /// not the flag actually changed. Returns how many listeners ran.
    pub fn emit(&self, channel: MediaChannel, matches: bool) -> usize {
        self.set_flag(channel, matches);
        self.registry.emit(channel, matches)
    }

    /// Switches the OS preference the way a browser reports it: every channel
    /// whose match flag flips gets a change event, the ones turning off first.
    pub fn set_preference(&self, preference: Option<ColorScheme>) {
        let target = MediaChannel::for_preference(preference);
        let changed: SmallVec<[(MediaChannel, bool); 3]> = MediaChannel::ALL
            .into_iter()
            .map(|c| (c, c == target))
            .filter(|(c, now)| self.flag(*c).get() != *now)
            .collect();
        for (channel, now) in changed.iter().filter(|(_, now)| !*now) {
            self.emit(*channel, *now);
        }
        for (channel, now) in changed.iter().filter(|(_, now)| *now) {
            self.emit(*channel, *now);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    pub fn listener_count_for(&self, channel: MediaChannel) -> usize {
        self.registry.count_for(channel)
    }
}

impl MediaQueryHost for ManualMediaHost {
    fn supports_color_scheme(&self) -> bool {
        self.supported.get()
    }

    fn matches(&self, channel: MediaChannel) -> bool {
        self.supported.get() && self.flag(channel).get()
    }

    fn add_listener(
        &self,
        channel: MediaChannel,
        listener: MediaListener,
    ) -> Result<ListenerId, SchemeError> {
        Ok(self.registry.add(channel, listener))
    }

    fn remove_listener(&self, channel: MediaChannel, id: ListenerId) {
        self.registry.remove(channel, id);
    }
}
