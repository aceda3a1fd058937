//! OS preference watcher.
//!
//! Two states. While `Active` the watcher holds exactly one listener on each
//! of the three channels; a listener forwards to the update path only when its
//! event reports a match. Eligibility is re-evaluated on every [`Watcher::sync`]
//! call whose inputs differ from the previous one, and the previous listeners
//! are always removed before new ones are attached.

use std::cell::Cell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{ColorScheme, Dispose, MediaChannel, MediaListener, MediaQueryHost, SchemeError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatcherState {
    Inactive,
    Active,
}

/// Everything watcher eligibility and handler targets depend on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchInputs {
    pub default_value: ColorScheme,
    pub listen_window_events: bool,
    pub use_local_storage: bool,
    pub storage_available: bool,
}

impl WatchInputs {
    /// Listening is wanted and no persisted value takes precedence.
    pub fn wants_events(&self) -> bool {
        self.listen_window_events && !(self.use_local_storage && self.storage_available)
    }
}

pub type UpdateFn = Rc<dyn Fn(ColorScheme)>;

pub struct Watcher {
    media: Option<Rc<dyn MediaQueryHost>>,
    last_inputs: Option<WatchInputs>,
    cleanup: Option<Dispose>,
}

impl Watcher {
    pub fn new(media: Option<Rc<dyn MediaQueryHost>>) -> Self {
        Self {
            media,
            last_inputs: None,
            cleanup: None,
        }
    }

    pub fn state(&self) -> WatcherState {
        if self.cleanup.is_some() {
            WatcherState::Active
        } else {
            WatcherState::Inactive
        }
    }

    /// Brings the subscriptions in line with `inputs`. Unchanged inputs keep
    /// the current subscriptions; changed inputs always start from scratch.
    pub fn sync(&mut self, inputs: WatchInputs, update: UpdateFn) -> WatcherState {
        if self.last_inputs.as_ref() == Some(&inputs) {
            return self.state();
        }
        self.stop();

        let eligible = inputs.wants_events();
        let default_value = inputs.default_value;
        self.last_inputs = Some(inputs);

        if !eligible {
            log::debug!("color scheme watcher idle: listening disabled or storage takes precedence");
            return WatcherState::Inactive;
        }
        let Some(media) = self.media.clone() else {
            log::debug!("color scheme watcher idle: no media query host");
            return WatcherState::Inactive;
        };
        if !media.supports_color_scheme() {
            log::debug!("color scheme watcher idle: host reports prefers-color-scheme unsupported");
            return WatcherState::Inactive;
        }

        match subscribe_all(media, default_value, update) {
            Ok(cleanup) => {
                log::debug!("color scheme watcher active (no-preference -> {default_value})");
                self.cleanup = Some(cleanup);
                WatcherState::Active
            }
            Err(err) => {
                log::warn!("color scheme watcher could not subscribe: {err}");
                WatcherState::Inactive
            }
        }
    }

    /// Removes all listeners. The next `sync` subscribes again.
    pub fn stop(&mut self) {
        self.last_inputs = None;
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.run();
            log::trace!("color scheme watcher stopped");
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn subscribe_all(
    media: Rc<dyn MediaQueryHost>,
    default_value: ColorScheme,
    update: UpdateFn,
) -> Result<Dispose, SchemeError> {
    // Cleared on unsubscribe so already-queued deliveries become no-ops.
    let armed = Rc::new(Cell::new(true));
    let mut attached: SmallVec<[(MediaChannel, crate::ListenerId); 3]> = SmallVec::new();

    for channel in MediaChannel::ALL {
        let target = channel.scheme_or(default_value);
        let listener: MediaListener = {
            let armed = armed.clone();
            let update = update.clone();
            Rc::new(move |matches: bool| {
                if matches && armed.get() {
                    log::debug!("OS color scheme changed: {channel} -> {target}");
                    update(target);
                }
            })
        };
        match media.add_listener(channel, listener) {
            Ok(id) => attached.push((channel, id)),
            Err(err) => {
                armed.set(false);
                for (channel, id) in attached {
                    media.remove_listener(channel, id);
                }
                return Err(err);
            }
        }
    }

    Ok(Dispose::new(move || {
        armed.set(false);
        for (channel, id) in attached {
            media.remove_listener(channel, id);
        }
    }))
}
