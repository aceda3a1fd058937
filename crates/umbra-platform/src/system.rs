//! OS preference host for desktop targets.
//!
//! Desktop platforms don't push `prefers-color-scheme` changes to us, so the
//! host re-queries the OS whenever the owning event loop calls
//! [`SystemMediaHost::poll`] and emits a change event for each channel whose
//! match state flipped.

use std::cell::Cell;

use umbra_core::{
    ColorScheme, ListenerId, ListenerRegistry, MediaChannel, MediaListener, MediaQueryHost,
    SchemeError,
};

/// Current OS preference; `Ok(None)` means "no preference".
pub type Detector = Box<dyn Fn() -> Result<Option<ColorScheme>, SchemeError>>;

pub struct SystemMediaHost {
    detector: Detector,
    last: Cell<Result<Option<ColorScheme>, ()>>,
    registry: ListenerRegistry,
}

impl SystemMediaHost {
    /// Uses the `dark-light` crate to query the OS.
    pub fn new() -> Self {
        Self::with_detector(detect_os_scheme)
    }

    /// Overrides detection, e.g. to force a preference in tests.
    pub fn with_detector(
        detector: impl Fn() -> Result<Option<ColorScheme>, SchemeError> + 'static,
    ) -> Self {
        let last = detector().map_err(|_| ());
        Self {
            detector: Box::new(detector),
            last: Cell::new(last),
            registry: ListenerRegistry::new(),
        }
    }

    /// Last observed preference, or `None` for "no preference".
    pub fn preference(&self) -> Option<ColorScheme> {
        self.last.get().ok().flatten()
    }

    /// Re-queries the OS and notifies listeners of every channel whose match
    /// state changed. Returns `true` if anything changed.
    pub fn poll(&self) -> bool {
        let now = (self.detector)().map_err(|_| ());
        let before = self.last.replace(now);
        if before == now {
            return false;
        }
        log::debug!("OS color scheme preference changed: {before:?} -> {now:?}");

        let matched = |state: Result<Option<ColorScheme>, ()>, channel: MediaChannel| {
            state.is_ok_and(|pref| MediaChannel::for_preference(pref) == channel)
        };
        // channels switching off first, like browsers report them
        for turning_on in [false, true] {
            for channel in MediaChannel::ALL {
                let (was, is) = (matched(before, channel), matched(now, channel));
                if was != is && is == turning_on {
                    self.registry.emit(channel, is);
                }
            }
        }
        true
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for SystemMediaHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaQueryHost for SystemMediaHost {
    fn supports_color_scheme(&self) -> bool {
        self.last.get().is_ok()
    }

    fn matches(&self, channel: MediaChannel) -> bool {
        self.last
            .get()
            .is_ok_and(|pref| MediaChannel::for_preference(pref) == channel)
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

fn detect_os_scheme() -> Result<Option<ColorScheme>, SchemeError> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => Ok(Some(ColorScheme::Dark)),
        Ok(dark_light::Mode::Light) => Ok(Some(ColorScheme::Light)),
        Ok(_) => Ok(None),
        Err(err) => {
            log::debug!("OS color scheme detection failed: {err:?}");
            Err(SchemeError::MediaUnsupported)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use umbra_core::{ColorSchemeProvider, ConfigOverrides, HostEnv, WatcherState};

    use super::*;

    fn scripted(
        initial: Result<Option<ColorScheme>, SchemeError>,
    ) -> (Rc<SystemMediaHost>, Rc<RefCell<Result<Option<ColorScheme>, SchemeError>>>) {
        let script = Rc::new(RefCell::new(initial));
        let host = SystemMediaHost::with_detector({
            let script = script.clone();
            move || script.borrow().clone()
        });
        (Rc::new(host), script)
    }

    #[test]
    fn test_queries_reflect_detection() {
        let (host, _) = scripted(Ok(Some(ColorScheme::Dark)));
        assert!(host.supports_color_scheme());
        assert!(host.matches(MediaChannel::Dark));
        assert!(!host.matches(MediaChannel::Light));

        let (host, _) = scripted(Err(SchemeError::MediaUnsupported));
        assert!(!host.supports_color_scheme());
        assert!(!host.matches(MediaChannel::NoPreference));
    }

    #[test]
    fn test_poll_emits_flipped_channels_only() {
        let (host, script) = scripted(Ok(Some(ColorScheme::Light)));
        let events = Rc::new(RefCell::new(Vec::new()));
        for channel in MediaChannel::ALL {
            let events = events.clone();
            host.add_listener(
                channel,
                Rc::new(move |matches: bool| events.borrow_mut().push((channel, matches))),
            )
            .unwrap();
        }

        assert!(!host.poll());
        assert!(events.borrow().is_empty());

        *script.borrow_mut() = Ok(Some(ColorScheme::Dark));
        assert!(host.poll());
        assert_eq!(
            *events.borrow(),
            vec![(MediaChannel::Light, false), (MediaChannel::Dark, true)]
        );
    }

    #[test]
    fn test_provider_follows_polled_changes() {
        let (host, script) = scripted(Ok(None));
        let provider = ColorSchemeProvider::new(
            Some(ColorScheme::Dark),
            ConfigOverrides::new(),
            HostEnv::detached().with_media(host.clone()),
        );
        assert_eq!(provider.watcher_state(), WatcherState::Active);
        assert_eq!(provider.current(), ColorScheme::Dark);

        *script.borrow_mut() = Ok(Some(ColorScheme::Light));
        host.poll();
        assert_eq!(provider.current(), ColorScheme::Light);

        *script.borrow_mut() = Ok(None);
        host.poll();
        assert_eq!(provider.current(), ColorScheme::Dark);

        drop(provider);
        assert_eq!(host.listener_count(), 0);
    }
}
