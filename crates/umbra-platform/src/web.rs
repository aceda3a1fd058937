//! Browser adapters (wasm32): `window.localStorage` and `window.matchMedia`.

use std::cell::RefCell;

use slotmap::SlotMap;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MediaQueryList, MediaQueryListEvent, Storage, Window};

use umbra_core::{
    KeyValueStore, ListenerId, MediaChannel, MediaListener, MediaQueryHost, SchemeError,
    UMBRELLA_QUERY,
};

fn js_reason(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// `window.localStorage`. Accessing it can throw (privacy modes, sandboxed
/// iframes); in that case the store reports itself unavailable.
pub struct WebStorage {
    storage: Option<Storage>,
}

impl WebStorage {
    pub fn local() -> Self {
        let storage = web_sys::window().and_then(|w| match w.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                log::debug!("localStorage unavailable: {}", js_reason(&err));
                None
            }
        });
        Self { storage }
    }
}

impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SchemeError> {
        let storage = self.storage.as_ref().ok_or(SchemeError::StorageUnavailable)?;
        storage.get_item(key).map_err(|err| SchemeError::Storage {
            key: key.to_string(),
            reason: js_reason(&err),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SchemeError> {
        let storage = self.storage.as_ref().ok_or(SchemeError::StorageUnavailable)?;
        storage.set_item(key, value).map_err(|err| SchemeError::Storage {
            key: key.to_string(),
            reason: js_reason(&err),
        })
    }

    fn is_available(&self) -> bool {
        self.storage.is_some()
    }
}

type ChangeClosure = Closure<dyn FnMut(MediaQueryListEvent)>;

/// `window.matchMedia` with one `change` listener per attached handler.
pub struct WebMediaHost {
    window: Option<Window>,
    attached: RefCell<SlotMap<ListenerId, (MediaQueryList, ChangeClosure)>>,
}

impl WebMediaHost {
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
            attached: RefCell::new(SlotMap::with_key()),
        }
    }

    fn query(&self, query: &str) -> Option<MediaQueryList> {
        self.window.as_ref()?.match_media(query).ok().flatten()
    }
}

impl Default for WebMediaHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaQueryHost for WebMediaHost {
    fn supports_color_scheme(&self) -> bool {
        self.query(UMBRELLA_QUERY)
            .is_some_and(|list| list.media() != "not all")
    }

    fn matches(&self, channel: MediaChannel) -> bool {
        self.query(channel.query()).is_some_and(|list| list.matches())
    }

    fn add_listener(
        &self,
        channel: MediaChannel,
        listener: MediaListener,
    ) -> Result<ListenerId, SchemeError> {
        let list = self
            .query(channel.query())
            .ok_or(SchemeError::MediaUnsupported)?;
        let closure: ChangeClosure =
            Closure::new(move |event: MediaQueryListEvent| listener(event.matches()));
        list.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            .map_err(|err| {
                log::warn!("matchMedia listener for {channel} rejected: {}", js_reason(&err));
                SchemeError::MediaUnsupported
            })?;
        Ok(self.attached.borrow_mut().insert((list, closure)))
    }

    fn remove_listener(&self, channel: MediaChannel, id: ListenerId) {
        let removed = self.attached.borrow_mut().remove(id);
        if let Some((list, closure)) = removed
            && let Err(err) = list
                .remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
        {
            log::debug!("matchMedia listener for {channel} not removed: {}", js_reason(&err));
        }
    }
}
