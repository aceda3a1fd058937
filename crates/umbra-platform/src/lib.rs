//! Host adapters for Umbra.
//!
//! - desktop: [`FileStore`] (JSON file under the user config dir) and
//!   [`SystemMediaHost`] (OS detection via `dark-light`, driven by `poll`);
//! - web (`wasm32`): `WebStorage` (`localStorage`) and `WebMediaHost`
//!   (`matchMedia` change listeners).

#[cfg(not(target_arch = "wasm32"))]
mod store;
#[cfg(not(target_arch = "wasm32"))]
mod system;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use store::FileStore;
#[cfg(not(target_arch = "wasm32"))]
pub use system::{Detector, SystemMediaHost};
#[cfg(target_arch = "wasm32")]
pub use web::{WebMediaHost, WebStorage};

#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeHost;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::rc::Rc;

    use umbra_core::{HostEnv, Persistence};

    use crate::{FileStore, SystemMediaHost};

    /// Desktop host: a file store (if one can be opened) and the OS
    /// preference host. The event loop should call [`NativeHost::poll`]
    /// periodically to deliver OS changes.
    pub struct NativeHost {
        pub env: HostEnv,
        pub media: Rc<SystemMediaHost>,
    }

    impl NativeHost {
        pub fn new() -> Self {
            let storage = match FileStore::open_default() {
                Ok(store) => Persistence::new(Rc::new(store)),
                Err(err) => {
                    log::warn!("color scheme persistence disabled: {err:#}");
                    Persistence::none()
                }
            };
            Self::with_parts(storage, Rc::new(SystemMediaHost::new()))
        }

        pub fn with_parts(storage: Persistence, media: Rc<SystemMediaHost>) -> Self {
            let env = HostEnv {
                storage,
                media: Some(media.clone()),
            };
            Self { env, media }
        }

        pub fn poll(&self) -> bool {
            self.media.poll()
        }
    }

    impl Default for NativeHost {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Browser host environment: `localStorage` plus `matchMedia`.
#[cfg(target_arch = "wasm32")]
pub fn web_env() -> umbra_core::HostEnv {
    use std::rc::Rc;

    umbra_core::HostEnv::detached()
        .with_storage(Rc::new(WebStorage::local()))
        .with_media(Rc::new(WebMediaHost::new()))
}
