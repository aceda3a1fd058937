//! # Color scheme resolution and synchronization
//!
//! Umbra keeps a binary `dark`/`light` preference consistent across a tree of
//! consumers while three signals compete for it:
//!
//! - an explicit default value,
//! - a persisted user choice (optional, via a [`KeyValueStore`]),
//! - live OS preference notifications (via a [`MediaQueryHost`]).
//!
//! ## Resolution
//!
//! When a [`ColorSchemeProvider`] is constructed, the initial scheme is
//! resolved once: a valid persisted value wins over the OS query, which wins
//! over the default. See [`resolve()`].
//!
//! ## Watching
//!
//! If listening is enabled and no persisted value takes precedence, the
//! provider subscribes to the `dark`, `light` and `no-preference` channels.
//! A matching `no-preference` event restores the configured default.
//!
//! ```rust
//! use std::rc::Rc;
//! use umbra_core::*;
//!
//! let os = Rc::new(ManualMediaHost::new());
//! let provider = ColorSchemeProvider::new(
//!     Some(ColorScheme::Light),
//!     ConfigOverrides::new(),
//!     HostEnv::detached().with_media(os.clone()),
//! );
//! assert_eq!(provider.watcher_state(), WatcherState::Active);
//!
//! os.set_preference(Some(ColorScheme::Dark));
//! assert_eq!(provider.current(), ColorScheme::Dark);
//!
//! os.set_preference(None);
//! assert_eq!(provider.current(), ColorScheme::Light);
//! ```
//!
//! ## Consumers
//!
//! Inside [`ColorSchemeProvider::provide`], any code can read the live pair
//! with [`use_color_scheme`], or be wrapped with [`with_color_scheme`] to get
//! it injected as props. Subscriptions made there are released when the
//! provider is torn down.
//!
//! Everything here is single-threaded: handles are `Rc`-based and callbacks
//! are expected to arrive on the thread that owns the provider.

pub mod config;
pub mod consumer;
pub mod effects;
pub mod error;
pub mod locals;
pub mod media;
pub mod prelude;
pub mod provider;
pub mod resolve;
pub mod scheme;
pub mod scope;
pub mod signal;
pub mod storage;
pub mod watcher;

pub use config::*;
pub use consumer::*;
pub use effects::*;
pub use error::*;
pub use media::*;
pub use provider::*;
pub use resolve::*;
pub use scheme::*;
pub use scope::*;
pub use signal::*;
pub use storage::*;
pub use watcher::*;
