//! Read surfaces for consumers running inside a provider's subtree.
//!
//! - [`use_color_scheme`] / [`color_scheme_handle`] — direct read primitive.
//! - [`with_color_scheme`] — wraps a consumer so it receives the current
//!   scheme and the setter alongside its own props.
//!
//! ```rust
//! use umbra_core::*;
//!
//! struct Label {
//!     text: &'static str,
//! }
//!
//! let label = with_color_scheme(|p: ColorSchemeProps<Label>| {
//!     format!("{} ({})", p.props.text, p.color_scheme)
//! });
//!
//! let provider = ColorSchemeProvider::new(
//!     Some(ColorScheme::Dark),
//!     ConfigOverrides::new(),
//!     HostEnv::detached(),
//! );
//! let out = provider.provide(|| label(Label { text: "Save" }));
//! assert_eq!(out.unwrap(), "Save (dark)");
//!
//! assert_eq!(label(Label { text: "Save" }), Err(SchemeError::NoProvider));
//! ```

use crate::locals::local;
use crate::{ColorScheme, SchemeError, SchemeHandle, SchemeSetter};

/// Handle of the innermost provider whose subtree is running.
pub fn color_scheme_handle() -> Option<SchemeHandle> {
    local::<SchemeHandle>()
}

/// Current scheme and setter of the innermost provider.
pub fn use_color_scheme() -> Option<(ColorScheme, SchemeSetter)> {
    color_scheme_handle().map(|handle| handle.pair())
}

/// Like [`use_color_scheme`], but reports a missing provider as an error.
pub fn try_use_color_scheme() -> Result<(ColorScheme, SchemeSetter), SchemeError> {
    use_color_scheme().ok_or(SchemeError::NoProvider)
}

/// A consumer's own props plus the injected color-scheme pair.
#[derive(Clone, Debug)]
pub struct ColorSchemeProps<P> {
    pub props: P,
    pub color_scheme: ColorScheme,
    pub handle_change_color_scheme: SchemeSetter,
}

impl<P> ColorSchemeProps<P> {
    pub fn toggle(&self) {
        self.handle_change_color_scheme
            .set(self.color_scheme.toggled());
    }
}

/// Wraps `consumer` so every call receives the current pair from the
/// innermost provider. Calling the wrapped consumer outside any provider
/// yields [`SchemeError::NoProvider`].
pub fn with_color_scheme<P, R>(
    consumer: impl Fn(ColorSchemeProps<P>) -> R + 'static,
) -> impl Fn(P) -> Result<R, SchemeError> {
    move |props| {
        let (color_scheme, handle_change_color_scheme) = try_use_color_scheme()?;
        Ok(consumer(ColorSchemeProps {
            props,
            color_scheme,
            handle_change_color_scheme,
        }))
    }
}
