pub use crate::{
    ColorScheme, ColorSchemeProps, ColorSchemeProvider, Config, ConfigOverrides, Content,
    Dispose, HostEnv, MediaChannel, MediaQueryHost, SchemeError, SchemeHandle, SchemeSetter,
    WatcherState, use_color_scheme, with_color_scheme,
};
