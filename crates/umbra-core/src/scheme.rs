use std::fmt;
use std::str::FromStr;

use crate::SchemeError;

/// The binary UI color-scheme preference.
///
/// `no-preference` is never a value of this type: it only exists as an OS
/// signal channel (see [`MediaChannel::NoPreference`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ColorScheme {
    Dark,
    #[default]
    Light,
}

impl ColorScheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Dark => "dark",
            ColorScheme::Light => "light",
        }
    }

    /// Exact match against a persisted string. Anything other than `"dark"`
    /// or `"light"` (including case variants and whitespace) is rejected.
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "dark" => Some(ColorScheme::Dark),
            "light" => Some(ColorScheme::Light),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            ColorScheme::Dark => ColorScheme::Light,
            ColorScheme::Light => ColorScheme::Dark,
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, ColorScheme::Dark)
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorScheme {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_stored(s).ok_or_else(|| SchemeError::InvalidScheme(s.to_string()))
    }
}

/// Media query that reports "not all" on hosts without color-scheme support.
pub const UMBRELLA_QUERY: &str = "(prefers-color-scheme)";

/// One of the three OS preference channels a host exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaChannel {
    Dark,
    Light,
    NoPreference,
}

impl MediaChannel {
    pub const ALL: [MediaChannel; 3] = [
        MediaChannel::Dark,
        MediaChannel::Light,
        MediaChannel::NoPreference,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MediaChannel::Dark => "dark",
            MediaChannel::Light => "light",
            MediaChannel::NoPreference => "no-preference",
        }
    }

    pub const fn query(self) -> &'static str {
        match self {
            MediaChannel::Dark => "(prefers-color-scheme: dark)",
            MediaChannel::Light => "(prefers-color-scheme: light)",
            MediaChannel::NoPreference => "(prefers-color-scheme: no-preference)",
        }
    }

    /// The scheme a matching event on this channel maps to.
    /// `NoPreference` restores `default`.
    pub const fn scheme_or(self, default: ColorScheme) -> ColorScheme {
        match self {
            MediaChannel::Dark => ColorScheme::Dark,
            MediaChannel::Light => ColorScheme::Light,
            MediaChannel::NoPreference => default,
        }
    }

    /// The channel that matches when the OS reports `preference`.
    pub const fn for_preference(preference: Option<ColorScheme>) -> Self {
        match preference {
            Some(ColorScheme::Dark) => MediaChannel::Dark,
            Some(ColorScheme::Light) => MediaChannel::Light,
            None => MediaChannel::NoPreference,
        }
    }
}

impl fmt::Display for MediaChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
