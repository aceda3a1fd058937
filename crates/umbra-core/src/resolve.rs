use crate::{ColorScheme, MediaChannel, MediaQueryHost, Persistence};

/// Where an initial scheme came from, highest precedence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrecedenceTier {
    Persisted,
    OsQuery,
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub scheme: ColorScheme,
    pub tier: PrecedenceTier,
}

/// Computes the initial scheme; first match wins:
///
/// 1. with `use_local_storage` and an available store, a persisted value that
///    is exactly `"dark"` or `"light"`;
/// 2. with a media host, whichever of the dark/light channels matches;
/// 3. `default_value`.
///
/// The store is not touched at all unless `use_local_storage` is set.
pub fn resolve(
    default_value: ColorScheme,
    use_local_storage: bool,
    local_storage_key: &str,
    storage: &Persistence,
    media: Option<&dyn MediaQueryHost>,
) -> Resolution {
    if use_local_storage && storage.is_available() {
        match storage.read(local_storage_key) {
            Some(stored) => match ColorScheme::from_stored(&stored) {
                Some(scheme) => {
                    return Resolution {
                        scheme,
                        tier: PrecedenceTier::Persisted,
                    };
                }
                None => log::debug!("ignoring unexpected stored color scheme {stored:?}"),
            },
            None => log::trace!("nothing stored under `{local_storage_key}`"),
        }
    }

    if let Some(media) = media {
        for channel in [MediaChannel::Dark, MediaChannel::Light] {
            if media.matches(channel) {
                return Resolution {
                    scheme: channel.scheme_or(default_value),
                    tier: PrecedenceTier::OsQuery,
                };
            }
        }
    }

    Resolution {
        scheme: default_value,
        tier: PrecedenceTier::Default,
    }
}

pub fn resolve_initial(
    default_value: ColorScheme,
    use_local_storage: bool,
    local_storage_key: &str,
    storage: &Persistence,
    media: Option<&dyn MediaQueryHost>,
) -> ColorScheme {
    resolve(
        default_value,
        use_local_storage,
        local_storage_key,
        storage,
        media,
    )
    .scheme
}
