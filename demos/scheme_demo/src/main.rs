//! Usage: `scheme_demo [dark|light|toggle] [--persist]`
//!
//! Resolves the color scheme for this machine, applies the requested change,
//! and, unless persisting, follows OS preference changes for a while.

use std::time::Duration;

use umbra_core::prelude::*;
use umbra_platform::NativeHost;

const WATCH_FOR: Duration = Duration::from_secs(15);
const POLL_EVERY: Duration = Duration::from_millis(500);

enum Action {
    Set(ColorScheme),
    Toggle,
}

fn status_line() -> Content<String> {
    Content::computed(|scheme, _set| {
        let swatch = if scheme.is_dark() { "#121212" } else { "#FAFAFA" };
        format!("color scheme: {scheme} (background {swatch})")
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut action = None;
    let mut persist = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--persist" => persist = true,
            "toggle" => action = Some(Action::Toggle),
            other => action = Some(Action::Set(other.parse()?)),
        }
    }

    let host = NativeHost::new();
    let provider = ColorSchemeProvider::new(
        None,
        ConfigOverrides::new().with_use_local_storage(persist),
        host.env.clone(),
    );
    log::info!("{provider:?}");

    let status = status_line();
    println!("{}", provider.render(&status));

    let _printer = provider.subscribe(|scheme| println!("-> {scheme}"));

    // A consumer that only gets the pair injected as props.
    let badge = with_color_scheme(|p: ColorSchemeProps<&'static str>| {
        format!("[{}] {}", p.color_scheme.as_str().to_uppercase(), p.props)
    });

    match action {
        Some(Action::Set(scheme)) => provider.set(scheme),
        Some(Action::Toggle) => provider.provide(|| {
            if let Some((scheme, set)) = use_color_scheme() {
                set.set(scheme.toggled());
            }
        }),
        None => {}
    }
    println!("{}", provider.provide(|| badge("umbra"))?);

    if provider.watcher_state() == WatcherState::Active {
        println!(
            "following OS preference for {}s (change it now)",
            WATCH_FOR.as_secs()
        );
        let mut waited = Duration::ZERO;
        while waited < WATCH_FOR {
            std::thread::sleep(POLL_EVERY);
            waited += POLL_EVERY;
            host.poll();
        }
    } else if persist {
        println!(
            "stored under `{}`; OS changes are ignored while a stored choice exists",
            provider.config().local_storage_key
        );
    }

    println!("{}", provider.render(&status));
    Ok(())
}
