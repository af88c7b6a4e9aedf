use std::panic::{self, PanicHookInfo};
use std::thread;

/// Filter used when neither `--log-filter` nor `RUST_LOG` is given
pub const DEFAULT_FILTER: &str = "info,econ_lab=debug";

/// Installs the global subscriber. Logs go to stderr so exported results on
/// stdout stay clean.
///
/// `env_filter` uses the `tracing_subscriber::EnvFilter` directive syntax,
/// e.g. `warn,econ_lab::sweep=debug`.
pub fn initialize(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    set_panic_hook();
}

/// Like [`initialize`] but tolerates an existing subscriber; for tests.
pub fn initialize_reentrant(env_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

// Panics are logged in addition to the default printer.
fn set_panic_hook() {
    let default_hook = panic::take_hook();
    let hook = move |info: &PanicHookInfo| {
        let thread = thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");
        tracing::error!(thread = thread_name, "{}", info);
        default_hook(info);
    };
    panic::set_hook(Box::new(hook));
}
