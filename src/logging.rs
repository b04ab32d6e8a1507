use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use crate::flags::Flags;

/// Installs the stderr subscriber for the lifetime of the returned guard.
///
/// `RUST_LOG` wins over `--debug`, which wins over the warn-level default.
pub fn init(flags: &Flags) -> DefaultGuard {
    let default_directive = if flags.is_set("debug") {
        "initialterm=debug"
    } else {
        "initialterm=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}
