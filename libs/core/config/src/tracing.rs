//! Logging and error-report setup shared by the binaries.

use crate::Environment;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the color-eyre report hook.
///
/// Reports show the error location but not the environment section, which
/// would print `MONGODB_URL` and friends. Later calls are no-ops.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Directives used when `RUST_LOG` is unset or unparsable.
///
/// Our crates log at debug in development; the driver and HTTP layers stay
/// quieter so request logs are readable.
pub fn default_directives(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => "info,tower_http=info,mongodb=warn",
        Environment::Development => {
            "info,users_api=debug,domain_users=debug,axum_helpers=debug,database=debug,tower_http=debug,mongodb=info"
        }
    }
}

/// `RUST_LOG` when it parses, otherwise [`default_directives`].
pub fn build_filter(environment: Environment) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(environment)))
}

/// Install the global subscriber: JSON lines in production, pretty output
/// otherwise, both with an `ErrorLayer` so eyre reports carry span traces.
///
/// Returns quietly when a subscriber is already set (tests do this).
pub fn init_tracing(environment: &Environment) {
    let environment = *environment;

    let fmt_layer = if environment.is_production() {
        fmt::layer()
            .json()
            .with_target(false)
            .flatten_event(true)
            .boxed()
    } else {
        fmt::layer().with_target(true).pretty().boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .with(build_filter(environment))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(?environment, "Tracing initialized");
    } else {
        tracing::debug!("Tracing already initialized");
    }
}
