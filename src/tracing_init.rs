//! Tracing setup with environment-based filtering.
//!
//! `RUST_LOG=ft8rx=debug` shows stage-level diagnostics;
//! `RUST_LOG=ft8rx::sync=trace` narrows to one module.

use once_cell::sync::Lazy;

/// Initialize tracing for binaries. Call once, early in main().
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ft8rx=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Initialize tracing for tests. Safe to call from every test; the
/// subscriber is installed once.
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ft8rx=warn"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .init();
    });

    Lazy::force(&TRACING);
}
