use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise our crate at info (debug when verbose) and
/// the HTTP stack only at warn, so request URLs are logged once.
fn harvest_filter(verbose: bool) -> EnvFilter {
    let directives = if verbose {
        "wfs_harvest=debug,reqwest=info,hyper=warn,info"
    } else {
        "wfs_harvest=info,reqwest=warn,hyper=warn,warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// 報表走 stdout，日誌一律寫 stderr
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(harvest_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// JSON 格式日誌，方便批次作業收集
pub fn init_json_logger() {
    tracing_subscriber::registry()
        .with(harvest_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(false),
        )
        .init();
}
