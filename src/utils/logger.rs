use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("trip_etl=debug,info")
        } else {
            EnvFilter::new("trip_etl=info")
        }
    })
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

fn json_subscriber(verbose: bool) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry().with(default_filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .json()
            .with_current_span(false),
    )
}

/// JSON 格式日誌，方便交給集中式日誌系統
pub fn init_json_logger(verbose: bool) {
    json_subscriber(verbose).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_subscriber_handles_events() {
        tracing::subscriber::with_default(json_subscriber(true), || {
            let span = tracing::info_span!("batch", rows = 2);
            let _guard = span.enter();
            tracing::info!(total = 2, "Inserted batch");
        });
    }
}
