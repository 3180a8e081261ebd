const LOG_ENV: &str = "EXPRBRIDGE_LOG";

/// Installs the global subscriber for the library's events.
/// The filter is read from `EXPRBRIDGE_LOG` (e.g., `forward=debug,reverse=trace`)
/// and defaults to warnings. Does nothing if a subscriber is already set.
pub fn init_logging() {
    use tracing_subscriber::{
        EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV.to_string())
        .from_env_lossy()
        .add_directive(
            "z3=off"
                .parse()
                .unwrap_or_else(|e| panic!("Invalid built-in log directive: {e}")),
        );

    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_bracketed_fields(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tree_layer)
        .try_init()
        .inspect(|_| common::log_debug!("Logging initialized"));
}
