use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Logs go to stderr so `--json` output stays clean. Silent unless `verbose`
/// or `RUST_LOG` is set.
pub fn init_logging(verbose: bool) {
    let from_env = EnvFilter::try_from_default_env().ok();
    let level_filter = match (verbose, from_env.is_some()) {
        (true, _) => LevelFilter::DEBUG,
        (false, true) => LevelFilter::TRACE,
        (false, false) => LevelFilter::OFF,
    };
    let app_filter = Targets::new().with_target("tufe", level_filter);
    let env_filter = from_env.unwrap_or_else(|| {
        EnvFilter::new(if verbose { "debug" } else { "off" })
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter)
        .init();
}
