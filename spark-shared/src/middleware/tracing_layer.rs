use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. JSON output when `SPARK_ENV=production`,
/// human-readable lines otherwise.
pub fn init_tracing(service_name: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    let is_production = std::env::var("SPARK_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    if is_production {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }

    tracing::info!(service = service_name, "tracing initialized");
}

/// Crate targets use underscores, service names use dashes.
fn default_directives(service_name: &str) -> String {
    let target = service_name.replace('-', "_");
    format!("info,{target}=debug,spark_shared=debug,tower_http=debug")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_target_the_crate_name() {
        let directives = default_directives("spark-relations");
        assert!(directives.contains("spark_relations=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
