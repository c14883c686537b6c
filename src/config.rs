use tracing_subscriber::EnvFilter;

/// Crate-level constants
pub const CRATE_NAME: &str = "cbam-core";
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CBAM QReport schema version the taxonomy and serializer target.
pub const SCHEMA_VERSION: &str = "23.00";

/// Default namespace of the generated QReport document.
pub const CBAM_NAMESPACE: &str = "urn:eu:ec:cbam:qreport:v2300";

/// XSD filename referenced from xsi:schemaLocation.
pub const SCHEMA_FILENAME: &str = "QReport_ver23.00.xsd";

/// Default tracing filter for embedding applications.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", CRATE_NAME.replace('-', "_"))
}

/// Install a global tracing subscriber, honoring `RUST_LOG` and falling
/// back to [`default_log_filter`]. Returns false when a subscriber is
/// already installed (harmless; the existing one stays).
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_matches_namespace() {
        let compact = SCHEMA_VERSION.replace('.', "");
        assert!(CBAM_NAMESPACE.ends_with(&format!("v{compact}")));
        assert!(SCHEMA_FILENAME.contains(SCHEMA_VERSION));
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().contains("cbam_core=debug"));
    }
}
