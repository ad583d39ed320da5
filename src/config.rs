use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shared credential expected by the collector API.
    pub api_key: String,

    /// Collector endpoint receiving usage reports.
    pub api_endpoint: String,

    #[serde(default = "default_tcp_status_file")]
    pub tcp_status_file: PathBuf,

    #[serde(default = "default_udp_status_file")]
    pub udp_status_file: PathBuf,

    /// Poll period in seconds; should match the status rewrite period of
    /// the VPN daemon (its `status <file> <period>` directive).
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,

    /// Request timeout for one usage report.
    #[serde(default = "default_report_timeout_secs")]
    pub report_timeout_secs: u64,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_tcp_status_file() -> PathBuf {
    PathBuf::from("/etc/openvpn/openvpn-status-tcp.log")
}

fn default_udp_status_file() -> PathBuf {
    PathBuf::from("/etc/openvpn/openvpn-status-udp.log")
}

fn default_period_secs() -> u64 {
    10
}

fn default_report_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_applies_defaults() {
        let content = r#"
api_key = "Ex4mpl3_K3y"
api_endpoint = "https://example.com/API/bw_update.php"
"#;
        let file = create_temp_file(content);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.api_key, "Ex4mpl3_K3y");
        assert_eq!(
            config.tcp_status_file,
            PathBuf::from("/etc/openvpn/openvpn-status-tcp.log")
        );
        assert_eq!(
            config.udp_status_file,
            PathBuf::from("/etc/openvpn/openvpn-status-udp.log")
        );
        assert_eq!(config.period_secs, 10);
        assert_eq!(config.report_timeout_secs, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let content = r#"
api_key = "k"
api_endpoint = "http://127.0.0.1:8080/bw_update.php"
tcp_status_file = "/var/run/status-tcp.log"
udp_status_file = "/var/run/status-udp.log"
period_secs = 30
report_timeout_secs = 5
log_level = "debug"
"#;
        let file = create_temp_file(content);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.tcp_status_file, PathBuf::from("/var/run/status-tcp.log"));
        assert_eq!(config.period_secs, 30);
        assert_eq!(config.report_timeout_secs, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let file = create_temp_file("api_key = \"k\"\n");
        assert!(Config::load(file.path()).is_err());
    }
}
