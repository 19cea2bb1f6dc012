use std::env;

use crate::parser::BASE_URL;

/// IqDB 單檔上限 8192 KB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    /// 上游 IqDB 的位址（結果網址一律以 iqdb.org 解析）
    pub upstream_url: String,
    /// 未設定則不設逾時
    pub upstream_timeout_secs: Option<u64>,
    pub max_upload_bytes: usize,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            listen_addr: lookup("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            upstream_url: lookup("IQDB_URL").unwrap_or_else(|| BASE_URL.to_string()),
            upstream_timeout_secs: lookup("UPSTREAM_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.upstream_url, "https://iqdb.org/");
        assert_eq!(config.upstream_timeout_secs, None);
        assert_eq!(config.max_upload_bytes, 8 * 1024 * 1024);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("LISTEN_ADDR", "127.0.0.1:3000"),
            ("IQDB_URL", "http://localhost:9000/"),
            ("UPSTREAM_TIMEOUT_SECS", "15"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("LOG_LEVEL", "debug"),
        ]);
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.upstream_url, "http://localhost:9000/");
        assert_eq!(config.upstream_timeout_secs, Some(15));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let config = config(&[
            ("UPSTREAM_TIMEOUT_SECS", "soon"),
            ("MAX_UPLOAD_BYTES", "-1"),
        ]);
        assert_eq!(config.upstream_timeout_secs, None);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
