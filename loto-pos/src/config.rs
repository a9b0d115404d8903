use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use loto_client::ClientConfig;
use loto_client::config::DEFAULT_BASE_URL;

/// 默认业务时区
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Bogota;

/// 前端配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | FLOR_API_URL | http://localhost:3000/api | 后端 API 地址 |
/// | FLOR_DATA_DIR | .flor-pos | 会话文件、导出的 PDF |
/// | FLOR_TIMEZONE | America/Bogota | 报表日期范围使用的时区 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | PAY_RETRY_ATTEMPTS | 2 | 结账时标记付款的额外重试次数 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (none) | 日志目录，设置后按天滚动写文件 |
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timezone: Tz,
    pub request_timeout_ms: u64,
    pub pay_retry_attempts: u32,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("FLOR_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            data_dir: std::env::var("FLOR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".flor-pos")),
            timezone: std::env::var("FLOR_TIMEZONE")
                .ok()
                .and_then(|tz| parse_timezone(&tz))
                .unwrap_or(DEFAULT_TIMEZONE),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            pay_retry_attempts: std::env::var("PAY_RETRY_ATTEMPTS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(2),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone())
            .with_timeout(Duration::from_millis(self.request_timeout_ms))
    }

    /// Directory where exported PDFs land
    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// IANA name → timezone, unknown names are logged and rejected
pub fn parse_timezone(name: &str) -> Option<Tz> {
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            tracing::warn!(timezone = name, "Unknown timezone, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Europe/Madrid"), Some(chrono_tz::Europe::Madrid));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }

    #[test]
    fn test_client_config_carries_timeout() {
        let config = Config {
            api_url: "http://pos.local/api".into(),
            data_dir: PathBuf::from("/tmp/flor"),
            timezone: DEFAULT_TIMEZONE,
            request_timeout_ms: 1500,
            pay_retry_attempts: 0,
            log_level: "debug".into(),
            log_dir: None,
        };
        let client = config.client_config();
        assert_eq!(client.base_url, "http://pos.local/api");
        assert_eq!(client.timeout, Duration::from_millis(1500));
        assert!(client.token.is_none());
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/flor/exports"));
    }
}
