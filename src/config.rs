use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// 客户端配置：默认值 + 环境变量覆盖（支持 .env）
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 后端 API 根路径（含版本号）
    pub api_base: String,
    pub timeout: Duration,
    /// 扫描任务轮询间隔
    pub scan_poll_interval: Duration,
    /// K线默认天数
    pub kline_days: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            scan_poll_interval: Duration::from_millis(1000),
            kline_days: 60,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base: std::env::var("THREEBROS_API_BASE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            timeout: env_parse::<u64>("THREEBROS_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            scan_poll_interval: env_parse::<u64>("THREEBROS_SCAN_POLL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.scan_poll_interval),
            kline_days: env_parse::<u32>("THREEBROS_KLINE_DAYS")
                .filter(|d| (1..=365).contains(d))
                .unwrap_or(defaults.kline_days),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
