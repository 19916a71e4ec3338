use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_file_size: usize,
    pub cache_ttl: Duration,
    pub eviction_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_or("PORT", 3000);
        let max_file_size_mb: usize = env_or("MAX_FILE_SIZE_MB", 25);
        let cache_ttl_seconds = env_or("CACHE_TTL_SECONDS", 3600);
        let eviction_interval_seconds = env_or("EVICTION_INTERVAL_SECONDS", 300);

        Self {
            port,
            max_file_size: max_file_size_mb * 1024 * 1024,
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            eviction_interval: Duration::from_secs(eviction_interval_seconds),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
