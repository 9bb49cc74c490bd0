use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    pub model: String,
    pub max_prompt_len: usize,
    pub read_timeout_secs: Option<u64>,
    pub auth_url: Option<String>,
    pub rate_limit_per_minute: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    upstream: UpstreamSection,
    #[serde(default)]
    auth: AuthSection,
    #[serde(default)]
    rate_limit: RateLimitSection,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpstreamSection {
    #[serde(default = "default_upstream_url")]
    url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_max_prompt_len")]
    max_prompt_len: usize,
    #[serde(default)]
    read_timeout_secs: Option<u64>,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            model: default_model(),
            max_prompt_len: default_max_prompt_len(),
            read_timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct AuthSection {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RateLimitSection {
    #[serde(default)]
    requests_per_minute: Option<u64>,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            requests_per_minute: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_max_prompt_len() -> usize {
    1500
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(file_config) = load_from_file()? {
            return Ok(Self {
                host: file_config.server.host,
                port: file_config.server.port,
                upstream_url: file_config.upstream.url,
                model: file_config.upstream.model,
                max_prompt_len: file_config.upstream.max_prompt_len,
                read_timeout_secs: file_config.upstream.read_timeout_secs,
                auth_url: file_config.auth.url,
                rate_limit_per_minute: file_config.rate_limit.requests_per_minute,
            });
        }

        Ok(Self::from_env())
    }

    fn from_env() -> Self {
        let host = env::var("PROMPTRELAY_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("PROMPTRELAY_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let upstream_url =
            env::var("LOCAL_AI_API_URL").unwrap_or_else(|_| default_upstream_url());
        let model = env::var("PROMPTRELAY_MODEL").unwrap_or_else(|_| default_model());
        let max_prompt_len = env::var("PROMPTRELAY_MAX_PROMPT_LEN")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or_else(default_max_prompt_len);
        let read_timeout_secs = env::var("PROMPTRELAY_READ_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());
        let auth_url = env::var("PROMPTRELAY_AUTH_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let rate_limit_per_minute = env::var("PROMPTRELAY_RATE_LIMIT_RPM")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());

        Self {
            host,
            port,
            upstream_url,
            model,
            max_prompt_len,
            read_timeout_secs,
            auth_url,
            rate_limit_per_minute,
        }
    }
}

fn load_from_file() -> anyhow::Result<Option<FileConfig>> {
    let config_path = env::var("PROMPTRELAY_CONFIG").ok();
    let path = if let Some(path) = config_path {
        Some(path)
    } else if Path::new("promptrelay.toml").exists() {
        Some("promptrelay.toml".to_string())
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(None);
    };

    let contents = fs::read_to_string(&path)
        .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path, err))?;
    let parsed: FileConfig = toml::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path, err))?;
    Ok(Some(parsed))
}
