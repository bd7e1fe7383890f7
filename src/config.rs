use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // Flat-file storage
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_ai_response_file")]
    pub ai_response_file: PathBuf,

    // Frontend page served at "/"
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,

    // Analysis webhook (n8n)
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_secs: u64,

    #[serde(default = "default_max_request_body")]
    pub max_request_body_kb: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_data_file() -> PathBuf {
    PathBuf::from("user_data.json")
}

fn default_ai_response_file() -> PathBuf {
    PathBuf::from("ai_recommendations.json")
}

fn default_index_file() -> PathBuf {
    PathBuf::from("index.html")
}

fn default_webhook_url() -> String {
    "https://h12user.app.n8n.cloud/webhook/webhook-test/medical-analysis".to_string()
}

fn default_webhook_timeout() -> u64 {
    30
}

fn default_max_request_body() -> usize {
    1024
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.max_request_body_kb * 1024
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URLs printed at startup so the form can be opened from a browser.
    pub fn display_urls(&self) -> Vec<String> {
        let mut urls = vec![
            format!("http://localhost:{}", self.port),
            format!("http://127.0.0.1:{}", self.port),
        ];
        let own = format!("http://{}:{}", self.host, self.port);
        if !urls.contains(&own) {
            urls.push(own);
        }
        urls
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageBackend::default(),
            data_file: default_data_file(),
            ai_response_file: default_ai_response_file(),
            index_file: default_index_file(),
            webhook_url: default_webhook_url(),
            webhook_timeout_secs: default_webhook_timeout(),
            max_request_body_kb: default_max_request_body(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.data_file, PathBuf::from("user_data.json"));
        assert_eq!(config.ai_response_file, PathBuf::from("ai_recommendations.json"));
        assert_eq!(config.webhook_timeout(), Duration::from_secs(30));
        assert!(config.webhook_url.ends_with("/medical-analysis"));
    }

    #[test]
    fn test_overrides() {
        let config: Config = envy::from_iter(vec![
            ("PORT".to_string(), "8080".to_string()),
            ("DATA_FILE".to_string(), "/tmp/intake.json".to_string()),
            ("WEBHOOK_TIMEOUT_SECS".to_string(), "5".to_string()),
            ("STORAGE".to_string(), "memory".to_string()),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.data_file, PathBuf::from("/tmp/intake.json"));
        assert_eq!(config.webhook_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_display_urls_skip_duplicate_host() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.display_urls(),
            vec!["http://localhost:5000", "http://127.0.0.1:5000"]
        );

        let config = Config::default();
        assert_eq!(config.display_urls().len(), 3);
    }
}
