//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. gcontacts.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default Google Contacts feed root
pub const DEFAULT_BASE_URL: &str = "https://www.google.com/m8/feeds/";

/// Contacts API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// OAuth access token sent as a bearer token
    #[serde(default)]
    pub access_token: String,

    /// Feed root that relative paths are joined to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("gcontacts/{}", env!("CARGO_PKG_VERSION"))
}

/// Main configuration for gcontacts
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Contacts API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                while let Some(c) = chars.next() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// # 引数
    /// * `path` - TOML ファイルのパス
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut cfg = Self::from_toml_config(config);

        // 環境変数が優先
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./gcontacts.toml` があればそれを使い、なければ環境変数のみ。
    pub fn load() -> crate::Result<Self> {
        if Path::new("gcontacts.toml").exists() {
            return Self::from_toml_file("gcontacts.toml");
        }

        Self::from_env()
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let api = toml.api.unwrap_or_default();

        Config {
            api: ApiConfig {
                access_token: api.access_token.unwrap_or_default(),
                base_url: api.base_url.unwrap_or_else(default_base_url),
                timeout_secs: api.timeout_secs.unwrap_or_else(default_timeout_secs),
                user_agent: api.user_agent.unwrap_or_else(default_user_agent),
            },
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("GCONTACTS_ACCESS_TOKEN") {
            if !token.is_empty() {
                self.api.access_token = token;
            }
        }

        if let Ok(base_url) = std::env::var("GCONTACTS_BASE_URL") {
            if !base_url.is_empty() {
                self.api.base_url = base_url;
            }
        }

        if let Ok(timeout) = std::env::var("GCONTACTS_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.api.timeout_secs = t;
            }
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let access_token = std::env::var("GCONTACTS_ACCESS_TOKEN")
            .map_err(|_| Error::Config("GCONTACTS_ACCESS_TOKEN not set".to_string()))?;

        Ok(Config {
            api: ApiConfig {
                access_token,
                base_url: std::env::var("GCONTACTS_BASE_URL")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(default_base_url),
                timeout_secs: std::env::var("GCONTACTS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or_else(default_timeout_secs),
                user_agent: default_user_agent(),
            },
        })
    }
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

/// TOML ファイル用のトップレベル構造
#[derive(Debug, Deserialize)]
struct TomlConfig {
    /// API 設定
    api: Option<TomlApiConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlApiConfig {
    /// アクセストークン
    #[serde(default)]
    access_token: Option<String>,
    /// ベース URL
    #[serde(default)]
    base_url: Option<String>,
    /// タイムアウト（秒）
    #[serde(default)]
    timeout_secs: Option<u64>,
    /// User-Agent
    #[serde(default)]
    user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://www.google.com/m8/feeds/");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.access_token.is_empty());
        assert!(config.user_agent.starts_with("gcontacts/"));
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("GC_CORE_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${GC_CORE_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        // 存在しない環境変数
        let result = Config::expand_env_vars("prefix_${GC_CORE_NONEXISTENT_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("GC_CORE_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("cost $5"), "cost $5");
    }

    #[test]
    fn test_expand_env_vars_empty_name() {
        assert_eq!(Config::expand_env_vars("${}_content"), "_content");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[api]
access_token = "token"
base_url = "https://contacts.example.com/feeds/"
timeout_secs = 5
"#;

        let toml_config: TomlConfig = toml::from_str(toml_content).unwrap();
        let config = Config::from_toml_config(toml_config);

        assert_eq!(config.api.access_token, "token");
        assert_eq!(config.api.base_url, "https://contacts.example.com/feeds/");
        assert_eq!(config.api.timeout_secs, 5);
        assert!(config.api.user_agent.starts_with("gcontacts/"));
    }

    #[test]
    fn test_toml_config_missing_section_uses_defaults() {
        let toml_config: TomlConfig = toml::from_str("").unwrap();
        let config = Config::from_toml_config(toml_config);

        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_from_toml_file_expands_env() {
        unsafe {
            std::env::set_var("GC_CORE_FILE_TOKEN", "from_env");
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\naccess_token = \"${{GC_CORE_FILE_TOKEN}}\"").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        // GCONTACTS_ACCESS_TOKEN が設定されていれば上書きされる
        if std::env::var("GCONTACTS_ACCESS_TOKEN").is_err() {
            assert_eq!(config.api.access_token, "from_env");
        }

        unsafe {
            std::env::remove_var("GC_CORE_FILE_TOKEN");
        }
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = Config::from_toml_file("/nonexistent/gcontacts.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
