use crate::adapters::gemini::{
    GeminiSettings, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_NARRATIVE_MODEL,
};
use crate::adapters::http::{DEFAULT_IP_LOOKUP_URL, DEFAULT_WEBHOOK_URL};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_non_empty_string, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_USER_AGENT: &str = concat!("nuvem-cultural/", env!("CARGO_PKG_VERSION"));

/// 站台設定。每個區段都可省略，省略時使用內建預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub survey: SurveyConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_WEBHOOK_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    pub url: String,
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_narrative_model")]
    pub narrative_model: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_narrative_model() -> String {
    DEFAULT_NARRATIVE_MODEL.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            image_model: default_image_model(),
            narrative_model: default_narrative_model(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// 設定後改用外部表單，不在本地送出問卷
    pub external_form_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 替代的模組目錄 JSON 檔
    pub path: Option<String>,
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 生成 API 金鑰：設定檔優先，其次 GEMINI_API_KEY、API_KEY
    pub fn resolve_api_key(&self) -> Option<String> {
        self.generator
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// 設定外部表單時，問卷改由該網址填寫
    pub fn external_survey_url(&self) -> Option<&str> {
        self.survey
            .external_form_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// 只有在需要生成內容時才要求金鑰
    pub fn gemini_settings(&self) -> Result<GeminiSettings> {
        let api_key = self.resolve_api_key();
        let api_key = validate_required_field("generator.api_key", &api_key)?;

        Ok(GeminiSettings {
            base_url: self.generator.base_url.clone(),
            api_key: api_key.clone(),
            image_model: self.generator.image_model.clone(),
            narrative_model: self.generator.narrative_model.clone(),
        })
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        validate_url("webhook.url", &self.webhook.url)?;
        validate_url("ip_lookup.url", &self.ip_lookup.url)?;
        validate_url("generator.base_url", &self.generator.base_url)?;
        validate_non_empty_string("generator.image_model", &self.generator.image_model)?;
        validate_non_empty_string("generator.narrative_model", &self.generator.narrative_model)?;

        if let Some(url) = &self.survey.external_form_url {
            validate_url("survey.external_form_url", url)?;
        }

        Ok(())
    }
}
