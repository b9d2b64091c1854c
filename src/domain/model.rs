use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::SiteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Gestão")]
    Gestao,
    #[serde(rename = "Social")]
    Social,
    #[serde(rename = "Financeiro")]
    Financeiro,
    #[serde(rename = "Inovação")]
    Inovacao,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Gestao,
        Category::Social,
        Category::Financeiro,
        Category::Inovacao,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Gestao => "Gestão",
            Category::Social => "Social",
            Category::Financeiro => "Financeiro",
            Category::Inovacao => "Inovação",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 移除葡萄牙文重音並轉小寫，讓 `gestao` 與 `Gestão` 視為相同
fn fold_accents(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

impl FromStr for Category {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold_accents(s.trim());
        Category::ALL
            .into_iter()
            .find(|category| fold_accents(category.as_str()) == folded)
            .ok_or_else(|| {
                SiteError::validation(format!(
                    "Unknown category '{}'. Valid categories: {}",
                    s, "Gestão, Social, Financeiro, Inovação"
                ))
            })
    }
}

/// 目前選取的分類：全部或單一分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(active) => *active == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_accents(s.trim()).as_str() {
            "all" | "tudo" => Ok(CategoryFilter::All),
            _ => s.parse().map(CategoryFilter::Only),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub description: String,
    pub features: Vec<String>,
    pub benefits: Vec<String>,
    pub icon: String,
}

pub const DEFAULT_USAGE_LIKELIHOOD: u8 = 3;

/// 問卷答案。欄位只能經由 `core::survey` 的驗證方法修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyState {
    pub(crate) usage_likelihood: u8,
    pub(crate) valuable_modules: Vec<String>,
    pub(crate) feedback: String,
    pub(crate) contact_email: Option<String>,
}

impl SurveyState {
    pub fn usage_likelihood(&self) -> u8 {
        self.usage_likelihood
    }

    pub fn valuable_modules(&self) -> &[String] {
        &self.valuable_modules
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn contact_email(&self) -> Option<&str> {
        self.contact_email.as_deref()
    }
}

impl Default for SurveyState {
    fn default() -> Self {
        Self {
            usage_likelihood: DEFAULT_USAGE_LIKELIHOOD,
            valuable_modules: Vec::new(),
            feedback: String::new(),
            contact_email: None,
        }
    }
}

/// `SURVEY` payload 內的問卷摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReport {
    pub likelihood: u8,
    pub modules: String,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl From<&SurveyState> for SurveyReport {
    fn from(state: &SurveyState) -> Self {
        Self {
            likelihood: state.usage_likelihood,
            modules: state.valuable_modules.join(", "),
            feedback: state.feedback.clone(),
            contact_email: state.contact_email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitBeacon {
    pub ip: String,
    pub timestamp: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub ip: String,
    pub timestamp: String,
    pub user_agent: String,
    pub survey: SurveyReport,
}

/// Webhook 接受的 payload，以 `type` 欄位區分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OutboundPayload {
    Visit(VisitBeacon),
    Survey(SurveySubmission),
}

impl OutboundPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundPayload::Visit(_) => "VISIT",
            OutboundPayload::Survey(_) => "SURVEY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisionKind {
    Image,
    Narrative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    /// 依 MIME 類型決定副檔名，未知類型用 `bin`
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }

    pub fn data_url(&self) -> String {
        use base64::Engine;
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub theme: String,
    pub stat1: Stat,
    pub stat2: Stat,
    pub details: Vec<String>,
    pub quote: String,
    pub author: String,
    pub author_title: String,
}

impl Narrative {
    /// 尚未有成功生成結果時顯示的預設內容
    pub fn fallback() -> Self {
        Self {
            theme: "Cultura conectada".to_string(),
            stat1: Stat {
                value: "25".to_string(),
                label: "módulos planejados".to_string(),
            },
            stat2: Stat {
                value: "4".to_string(),
                label: "eixos de gestão".to_string(),
            },
            details: vec![
                "Governança, finanças e impacto social em um só lugar".to_string(),
                "Pensado para OSCs e coletivos culturais".to_string(),
            ],
            quote: "A cultura é a nuvem que conecta pessoas, histórias e territórios."
                .to_string(),
            author: "Nuvem Cultural".to_string(),
            author_title: "Fase de incubação".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionContent {
    Image(GeneratedImage),
    Narrative(Narrative),
}
