use crate::core::{ContentGenerator, GeneratedImage, Narrative, VisionContent, VisionKind};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_NARRATIVE_MODEL: &str = "gemini-2.5-flash";

pub const IMAGE_PROMPT: &str = "A highly artistic and modern digital painting of a \
'Cultural Cloud'. Abstract cloud composed of musical instruments, theatre masks, and floating \
books connected by glowing digital lines. Vibrant colors, blue and purple palette, \
professional lighting, cinematic 16:9 aspect ratio.";

pub const NARRATIVE_PROMPT: &str = "Escreva um pequeno painel inspirador sobre o impacto de uma \
plataforma de gestão para organizações culturais e OSCs brasileiras. Traga um tema curto, duas \
estatísticas plausíveis do setor cultural com rótulos, três detalhes de apoio e uma citação \
atribuída a uma pessoa do setor com seu cargo.";

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: String,
    pub image_model: String,
    pub narrative_model: String,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            narrative_model: DEFAULT_NARRATIVE_MODEL.to_string(),
        }
    }
}

/// `generateContent` 的結構化輸出 schema
pub fn narrative_schema() -> Value {
    let stat = json!({
        "type": "OBJECT",
        "properties": {
            "value": { "type": "STRING" },
            "label": { "type": "STRING" }
        },
        "required": ["value", "label"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "theme": { "type": "STRING" },
            "stat1": stat,
            "stat2": stat,
            "details": { "type": "ARRAY", "items": { "type": "STRING" } },
            "quote": { "type": "STRING" },
            "author": { "type": "STRING" },
            "authorTitle": { "type": "STRING" }
        },
        "required": ["theme", "stat1", "stat2", "details", "quote", "author", "authorTitle"]
    })
}

pub fn build_request_body(kind: VisionKind) -> Value {
    match kind {
        VisionKind::Image => json!({
            "contents": [{ "parts": [{ "text": IMAGE_PROMPT }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "16:9" }
            }
        }),
        VisionKind::Narrative => json!({
            "contents": [{ "parts": [{ "text": NARRATIVE_PROMPT }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": narrative_schema()
            }
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// 取最後一個 inline 圖片區塊
    pub fn into_image(self) -> Result<GeneratedImage> {
        let inline = self
            .parts()
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .last()
            .ok_or_else(|| SiteError::generation("response contains no inline image"))?;

        let data = base64::engine::general_purpose::STANDARD.decode(inline.data.as_bytes())?;
        Ok(GeneratedImage {
            mime_type: inline
                .mime_type
                .clone()
                .unwrap_or_else(|| "image/png".to_string()),
            data,
        })
    }

    pub fn into_narrative(self) -> Result<Narrative> {
        let text = self
            .parts()
            .iter()
            .find_map(|part| part.text.as_deref())
            .ok_or_else(|| SiteError::generation("response contains no text part"))?;

        Ok(serde_json::from_str(text.trim())?)
    }
}

pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn endpoint(&self, kind: VisionKind) -> String {
        let model = match kind {
            VisionKind::Image => &self.settings.image_model,
            VisionKind::Narrative => &self.settings.narrative_model,
        };
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, kind: VisionKind) -> Result<VisionContent> {
        let endpoint = self.endpoint(kind);
        tracing::debug!("Making generateContent request to: {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&build_request_body(kind))
            .send()
            .await?;

        tracing::debug!("generateContent response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SiteError::ApiError { status, message });
        }

        let decoded: GenerateContentResponse = response.json().await?;
        match kind {
            VisionKind::Image => decoded.into_image().map(VisionContent::Image),
            VisionKind::Narrative => decoded.into_narrative().map(VisionContent::Narrative),
        }
    }
}
