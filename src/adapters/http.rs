use crate::core::{IpResolver, Notifier, OutboundPayload};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_WEBHOOK_URL: &str = "https://script.google.com/macros/s/AKfycbzAYUV1Twj22IIQkL1cYoW7XFdvOGFGUftXBkUd1q62dmX8YMD0mJTGDQXBl6bWdg8j/exec";
pub const DEFAULT_IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

/// 試算表 webhook：POST JSON 字串（text/plain），不讀取回應
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &OutboundPayload) -> Result<()> {
        let body = serde_json::to_string(payload)?;
        tracing::debug!("Sending {} payload to webhook ({} bytes)", payload.kind(), body.len());

        // 只有傳輸層錯誤算失敗，狀態碼與內容一律忽略
        match self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!("❌ Failed to send {} payload: {}", payload.kind(), e);
                Err(SiteError::network(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    ip: String,
}

#[derive(Debug, Clone)]
pub struct IpifyResolver {
    client: Client,
    url: String,
}

impl IpifyResolver {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IpResolver for IpifyResolver {
    async fn resolve_ip(&self) -> Result<String> {
        tracing::debug!("Looking up client IP at: {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SiteError::ApiError {
                status: response.status().as_u16(),
                message: "IP lookup failed".to_string(),
            });
        }

        let lookup: IpLookupResponse = response.json().await?;
        Ok(lookup.ip)
    }
}
