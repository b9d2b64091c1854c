use crate::domain::model::{OutboundPayload, VisionContent, VisionKind};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Best-effort 單向傳送。`Err` 只代表傳輸失敗，呼叫端可以忽略
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &OutboundPayload) -> Result<()>;
}

#[async_trait]
pub trait IpResolver: Send + Sync {
    async fn resolve_ip(&self) -> Result<String>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, kind: VisionKind) -> Result<VisionContent>;
}
