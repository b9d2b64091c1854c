use crate::core::{ContentGenerator, Narrative, VisionContent, VisionKind};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 每次請求遞增的序號，只有最新序號的回應會被套用
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionState {
    Idle,
    Loading,
    Ready(VisionContent),
    Failed { message: String },
}

#[derive(Debug, Clone)]
pub struct VisionPanel {
    kind: VisionKind,
    state: VisionState,
    latest: u64,
}

impl VisionPanel {
    pub fn new(kind: VisionKind) -> Self {
        Self {
            kind,
            state: VisionState::Idle,
            latest: 0,
        }
    }

    pub fn kind(&self) -> VisionKind {
        self.kind
    }

    pub fn state(&self) -> &VisionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == VisionState::Loading
    }

    pub fn latest_token(&self) -> Option<RequestToken> {
        (self.latest > 0).then_some(RequestToken(self.latest))
    }

    /// 開始新的請求；不取消先前仍在進行中的請求
    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        self.state = VisionState::Loading;
        RequestToken(self.latest)
    }

    /// 套用回應。token 不是最新的就丟棄並回傳 `false`
    pub fn complete(&mut self, token: RequestToken, result: Result<VisionContent>) -> bool {
        if token.0 != self.latest {
            tracing::debug!(
                "Dropping stale vision response #{} (latest is #{})",
                token.0,
                self.latest
            );
            return false;
        }

        self.state = match result {
            Ok(content) => VisionState::Ready(content),
            Err(e) => {
                tracing::error!("❌ Vision generation #{} failed: {}", token.0, e);
                VisionState::Failed {
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// 顯示用內容：已就緒的結果；敘事版本在沒有結果時退回預設內容
    pub fn display(&self) -> Option<VisionContent> {
        match (&self.state, self.kind) {
            (VisionState::Ready(content), _) => Some(content.clone()),
            (_, VisionKind::Narrative) => Some(VisionContent::Narrative(Narrative::fallback())),
            (_, VisionKind::Image) => None,
        }
    }
}

/// 共享 panel，允許多個重新生成請求同時進行（last-issued wins）
pub struct VisionController<G: ContentGenerator> {
    generator: G,
    panel: Arc<Mutex<VisionPanel>>,
}

impl<G: ContentGenerator> VisionController<G> {
    pub fn new(generator: G, kind: VisionKind) -> Self {
        Self {
            generator,
            panel: Arc::new(Mutex::new(VisionPanel::new(kind))),
        }
    }

    pub fn panel(&self) -> Arc<Mutex<VisionPanel>> {
        Arc::clone(&self.panel)
    }

    /// 發出一次生成請求；回傳結果是否被套用
    pub async fn regenerate(&self) -> bool {
        let (token, kind) = {
            let mut panel = self.panel.lock().await;
            (panel.begin(), panel.kind())
        };

        tracing::info!("🎨 Requesting {:?} generation #{}", kind, token.0);
        let result = self.generator.generate(kind).await;

        let mut panel = self.panel.lock().await;
        panel.complete(token, result)
    }

    pub async fn snapshot(&self) -> VisionState {
        self.panel.lock().await.state().clone()
    }
}
