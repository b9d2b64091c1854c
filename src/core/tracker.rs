use crate::core::{
    IpResolver, Notifier, OutboundPayload, SurveyReport, SurveySubmission, VisitBeacon,
};
use crate::utils::error::Result;
use chrono::{DateTime, Local, TimeZone};

pub const PLACEHOLDER_IP: &str = "0.0.0.0";

/// pt-BR 的 `toLocaleString` 格式，例如 `18/10/2026, 14:03:09`
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%d/%m/%Y, %H:%M:%S").to_string()
}

pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// 訪客環境：IP 解析前維持 placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub ip: String,
    pub user_agent: String,
}

impl ClientContext {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            ip: PLACEHOLDER_IP.to_string(),
            user_agent: user_agent.into(),
        }
    }

    pub fn ip_resolved(&self) -> bool {
        self.ip != PLACEHOLDER_IP
    }

    pub fn visit_payload(&self, timestamp: impl Into<String>) -> OutboundPayload {
        OutboundPayload::Visit(VisitBeacon {
            ip: self.ip.clone(),
            timestamp: timestamp.into(),
            user_agent: self.user_agent.clone(),
        })
    }

    pub fn survey_payload(
        &self,
        timestamp: impl Into<String>,
        survey: SurveyReport,
    ) -> OutboundPayload {
        OutboundPayload::Survey(SurveySubmission {
            ip: self.ip.clone(),
            timestamp: timestamp.into(),
            user_agent: self.user_agent.clone(),
            survey,
        })
    }
}

/// 只解析 IP，不送出任何東西。失敗時 context 保持原樣
pub async fn resolve_client_ip<R>(resolver: &R, context: &mut ClientContext) -> Result<()>
where
    R: IpResolver + ?Sized,
{
    match resolver.resolve_ip().await {
        Ok(ip) => {
            tracing::debug!("Resolved client IP: {}", ip);
            context.ip = ip;
            Ok(())
        }
        Err(e) => {
            tracing::debug!("IP lookup failed, keeping placeholder: {}", e);
            Err(e)
        }
    }
}

/// 解析 IP 後送出一次 VISIT。
///
/// IP 查詢失敗時保留 placeholder 照樣送出；回傳 webhook 的傳送結果。
pub async fn track_visit<R, N>(
    resolver: &R,
    notifier: &N,
    context: &mut ClientContext,
    timestamp: impl Into<String>,
) -> Result<()>
where
    R: IpResolver + ?Sized,
    N: Notifier + ?Sized,
{
    // 查詢失敗不影響 VISIT
    let _ = resolve_client_ip(resolver, context).await;

    let payload = context.visit_payload(timestamp);
    notifier.notify(&payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::SiteError;
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::Mutex;

    struct StaticResolver(Option<&'static str>);

    #[async_trait]
    impl IpResolver for StaticResolver {
        async fn resolve_ip(&self) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| SiteError::network("lookup offline"))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<OutboundPayload>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, payload: &OutboundPayload) -> Result<()> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    #[test]
    fn test_timestamp_matches_pt_br_locale_format() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let at = offset.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(format_timestamp(&at), "07/03/2026, 09:05:01");
    }

    #[tokio::test]
    async fn test_track_visit_uses_resolved_ip() {
        let notifier = RecordingNotifier::default();
        let mut context = ClientContext::new("agent/1.0");

        track_visit(&StaticResolver(Some("203.0.113.7")), &notifier, &mut context, "t0")
            .await
            .unwrap();

        assert!(context.ip_resolved());
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            OutboundPayload::Visit(VisitBeacon {
                ip: "203.0.113.7".to_string(),
                timestamp: "t0".to_string(),
                user_agent: "agent/1.0".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_resolve_client_ip_keeps_context_on_failure() {
        let mut context = ClientContext::new("agent/1.0");

        let result = resolve_client_ip(&StaticResolver(None), &mut context).await;
        assert!(matches!(result, Err(SiteError::NetworkError { .. })));
        assert_eq!(context.ip, PLACEHOLDER_IP);

        resolve_client_ip(&StaticResolver(Some("198.51.100.4")), &mut context)
            .await
            .unwrap();
        assert_eq!(context.ip, "198.51.100.4");
    }

    #[tokio::test]
    async fn test_track_visit_falls_back_to_placeholder() {
        let notifier = RecordingNotifier::default();
        let mut context = ClientContext::new("agent/1.0");

        track_visit(&StaticResolver(None), &notifier, &mut context, "t0")
            .await
            .unwrap();

        assert!(!context.ip_resolved());
        let sent = notifier.sent.lock().unwrap();
        match &sent[0] {
            OutboundPayload::Visit(beacon) => assert_eq!(beacon.ip, PLACEHOLDER_IP),
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
