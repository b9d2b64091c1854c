use crate::core::survey::{SurveyAction, SurveyForm};
use crate::core::tracker::{self, ClientContext};
use crate::core::{Catalog, CategoryFilter, IpResolver, ModuleRecord, Notifier};
use crate::utils::error::Result;

/// 一個訪客的頁面狀態：目錄篩選、問卷與訪客環境
#[derive(Debug, Clone)]
pub struct LandingState {
    catalog: Catalog,
    active_filter: CategoryFilter,
    search_term: String,
    survey: SurveyForm,
    context: ClientContext,
}

impl LandingState {
    pub fn new(catalog: Catalog, user_agent: impl Into<String>) -> Self {
        Self {
            catalog,
            active_filter: CategoryFilter::All,
            search_term: String::new(),
            survey: SurveyForm::new(),
            context: ClientContext::new(user_agent),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    pub fn survey(&self) -> &SurveyForm {
        &self.survey
    }

    pub fn active_filter(&self) -> CategoryFilter {
        self.active_filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.active_filter = filter;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn visible_modules(&self) -> Vec<&ModuleRecord> {
        self.catalog.filter(self.active_filter, &self.search_term)
    }

    pub fn dispatch(&mut self, action: SurveyAction) -> Result<()> {
        self.survey.dispatch(action, &self.catalog)
    }

    /// 頁面載入時的訪問紀錄，解析到的 IP 會保留給之後的問卷使用
    pub async fn track_visit<R, N>(&mut self, resolver: &R, notifier: &N) -> Result<()>
    where
        R: IpResolver + ?Sized,
        N: Notifier + ?Sized,
    {
        tracker::track_visit(resolver, notifier, &mut self.context, tracker::now_timestamp()).await
    }

    /// 只補上訪客 IP，不送 VISIT。用於沒有頁面載入、直接送問卷的情況
    pub async fn resolve_ip<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: IpResolver + ?Sized,
    {
        tracker::resolve_client_ip(resolver, &mut self.context).await
    }

    pub async fn submit_survey<N>(&mut self, notifier: &N) -> Result<()>
    where
        N: Notifier + ?Sized,
    {
        self.survey
            .submit(notifier, &self.context, tracker::now_timestamp())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, OutboundPayload};
    use crate::utils::error::SiteError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedResolver;

    #[async_trait]
    impl IpResolver for FixedResolver {
        async fn resolve_ip(&self) -> Result<String> {
            Ok("192.0.2.10".to_string())
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
    fn test_visible_modules_follow_selection() {
        let mut state = LandingState::new(Catalog::builtin().unwrap(), "agent");
        assert_eq!(state.visible_modules().len(), 25);

        state.set_filter(CategoryFilter::Only(Category::Financeiro));
        state.set_search("doadores");
        let visible = state.visible_modules();
        assert!(visible.iter().any(|m| m.id == "doadores"));
        assert!(visible.iter().all(|m| m.category == Category::Financeiro));

        state.set_filter(CategoryFilter::Only(Category::Social));
        assert!(state.visible_modules().iter().all(|m| m.id != "doadores"));
    }

    #[test]
    fn test_dispatch_rejects_unknown_module() {
        let mut state = LandingState::new(Catalog::builtin().unwrap(), "agent");
        let result = state.dispatch(SurveyAction::ToggleModule("inexistente".into()));
        assert!(matches!(result, Err(SiteError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn test_survey_reuses_ip_from_visit() {
        let notifier = RecordingNotifier::default();
        let mut state = LandingState::new(Catalog::builtin().unwrap(), "agent");

        state.track_visit(&FixedResolver, &notifier).await.unwrap();
        state.dispatch(SurveyAction::SetRating(4)).unwrap();
        state.submit_survey(&notifier).await.unwrap();

        assert!(state.survey().is_submitted());
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        match &sent[1] {
            OutboundPayload::Survey(submission) => {
                assert_eq!(submission.ip, "192.0.2.10");
                assert_eq!(submission.survey.likelihood, 4);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_ip_then_submit_sends_only_survey() {
        let notifier = RecordingNotifier::default();
        let mut state = LandingState::new(Catalog::builtin().unwrap(), "agent");

        state.resolve_ip(&FixedResolver).await.unwrap();
        assert_eq!(state.context().ip, "192.0.2.10");
        state.submit_survey(&notifier).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            OutboundPayload::Survey(submission) => assert_eq!(submission.ip, "192.0.2.10"),
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
