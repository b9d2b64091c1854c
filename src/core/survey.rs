use crate::core::{Catalog, ClientContext, Notifier, SurveyReport, SurveyState};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::validate_range;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyAction {
    SetRating(u8),
    ToggleModule(String),
    SetFeedback(String),
    SetContactEmail(Option<String>),
    Reset,
}

impl SurveyState {
    /// 超出 1..=5 直接拒絕，狀態不變
    pub fn set_rating(&mut self, value: u8) -> Result<()> {
        validate_range("usage_likelihood", value, MIN_RATING, MAX_RATING)?;
        self.usage_likelihood = value;
        Ok(())
    }

    /// 已選則移除，未選則加入；回傳切換後是否為選取狀態
    pub fn toggle_module(&mut self, id: &str, catalog: &Catalog) -> Result<bool> {
        if let Some(pos) = self.valuable_modules.iter().position(|m| m == id) {
            self.valuable_modules.remove(pos);
            return Ok(false);
        }

        if !catalog.contains(id) {
            return Err(SiteError::validation(format!(
                "Module '{}' is not in the catalog",
                id
            )));
        }
        self.valuable_modules.push(id.to_string());
        Ok(true)
    }

    pub fn set_feedback(&mut self, text: impl Into<String>) {
        self.feedback = text.into();
    }

    pub fn set_contact_email(&mut self, email: Option<String>) {
        self.contact_email = email.filter(|e| !e.trim().is_empty());
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.valuable_modules.iter().any(|m| m == id)
    }

    pub fn report(&self) -> SurveyReport {
        SurveyReport::from(self)
    }
}

/// Reducer：回傳套用 action 後的新狀態，錯誤時原狀態不受影響
pub fn reduce(state: &SurveyState, action: SurveyAction, catalog: &Catalog) -> Result<SurveyState> {
    let mut next = state.clone();
    match action {
        SurveyAction::SetRating(value) => next.set_rating(value)?,
        SurveyAction::ToggleModule(id) => {
            next.toggle_module(&id, catalog)?;
        }
        SurveyAction::SetFeedback(text) => next.set_feedback(text),
        SurveyAction::SetContactEmail(email) => next.set_contact_email(email),
        SurveyAction::Reset => next = SurveyState::default(),
    }
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurveyPhase {
    #[default]
    Editing,
    Submitted,
}

/// 問卷表單：答案加上目前階段
#[derive(Debug, Clone, Default)]
pub struct SurveyForm {
    state: SurveyState,
    phase: SurveyPhase,
}

impl SurveyForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SurveyState {
        &self.state
    }

    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == SurveyPhase::Submitted
    }

    pub fn dispatch(&mut self, action: SurveyAction, catalog: &Catalog) -> Result<()> {
        self.state = reduce(&self.state, action, catalog)?;
        Ok(())
    }

    /// 送出目前的答案快照。
    ///
    /// 不論 webhook 成功與否都會進入 `Submitted`；回傳值只供檢查，
    /// 使用者看不到差異。
    pub async fn submit<N>(
        &mut self,
        notifier: &N,
        context: &ClientContext,
        timestamp: impl Into<String>,
    ) -> Result<()>
    where
        N: Notifier + ?Sized,
    {
        let payload = context.survey_payload(timestamp, self.state.report());
        let delivery = notifier.notify(&payload).await;

        if let Err(e) = &delivery {
            tracing::error!("❌ Failed to deliver survey: {}", e);
        } else {
            tracing::info!(
                "📨 Survey sent (likelihood: {}, modules: {})",
                self.state.usage_likelihood(),
                self.state.valuable_modules().len()
            );
        }

        self.phase = SurveyPhase::Submitted;
        delivery
    }

    /// 回到編輯，保留先前的答案
    pub fn reopen(&mut self) {
        self.phase = SurveyPhase::Editing;
    }

    pub fn reset(&mut self) {
        self.state = SurveyState::default();
        self.phase = SurveyPhase::Editing;
    }
}
