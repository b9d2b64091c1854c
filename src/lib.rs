pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{GeminiClient, GeminiSettings, IpifyResolver, WebhookNotifier};
pub use config::SiteConfig;
pub use crate::core::survey::{SurveyAction, SurveyForm, SurveyPhase};
pub use crate::core::vision::{VisionController, VisionPanel, VisionState};
pub use crate::core::{Catalog, CategoryFilter, ClientContext, LandingState};
pub use utils::error::{Result, SiteError};
