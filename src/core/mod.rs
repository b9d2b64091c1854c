pub mod catalog;
pub mod site;
pub mod survey;
pub mod tracker;
pub mod vision;

pub use crate::domain::model::{
    Category, CategoryFilter, GeneratedImage, ModuleRecord, Narrative, OutboundPayload, Stat,
    SurveyReport, SurveyState, SurveySubmission, VisionContent, VisionKind, VisitBeacon,
};
pub use crate::domain::ports::{ContentGenerator, IpResolver, Notifier};
pub use crate::utils::error::Result;
pub use catalog::{filter_modules, Catalog};
pub use site::LandingState;
pub use tracker::ClientContext;
