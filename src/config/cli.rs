use crate::core::survey::SurveyAction;
use crate::core::CategoryFilter;
use crate::utils::error::{Result, SiteError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "nuvem-cultural")]
#[command(
    about = "Module catalog, lead survey and vision generator for the Nuvem Cultural landing page"
)]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List catalog modules, optionally filtered
    Modules {
        /// "all" or one of Gestão, Social, Financeiro, Inovação
        #[arg(long, default_value = "all")]
        category: String,

        #[arg(long, default_value = "")]
        search: String,

        /// Show features and benefits of each module
        #[arg(long)]
        details: bool,
    },

    /// Send the page-visit beacon
    Visit,

    /// Submit a survey response
    Survey {
        #[arg(long, default_value = "3")]
        rating: u8,

        /// Module id considered valuable (repeatable or comma separated)
        #[arg(long = "module", value_delimiter = ',')]
        modules: Vec<String>,

        #[arg(long, default_value = "")]
        feedback: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Generate the decorative vision image or the narrative panel
    Vision {
        /// Request the structured narrative instead of an image
        #[arg(long)]
        narrative: bool,

        /// Where to write the generated image (default: vision.<ext> from the MIME type)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    pub fn category_filter(&self) -> Result<CategoryFilter> {
        match self {
            Command::Modules { category, .. } => category.parse(),
            _ => Ok(CategoryFilter::All),
        }
    }

    /// 將問卷參數轉為 reducer actions（依序套用）
    pub fn survey_actions(&self) -> Result<Vec<SurveyAction>> {
        match self {
            Command::Survey {
                rating,
                modules,
                feedback,
                email,
            } => {
                let mut actions = vec![SurveyAction::SetRating(*rating)];
                // 參數列出的是選取結果，重複的 id 只切換一次
                let mut selected: Vec<&str> = Vec::new();
                for module in modules {
                    let module = module.trim();
                    if !module.is_empty() && !selected.contains(&module) {
                        selected.push(module);
                        actions.push(SurveyAction::ToggleModule(module.to_string()));
                    }
                }
                actions.push(SurveyAction::SetFeedback(feedback.clone()));
                actions.push(SurveyAction::SetContactEmail(email.clone()));
                Ok(actions)
            }
            _ => Err(SiteError::validation("not a survey command")),
        }
    }
}
