use clap::Parser;
use std::path::PathBuf;
use nuvem_cultural::config::Command;
use nuvem_cultural::core::{VisionContent, VisionKind};
use nuvem_cultural::utils::error::ErrorSeverity;
use nuvem_cultural::utils::{logger, validation::Validate};
use nuvem_cultural::{
    Catalog, CliConfig, GeminiClient, IpifyResolver, LandingState, SiteConfig, SiteError,
    VisionController, VisionState, WebhookNotifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting nuvem-cultural CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            SiteConfig::from_file(path).unwrap_or_else(|e| exit_with(e))
        }
        None => SiteConfig::default(),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(e);
    }

    let catalog = match &config.catalog.path {
        Some(path) => Catalog::from_file(path),
        None => Catalog::builtin(),
    }
    .unwrap_or_else(|e| exit_with(e));

    if let Err(e) = run(cli.command, config, catalog).await {
        exit_with(e);
    }

    Ok(())
}

async fn run(
    command: Command,
    config: SiteConfig,
    catalog: Catalog,
) -> nuvem_cultural::Result<()> {
    let filter = command.category_filter()?;
    let mut state = LandingState::new(catalog, config.client.user_agent.clone());

    match &command {
        Command::Modules {
            search, details, ..
        } => {
            state.set_filter(filter);
            state.set_search(search.as_str());

            let counts = state
                .catalog()
                .category_counts()
                .iter()
                .map(|(category, count)| format!("{} {}", category, count))
                .collect::<Vec<_>>()
                .join(" · ");
            println!("📚 {} modules ({})", state.catalog().len(), counts);

            let visible = state.visible_modules();
            if visible.is_empty() {
                println!("No modules found for category '{}' and search '{}'", filter, search);
                return Ok(());
            }

            for module in visible {
                println!("{} {} [{}] ({})", module.icon, module.title, module.category, module.id);
                if *details {
                    println!("   {}", module.description);
                    for feature in &module.features {
                        println!("   + {}", feature);
                    }
                    for benefit in &module.benefits {
                        println!("   ✓ {}", benefit);
                    }
                }
            }
        }

        Command::Visit => {
            let resolver = IpifyResolver::new(config.ip_lookup.url.clone());
            let notifier = WebhookNotifier::new(config.webhook.url.clone());

            // best-effort：失敗只記錄，不影響結束碼
            if state.track_visit(&resolver, &notifier).await.is_ok() {
                tracing::info!("📨 Visit beacon sent");
            }
            println!("👋 Visit recorded from {}", state.context().ip);
        }

        Command::Survey { .. } => {
            if let Some(url) = config.external_survey_url() {
                println!("📝 Answer the survey at: {}", url);
                return Ok(());
            }

            for action in command.survey_actions()? {
                state.dispatch(action)?;
            }

            let resolver = IpifyResolver::new(config.ip_lookup.url.clone());
            let notifier = WebhookNotifier::new(config.webhook.url.clone());
            // 問卷只送 SURVEY；IP 查詢失敗時沿用 placeholder
            let _ = state.resolve_ip(&resolver).await;
            let _ = state.submit_survey(&notifier).await;

            if state.survey().is_submitted() {
                println!("✅ Thank you! Your answers were recorded.");
            }
        }

        Command::Vision { narrative, output } => {
            let kind = if *narrative {
                VisionKind::Narrative
            } else {
                VisionKind::Image
            };
            let generator = GeminiClient::new(config.gemini_settings()?);
            let controller = VisionController::new(generator, kind);

            controller.regenerate().await;
            match controller.snapshot().await {
                VisionState::Ready(VisionContent::Image(image)) => {
                    let output = output.clone().unwrap_or_else(|| {
                        PathBuf::from(format!("vision.{}", image.file_extension()))
                    });
                    tokio::fs::write(&output, &image.data).await?;
                    println!(
                        "🎨 Vision saved to {} ({}, {} bytes)",
                        output.display(),
                        image.mime_type,
                        image.data.len()
                    );
                }
                VisionState::Ready(VisionContent::Narrative(narrative)) => {
                    println!("{}", serde_json::to_string_pretty(&narrative)?);
                }
                VisionState::Failed { message } => {
                    eprintln!("❌ Generation failed: {}", message);
                    let panel = controller.panel();
                    let panel = panel.lock().await;
                    if let Some(VisionContent::Narrative(fallback)) = panel.display() {
                        println!("{}", serde_json::to_string_pretty(&fallback)?);
                    }
                    return Err(SiteError::generation(message));
                }
                VisionState::Idle | VisionState::Loading => {}
            }
        }
    }

    Ok(())
}

fn exit_with(e: SiteError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
