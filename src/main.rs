use anyhow::Result;
use clap::Parser;
use moderation_allocator::cli::{Cli, SingleEvaluatorPolicy};
use moderation_allocator::infrastructure::spawn_console_responder;
use moderation_allocator::services::validation::validate_preferences;
use moderation_allocator::services::{decision_channel, FixedDecision};
use moderation_allocator::utils::logging;
use moderation_allocator::{App, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：默认值 → 偏好设置文件 → 环境变量 → 命令行
    let config = cli.apply(Config::load(Some(cli.config.as_path()))?);

    // 初始化日志
    logging::init(&config)?;

    if cli.save_preferences {
        let validation = validate_preferences(&config);
        if validation.is_valid() {
            config.save_toml_file(&cli.config)?;
            info!("💾 偏好设置已保存至: {}", cli.config.display());
        } else {
            for e in [validation.distribution, validation.picking].into_iter().flatten() {
                warn!("⚠️ 偏好设置未保存: {}", e);
            }
        }
    }

    // 初始化并运行应用
    let app = App::initialize(config, cli.files.clone()).await?;
    match &cli.single_evaluator {
        SingleEvaluatorPolicy::Fixed(decision) => {
            app.run(&FixedDecision(decision.clone())).await?;
        }
        SingleEvaluatorPolicy::Ask => {
            let (decisions, requests) = decision_channel(1);
            let responder = spawn_console_responder(requests);
            app.run(&decisions).await?;
            drop(decisions);
            responder.await?;
        }
    }

    Ok(())
}
