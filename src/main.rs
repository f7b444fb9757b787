use anyhow::Context;
use wx_fixtures::core::ConfigProvider;
use wx_fixtures::utils::{logger, validation::Validate};
use wx_fixtures::{AvwxHttpFetcher, CliConfig, FixtureError, FixtureWriter, LocalStorage, TomlConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let (cli, overrides) = match CliConfig::try_parse_with_overrides(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) => e.exit(),
    };

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting wx-fixtures");

    let exit_code = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            let mut config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file {}", path.display()))?;
            config.apply_overrides(&overrides);
            generate(config).await
        }
        None => generate(cli).await,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn generate<C: ConfigProvider + Validate>(config: C) -> i32 {
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return 1;
    }

    let fetcher = match AvwxHttpFetcher::from_config(&config) {
        Ok(fetcher) => fetcher,
        Err(e) => return report_failure(&e),
    };
    let storage = LocalStorage::new(config.output_path().to_string());
    tracing::info!("🌐 Report source: {}", config.api_endpoint());

    let writer = FixtureWriter::new(fetcher, storage, config);

    match writer.run().await {
        Ok(summary) => {
            if summary.is_success() {
                println!(
                    "✅ Wrote {} fixtures ({} skipped, no reports)",
                    summary.written.len(),
                    summary.skipped.len()
                );
            } else {
                for failed in &summary.failed {
                    eprintln!("❌ {} {}: {}", failed.kind, failed.station, failed.error);
                }
                eprintln!(
                    "❌ {} of {} fixtures failed",
                    summary.failed.len(),
                    summary.written.len() + summary.skipped.len() + summary.failed.len()
                );
            }
            summary.exit_code()
        }
        Err(e) => report_failure(&e),
    }
}

fn report_failure(e: &FixtureError) -> i32 {
    tracing::error!(
        "❌ Fixture generation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    e.exit_code()
}
