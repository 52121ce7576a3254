use clap::Parser;
use stroke_risk::core::{ConfigProvider, RiskModel};
use stroke_risk::utils::{logger, validation::Validate};
use stroke_risk::{CliConfig, OutputFormat, RiskAssessor, RiskError, RiskReport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting stroke-risk CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 模型只在啟動時載入一次；失敗時照常回報，但不做推論
    let assessor = RiskAssessor::from_path(config.model_path());
    if let Err(e) = assessor.load_status() {
        eprintln!("❌ Failed to load model: {}", e);
    }

    // 驗證輸入
    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    let features = config.features();
    let threshold = config.threshold();

    match assessor.assess(&features, threshold) {
        Ok(prediction) => {
            let model_name = assessor
                .load_status()
                .map(|m| m.name().to_string())
                .unwrap_or_default();
            let report = RiskReport::new(model_name, features, threshold, prediction);

            match config.format {
                OutputFormat::Text => print!("{}", report.render_text()),
                OutputFormat::Json => println!("{}", report.render_json()?),
            }

            tracing::info!(
                "✅ Prediction complete: probability={:.2}, verdict={}",
                prediction.probability,
                prediction.verdict
            );
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn report_failure(e: &RiskError) -> ! {
    tracing::error!(
        "❌ Prediction failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
