use clap::Parser;
use stroke_risk::core::{ConfigProvider, RiskModel};
use stroke_risk::utils::{logger, validation::Validate};
use stroke_risk::{BatchConfig, BatchEngine, BatchPipeline, LocalStorage, RiskAssessor, Threshold};

#[derive(Parser)]
#[command(name = "risk-batch")]
#[command(about = "Score a CSV of patients with the stroke risk model")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "risk-batch.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the decision threshold from config
    #[arg(long)]
    threshold: Option<Threshold>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting batch risk scoring");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match BatchConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 命令列覆蓋設定
    if let Some(threshold) = args.threshold {
        config.decision.threshold = Some(threshold);
        tracing::info!("🔧 Threshold overridden to: {}", threshold);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let assessor = RiskAssessor::from_path(config.model_path());
    if let Err(e) = assessor.load_status() {
        eprintln!("❌ Failed to load model: {}", e);
        eprintln!("💡 Check that [model].path points to a trained model artifact");
        std::process::exit(3);
    }

    let storage = LocalStorage::new(".");
    let pipeline = BatchPipeline::new(storage, config, assessor);
    let engine = BatchEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Batch scoring completed successfully!");
            println!("✅ Batch scoring completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch scoring failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &BatchConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Batch: {}", config.batch.name);
    if let Some(description) = &config.batch.description {
        println!("  Description: {}", description);
    }
    println!("  Model: {}", config.model_path());
    println!("  Threshold: {}", config.threshold());
    println!("  Input: {}", config.input.path);
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output.formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &BatchConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("🧠 Model:");
    match RiskAssessor::from_path(config.model_path()).load_status() {
        Ok(model) => println!("  ✅ '{}' loads successfully", model.name()),
        Err(e) => println!("  ❌ {}", e),
    }

    println!();
    println!("📥 Input:");
    println!("  Path: {}", config.input.path);
    println!("  Delimiter: {:?}", config.delimiter() as char);
    println!("  Invalid rows: {:?}", config.invalid_row_policy());

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output.formats.join(", "));
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
