use cafe_etl::core::etl::log_failure;
use cafe_etl::domain::ports::Storage;
use cafe_etl::utils::{logger, validation::Validate};
use cafe_etl::{authenticate, CliArgs, EnvCredentials, EtlEngine, EtlError, PricePipeline};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("Starting cafe-etl");

    match run(&args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(
                "❌ ETL run failed at stage '{}': {}",
                e.stage(),
                e
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(args: &CliArgs) -> Result<(), EtlError> {
    let config = args.resolve()?;
    if args.verbose {
        tracing::debug!("Pipeline config: {:?}", config);
    }
    config.validate()?;

    // 驗證憑證並建立存儲客戶端
    let storage = authenticate(&config, &EnvCredentials)
        .await
        .map_err(log_failure)?;
    let location = storage.location();
    tracing::info!("🔐 Authenticated against {}", location);

    let pipeline = PricePipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline);
    let report = engine.run().await?;

    tracing::info!(
        "✅ Uploaded {} to {} ({} rows)",
        report.object_key,
        location,
        report.stats.rows_kept
    );
    println!("{}", report.object_key);
    Ok(())
}
