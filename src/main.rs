use clap::Parser;
use cloudtrail_query::utils::{logger, validation::Validate};
use cloudtrail_query::{CliConfig, CloudTrailService, QueryError, QueryExecutor};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if let Err(e) = run(config).await {
        tracing::error!("❌ {} (category: {:?})", e, e.category());
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(config: CliConfig) -> Result<(), QueryError> {
    tracing::debug!("CLI config: {:?}", config);
    config.validate()?;

    let file_config = config.load_file_config()?;
    file_config.validate()?;

    let query = config.query_text(std::io::stdin().lock())?;
    let options = config.query_options(&file_config);
    let profile = config.profile(&file_config);
    let region = config.region(&file_config);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling query");
                cancel.cancel();
            }
        }
    });

    let service = CloudTrailService::from_profile(&profile, region).await;
    let executor = QueryExecutor::new(service);

    let written = executor
        .query_stream(&query, &options, std::io::stdout(), &cancel)
        .await?;
    tracing::info!("✅ {} rows written", written);

    Ok(())
}
