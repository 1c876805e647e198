use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use txn_importer::app::export_summary;
use txn_importer::config::toml_config::TomlConfig;
use txn_importer::core::report;
use txn_importer::core::ConfigProvider;
use txn_importer::domain::transaction_type;
use txn_importer::utils::{logger, validation::Validate};
use txn_importer::ImportJob;

#[derive(Parser)]
#[command(name = "toml-import")]
#[command(about = "Transaction importer driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "import-config.toml")]
    config: String,

    /// Override the input file from config
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - decode and validate without writing to the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 設定檔指定 log_level 時輸出 JSON 日誌，否則使用一般格式
    match config.log_level() {
        Some(level) if !args.verbose => logger::init_json_logger(Some(level)),
        _ => logger::init_cli_logger(args.verbose),
    }

    tracing::info!("🚀 Starting TOML-based importer");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(input) = args.input.clone() {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.source.path = Some(input);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupt received, stopping after the current batch");
            flag.store(true, Ordering::SeqCst);
        }
    });

    let summary_csv = config.summary_csv_path().map(str::to_string);
    let keep_summary = config.import.summary.unwrap_or(false);
    let json = config.json_output();

    let job = ImportJob::new(config)
        .dry_run(args.dry_run)
        .with_monitoring(monitor_enabled)
        .with_cancellation(cancel);

    match job.run().await {
        Ok(mut result) => {
            if args.dry_run {
                // 試跑不輸出摘要 CSV
                export_summary(&mut result, None, keep_summary)?;
                print_dry_run(&result);
            } else {
                export_summary(&mut result, summary_csv.as_deref(), keep_summary)?;
                tracing::info!("✅ Import completed successfully!");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", report::render_text(&result));
            }
        }
        Err(aborted) => {
            let e = &aborted.error;
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            eprintln!(
                "⚠️ Stopped after {} lines, {} records persisted",
                aborted.partial.total_lines, aborted.persisted
            );

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Import: {}", config.import.name);
    println!("  Source: {}", config.source_path());
    println!("  Database: {}", config.database_path());
    println!("  Batch Size: {}", config.batch_size());
    println!("  Summary: {}", config.summary_enabled());
    println!("  Tax Id Check Digits: {}", config.validate_tax_id());

    if let Some(path) = config.failed_records_path() {
        println!("  Failed Records: {}", path);
    }

    if let Some(path) = config.summary_csv_path() {
        println!("  Summary CSV: {}", path);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn print_dry_run(result: &txn_importer::ImportResult) {
    println!("🔍 Dry Run Analysis:");
    println!(
        "  {} of {} records would be imported, {} rejected",
        result.success_count, result.total_lines, result.failed_count
    );
    println!();
    println!("⚙️ Known transaction types:");
    for kind in transaction_type::all() {
        println!(
            "  {} {:<14} {:?}",
            kind.code, kind.description, kind.nature
        );
    }
    println!();
    println!("✅ Dry run analysis complete. Nothing was written to the database.");
}
