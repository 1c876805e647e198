use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use txn_importer::app::export_summary;
use txn_importer::core::report;
use txn_importer::utils::error::ImportError;
use txn_importer::utils::{logger, validation::Validate};
use txn_importer::{CliConfig, ImportJob, ImportResult};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting txn-importer CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    spawn_ctrl_c_handler(Arc::clone(&cancel));

    let summary_csv = config.summary_csv.clone();
    let keep_summary = config.summary;
    let json = config.json;

    let job = ImportJob::new(config.clone())
        .dry_run(config.dry_run)
        .with_monitoring(config.monitor)
        .with_cancellation(cancel);

    match job.run().await {
        Ok(mut result) => {
            export_summary(&mut result, summary_csv.as_deref(), keep_summary)?;
            tracing::info!("✅ Import completed successfully!");
            print_result(&result, json)?;
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

            if !matches!(e, ImportError::Cancelled) {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
            }
            eprintln!(
                "⚠️ {} records persisted before the import stopped",
                aborted.persisted
            );
            print_result(&aborted.partial, json)?;

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

/// 第一次 Ctrl-C 只設定取消旗標，在下一個批次邊界停止
fn spawn_ctrl_c_handler(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupt received, stopping after the current batch");
            cancel.store(true, Ordering::SeqCst);
        }
    });
}

fn print_result(result: &ImportResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("📋 Import Result:");
        println!("{}", report::render_text(result));
    }
    Ok(())
}
