use crate::core::batch::DEFAULT_BATCH_SIZE;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "txn-importer")]
#[command(about = "Import fixed-width transaction files into a SQLite store")]
pub struct CliConfig {
    /// Fixed-width input file
    pub input: String,

    #[arg(long, default_value = "transactions.db")]
    pub database: String,

    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    #[arg(long, help = "Group accepted transactions by store and report balances")]
    pub summary: bool,

    #[arg(long, help = "Reject records whose tax id check digits do not match")]
    pub validate_tax_id: bool,

    #[arg(long, help = "Write rejected lines to this CSV file")]
    pub failed_records: Option<String>,

    #[arg(long, help = "Write the per-store summary to this CSV file")]
    pub summary_csv: Option<String>,

    #[arg(long, help = "Print the import result as JSON")]
    pub json: bool,

    #[arg(long, help = "Decode and validate without writing to the database")]
    pub dry_run: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn source_path(&self) -> &str {
        &self.input
    }

    fn database_path(&self) -> &str {
        &self.database
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn summary_enabled(&self) -> bool {
        // 匯出摘要 CSV 需要摘要資料
        self.summary || self.summary_csv.is_some()
    }

    fn validate_tax_id(&self) -> bool {
        self.validate_tax_id
    }

    fn failed_records_path(&self) -> Option<&str> {
        self.failed_records.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("database", &self.database)?;
        validation::validate_batch_size("batch_size", self.batch_size)?;
        validation::validate_optional_path("failed_records", self.failed_records.as_deref())?;
        validation::validate_optional_path("summary_csv", self.summary_csv.as_deref())?;
        Ok(())
    }
}
