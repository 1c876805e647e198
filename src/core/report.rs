use crate::domain::model::{ImportResult, Summary};
use crate::utils::error::Result;
use std::io::Write;

/// Writes one `store_name,transactions,balance` row per merchant.
pub fn write_summary_csv<W: Write>(summary: &Summary, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["store_name", "transactions", "balance"])?;

    for (store_name, entry) in summary {
        let count = entry.transactions.len().to_string();
        let balance = entry.balance.to_string();
        csv_writer.write_record([store_name.as_str(), count.as_str(), balance.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// 產生給終端機看的匯入摘要
pub fn render_text(result: &ImportResult) -> String {
    let mut lines = vec![
        format!("  Total lines: {}", result.total_lines),
        format!("  Successful:  {}", result.success_count),
        format!("  Failed:      {}", result.failed_count),
    ];

    if let Some(summary) = &result.summary {
        let width = summary.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        lines.push(String::new());
        lines.push(format!("  {} merchants:", summary.len()));
        for (store_name, entry) in summary {
            let padding = width - store_name.chars().count();
            lines.push(format!(
                "    {}{}  {:>6} tx  {:>14}",
                store_name,
                " ".repeat(padding),
                entry.transactions.len(),
                entry.balance
            ));
        }
    }

    lines.join("\n")
}
