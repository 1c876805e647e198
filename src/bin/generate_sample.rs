use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveTime};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{BufWriter, Write};
use txn_importer::core::layout::{self, encode_record};
use txn_importer::domain::tax_id::{self, TaxId};
use txn_importer::domain::transaction_type;
use txn_importer::utils::logger;
use txn_importer::Transaction;

const STORE_OWNERS: [&str; 8] = [
    "JOÃO MACEDO",
    "MARIA JOSEFINA",
    "MARCOS PEREIRA",
    "JOSÉ COSTA",
    "PEDRO SANTOS",
    "ANA SILVA",
    "CARLOS LIMA",
    "FERNANDA ROCHA",
];

const STORE_NAMES: [&str; 8] = [
    "BAR DO JOÃO",
    "LOJA DO Ó - MATRIZ",
    "MERCADO DA AVENIDA",
    "MERCEARIA 3 IRMÃOS",
    "LOJA DO Ó - FILIAL",
    "SUPERMERCADO CENTRA",
    "PADARIA BOM DIA",
    "FARMÁCIA SAÚDE",
];

const PROGRESS_EVERY: u64 = 1_000_000;

#[derive(Parser)]
#[command(name = "generate-sample")]
#[command(about = "Write a fixed-width transaction file with random records")]
struct Args {
    /// Number of lines to write
    #[arg(short = 'n', long, default_value_t = 10_000)]
    count: u64,

    /// Output file
    #[arg(short, long, default_value = "sample.txt")]
    output: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Share of tax ids generated with correct check digits
    #[arg(long, default_value_t = 0.5)]
    valid_tax_id_ratio: f64,

    /// Share of lines deliberately malformed
    #[arg(long, default_value_t = 0.0)]
    invalid_ratio: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    anyhow::ensure!(
        (0.0..=1.0).contains(&args.invalid_ratio),
        "--invalid-ratio must be between 0 and 1"
    );
    anyhow::ensure!(
        (0.0..=1.0).contains(&args.valid_tax_id_ratio),
        "--valid-tax-id-ratio must be between 0 and 1"
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::info!("🚀 Generating {} records into {}", args.count, args.output);

    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output))?;
    let mut out = BufWriter::new(file);

    let mut malformed = 0u64;
    for i in 0..args.count {
        let transaction = random_transaction(&mut rng, args.valid_tax_id_ratio)?;
        let mut line = encode_record(&transaction);

        if rng.gen_bool(args.invalid_ratio) {
            line = corrupt(&mut rng, line);
            malformed += 1;
        }

        writeln!(out, "{}", line)?;

        if (i + 1) % PROGRESS_EVERY == 0 {
            tracing::info!(
                "Progress: {} records ({:.1}%)",
                i + 1,
                (i + 1) as f64 / args.count as f64 * 100.0
            );
        }
    }
    out.flush()?;

    tracing::info!(
        "✅ Done: {} lines written to {} ({} malformed)",
        args.count,
        args.output,
        malformed
    );
    Ok(())
}

fn random_transaction(rng: &mut StdRng, valid_tax_id_ratio: f64) -> Result<Transaction> {
    let catalog = transaction_type::all();
    let kind = &catalog[rng.gen_range(0..catalog.len())];

    let start = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;
    let date = start
        .checked_add_days(Days::new(rng.gen_range(0..=2191)))
        .unwrap_or(start);
    let time = NaiveTime::from_hms_opt(
        rng.gen_range(0..24),
        rng.gen_range(0..60),
        rng.gen_range(0..60),
    )
    .context("invalid time of day")?;

    let tax_id = if rng.gen_bool(valid_tax_id_ratio) {
        valid_tax_id(rng)
    } else {
        digits(rng, 11)
    };
    let card = format!("{}****{}", digits(rng, 4), digits(rng, 4));

    Ok(Transaction {
        kind,
        date,
        time,
        value: Decimal::new(rng.gen_range(100..=9_999_999_999), 2),
        tax_id: TaxId::new(tax_id)?,
        card,
        store_owner: pick(rng, &STORE_OWNERS),
        store_name: pick(rng, &STORE_NAMES),
    })
}

fn valid_tax_id(rng: &mut StdRng) -> String {
    let mut base = [0u32; 9];
    for digit in base.iter_mut() {
        *digit = rng.gen_range(0..10);
    }
    let (first, second) = tax_id::check_digits(&base);
    base.iter()
        .chain([first, second].iter())
        .map(|d| char::from_digit(*d, 10).unwrap_or('0'))
        .collect()
}

fn digits(rng: &mut StdRng, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn pick(rng: &mut StdRng, names: &[&str]) -> String {
    names.choose(rng).copied().unwrap_or_default().to_string()
}

// 產生解碼器會拒絕的行：截斷、未知類型或非數字日期
fn corrupt(rng: &mut StdRng, line: String) -> String {
    match rng.gen_range(0..3) {
        0 => line.chars().take(layout::MIN_RECORD_WIDTH - 1).collect(),
        1 => format!("0{}", &line[1..]),
        _ => {
            let mut chars: Vec<char> = line.chars().collect();
            chars[layout::DATE.start] = 'X';
            chars.into_iter().collect()
        }
    }
}
