use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use std::io::Cursor;
use txn_importer::core::layout::encode_record;
use txn_importer::domain::tax_id::TaxId;
use txn_importer::domain::transaction_type;
use txn_importer::{ImportOptions, ImportPipeline, MemoryBulkWriter, SqliteBulkWriter, Transaction};

const THRESHOLD: usize = 5;

fn input(count: usize) -> String {
    let transaction = Transaction {
        kind: transaction_type::lookup(6).unwrap(),
        date: NaiveDate::from_ymd_opt(2019, 3, 1).unwrap(),
        time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        value: dec!(12.34),
        tax_id: TaxId::new("11144477735").unwrap(),
        card: "1234****5678".to_string(),
        store_owner: "MARIA JOSEFINA".to_string(),
        store_name: "LOJA DO Ó - MATRIZ".to_string(),
    };
    let line = encode_record(&transaction);
    std::iter::repeat(line.as_str())
        .take(count)
        .collect::<Vec<_>>()
        .join("\n")
}

async fn flushes_for(count: usize) -> Vec<usize> {
    let writer = MemoryBulkWriter::new();
    let options = ImportOptions {
        batch_size: THRESHOLD,
        ..ImportOptions::default()
    };
    let mut pipeline = ImportPipeline::new(writer.clone(), &options);

    let result = pipeline.run(Cursor::new(input(count))).await.unwrap();
    assert_eq!(result.success_count, count as u64);
    writer.batch_sizes().await
}

#[tokio::test]
async fn test_one_below_threshold_flushes_once() {
    assert_eq!(flushes_for(THRESHOLD - 1).await, vec![THRESHOLD - 1]);
}

#[tokio::test]
async fn test_exact_threshold_flushes_once() {
    assert_eq!(flushes_for(THRESHOLD).await, vec![THRESHOLD]);
}

#[tokio::test]
async fn test_one_above_threshold_flushes_twice() {
    assert_eq!(flushes_for(THRESHOLD + 1).await, vec![THRESHOLD, 1]);
}

#[tokio::test]
async fn test_flush_count_is_ceiling_of_count_over_threshold() {
    for count in [1usize, 9, 10, 11, 23] {
        let sizes = flushes_for(count).await;
        assert_eq!(sizes.len(), count.div_ceil(THRESHOLD), "count {}", count);

        let last = count % THRESHOLD;
        let expected_last = if last == 0 { THRESHOLD } else { last };
        assert_eq!(sizes.last().copied(), Some(expected_last), "count {}", count);
    }
}

#[tokio::test]
async fn test_empty_input_never_flushes() {
    assert!(flushes_for(0).await.is_empty());
}

#[tokio::test]
async fn test_sqlite_receives_every_batch() {
    let writer = SqliteBulkWriter::open_in_memory().unwrap();
    let options = ImportOptions {
        batch_size: THRESHOLD,
        ..ImportOptions::default()
    };
    let mut pipeline = ImportPipeline::new(writer.clone(), &options);

    let result = pipeline.run(Cursor::new(input(12))).await.unwrap();
    assert_eq!(result.success_count, 12);
    assert_eq!(writer.count().unwrap(), 12);
}
