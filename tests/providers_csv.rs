use chrono::{TimeZone, Utc};
use std::fs;

use market_pulse::ingest::providers::csv_dir::CsvDirSource;
use market_pulse::ArticleSource;

#[tokio::test]
async fn reads_every_dump_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("b_second.csv"),
        "timestamp_utc,title,body\n2025-10-14T09:30:00Z,Tesla recall,Body text\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("a_first.csv"),
        "scraped_utc,published_utc,source,title,summary,text,url\n\
         2025-10-14T10:00:00Z,\"Tue, 14 Oct 2025 09:15:00 GMT\",Wire,Apple beats,Strong quarter,,https://n.test/apple\n\
         2025-10-14T10:00:00Z,,Wire,,,,https://n.test/empty\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a dump").unwrap();

    let src = CsvDirSource::new(dir.path());
    let items = src.fetch_latest().await.unwrap();
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].title, "Apple beats");
    assert_eq!(items[0].source_name, "Wire");
    assert_eq!(items[0].url.as_deref(), Some("https://n.test/apple"));
    assert_eq!(
        items[0].published_time,
        Some(Utc.with_ymd_and_hms(2025, 10, 14, 9, 15, 0).unwrap())
    );

    assert_eq!(items[1].title, "Tesla recall");
    assert_eq!(items[1].body, "Body text");
    assert_eq!(items[1].url, None);
    assert_eq!(items[1].published_time, None);
    assert_eq!(
        items[1].source_timestamp,
        Utc.with_ymd_and_hms(2025, 10, 14, 9, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn empty_directory_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let items = CsvDirSource::new(dir.path()).fetch_latest().await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = CsvDirSource::new(dir.path().join("nope"));
    assert!(src.fetch_latest().await.is_err());
}

#[tokio::test]
async fn unreadable_dump_fails_the_source() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "title\nApple beats\n").unwrap();
    // a directory named like a dump cannot be opened as a file
    fs::create_dir(dir.path().join("b.csv")).unwrap();
    assert!(CsvDirSource::new(dir.path()).fetch_latest().await.is_err());
}
