use chrono::{DateTime, Duration, TimeZone, Utc};
use market_pulse::{Article, ArticleMapper, PipelineError, Watchlist};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 14, 12, 0, 0).unwrap()
}

fn watchlist() -> Watchlist {
    Watchlist::new([
        ("AAA", vec!["alpha corp"]),
        ("BBB", vec!["beta labs"]),
        ("CCC", vec!["gamma inc"]),
    ])
    .unwrap()
}

fn article(title: &str, url: Option<&str>, published: Option<DateTime<Utc>>) -> Article {
    Article {
        source_timestamp: now(),
        published_time: published,
        source_name: "Wire".into(),
        title: title.into(),
        summary: String::new(),
        body: String::new(),
        url: url.map(str::to_string),
    }
}

#[test]
fn duplicate_url_across_sources_keeps_first() {
    let mapper = ArticleMapper::new(&watchlist(), 24).unwrap();
    let first = vec![article("Alpha Corp raises guidance", Some("https://n.test/1"), Some(now()))];
    let second = vec![article("Alpha Corp raises guidance (updated)", Some("https://n.test/1"), Some(now()))];
    let rows = mapper.map([first, second], now()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Alpha Corp raises guidance");
}

#[test]
fn window_boundary_is_inclusive() {
    let mapper = ArticleMapper::new(&watchlist(), 24).unwrap();
    let edge = now() - Duration::hours(24);
    let batch = vec![
        article("AAA at the edge", Some("https://n.test/edge"), Some(edge)),
        article("AAA just inside", Some("https://n.test/in"), Some(edge + Duration::seconds(1))),
        article("AAA just outside", Some("https://n.test/out"), Some(edge - Duration::seconds(1))),
        article("AAA undated", Some("https://n.test/undated"), None),
    ];
    let (rows, stats) = mapper.map_with_stats([batch], now()).unwrap();
    let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["AAA at the edge", "AAA just inside", "AAA undated"]);
    assert_eq!(stats.stale, 1);
}

#[test]
fn fan_out_emits_one_row_per_ticker() {
    let mapper = ArticleMapper::new(&watchlist(), 24).unwrap();
    let a = article("Gamma Inc and Alpha Corp sign deal", Some("https://n.test/deal"), Some(now()));
    let rows = mapper.map([vec![a]], now()).unwrap();
    let tickers: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["AAA", "CCC"]);
    assert_eq!(rows[0].title, rows[1].title);
    assert_eq!(rows[0].url, rows[1].url);
    assert_eq!(rows[0].published_time, rows[1].published_time);
}

#[test]
fn unmatched_articles_are_dropped() {
    let mapper = ArticleMapper::new(&watchlist(), 24).unwrap();
    let batch = vec![
        article("Markets wrap", None, Some(now())),
        article("Beta Labs wins contract", None, Some(now())),
    ];
    let (rows, stats) = mapper.map_with_stats([batch], now()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ticker, "BBB");
    assert_eq!(stats.unmatched, 1);
}

#[test]
fn empty_input_is_an_error() {
    let mapper = ArticleMapper::new(&watchlist(), 24).unwrap();
    let err = mapper.map(Vec::<Vec<Article>>::new(), now()).unwrap_err();
    assert!(matches!(err, PipelineError::NoInput));
    let err = mapper.map([Vec::new(), Vec::new()], now()).unwrap_err();
    assert!(matches!(err, PipelineError::NoInput));
}

#[test]
fn all_stale_is_an_empty_success() {
    let mapper = ArticleMapper::new(&watchlist(), 1).unwrap();
    let old = now() - Duration::hours(5);
    let batch = vec![article("Alpha Corp old news", None, Some(old))];
    let rows = mapper.map([batch], now()).unwrap();
    assert!(rows.is_empty());
}
