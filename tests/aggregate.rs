use chrono::{DateTime, Duration, TimeZone, Utc};
use market_pulse::mapper::MappedRow;
use market_pulse::snapshot;
use market_pulse::{aggregate, PipelineError, SentimentRow, Signal, SignalPolicy};

fn h(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 14, hour, 0, 0).unwrap()
}

fn row(ticker: &str, at: DateTime<Utc>, score: f64, title: &str) -> SentimentRow {
    SentimentRow {
        row: MappedRow {
            published_time: Some(at),
            source_timestamp: at + Duration::minutes(1),
            source_name: "Wire".into(),
            ticker: ticker.into(),
            title: title.into(),
            summary: String::new(),
            body: String::new(),
            url: Some(format!("https://n.test/{title}")),
        },
        sentiment_score: score,
        sentiment_confidence: 0.8,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn bucket_mean_volume_and_first_hour() {
    let rows = vec![
        row("AAA", h(10) + Duration::minutes(5), 0.5, "a"),
        row("AAA", h(10) + Duration::minutes(40), 0.7, "b"),
        row("AAA", h(10) + Duration::minutes(59), -0.1, "c"),
    ];
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    assert_eq!(out.len(), 1);
    let b = &out[0];
    assert_eq!(b.hour, h(10));
    assert_eq!(b.volume, 3);
    assert!(close(b.avg_sentiment, 0.3667), "avg {}", b.avg_sentiment);
    assert_eq!(b.sentiment_delta, None);
    assert_eq!(b.signal, Signal::Hold);
    assert_eq!(b.confidence, 0.0);
    assert_eq!(b.rep_title, "b");
}

#[test]
fn rising_sentiment_with_volume_is_buy() {
    let mut rows = vec![
        row("AAA", h(9), 0.1, "h9a"),
        row("AAA", h(9) + Duration::minutes(30), -0.1, "h9b"),
    ];
    for (i, s) in [0.5, 0.3, 0.6, 0.2].into_iter().enumerate() {
        rows.push(row("AAA", h(10) + Duration::minutes(i as i64), s, &format!("h10-{i}")));
    }
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    assert_eq!(out.len(), 2);
    let second = &out[1];
    assert!(close(second.sentiment_delta.unwrap(), 0.4));
    assert_eq!(second.volume, 4);
    assert_eq!(second.signal, Signal::Buy);
    assert!(close(second.confidence, 0.2667), "confidence {}", second.confidence);
    assert_eq!(second.rep_title, "h10-2");
    assert_eq!(second.rep_article_sentiment, Some(0.6));
}

#[test]
fn thin_bucket_holds_despite_large_delta() {
    let rows = vec![row("AAA", h(9), 0.1, "x"), row("AAA", h(10), 0.5, "y")];
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    assert!(close(out[1].sentiment_delta.unwrap(), 0.4));
    assert_eq!(out[1].volume, 1);
    assert_eq!(out[1].signal, Signal::Hold);
}

#[test]
fn falling_sentiment_is_sell() {
    let rows = vec![
        row("AAA", h(9), 0.4, "p1"),
        row("AAA", h(9), 0.2, "p2"),
        row("AAA", h(11), -0.3, "n1"),
        row("AAA", h(11), -0.1, "n2"),
    ];
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    assert_eq!(out.len(), 2);
    assert!(close(out[1].sentiment_delta.unwrap(), -0.5));
    assert_eq!(out[1].signal, Signal::Sell);
}

#[test]
fn representative_is_strongest_opinion_either_sign() {
    let rows = vec![
        row("AAA", h(10), 0.1, "mild"),
        row("AAA", h(10) + Duration::minutes(2), -0.6, "harsh"),
        row("AAA", h(10) + Duration::minutes(3), 0.3, "meh"),
    ];
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    assert_eq!(out[0].rep_title, "harsh");
    assert_eq!(out[0].rep_article_sentiment, Some(-0.6));
    assert_eq!(out[0].rep_url.as_deref(), Some("https://n.test/harsh"));
}

#[test]
fn delta_never_crosses_tickers() {
    let rows = vec![
        row("BBB", h(10), 0.9, "b"),
        row("AAA", h(11), -0.9, "a"),
    ];
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    assert_eq!(out[0].ticker, "AAA");
    assert_eq!(out[1].ticker, "BBB");
    assert!(out.iter().all(|r| r.sentiment_delta.is_none()));
}

#[test]
fn output_sorted_by_ticker_then_hour() {
    let rows = vec![
        row("CCC", h(12), 0.1, "c12"),
        row("AAA", h(13), 0.1, "a13"),
        row("CCC", h(8), 0.1, "c8"),
        row("AAA", h(7), 0.1, "a7"),
    ];
    let out = aggregate(&rows, &SignalPolicy::default()).unwrap();
    let keys: Vec<(&str, DateTime<Utc>)> = out.iter().map(|r| (r.ticker.as_str(), r.hour)).collect();
    assert_eq!(
        keys,
        vec![("AAA", h(7)), ("AAA", h(13)), ("CCC", h(8)), ("CCC", h(12))]
    );
}

#[test]
fn unknown_publish_time_buckets_by_fetch_time() {
    let mut r = row("AAA", h(10), 0.2, "undated");
    r.row.published_time = None;
    r.row.source_timestamp = h(15) + Duration::minutes(20);
    let out = aggregate(&[r], &SignalPolicy::default()).unwrap();
    assert_eq!(out[0].hour, h(15));
}

#[test]
fn same_input_same_bytes() {
    let rows = vec![
        row("AAA", h(9), 0.1, "a"),
        row("AAA", h(10), 0.5, "b"),
        row("AAA", h(10), -0.5, "c"),
        row("BBB", h(10), 0.0, "d"),
    ];
    let p = SignalPolicy::default();
    let one = snapshot::to_csv_bytes(&aggregate(&rows, &p).unwrap()).unwrap();
    let two = snapshot::to_csv_bytes(&aggregate(&rows, &p).unwrap()).unwrap();
    assert_eq!(one, two);
}

#[test]
fn empty_input_is_no_sentiment_data() {
    let err = aggregate(&[], &SignalPolicy::default()).unwrap_err();
    assert!(matches!(err, PipelineError::NoSentimentData));
}

#[test]
fn custom_policy_thresholds_are_strict() {
    let policy = SignalPolicy {
        buy_delta: 0.5,
        sell_delta: -0.5,
        min_volume: 1,
    };
    let rows = vec![
        row("AAA", h(9), 0.0, "base"),
        row("AAA", h(10), 0.5, "at-threshold"),
        row("AAA", h(11), -0.01, "drop"),
        row("AAA", h(12), 0.6, "rebound"),
    ];
    let out = aggregate(&rows, &policy).unwrap();
    assert_eq!(out[1].signal, Signal::Hold);
    assert_eq!(out[2].signal, Signal::Sell);
    assert_eq!(out[3].signal, Signal::Buy);
}
