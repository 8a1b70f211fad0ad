// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::error::PipelineError;
use crate::ingest::types::{Article, ArticleSource};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_articles_total",
            "Raw articles fetched from sources."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch/parse errors (each aborts the run)."
        );
        describe_histogram!("ingest_parse_ms", "Source parse time in milliseconds.");
    });
}

/// Normalize feed text: decode entities, strip tags, unify quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Fetch every source in order and concatenate the results.
///
/// A failing source fails the whole run: skipping it would silently skew the
/// hourly averages.
pub async fn collect_articles(
    sources: &[Box<dyn ArticleSource>],
) -> Result<Vec<Article>, PipelineError> {
    ensure_metrics_described();

    let mut all = Vec::new();
    for s in sources {
        let t0 = std::time::Instant::now();
        match s.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(target: "ingest", source = s.name(), articles = v.len(), "source fetched");
                counter!("ingest_articles_total").increment(v.len() as u64);
                all.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = s.name(), "source error");
                counter!("ingest_source_errors_total").increment(1);
                return Err(PipelineError::Source {
                    source_name: s.name().to_string(),
                    message: format!("{e:#}"),
                });
            }
        }
        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    }
    Ok(all)
}
