//! Server-rendered dashboard: the current sample plus a table of the last
//! 24 hours, built from the same two queries the JSON API uses.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use hostwatch_collector::store::UsageStore;
use hostwatch_collector::types::UsageSample;

use crate::routes::{last_24h_window, ApiError};

pub async fn page<S: UsageStore + 'static>(
    State(store): State<Arc<S>>,
) -> Result<Html<String>, ApiError> {
    let latest = store.latest().await?;
    let rows = store.range_since(last_24h_window()).await?;
    Ok(Html(render(latest.as_ref(), &rows)))
}

fn render(latest: Option<&UsageSample>, rows: &[UsageSample]) -> String {
    let current = match latest {
        Some(s) => format!(
            "<p class=\"current\">cpu {:.1}% | mem {:.1}% | disk {:.1}% \
             <span class=\"ts\">as of {}</span></p>",
            s.cpu,
            s.mem,
            s.disk,
            s.ts.to_rfc3339()
        ),
        None => "<p class=\"current\">no data yet</p>".to_string(),
    };

    let mut table = String::from(
        "<table><tr><th>time (UTC)</th><th>cpu %</th><th>mem %</th><th>disk %</th></tr>",
    );
    for r in rows {
        let _ = write!(
            table,
            "<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr>",
            r.ts.format("%Y-%m-%d %H:%M:%S"),
            r.cpu,
            r.mem,
            r.disk
        );
    }
    table.push_str("</table>");

    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>hostwatch</title>\n<style>\n\
         body {{ font-family: sans-serif; margin: 2rem; }}\n\
         table {{ border-collapse: collapse; }}\n\
         td, th {{ border: 1px solid #ccc; padding: 0.3rem 0.8rem; text-align: right; }}\n\
         .ts {{ color: #888; font-size: 0.8rem; }}\n\
         </style>\n</head>\n<body>\n<h1>hostwatch</h1>\n{current}\n\
         <h2>last 24 hours</h2>\n{table}\n</body>\n</html>\n"
    )
}
