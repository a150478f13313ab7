use httpmock::prelude::*;
use httpmock::Mock;
use publications_aggregator::framing::wrap_gviz;
use publications_aggregator::{SheetTab, SiteConfig};
use serde_json::{json, Value};
use std::sync::Once;

static INIT: Once = Once::new();

pub const SHEET_ID: &str = "sheet-1";
pub const SHEET_GID: &str = "0";
pub const SHEET_LABEL: &str = "Scholar";

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

/// Site config pointing every source at `server`.
pub fn config_for(server: &MockServer) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.pubmed.base_url = server.base_url();
    config.sheet.base_url = server.base_url();
    config.sheet.sheet_id = SHEET_ID.to_string();
    config.sheet.tabs = vec![SheetTab {
        gid: SHEET_GID.to_string(),
        label: SHEET_LABEL.to_string(),
    }];
    config.fetch.timeout_seconds = 5;
    config
}

pub fn summary(title: &str, authors: &[&str], journal: &str, pubdate: &str) -> Value {
    json!({
        "title": title,
        "authors": authors.iter().map(|name| json!({ "name": name, "authtype": "Author" })).collect::<Vec<_>>(),
        "fulljournalname": journal,
        "source": journal,
        "pubdate": pubdate,
    })
}

pub fn sheet_row(cells: [&str; 5]) -> Value {
    json!({ "c": cells.iter().map(|v| json!({ "v": v })).collect::<Vec<_>>() })
}

pub fn sheet_body(rows: Vec<Value>) -> String {
    let payload = json!({
        "version": "0.6",
        "status": "ok",
        "table": { "cols": [], "rows": rows }
    });
    wrap_gviz(&payload.to_string())
}

pub async fn mock_search<'a>(server: &'a MockServer, ids: &[&str]) -> Mock<'a> {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/esearch.fcgi")
                .query_param("db", "pubmed")
                .query_param("term", "Bommakanti N[Author]")
                .query_param("retmode", "json")
                .query_param("sort", "pub_date");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "esearchresult": { "count": ids.len().to_string(), "idlist": ids } }));
        })
        .await
}

pub async fn mock_summary<'a>(server: &'a MockServer, result: Value) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/esummary.fcgi");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "header": {}, "result": result }));
        })
        .await
}

pub async fn mock_sheet(server: &MockServer, status: u16, body: String) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/{}/gviz/tq", SHEET_ID))
                .query_param("tqx", "out:json")
                .query_param("gid", SHEET_GID);
            then.status(status).body(body);
        })
        .await
}
