use crate::framing::GVIZ_FRAME;
use crate::types::{AggregatorError, NormalizedRecord, Result, SortKey, SourceTag};
use crate::utils::text::{first_token, split_authors};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// PubMed E-utilities
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub esearchresult: SearchResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub idlist: Vec<String>,
    #[serde(rename = "ERROR")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub result: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummaryEntry {
    pub title: String,
    pub authors: Vec<SummaryAuthor>,
    pub fulljournalname: String,
    pub source: String,
    pub pubdate: String,
    pub sortpubdate: String,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummaryAuthor {
    pub name: String,
}

/// Key of the identifier list inside an esummary `result` map.
const UIDS_KEY: &str = "uids";

pub struct SummaryParser {
    tag: SourceTag,
    link_prefix: String,
}

impl SummaryParser {
    pub fn new(tag: SourceTag, link_prefix: impl Into<String>) -> Self {
        Self {
            tag,
            link_prefix: link_prefix.into(),
        }
    }

    /// Map every summary entry to a record, following the `uids` order when
    /// the response carries one.
    pub fn parse(&self, response: &SummaryResponse) -> Vec<NormalizedRecord> {
        let result = &response.result;
        let ids: Vec<String> = match result.get(UIDS_KEY).and_then(Value::as_array) {
            Some(uids) => uids
                .iter()
                .filter_map(|uid| uid.as_str().map(str::to_string))
                .collect(),
            None => result.keys().filter(|k| *k != UIDS_KEY).cloned().collect(),
        };

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(raw) = result.get(&id) else {
                warn!("Summary for {} missing from response", id);
                continue;
            };
            let entry = match SummaryEntry::deserialize(raw) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable summary {}: {}", id, e);
                    continue;
                }
            };
            if let Some(error) = &entry.error {
                warn!("Skipping summary {}: {}", id, error);
                continue;
            }
            records.push(self.to_record(&id, entry));
        }

        debug!("Parsed {} summaries", records.len());
        records
    }

    fn to_record(&self, id: &str, entry: SummaryEntry) -> NormalizedRecord {
        let journal = if entry.fulljournalname.is_empty() {
            entry.source
        } else {
            entry.fulljournalname
        };
        let sort_key = SortKey::resolve([
            Some(entry.sortpubdate.as_str()),
            Some(entry.pubdate.as_str()),
        ]);

        NormalizedRecord {
            title: entry.title,
            authors: entry.authors.into_iter().map(|a| a.name).collect(),
            journal,
            year: first_token(&entry.pubdate).to_string(),
            sort_key,
            link: Some(format!("{}{}/", self.link_prefix, id)),
            source_tag: self.tag.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sheets gviz table
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableResponse {
    pub status: Option<String>,
    pub errors: Vec<Value>,
    pub table: Option<Table>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableRow {
    #[serde(rename = "c")]
    pub cells: Vec<Option<TableCell>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableCell {
    #[serde(rename = "v")]
    pub value: Option<Value>,
    #[serde(rename = "f")]
    pub formatted: Option<String>,
}

/// Column headers of the publications sheet, in column order.
pub const SHEET_HEADERS: [&str; 5] = ["Title", "Authors", "Journal", "Year", "Link"];

#[derive(Debug, Default)]
pub struct ParsedSheet {
    pub records: Vec<NormalizedRecord>,
    /// Zero-based indices of rows dropped as blank or header rows.
    pub excluded_rows: Vec<usize>,
}

pub struct SheetParser {
    tag: SourceTag,
}

impl SheetParser {
    pub fn new(tag: SourceTag) -> Self {
        Self { tag }
    }

    /// Strip the response frame, then parse the table inside it.
    pub fn parse_framed(&self, body: &str) -> Result<ParsedSheet> {
        let payload = GVIZ_FRAME.decode(body)?;
        self.parse_payload(payload)
    }

    pub fn parse_payload(&self, payload: &str) -> Result<ParsedSheet> {
        let response: TableResponse = serde_json::from_str(payload)?;

        if response.status.as_deref() == Some("error") {
            return Err(AggregatorError::Parse(format!(
                "sheet query failed: {}",
                Value::Array(response.errors)
            )));
        }
        let table = response
            .table
            .ok_or_else(|| AggregatorError::Parse("sheet response has no table".to_string()))?;

        let mut parsed = ParsedSheet::default();
        for (index, row) in table.rows.iter().enumerate() {
            let cells = row_values(row);
            if is_excluded(&cells) {
                parsed.excluded_rows.push(index);
                continue;
            }
            let year_date = row.cells.get(3).and_then(Option::as_ref).and_then(date_value);
            parsed.records.push(self.to_record(cells, year_date));
        }

        info!(
            "Parsed sheet '{}': {} records, {} rows excluded",
            self.tag,
            parsed.records.len(),
            parsed.excluded_rows.len()
        );
        Ok(parsed)
    }

    /// A year column typed as a date carries its year and full date in the
    /// raw value, whatever display format the sheet applies.
    fn to_record(&self, cells: [String; 5], year_date: Option<(i32, u32, u32)>) -> NormalizedRecord {
        let [title, authors, journal, year, link] = cells;
        let (year, sort_key) = match year_date {
            Some((y, m, d)) => (
                y.to_string(),
                SortKey::resolve([Some(format!("{:04}/{:02}/{:02}", y, m, d).as_str()), Some(year.as_str())]),
            ),
            None => {
                let sort_key = SortKey::resolve([Some(year.as_str())]);
                (year, sort_key)
            }
        };

        NormalizedRecord {
            title,
            authors: split_authors(&authors),
            journal,
            year,
            sort_key,
            link: if link.is_empty() { None } else { Some(link) },
            source_tag: self.tag.clone(),
        }
    }
}

/// Blank-title rows and rows repeating a column header never become records.
pub fn is_excluded(cells: &[String; 5]) -> bool {
    cells[0].is_empty()
        || cells
            .iter()
            .zip(SHEET_HEADERS)
            .any(|(value, header)| value == header)
}

fn row_values(row: &TableRow) -> [String; 5] {
    std::array::from_fn(|i| {
        row.cells
            .get(i)
            .and_then(Option::as_ref)
            .map(cell_text)
            .unwrap_or_default()
    })
}

/// `Date(2022,0,15)` as `(2022, 1, 15)`. Months are zero-based on the wire.
fn date_value(cell: &TableCell) -> Option<(i32, u32, u32)> {
    let Some(Value::String(raw)) = &cell.value else {
        return None;
    };
    let inner = raw.trim().strip_prefix("Date(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(str::trim);
    let year = parts.next()?.parse().ok()?;
    let month = parts.next().map_or(Some(0), |m| m.parse::<u32>().ok())?;
    let day = parts.next().map_or(Some(1), |d| d.parse().ok())?;
    Some((year, month + 1, day))
}

fn cell_text(cell: &TableCell) -> String {
    let text = match &cell.value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) if s.starts_with("Date(") => {
            cell.formatted.clone().unwrap_or_else(|| s.clone())
        }
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag(label: &str) -> SourceTag {
        SourceTag::new(label).unwrap()
    }

    fn row(values: &[Value]) -> Value {
        json!({ "c": values.iter().map(|v| json!({ "v": v })).collect::<Vec<_>>() })
    }

    #[test]
    fn summary_entries_follow_uid_order_and_skip_sentinel() {
        let response: SummaryResponse = serde_json::from_value(json!({
            "result": {
                "uids": ["222", "111"],
                "111": {
                    "title": "Older paper",
                    "authors": [{ "name": "Smith J" }],
                    "fulljournalname": "",
                    "source": "Ophthalmology",
                    "pubdate": "2021 Jun"
                },
                "222": {
                    "title": "Newer paper",
                    "authors": [{ "name": "Bommakanti N" }, { "name": "Lee K" }],
                    "fulljournalname": "JAMA Ophthalmology",
                    "source": "JAMA Ophthalmol",
                    "pubdate": "2023 Jan 12",
                    "sortpubdate": "2023/01/12 00:00"
                }
            }
        }))
        .unwrap();

        let parser = SummaryParser::new(tag("PubMed"), "https://pubmed.ncbi.nlm.nih.gov/");
        let records = parser.parse(&response);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Newer paper");
        assert_eq!(records[0].journal, "JAMA Ophthalmology");
        assert_eq!(records[0].year, "2023");
        assert_eq!(records[0].authors, vec!["Bommakanti N", "Lee K"]);
        assert_eq!(records[0].link.as_deref(), Some("https://pubmed.ncbi.nlm.nih.gov/222/"));
        assert_eq!(records[0].sort_key, SortKey::parse("2023/01/12").unwrap());

        assert_eq!(records[1].journal, "Ophthalmology");
        assert_eq!(records[1].sort_key, SortKey::parse("2021 Jun").unwrap());
        assert!(records.iter().all(|r| r.source_tag.as_str() == "PubMed"));
    }

    #[test]
    fn summary_without_uids_uses_map_keys() {
        let response: SummaryResponse = serde_json::from_value(json!({
            "result": { "5": { "title": "Only", "pubdate": "" } }
        }))
        .unwrap();
        let records = SummaryParser::new(tag("PubMed"), "https://x/").parse(&response);
        assert_eq!(records.len(), 1);
        assert!(records[0].sort_key.is_fallback());
        assert_eq!(records[0].year, "");
    }

    #[test]
    fn summary_error_entries_are_skipped() {
        let response: SummaryResponse = serde_json::from_value(json!({
            "result": {
                "uids": ["1", "2", "3"],
                "1": { "uid": "1", "error": "cannot get document summary" },
                "2": { "title": "Kept", "pubdate": "2020" },
                "3": "garbage"
            }
        }))
        .unwrap();
        let records = SummaryParser::new(tag("PubMed"), "https://x/").parse(&response);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");
    }

    #[test]
    fn sheet_rows_map_to_records() {
        let payload = json!({
            "table": { "rows": [
                row(&[json!("Retina outcomes"), json!("A Jones, N Bommakanti"), json!("Retina"), json!(2022.0), json!("https://doi.org/x")]),
                row(&[json!("Poster"), json!(""), json!(""), Value::Null, Value::Null]),
            ] }
        })
        .to_string();

        let parsed = SheetParser::new(tag("Scholar")).parse_payload(&payload).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert!(parsed.excluded_rows.is_empty());

        let first = &parsed.records[0];
        assert_eq!(first.year, "2022");
        assert_eq!(first.authors, vec!["A Jones", "N Bommakanti"]);
        assert_eq!(first.link.as_deref(), Some("https://doi.org/x"));
        assert_eq!(first.sort_key, SortKey::parse("2022/01/01").unwrap());

        let second = &parsed.records[1];
        assert!(second.authors.is_empty());
        assert!(second.link.is_none());
        assert!(second.sort_key.is_fallback());
    }

    #[test]
    fn header_and_blank_rows_are_excluded() {
        let payload = json!({
            "table": { "rows": [
                row(&[json!("Title"), json!("Authors"), json!("Journal"), json!("Year"), json!("Link")]),
                row(&[json!(""), json!("Someone"), json!("J"), json!(2020), json!("")]),
                { "c": [null, { "v": "A" }] },
                row(&[json!("Real"), json!("A B"), json!("Journal"), json!(2019), json!("")]),
                row(&[json!("Valid title"), json!("X Y"), json!("Eye"), json!(2018), json!("")]),
                { "c": [] },
            ] }
        })
        .to_string();

        let parsed = SheetParser::new(tag("Scholar")).parse_payload(&payload).unwrap();
        assert_eq!(parsed.excluded_rows, vec![0, 1, 2, 3, 5]);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].title, "Valid title");
    }

    #[test]
    fn framed_payload_is_unwrapped_first() {
        let body = crate::framing::wrap_gviz(
            &json!({ "table": { "rows": [row(&[json!("T"), json!("A"), json!("J"), json!("2001"), json!("")])] } })
                .to_string(),
        );
        let parsed = SheetParser::new(tag("Scholar")).parse_framed(&body).unwrap();
        assert_eq!(parsed.records.len(), 1);

        let err = SheetParser::new(tag("Scholar")).parse_framed("{}").unwrap_err();
        assert!(matches!(err, AggregatorError::Frame(_)), "{err}");
    }

    #[test]
    fn sheet_error_status_is_reported() {
        let payload = json!({ "status": "error", "errors": [{ "reason": "access_denied" }] }).to_string();
        let err = SheetParser::new(tag("Scholar")).parse_payload(&payload).unwrap_err();
        assert!(err.to_string().contains("access_denied"), "{err}");
    }

    #[test]
    fn date_cells_use_formatted_text() {
        let cell = TableCell {
            value: Some(json!("Date(2022,0,1)")),
            formatted: Some("2022".to_string()),
        };
        assert_eq!(cell_text(&cell), "2022");
    }

    #[test]
    fn date_typed_year_column_reads_the_raw_date() {
        let payload = json!({
            "status": "ok",
            "table": { "rows": [
                { "c": [
                    { "v": "Dated chapter" },
                    { "v": "N Bommakanti" },
                    { "v": "Textbook" },
                    { "v": "Date(2022,2,15)", "f": "3/15/2022" },
                    null
                ] },
                { "c": [
                    { "v": "Bare year" },
                    null,
                    null,
                    { "v": 2019.0, "f": "2019" },
                    null
                ] }
            ] }
        })
        .to_string();

        let parsed = SheetParser::new(tag("Scholar")).parse_payload(&payload).unwrap();
        assert_eq!(parsed.records[0].year, "2022");
        assert_eq!(parsed.records[0].sort_key, SortKey::parse("2022/03/15").unwrap());
        assert!(!parsed.records[0].sort_key.is_fallback());
        assert_eq!(parsed.records[1].year, "2019");
        assert_eq!(parsed.records[1].sort_key, SortKey::parse("2019").unwrap());
    }

    #[test]
    fn date_values_are_read_with_one_based_months() {
        let cell = |v: &str| TableCell {
            value: Some(json!(v)),
            formatted: None,
        };
        assert_eq!(date_value(&cell("Date(2022,0,1)")), Some((2022, 1, 1)));
        assert_eq!(date_value(&cell("Date(2021,11,31,8,30,0)")), Some((2021, 12, 31)));
        assert_eq!(date_value(&cell("2022")), None);
        assert_eq!(date_value(&cell("Date(soon)")), None);
    }
}
