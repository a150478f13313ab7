use crate::fetcher::Fetcher;
use crate::parser::SheetParser;
use crate::traits::PublicationSource;
use crate::types::{AggregatorError, NormalizedRecord, Result, SheetTab, SourceTag};
use crate::utils::url::endpoint;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// One tab (gid) of the publications spreadsheet, read through the gviz
/// query endpoint.
pub struct SheetSource {
    base_url: String,
    sheet_id: String,
    gid: String,
    tag: SourceTag,
    fetcher: Fetcher,
}

impl SheetSource {
    pub fn new(base_url: &str, sheet_id: &str, tab: &SheetTab, fetcher: Fetcher) -> Result<Self> {
        let tag = SourceTag::new(tab.label.as_str()).ok_or_else(|| {
            AggregatorError::Config(format!("sheet tab {} has an empty label", tab.gid))
        })?;
        Ok(Self {
            base_url: base_url.to_string(),
            sheet_id: sheet_id.to_string(),
            gid: tab.gid.clone(),
            tag,
            fetcher,
        })
    }

    pub fn query_url(&self) -> Result<Url> {
        endpoint(
            &self.base_url,
            &[self.sheet_id.as_str(), "gviz", "tq"],
            &[("tqx", "out:json"), ("gid", self.gid.as_str())],
        )
    }
}

#[async_trait]
impl PublicationSource for SheetSource {
    fn source_tag(&self) -> &SourceTag {
        &self.tag
    }

    fn source_name(&self) -> String {
        format!("Sheet {} (gid {})", self.tag, self.gid)
    }

    async fn pull(&self) -> Result<Vec<NormalizedRecord>> {
        let url = self.query_url()?;
        let body = self.fetcher.fetch_text(&url).await?;
        let parsed = SheetParser::new(self.tag.clone()).parse_framed(&body)?;
        debug!("Excluded rows for {}: {:?}", self.source_name(), parsed.excluded_rows);
        Ok(parsed.records)
    }
}
