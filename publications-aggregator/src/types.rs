use serde::{Deserialize, Serialize};
pub use interfaces::defs::{NormalizedRecord, SortKey, SourceTag};
pub use interfaces::state::{FilterButton, FilterCategory, FilterController};

use crate::framing::FrameError;
use crate::utils::url::is_fetchable;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub max_response_mb: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Publications-Aggregator/1.0".to_string(),
            timeout_seconds: 30,
            connect_timeout_seconds: 10,
            max_response_mb: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PubMedConfig {
    pub base_url: String,
    pub term: String,
    pub retmax: u32,
    pub label: String,
    pub link_prefix: String,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            term: "Bommakanti N[Author]".to_string(),
            retmax: 1000,
            label: "PubMed".to_string(),
            link_prefix: "https://pubmed.ncbi.nlm.nih.gov/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetTab {
    pub gid: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub base_url: String,
    pub sheet_id: String,
    pub tabs: Vec<SheetTab>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.google.com/spreadsheets/d".to_string(),
            sheet_id: "1VmBY80e_dJL6JrGpqcfK08ofAqERUZ_1CnewBUe__J8".to_string(),
            tabs: vec![SheetTab {
                gid: "0".to_string(),
                label: "Google Scholar".to_string(),
            }],
        }
    }
}

/// Everything needed to build the publications page. Every field has a
/// default so a config file only has to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub pubmed: PubMedConfig,
    pub sheet: SheetConfig,
    pub highlight_name: String,
    pub fetch: FetchConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            pubmed: PubMedConfig::default(),
            sheet: SheetConfig::default(),
            highlight_name: "Bommakanti".to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would produce records without a usable
    /// source tag or two sources sharing one.
    pub fn validate(&self) -> Result<()> {
        let mut labels = vec![self.pubmed.label.trim()];
        for tab in &self.sheet.tabs {
            if tab.gid.trim().is_empty() {
                return Err(AggregatorError::Config(format!(
                    "sheet tab '{}' has no gid",
                    tab.label
                )));
            }
            labels.push(tab.label.trim());
        }

        for (i, label) in labels.iter().enumerate() {
            if label.is_empty() {
                return Err(AggregatorError::Config("source labels must not be empty".to_string()));
            }
            if label.eq_ignore_ascii_case("all") {
                return Err(AggregatorError::Config("'All' is reserved for the unfiltered view".to_string()));
            }
            // Filter labels are matched case-insensitively.
            if labels[..i].iter().any(|seen| seen.eq_ignore_ascii_case(label)) {
                return Err(AggregatorError::Config(format!("duplicate source label '{}'", label)));
            }
        }

        for (field, base) in [
            ("pubmed.base_url", &self.pubmed.base_url),
            ("sheet.base_url", &self.sheet.base_url),
        ] {
            if !is_fetchable(base) {
                return Err(AggregatorError::Config(format!("{} is not an http(s) URL: {}", field, base)));
            }
        }

        if self.pubmed.retmax == 0 {
            return Err(AggregatorError::Config("pubmed.retmax must be at least 1".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} exceeds the {limit_mb}MB limit")]
    ResponseTooLarge { url: String, limit_mb: usize },

    #[error("Framed payload error: {0}")]
    Frame(#[from] FrameError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page template has no '{0}' container")]
    MissingContainer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
