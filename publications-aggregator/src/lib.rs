pub mod types;
pub mod framing;
pub mod fetcher;
pub mod parser;
pub mod traits;
pub mod sources;
pub mod aggregator;
pub mod render;
pub mod page;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use fetcher::Fetcher;
pub use framing::{FrameError, FrameFormat, GVIZ_FRAME};
pub use parser::{SheetParser, SummaryParser};
pub use traits::PublicationSource;
pub use sources::{PubMedSource, SheetSource};
pub use aggregator::{merge_sorted, AggregatedPublications, PublicationAggregator};
pub use render::{FragmentRenderer, PublicationFragment};
pub use page::PageTemplate;
pub use pipeline::{PageOutcome, PublicationsPipeline};
