pub mod pubmed;
pub mod sheet;

pub use pubmed::PubMedSource;
pub use sheet::SheetSource;
