use crate::aggregator::PublicationAggregator;
use crate::page::PageTemplate;
use crate::render::FragmentRenderer;
use crate::types::{FilterController, NormalizedRecord, Result, SiteConfig, SourceTag};
use tracing::{error, info, warn};

/// Shown in place of the loading indicator when the page cannot be built.
pub const ERROR_MESSAGE: &str = "Error loading publications. Check the build log for details.";

/// Result of one pipeline run. `html` is always a complete page: on failure
/// it is the error page.
#[derive(Debug)]
pub struct PageOutcome {
    pub html: String,
    pub records: Vec<NormalizedRecord>,
    pub source_counts: Vec<(SourceTag, usize)>,
    pub succeeded: bool,
}

/// Fetch, merge, render and mount the publications list.
pub struct PublicationsPipeline {
    aggregator: PublicationAggregator,
    renderer: FragmentRenderer,
    template: PageTemplate,
    initial_filter: Option<String>,
}

impl PublicationsPipeline {
    pub fn new(aggregator: PublicationAggregator, renderer: FragmentRenderer, template: PageTemplate) -> Self {
        Self {
            aggregator,
            renderer,
            template,
            initial_filter: None,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Ok(Self::new(
            PublicationAggregator::from_config(config)?,
            FragmentRenderer::new(config.highlight_name.as_str()),
            PageTemplate::default(),
        ))
    }

    pub fn with_template(mut self, template: PageTemplate) -> Self {
        self.template = template;
        self
    }

    /// Start the page filtered to the category with this label (`All` or a
    /// source tag).
    pub fn with_initial_filter(mut self, label: impl Into<String>) -> Self {
        self.initial_filter = Some(label.into());
        self
    }

    pub async fn run(&self) -> PageOutcome {
        let aggregated = self.aggregator.collect().await;

        let (html, succeeded) = match self.render_page(&aggregated.records) {
            Ok(html) => {
                info!("Rendered {} publications", aggregated.records.len());
                (html, true)
            }
            Err(e) => {
                error!("Publication loading failed: {}", e);
                (self.template.render_error(ERROR_MESSAGE), false)
            }
        };

        PageOutcome {
            html,
            records: aggregated.records,
            source_counts: aggregated.source_counts,
            succeeded,
        }
    }

    fn render_page(&self, records: &[NormalizedRecord]) -> Result<String> {
        let fragments = self.renderer.render_all(records);
        let mut filter = FilterController::new(fragments.iter().map(|f| &f.source_tag));

        if let Some(label) = &self.initial_filter {
            match filter.category_by_label(label).cloned() {
                Some(category) => {
                    filter.select(&category);
                    info!(
                        "Initial filter '{}': {} of {} publications visible",
                        category,
                        filter.visible_count(),
                        filter.fragment_count()
                    );
                }
                None => warn!("No publications tagged '{}'; showing all", label),
            }
        }

        self.template.render_loaded(&fragments, &filter)
    }
}
