//! The publications page: the only place where output markup is assembled.
//!
//! A page template is an HTML document holding `{{slot}}` markers for the
//! containers the pipeline fills:
//!
//! - `{{loading}}`: the loading indicator, and where errors are reported
//! - `{{list_state}}`: class attribute of the wrapper around the list
//! - `{{filters}}`: the filter-button container
//! - `{{results}}`: the mount point for the publication fragments

use crate::render::PublicationFragment;
use crate::types::{AggregatorError, FilterCategory, FilterController, Result};
use crate::utils::text::escape_html;

pub const SLOT_LOADING: &str = "loading";
pub const SLOT_LIST_STATE: &str = "list_state";
pub const SLOT_FILTERS: &str = "filters";
pub const SLOT_RESULTS: &str = "results";

const LOADING_TEXT: &str = "Loading publications...";
const ACTIVE_BUTTON: &str = "bg-blue-600 text-white active";
const INACTIVE_BUTTON: &str = "bg-gray-200 text-gray-800";

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Publications</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50">
    <main class="container mx-auto px-6 py-12">
        <h1 class="text-4xl font-bold text-blue-900 text-center mb-8">Publications</h1>
        {{loading}}
        <div id="pubmed-list" class="{{list_state}}">
            <div id="filter-buttons" class="flex justify-center gap-3 mb-8">
{{filters}}
            </div>
            <div id="pubmed-results" class="space-y-6">
{{results}}
            </div>
        </div>
    </main>
</body>
</html>
"#;

// Mirrors FilterController in the browser: one active button, fragments
// shown when the filter is empty (All) or equals their data-source.
const FILTER_SCRIPT: &str = r#"<script>
(function () {
    var buttons = document.querySelectorAll("[data-filter]");
    var cards = document.querySelectorAll("[data-source]");
    buttons.forEach(function (button) {
        button.addEventListener("click", function () {
            var category = button.getAttribute("data-filter");
            buttons.forEach(function (other) {
                var on = other === button;
                ["bg-blue-600", "text-white", "active"].forEach(function (c) { other.classList.toggle(c, on); });
                ["bg-gray-200", "text-gray-800"].forEach(function (c) { other.classList.toggle(c, !on); });
            });
            cards.forEach(function (card) {
                card.classList.toggle("hidden", category !== "" && card.getAttribute("data-source") !== category);
            });
        });
    });
})();
</script>"#;

#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    /// A template must at least have somewhere to report errors.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let template = Self {
            source: source.into(),
        };
        if !template.has_slot(SLOT_LOADING) {
            return Err(AggregatorError::Config(format!(
                "page template has no {{{{{}}}}} slot",
                SLOT_LOADING
            )));
        }
        Ok(template)
    }

    pub fn slot_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                break;
            };
            names.push(after[..end].trim());
            rest = &after[end + 2..];
        }
        names
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slot_names().contains(&name)
    }

    fn require(&self, name: &str) -> Result<()> {
        if self.has_slot(name) {
            Ok(())
        } else {
            Err(AggregatorError::MissingContainer(name.to_string()))
        }
    }

    /// Substitute slots in a single pass so slot-like text inside the
    /// substituted values is left alone. Unknown slots are kept verbatim.
    fn fill(&self, values: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = after[..end].trim();
            match values.iter().find(|(slot, _)| *slot == name) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }

    /// The loaded page: indicator hidden, list shown, one button per filter
    /// category and every fragment mounted in order.
    pub fn render_loaded(
        &self,
        fragments: &[PublicationFragment],
        filter: &FilterController,
    ) -> Result<String> {
        for slot in [SLOT_LIST_STATE, SLOT_FILTERS, SLOT_RESULTS] {
            self.require(slot)?;
        }

        let loading = format!("<div id=\"loading\" class=\"hidden\">{}</div>", LOADING_TEXT);
        let filters = format!("{}\n{}", filter_buttons_html(filter), FILTER_SCRIPT);
        let results = fragments
            .iter()
            .enumerate()
            .map(|(i, fragment)| fragment.to_html(!filter.is_visible(i)))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(self.fill(&[
            (SLOT_LOADING, &loading),
            (SLOT_LIST_STATE, ""),
            (SLOT_FILTERS, &filters),
            (SLOT_RESULTS, &results),
        ]))
    }

    /// The failed page: the message replaces the loading indicator and the
    /// list stays hidden and empty.
    pub fn render_error(&self, message: &str) -> String {
        let loading = format!(
            "<div id=\"loading\"><p class=\"text-red-600\">{}</p></div>",
            escape_html(message)
        );
        self.fill(&[
            (SLOT_LOADING, &loading),
            (SLOT_LIST_STATE, "hidden"),
            (SLOT_FILTERS, ""),
            (SLOT_RESULTS, ""),
        ])
    }
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

pub fn filter_buttons_html(filter: &FilterController) -> String {
    filter
        .buttons()
        .iter()
        .map(|button| {
            let value = match &button.category {
                FilterCategory::All => String::new(),
                FilterCategory::Source(tag) => escape_html(tag.as_str()),
            };
            format!(
                "<button type=\"button\" data-filter=\"{}\" class=\"px-4 py-2 rounded-lg transition {}\">{}</button>",
                value,
                if button.active { ACTIVE_BUTTON } else { INACTIVE_BUTTON },
                escape_html(button.category.label())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceTag;

    fn fragment(title: &str, tag: &str) -> PublicationFragment {
        PublicationFragment {
            source_tag: SourceTag::new(tag).unwrap(),
            title: title.to_string(),
            authors: Vec::new(),
            journal: String::new(),
            year: String::new(),
            link: None,
        }
    }

    #[test]
    fn default_template_has_every_slot() {
        let template = PageTemplate::default();
        for slot in [SLOT_LOADING, SLOT_LIST_STATE, SLOT_FILTERS, SLOT_RESULTS] {
            assert!(template.has_slot(slot), "missing {slot}");
        }
    }

    #[test]
    fn template_without_loading_slot_is_rejected() {
        let err = PageTemplate::new("<div>{{results}}</div>").unwrap_err();
        assert!(matches!(err, AggregatorError::Config(_)));
    }

    #[test]
    fn loaded_page_mounts_fragments_and_buttons() {
        let fragments = vec![fragment("alpha-title", "PubMed"), fragment("beta-title", "Sheet")];
        let tags: Vec<SourceTag> = fragments.iter().map(|f| f.source_tag.clone()).collect();
        let mut filter = FilterController::new(&tags);
        filter.select(&FilterCategory::Source(tags[1].clone()));

        let html = PageTemplate::default().render_loaded(&fragments, &filter).unwrap();
        assert!(html.contains("id=\"loading\" class=\"hidden\""));
        assert!(html.contains("id=\"pubmed-list\" class=\"\""));
        assert_eq!(html.matches("data-filter=").count(), 3);
        assert!(html.contains(&format!("data-filter=\"Sheet\" class=\"px-4 py-2 rounded-lg transition {}\"", ACTIVE_BUTTON)));
        assert!(html.contains(&format!("data-filter=\"\" class=\"px-4 py-2 rounded-lg transition {}\"", INACTIVE_BUTTON)));
        assert!(html.find("alpha-title").unwrap() < html.find("beta-title").unwrap());
        assert_eq!(html.matches(" hidden\" data-source=").count(), 1);
    }

    #[test]
    fn missing_results_slot_is_a_missing_container() {
        let template = PageTemplate::new("{{loading}}<div class=\"{{list_state}}\">{{filters}}</div>").unwrap();
        let filter = FilterController::new(std::iter::empty());
        let err = template.render_loaded(&[], &filter).unwrap_err();
        assert!(matches!(err, AggregatorError::MissingContainer(ref slot) if slot == "results"));
    }

    #[test]
    fn error_page_replaces_loading_and_hides_list() {
        let html = PageTemplate::default().render_error("Error <loading> publications.");
        assert!(html.contains("<p class=\"text-red-600\">Error &lt;loading&gt; publications.</p>"));
        assert!(html.contains("id=\"pubmed-list\" class=\"hidden\""));
        assert!(!html.contains("data-filter="));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn slot_text_inside_values_is_not_expanded() {
        let template = PageTemplate::new("{{loading}}|{{list_state}}|{{filters}}|{{results}}|{{unknown}}").unwrap();
        let fragments = vec![fragment("{{results}}", "PubMed")];
        let tags = vec![fragments[0].source_tag.clone()];
        let html = template
            .render_loaded(&fragments, &FilterController::new(&tags))
            .unwrap();
        assert!(html.contains("<strong>{{results}}</strong>"));
        assert!(html.ends_with("|{{unknown}}"));
    }
}
