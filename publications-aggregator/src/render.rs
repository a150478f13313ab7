use crate::types::{NormalizedRecord, SourceTag};
use crate::utils::text::escape_html;

const CARD_CLASS: &str = "bg-white p-6 rounded-xl shadow-lg hover:shadow-2xl transition max-w-3xl mx-auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSpan {
    pub name: String,
    pub highlighted: bool,
}

/// Display-ready description of one publication, independent of where it
/// ends up being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationFragment {
    pub source_tag: SourceTag,
    pub title: String,
    pub authors: Vec<AuthorSpan>,
    pub journal: String,
    pub year: String,
    pub link: Option<String>,
}

impl PublicationFragment {
    /// Authors, journal and year as one line of HTML.
    pub fn byline_html(&self) -> String {
        let authors = self
            .authors
            .iter()
            .map(|author| {
                let name = escape_html(&author.name);
                if author.highlighted {
                    format!("<strong class=\"text-blue-900\">{}</strong>", name)
                } else {
                    name
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut line = authors;
        if !line.is_empty() && !self.journal.is_empty() {
            line.push_str(", ");
        }
        if !self.journal.is_empty() {
            line.push_str(&format!("<em>{}</em>", escape_html(&self.journal)));
        }
        if !self.year.is_empty() {
            line.push_str(&format!(", {}", escape_html(&self.year)));
        }
        line
    }

    pub fn to_html(&self, hidden: bool) -> String {
        let class = if hidden {
            format!("{} hidden", CARD_CLASS)
        } else {
            CARD_CLASS.to_string()
        };

        let mut html = format!(
            "<div class=\"{}\" data-source=\"{}\">\n",
            class,
            escape_html(self.source_tag.as_str())
        );
        html.push_str(&format!(
            "  <p class=\"text-lg text-gray-800 mb-2\"><strong>{}</strong></p>\n",
            escape_html(&self.title)
        ));
        html.push_str(&format!(
            "  <p class=\"text-gray-700 mb-2\">{}</p>\n",
            self.byline_html()
        ));
        if let Some(link) = &self.link {
            html.push_str(&format!(
                "  <a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"text-blue-600 hover:underline text-sm\">View →</a>\n",
                escape_html(link)
            ));
        }
        html.push_str("</div>");
        html
    }
}

/// Turns records into fragments, bolding the site owner's name wherever it
/// appears in an author list.
pub struct FragmentRenderer {
    highlight_name: String,
}

impl FragmentRenderer {
    pub fn new(highlight_name: impl Into<String>) -> Self {
        Self {
            highlight_name: highlight_name.into(),
        }
    }

    pub fn is_highlighted(&self, author: &str) -> bool {
        !self.highlight_name.is_empty() && author.contains(&self.highlight_name)
    }

    pub fn render(&self, record: &NormalizedRecord) -> PublicationFragment {
        PublicationFragment {
            source_tag: record.source_tag.clone(),
            title: record.title.clone(),
            authors: record
                .authors
                .iter()
                .map(|name| AuthorSpan {
                    name: name.clone(),
                    highlighted: self.is_highlighted(name),
                })
                .collect(),
            journal: record.journal.clone(),
            year: record.year.clone(),
            link: record.link.clone().filter(|link| !link.is_empty()),
        }
    }

    /// Fragments in the same order as `records`.
    pub fn render_all(&self, records: &[NormalizedRecord]) -> Vec<PublicationFragment> {
        records.iter().map(|record| self.render(record)).collect()
    }
}
