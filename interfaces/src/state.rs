use std::fmt;

use crate::defs::SourceTag;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FilterCategory {
    All,
    Source(SourceTag),
}

impl FilterCategory {
    pub fn label(&self) -> &str {
        match self {
            FilterCategory::All => "All",
            FilterCategory::Source(tag) => tag.as_str(),
        }
    }

    pub fn admits(&self, tag: &SourceTag) -> bool {
        match self {
            FilterCategory::All => true,
            FilterCategory::Source(active) => active == tag,
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterButton {
    pub category: FilterCategory,
    pub active: bool,
}

/// Single-select filter over a fixed set of rendered fragments.
///
/// The category set is `All` plus one entry per distinct tag among the
/// fragments, in order of first appearance. Selecting a category only
/// changes which fragments are visible; the fragments themselves are never
/// rebuilt.
#[derive(Clone, Debug)]
pub struct FilterController {
    categories: Vec<FilterCategory>,
    fragment_tags: Vec<SourceTag>,
    active: FilterCategory,
}

impl FilterController {
    pub fn new<'a>(fragment_tags: impl IntoIterator<Item = &'a SourceTag>) -> Self {
        let fragment_tags: Vec<SourceTag> = fragment_tags.into_iter().cloned().collect();

        let mut categories = vec![FilterCategory::All];
        for tag in &fragment_tags {
            let category = FilterCategory::Source(tag.clone());
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        Self {
            categories,
            fragment_tags,
            active: FilterCategory::All,
        }
    }

    pub fn categories(&self) -> &[FilterCategory] {
        &self.categories
    }

    pub fn active(&self) -> &FilterCategory {
        &self.active
    }

    pub fn is_active(&self, category: &FilterCategory) -> bool {
        &self.active == category
    }

    /// Moves to `category`. Returns `false` and keeps the current state when
    /// the category is not one of [`categories`](Self::categories).
    pub fn select(&mut self, category: &FilterCategory) -> bool {
        if !self.categories.contains(category) {
            return false;
        }
        if &self.active != category {
            self.active = category.clone();
        }
        true
    }

    /// Looks a category up by its button label (`All` or a tag).
    pub fn category_by_label(&self, label: &str) -> Option<&FilterCategory> {
        self.categories
            .iter()
            .find(|category| category.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.fragment_tags
            .get(index)
            .map(|tag| self.active.admits(tag))
            .unwrap_or(false)
    }

    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.fragment_tags
            .iter()
            .enumerate()
            .filter(|(_, tag)| self.active.admits(tag))
            .map(|(index, _)| index)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices().count()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragment_tags.len()
    }

    pub fn buttons(&self) -> Vec<FilterButton> {
        self.categories
            .iter()
            .map(|category| FilterButton {
                category: category.clone(),
                active: self.is_active(category),
            })
            .collect()
    }
}
