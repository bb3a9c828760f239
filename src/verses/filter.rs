use std::cmp::Ordering;

use crate::models::{Priority, Verse, VerseCategory};

/// Filter parameters for the verse list. They are sent to the backend and the
/// same predicate is applied to the response, so a backend that only knows
/// `search` and `category` still yields a consistent view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseFilters {
    pub search: String,
    pub category: Option<VerseCategory>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

impl VerseFilters {
    /// Case-insensitive substring on title or lyrics, exact category and
    /// priority, and every requested tag present.
    pub fn matches(&self, verse: &Verse) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || verse.title.to_lowercase().contains(&needle)
            || verse.lyrics.to_lowercase().contains(&needle);
        let matches_category = self.category.map_or(true, |c| verse.category == c);
        let matches_priority = self.priority.map_or(true, |p| verse.priority == p);
        let matches_tags = self.tags.iter().all(|wanted| {
            verse
                .tags
                .iter()
                .any(|tag| tag.trim().eq_ignore_ascii_case(wanted.trim()))
        });

        matches_search && matches_category && matches_priority && matches_tags
    }

    /// Query string pairs for `GET /verses`. Empty parameters are omitted.
    pub fn query_pairs(&self, sort: VerseSort) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        pairs.push(("sort_by", sort.field.as_param().to_string()));
        pairs.push(("sort_order", sort.order.as_param().to_string()));
        pairs
    }

    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty()
            || self.category.is_some()
            || self.priority.is_some()
            || !self.tags.is_empty()
    }

    /// One-line description for the list header.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.trim().is_empty() {
            parts.push(format!("\"{}\"", self.search.trim()));
        }
        if let Some(category) = self.category {
            parts.push(category.label().to_string());
        }
        if let Some(priority) = self.priority {
            parts.push(format!("{} priority", priority.label()));
        }
        if !self.tags.is_empty() {
            parts.push(format!("#{}", self.tags.join(" #")));
        }
        if parts.is_empty() {
            "All verses".to_string()
        } else {
            parts.join(" · ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    UpdatedAt,
    CreatedAt,
    Title,
    Priority,
    WordCount,
}

impl SortField {
    const ALL: [SortField; 5] = [
        SortField::UpdatedAt,
        SortField::CreatedAt,
        SortField::Title,
        SortField::Priority,
        SortField::WordCount,
    ];

    pub fn as_param(self) -> &'static str {
        match self {
            SortField::UpdatedAt => "updated_at",
            SortField::CreatedAt => "created_at",
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::WordCount => "word_count",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::UpdatedAt => "Last updated",
            SortField::CreatedAt => "Created",
            SortField::Title => "Title",
            SortField::Priority => "Priority",
            SortField::WordCount => "Word count",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn flip(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Ordering of the verse list. Defaults to most recently updated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerseSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl VerseSort {
    /// Stable sort, so records the backend returned in equal order keep it.
    pub fn apply(&self, verses: &mut [Verse]) {
        verses.sort_by(|a, b| {
            let ordering = self.compare(a, b);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    fn compare(&self, a: &Verse, b: &Verse) -> Ordering {
        match self.field {
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::WordCount => a.display_word_count().cmp(&b.display_word_count()),
        }
    }

    pub fn label(&self) -> String {
        let arrow = match self.order {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        };
        format!("{} {arrow}", self.field.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(title: &str, lyrics: &str, category: VerseCategory) -> Verse {
        Verse {
            id: title.to_lowercase(),
            title: title.to_string(),
            lyrics: lyrics.to_string(),
            category,
            ..Verse::default()
        }
    }

    #[test]
    fn search_matches_title_or_lyrics_case_insensitively() {
        let filters = VerseFilters {
            search: "MOON".to_string(),
            ..VerseFilters::default()
        };
        assert!(filters.matches(&verse("Moonlight", "", VerseCategory::Album)));
        assert!(filters.matches(&verse("Night", "under the moon", VerseCategory::Album)));
        assert!(!filters.matches(&verse("Sun", "daylight", VerseCategory::Album)));
    }

    #[test]
    fn category_is_an_exact_match() {
        let filters = VerseFilters {
            category: Some(VerseCategory::Hooks),
            ..VerseFilters::default()
        };
        assert!(filters.matches(&verse("a", "", VerseCategory::Hooks)));
        assert!(!filters.matches(&verse("a", "", VerseCategory::Freestyle)));
    }

    #[test]
    fn every_requested_tag_must_be_present() {
        let mut tagged = verse("a", "", VerseCategory::Album);
        tagged.tags = vec!["Dark".to_string(), "trap".to_string()];
        let both = VerseFilters {
            tags: vec!["dark".to_string(), "trap".to_string()],
            ..VerseFilters::default()
        };
        let missing = VerseFilters {
            tags: vec!["dark".to_string(), "drill".to_string()],
            ..VerseFilters::default()
        };
        assert!(both.matches(&tagged));
        assert!(!missing.matches(&tagged));
    }

    #[test]
    fn query_pairs_skip_empty_parameters() {
        let filters = VerseFilters {
            search: "  ".to_string(),
            priority: Some(Priority::Urgent),
            tags: vec!["a".to_string(), "b".to_string()],
            ..VerseFilters::default()
        };
        let pairs = filters.query_pairs(VerseSort::default());
        assert_eq!(
            pairs,
            vec![
                ("priority", "urgent".to_string()),
                ("tags", "a,b".to_string()),
                ("sort_by", "updated_at".to_string()),
                ("sort_order", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn sort_by_title_ignores_case() {
        let mut verses = vec![
            verse("beta", "", VerseCategory::Album),
            verse("Alpha", "", VerseCategory::Album),
            verse("gamma", "", VerseCategory::Album),
        ];
        VerseSort {
            field: SortField::Title,
            order: SortOrder::Asc,
        }
        .apply(&mut verses);
        let titles: Vec<_> = verses.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn priority_descending_puts_urgent_first() {
        let mut low = verse("low", "", VerseCategory::Album);
        low.priority = Priority::Low;
        let mut urgent = verse("urgent", "", VerseCategory::Album);
        urgent.priority = Priority::Urgent;
        let mut verses = vec![low, urgent];
        VerseSort {
            field: SortField::Priority,
            order: SortOrder::Desc,
        }
        .apply(&mut verses);
        assert_eq!(verses[0].title, "urgent");
    }

    #[test]
    fn sort_field_cycles_back_to_default() {
        let mut field = SortField::default();
        for _ in 0..5 {
            field = field.next();
        }
        assert_eq!(field, SortField::UpdatedAt);
    }
}
