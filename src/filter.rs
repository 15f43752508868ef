//! Listing filters and pagination.
//!
//! The listing page filters recipes in the browser, and the paginated pages
//! are filtered and sliced at build time. Both must agree on what matches, so
//! every predicate input is computed here in Rust: the JSON index embedded
//! in the listing page carries the precomputed search haystack, lowercased
//! difficulty and time bucket for each recipe, and `static/filter.js` only
//! performs substring and equality tests on those fields.

use crate::naming;
use crate::types::Recipe;
use serde::Serialize;

/// Coarse cooking-time groups used by the time filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    /// 30 minutes or less.
    Quick,
    /// 31 to 60 minutes.
    Medium,
    /// Over an hour.
    Long,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 3] = [Self::Quick, Self::Medium, Self::Long];

    pub fn for_minutes(minutes: u32) -> Self {
        match minutes {
            0..=30 => Self::Quick,
            31..=60 => Self::Medium,
            _ => Self::Long,
        }
    }

    /// Bucket of a recipe's displayed time. Recipes without a time have none.
    pub fn for_recipe(recipe: &Recipe) -> Option<Self> {
        recipe.display_minutes().map(Self::for_minutes)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Quick => "30 min or less",
            Self::Medium => "31 to 60 min",
            Self::Long => "Over an hour",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == s)
    }
}

/// Lowercased text the search box matches against: title, description, tags
/// and ingredients, one per line.
pub fn search_haystack(recipe: &Recipe) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(2 + recipe.tags.len() + recipe.ingredients.len());
    parts.push(&recipe.title);
    parts.push(&recipe.description);
    parts.extend(recipe.tags.iter().map(String::as_str));
    parts.extend(recipe.ingredients.iter().map(String::as_str));
    parts.join("\n").to_lowercase()
}

/// Active filters of a listing. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search: String,
    /// Exact category label.
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub time: Option<TimeBucket>,
    pub tag: Option<String>,
}

impl FilterState {
    pub fn for_tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.category.is_none()
            && self.difficulty.is_none()
            && self.time.is_none()
            && self.tag.is_none()
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        let query = self.search.trim().to_lowercase();
        if !query.is_empty() && !search_haystack(recipe).contains(&query) {
            return false;
        }
        if let Some(category) = &self.category {
            if recipe.category != *category {
                return false;
            }
        }
        if let Some(difficulty) = &self.difficulty {
            let wanted = difficulty.trim().to_lowercase();
            let actual = normalized_difficulty(recipe);
            if actual.as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        if let Some(bucket) = self.time {
            if TimeBucket::for_recipe(recipe) != Some(bucket) {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !recipe.has_tag(tag) {
                return false;
            }
        }
        true
    }
}

fn normalized_difficulty(recipe: &Recipe) -> Option<String> {
    recipe
        .difficulty
        .as_deref()
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
}

/// Recipes matching `state`, preserving input order.
pub fn filter_recipes<'a>(recipes: &[&'a Recipe], state: &FilterState) -> Vec<&'a Recipe> {
    recipes
        .iter()
        .copied()
        .filter(|r| state.matches(r))
        .collect()
}

/// Distinct difficulties present, lowercased, sorted.
pub fn difficulty_options(recipes: &[&Recipe]) -> Vec<String> {
    let set: std::collections::BTreeSet<String> =
        recipes.iter().filter_map(|r| normalized_difficulty(r)).collect();
    set.into_iter().collect()
}

/// One recipe as seen by the browser-side filter.
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    /// Lowercased; empty when unknown.
    pub difficulty: String,
    pub minutes: Option<u32>,
    pub bucket: Option<TimeBucket>,
    /// Trimmed, lowercased tags for the `?tag=` filter.
    pub tags: Vec<String>,
    /// [`search_haystack`] of the recipe.
    pub search: String,
}

impl IndexEntry {
    pub fn from_recipe(recipe: &Recipe, placeholder_image: &str) -> Self {
        Self {
            slug: recipe.slug.clone(),
            url: naming::recipe_route(&recipe.slug),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            image: recipe
                .image
                .clone()
                .unwrap_or_else(|| placeholder_image.to_string()),
            category: recipe.category.clone(),
            difficulty: normalized_difficulty(recipe).unwrap_or_default(),
            minutes: recipe.display_minutes(),
            bucket: TimeBucket::for_recipe(recipe),
            tags: recipe
                .tags
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            search: search_haystack(recipe),
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Number of listing pages for `total` recipes. Always at least one so the
/// listing root exists even for an empty catalog.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// The window of a 1-based `page`: items at offset `(page - 1) * page_size`
/// up to `page_size` items. Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if page == 0 || start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::recipe;

    #[test]
    fn time_bucket_boundaries() {
        assert_eq!(TimeBucket::for_minutes(0), TimeBucket::Quick);
        assert_eq!(TimeBucket::for_minutes(30), TimeBucket::Quick);
        assert_eq!(TimeBucket::for_minutes(31), TimeBucket::Medium);
        assert_eq!(TimeBucket::for_minutes(60), TimeBucket::Medium);
        assert_eq!(TimeBucket::for_minutes(61), TimeBucket::Long);
    }

    #[test]
    fn time_bucket_uses_total_then_cook_time() {
        let mut r = recipe("x", "C");
        r.total_time = None;
        r.cook_time = Some(45);
        assert_eq!(TimeBucket::for_recipe(&r), Some(TimeBucket::Medium));
        r.cook_time = None;
        assert_eq!(TimeBucket::for_recipe(&r), None);
    }

    #[test]
    fn time_bucket_parse_roundtrips_names() {
        for b in TimeBucket::ALL {
            assert_eq!(TimeBucket::parse(b.as_str()), Some(b));
        }
        assert_eq!(TimeBucket::parse("forever"), None);
    }

    #[test]
    fn search_matches_title_tags_and_ingredients() {
        let mut r = recipe("pho", "Soups");
        r.title = "Chicken Pho".into();
        r.tags = vec!["Vietnamese".into()];
        r.ingredients = vec!["rice noodles".into()];

        for query in ["pho", "VIETNAM", "noodles", "  chicken  "] {
            let state = FilterState {
                search: query.into(),
                ..FilterState::default()
            };
            assert!(state.matches(&r), "query {query:?} should match");
        }
        let miss = FilterState {
            search: "lasagna".into(),
            ..FilterState::default()
        };
        assert!(!miss.matches(&r));
    }

    #[test]
    fn category_filter_is_exact() {
        let r = recipe("a", "Breakfast");
        let mut state = FilterState {
            category: Some("Breakfast".into()),
            ..FilterState::default()
        };
        assert!(state.matches(&r));
        state.category = Some("Dinner".into());
        assert!(!state.matches(&r));
    }

    #[test]
    fn difficulty_filter_ignores_case() {
        let mut r = recipe("a", "C");
        r.difficulty = Some("Easy".into());
        let state = FilterState {
            difficulty: Some("easy".into()),
            ..FilterState::default()
        };
        assert!(state.matches(&r));
        r.difficulty = None;
        assert!(!state.matches(&r));
    }

    #[test]
    fn time_filter_excludes_unknown_times() {
        let mut r = recipe("a", "C");
        r.total_time = None;
        r.cook_time = None;
        let state = FilterState {
            time: Some(TimeBucket::Quick),
            ..FilterState::default()
        };
        assert!(!state.matches(&r));
    }

    #[test]
    fn empty_state_matches_everything() {
        let state = FilterState::default();
        assert!(state.is_empty());
        assert!(state.matches(&recipe("a", "C")));
    }

    #[test]
    fn index_entry_carries_server_predicate_inputs() {
        let mut r = recipe("stew", "Dinner");
        r.difficulty = Some(" Hard ".into());
        r.total_time = Some(90);
        r.image = None;
        let entry = IndexEntry::from_recipe(&r, "/ph.svg");

        assert_eq!(entry.search, search_haystack(&r));
        assert_eq!(entry.bucket, TimeBucket::for_recipe(&r));
        assert_eq!(entry.difficulty, "hard");
        assert_eq!(entry.url, "/recipe/stew/");
        assert_eq!(entry.image, "/ph.svg");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["bucket"], "long");
    }

    #[test]
    fn difficulty_options_are_distinct_and_sorted() {
        let mut a = recipe("a", "C");
        a.difficulty = Some("Medium".into());
        let mut b = recipe("b", "C");
        b.difficulty = Some("easy".into());
        let mut c = recipe("c", "C");
        c.difficulty = Some("EASY".into());
        assert_eq!(difficulty_options(&[&a, &b, &c]), vec!["easy", "medium"]);
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    #[test]
    fn total_pages_edge_cases() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn page_slice_windows() {
        let items: Vec<u32> = (0..11).collect();
        assert_eq!(page_slice(&items, 1, 10), &items[0..10]);
        assert_eq!(page_slice(&items, 2, 10), &[10]);
        assert!(page_slice(&items, 3, 10).is_empty());
        assert!(page_slice(&items, 0, 10).is_empty());
    }

    #[test]
    fn pages_cover_every_item_exactly_once() {
        for page_size in 1..=7 {
            for total in [0, 1, page_size, page_size + 1, page_size * 3, 23] {
                let items: Vec<usize> = (0..total).collect();
                let pages = total_pages(total, page_size);
                let union: Vec<usize> = (1..=pages)
                    .flat_map(|p| page_slice(&items, p, page_size).to_vec())
                    .collect();
                assert_eq!(union, items, "page_size={page_size} total={total}");
                if total > 0 {
                    assert!(!page_slice(&items, pages, page_size).is_empty());
                }
            }
        }
    }
}
