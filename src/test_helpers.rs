//! Shared test utilities for the gf-press test suite.
//!
//! Provides recipe builders with sensible defaults, snapshot and config
//! fixtures, in-memory data sources, and lookups into a built site tree.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let snapshot = snapshot_of(vec![recipe("pancakes", "Breakfast")]);
//! let catalog = Catalog::from_snapshot(&snapshot, &test_config());
//! assert_eq!(catalog.category_labels(), vec!["Breakfast"]);
//! ```

use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::SiteConfig;
use crate::source::{RecipeSource, SourceError};
use crate::types::{Recipe, RecipeStatus, Review, Snapshot};

// =========================================================================
// Record builders
// =========================================================================

static NEXT_ID: AtomicI64 = AtomicI64::new(1);

/// A published recipe with every optional field filled in.
///
/// Ids are unique per process; tests that key reviews by id set it
/// explicitly.
pub fn recipe(slug: &str, category: &str) -> Recipe {
    recipe_at(slug, category, "2024-01-01T00:00:00Z")
}

/// Same as [`recipe`] with an explicit `createdAt`.
pub fn recipe_at(slug: &str, category: &str, created_at: &str) -> Recipe {
    Recipe {
        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        slug: slug.to_string(),
        title: format!("Recipe {slug}"),
        description: format!("A gluten-free {category} favorite."),
        long_description: None,
        category: category.to_string(),
        difficulty: Some("Easy".to_string()),
        image: Some(format!("/images/{slug}.jpg")),
        prep_time: Some(10),
        cook_time: Some(20),
        total_time: Some(30),
        servings: Some(4),
        rating: Some(4.0),
        calories: Some(250.0),
        protein: Some(10.0),
        carbs: Some(30.0),
        fat: Some(8.0),
        fiber: Some(3.0),
        ingredients: vec!["1 cup rice flour".to_string(), "2 eggs".to_string()],
        instructions: vec!["Mix everything.".to_string(), "Bake for 20 minutes.".to_string()],
        tips: None,
        variations: Vec::new(),
        tags: Vec::new(),
        is_naturally_gluten_free: false,
        status: RecipeStatus::Published,
        seo_title: None,
        seo_description: None,
        created_at: parse_time(created_at),
    }
}

pub fn parse_time(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("bad timestamp {rfc3339:?}: {e}"))
        .with_timezone(&Utc)
}

pub fn review(author: &str, rating: f64) -> Review {
    Review {
        author: author.to_string(),
        rating,
        comment: Some(format!("Made this twice. {author}")),
        created_at: None,
    }
}

// =========================================================================
// Fixtures
// =========================================================================

pub fn snapshot_of(recipes: Vec<Recipe>) -> Snapshot {
    Snapshot {
        recipes,
        ..Snapshot::default()
    }
}

/// `a` (Breakfast, published), `b` (Breakfast, draft), `c` (Dinner, published).
pub fn scenario_snapshot() -> Snapshot {
    let mut draft = recipe("b", "Breakfast");
    draft.status = RecipeStatus::Draft;
    snapshot_of(vec![recipe("a", "Breakfast"), draft, recipe("c", "Dinner")])
}

/// Stock config with a fixed base URL.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.site.base_url = "https://gf.example.com".to_string();
    config
}

// =========================================================================
// In-memory sources
// =========================================================================

/// Serves a fixed snapshot.
pub struct StaticSource(pub Snapshot);

impl RecipeSource for StaticSource {
    fn get_all_published(&self) -> Result<Snapshot, SourceError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "in-memory snapshot".to_string()
    }
}

/// Always fails like an unreachable database.
pub struct FailingSource;

impl RecipeSource for FailingSource {
    fn get_all_published(&self) -> Result<Snapshot, SourceError> {
        Err(SourceError::Read {
            path: "unreachable.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        })
    }

    fn describe(&self) -> String {
        "unreachable".to_string()
    }
}

// =========================================================================
// Output tree lookups (panic with a clear message on miss)
// =========================================================================

/// Read a generated file relative to the output root. Panics if missing.
pub fn read_output(root: &Path, relative: &str) -> String {
    let path = root.join(relative);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

/// All `index.html` files under `root`, as paths relative to it, sorted.
pub fn html_pages(root: &Path) -> Vec<String> {
    let mut pages: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    pages.sort();
    pages
}
