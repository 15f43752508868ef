//! Shared record types read from the recipe data source.
//!
//! These mirror the rows the CRUD API stores. Field names on the wire are
//! camelCase. Every field the API may leave empty is an `Option` so templates
//! must handle the absent case explicitly; a present `0` is never treated as
//! missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Moderation state of a recipe. Only [`RecipeStatus::Published`] is rendered.
///
/// Read case-insensitively from every source, so `"Published"` and
/// `" published "` both count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RecipeStatus {
    Published,
    Draft,
    Flagged,
    /// Any status the generator does not know about. Never rendered.
    Other,
}

impl From<String> for RecipeStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl RecipeStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "published" => Self::Published,
            "draft" => Self::Draft,
            "flagged" => Self::Flagged,
            _ => Self::Other,
        }
    }
}

/// A recipe row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub prep_time: Option<u32>,
    #[serde(default)]
    pub cook_time: Option<u32>,
    #[serde(default)]
    pub total_time: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    /// Static rating, 0.0 to 5.0.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tips: Option<String>,
    #[serde(default)]
    pub variations: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_naturally_gluten_free: bool,
    pub status: RecipeStatus,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn is_published(&self) -> bool {
        self.status == RecipeStatus::Published
    }

    /// Time shown on cards and used for time buckets: total time, else cook time.
    pub fn display_minutes(&self) -> Option<u32> {
        self.total_time.or(self.cook_time)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| t.trim().to_lowercase() == tag)
    }
}

/// A user review fetched from the ratings collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub author: String,
    /// 1 to 5.
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A source record that could not be decoded into a [`Recipe`].
///
/// Whatever identity could be salvaged from the raw record is kept so the
/// failure can be reported against it.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    pub id: Option<i64>,
    pub slug: Option<String>,
    pub error: String,
}

/// Everything one build reads from the data source.
///
/// Treated as immutable for the duration of a build and passed explicitly
/// through every pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub recipes: Vec<Recipe>,
    /// Reviews keyed by recipe id. Absent ids simply have no reviews.
    #[serde(default)]
    pub reviews: BTreeMap<i64, Vec<Review>>,
    /// Published-looking records that failed to decode. Each one is a failed page.
    #[serde(skip)]
    pub malformed: Vec<MalformedRecord>,
}

impl Snapshot {
    pub fn reviews_for(&self, recipe_id: i64) -> &[Review] {
        self.reviews
            .get(&recipe_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
