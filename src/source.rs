//! Recipe data source.
//!
//! The generator reads the catalog exactly once per build through a
//! [`RecipeSource`]. Two implementations exist:
//!
//! - [`JsonSnapshotSource`]: a JSON export of the catalog, either
//!   `{"recipes": [...], "reviews": {"<id>": [...]}}` or a bare array of recipes.
//! - [`SqliteSource`]: the CRUD API's SQLite database, addressed by a
//!   `sqlite://` connection string.
//!
//! A source that cannot be read at all is fatal to the build, and nothing is
//! written until a full snapshot has been fetched. Records are decoded one
//! at a time: a record that fails to decode lands in
//! [`Snapshot::malformed`] and fails only its own page. A review that fails
//! to decode is logged and skipped.

use crate::types::{MalformedRecord, Recipe, RecipeStatus, Review, Snapshot};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("snapshot {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("snapshot {path} is not a recipe export: {reason}")]
    Shape { path: PathBuf, reason: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("cannot start database runtime: {0}")]
    Runtime(std::io::Error),
}

/// Why a single record could not be decoded. Never fatal to the build.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Column(#[from] sqlx::Error),
    #[error("column `{column}` is not a JSON string list: {source}")]
    List {
        column: &'static str,
        source: serde_json::Error,
    },
    #[error("column `{column}` holds {value}, not a count of minutes")]
    Minutes { column: &'static str, value: i64 },
}

/// Read-only access to the recipe catalog.
pub trait RecipeSource {
    /// Every recipe eligible for publishing, plus reviews keyed by recipe id.
    ///
    /// Sources may return non-published rows too; the catalog filters again.
    /// Order is unspecified.
    fn get_all_published(&self) -> Result<Snapshot, SourceError>;

    /// Human-readable location, for log lines.
    fn describe(&self) -> String;
}

/// Pick a source from a connection string: `sqlite:` URLs open the database,
/// anything else is a JSON snapshot path.
pub fn open_source(connection: &str) -> Box<dyn RecipeSource + Send + Sync> {
    if connection.starts_with("sqlite:") {
        Box::new(SqliteSource::new(connection))
    } else {
        Box::new(JsonSnapshotSource::new(connection))
    }
}

/// Identity fields read straight from a raw record, before decoding.
#[derive(Debug, Default)]
struct RecordHint {
    id: Option<i64>,
    slug: Option<String>,
    status: Option<String>,
}

/// Keep a decoded record, or remember why it failed.
///
/// A record that fails to decode but whose raw status is readable and not
/// `published` is dropped like any other unpublished row.
fn admit(snapshot: &mut Snapshot, decoded: Result<Recipe, RecordError>, hint: RecordHint) {
    match decoded {
        Ok(recipe) => snapshot.recipes.push(recipe),
        Err(_)
            if hint
                .status
                .as_deref()
                .is_some_and(|s| RecipeStatus::parse(s) != RecipeStatus::Published) => {}
        Err(e) => {
            warn!(id = ?hint.id, slug = ?hint.slug, error = %e, "recipe record cannot be decoded");
            snapshot.malformed.push(MalformedRecord {
                id: hint.id,
                slug: hint.slug,
                error: e.to_string(),
            });
        }
    }
}

// ============================================================================
// JSON snapshot
// ============================================================================

pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn shape_error(&self, reason: &'static str) -> SourceError {
        SourceError::Shape {
            path: self.path.clone(),
            reason,
        }
    }
}

impl RecordHint {
    fn from_json(record: &Value) -> Self {
        Self {
            id: record.get("id").and_then(Value::as_i64),
            slug: record.get("slug").and_then(Value::as_str).map(str::to_string),
            status: record.get("status").and_then(Value::as_str).map(str::to_string),
        }
    }
}

impl RecipeSource for JsonSnapshotSource {
    fn get_all_published(&self) -> Result<Snapshot, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let export: Value = serde_json::from_str(&content).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let (records, reviews) = match export {
            Value::Array(records) => (records, Value::Null),
            Value::Object(mut fields) => match fields.remove("recipes") {
                Some(Value::Array(records)) => {
                    (records, fields.remove("reviews").unwrap_or(Value::Null))
                }
                _ => return Err(self.shape_error("expected a `recipes` array")),
            },
            _ => return Err(self.shape_error("expected an object or an array of recipes")),
        };

        let mut snapshot = Snapshot::default();
        for record in records {
            let hint = RecordHint::from_json(&record);
            let decoded = serde_json::from_value::<Recipe>(record).map_err(RecordError::from);
            admit(&mut snapshot, decoded, hint);
        }

        match reviews {
            Value::Null => {}
            Value::Object(by_recipe) => {
                for (key, list) in by_recipe {
                    let Ok(recipe_id) = key.trim().parse::<i64>() else {
                        warn!(key = %key, "reviews keyed by something other than a recipe id");
                        continue;
                    };
                    match serde_json::from_value::<Vec<Review>>(list) {
                        Ok(list) => {
                            snapshot.reviews.entry(recipe_id).or_default().extend(list);
                        }
                        Err(e) => warn!(recipe_id, error = %e, "reviews cannot be decoded"),
                    }
                }
            }
            _ => return Err(self.shape_error("`reviews` must map recipe ids to review lists")),
        }
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// Reads the `recipes` table and, when it exists, the `reviews` table.
///
/// List columns (`ingredients`, `instructions`, `variations`, `tags`) hold
/// JSON arrays of strings, as written by the CRUD API.
pub struct SqliteSource {
    url: String,
}

const RECIPES_QUERY: &str = "SELECT id, slug, title, description, long_description, category, \
     difficulty, image, prep_time, cook_time, total_time, servings, rating, calories, protein, \
     carbs, fat, fiber, ingredients, instructions, tips, variations, tags, \
     is_naturally_gluten_free, status, seo_title, seo_description, created_at \
     FROM recipes WHERE lower(trim(status)) = 'published'";

const REVIEWS_QUERY: &str =
    "SELECT recipe_id, author, rating, comment, created_at FROM reviews ORDER BY recipe_id, id";

impl SqliteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        let options = SqliteConnectOptions::from_str(&self.url)?.read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let mut snapshot = Snapshot::default();
        let rows = sqlx::query(RECIPES_QUERY).fetch_all(&pool).await?;
        for row in &rows {
            let hint = RecordHint {
                id: row.try_get("id").ok(),
                slug: row.try_get("slug").ok(),
                status: row.try_get("status").ok(),
            };
            admit(&mut snapshot, recipe_from_row(row), hint);
        }

        if has_table(&pool, "reviews").await? {
            let rows = sqlx::query(REVIEWS_QUERY).fetch_all(&pool).await?;
            for row in &rows {
                match review_from_row(row) {
                    Ok((recipe_id, review)) => {
                        snapshot.reviews.entry(recipe_id).or_default().push(review);
                    }
                    Err(e) => warn!(error = %e, "review row cannot be decoded"),
                }
            }
        }

        pool.close().await;
        Ok(snapshot)
    }
}

impl RecipeSource for SqliteSource {
    fn get_all_published(&self) -> Result<Snapshot, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceError::Runtime)?;
        runtime.block_on(self.fetch())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

async fn has_table(pool: &SqlitePool, name: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;
    let n: i64 = row.try_get("n")?;
    Ok(n > 0)
}

fn review_from_row(row: &SqliteRow) -> Result<(i64, Review), sqlx::Error> {
    Ok((
        row.try_get("recipe_id")?,
        Review {
            author: row.try_get("author")?,
            rating: row.try_get("rating")?,
            comment: row.try_get("comment")?,
            created_at: row.try_get("created_at")?,
        },
    ))
}

fn recipe_from_row(row: &SqliteRow) -> Result<Recipe, RecordError> {
    let list = |column: &'static str| -> Result<Vec<String>, RecordError> {
        let raw: Option<String> = row.try_get(column)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(Vec::new()),
            Some(json) => {
                serde_json::from_str(json).map_err(|source| RecordError::List { column, source })
            }
        }
    };
    let minutes = |column: &'static str| -> Result<Option<u32>, RecordError> {
        let value: Option<i64> = row.try_get(column)?;
        value
            .map(|m| u32::try_from(m).map_err(|_| RecordError::Minutes { column, value: m }))
            .transpose()
    };
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let gluten_free: Option<bool> = row.try_get("is_naturally_gluten_free")?;

    Ok(Recipe {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        title: row.try_get("title")?,
        description: row.try_get::<Option<String>, _>("description")?.unwrap_or_default(),
        long_description: row.try_get("long_description")?,
        category: row.try_get("category")?,
        difficulty: row.try_get("difficulty")?,
        image: row.try_get("image")?,
        prep_time: minutes("prep_time")?,
        cook_time: minutes("cook_time")?,
        total_time: minutes("total_time")?,
        servings: minutes("servings")?,
        rating: row.try_get("rating")?,
        calories: row.try_get("calories")?,
        protein: row.try_get("protein")?,
        carbs: row.try_get("carbs")?,
        fat: row.try_get("fat")?,
        fiber: row.try_get("fiber")?,
        ingredients: list("ingredients")?,
        instructions: list("instructions")?,
        tips: row.try_get("tips")?,
        variations: list("variations")?,
        tags: list("tags")?,
        is_naturally_gluten_free: gluten_free.unwrap_or(false),
        status: RecipeStatus::parse(&status),
        seo_title: row.try_get("seo_title")?,
        seo_description: row.try_get("seo_description")?,
        created_at,
    })
}
