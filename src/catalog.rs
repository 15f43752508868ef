//! Build-time view of the recipe snapshot.
//!
//! The [`Catalog`] is computed once per build from a [`Snapshot`] and owns
//! every aggregate the templates need: the eligible recipes in their fixed
//! total order, the category aggregate, tag groupings and the featured
//! subset for the home page. Nothing downstream looks at the raw snapshot
//! again except to fetch reviews.
//!
//! ## Eligibility
//!
//! A recipe is eligible when its status is `published`, it has a title, its
//! slug is a valid URL segment, and no earlier eligible recipe claimed the
//! same slug. Rejected published records, and records the source could not
//! decode at all, are kept in [`Catalog::rejected`] so the builder can count
//! them as failed pages. Nothing links to a rejected record. Drafts and
//! flagged recipes are silently ignored.
//!
//! ## Ordering
//!
//! Recipes are ordered by `createdAt` descending with ties broken by slug,
//! so a listing page never reshuffles between two builds of the same data.

use crate::config::SiteConfig;
use crate::naming::{self, category_slug, tag_slug};
use crate::types::{Recipe, Review, Snapshot};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// One entry of the category aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    /// Label exactly as authored.
    pub label: String,
    pub slug: String,
    /// Eligible recipes carrying this exact label.
    pub count: usize,
}

impl CategoryEntry {
    pub fn route(&self) -> String {
        naming::category_route(&self.slug)
    }
}

/// One output page per distinct category slug.
#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub slug: String,
    /// Display title: the first label (in aggregate order) mapping to this slug.
    pub title: String,
    /// Indices into [`Catalog::recipes`], in catalog order.
    pub recipes: Vec<usize>,
}

/// One output page per distinct tag slug.
#[derive(Debug, Clone)]
pub struct TagPage {
    pub slug: String,
    pub title: String,
    pub recipes: Vec<usize>,
}

/// A published record that cannot be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// `None` when the record was too broken to carry a readable id.
    pub id: Option<i64>,
    /// Empty when unknown.
    pub slug: String,
    pub reason: RejectReason,
}

impl Rejected {
    fn of(recipe: &Recipe, reason: RejectReason) -> Self {
        Self {
            id: Some(recipe.id),
            slug: recipe.slug.clone(),
            reason,
        }
    }

    /// `recipe 7 'slug'` for reports and logs.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("recipe {id} '{}'", self.slug),
            None => format!("recipe without id '{}'", self.slug),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    InvalidSlug,
    DuplicateSlug,
    EmptyTitle,
    /// The source record could not be decoded.
    Malformed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSlug => write!(f, "slug is not a lowercase hyphenated token"),
            Self::DuplicateSlug => write!(f, "slug already used by another recipe"),
            Self::EmptyTitle => write!(f, "title is empty"),
            Self::Malformed(error) => write!(f, "record cannot be decoded: {error}"),
        }
    }
}

/// Data inconsistencies surfaced to the operator. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Distinct category labels share one slug; their recipes share one page.
    CategorySlugCollision { slug: String, labels: Vec<String> },
    /// Distinct tags share one slug; their recipes share one page.
    TagSlugCollision { slug: String, tags: Vec<String> },
    /// The home page themed section matched no recipe.
    EmptyFeatured { tag: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategorySlugCollision { slug, labels } => {
                write!(f, "categories {labels:?} all map to /category/{slug}/")
            }
            Self::TagSlugCollision { slug, tags } => {
                write!(f, "tags {tags:?} all map to /tag/{slug}/")
            }
            Self::EmptyFeatured { tag } => {
                write!(f, "featured section: no published recipe tagged '{tag}'")
            }
        }
    }
}

#[derive(Debug)]
pub struct Catalog<'a> {
    /// Eligible recipes in total order.
    pub recipes: Vec<&'a Recipe>,
    /// Category aggregate: distinct labels, sorted.
    pub categories: Vec<CategoryEntry>,
    /// One page per distinct category slug, sorted by slug.
    pub category_pages: Vec<CategoryPage>,
    /// One page per distinct tag slug, sorted by slug.
    pub tag_pages: Vec<TagPage>,
    /// Indices of the home page themed subset.
    pub featured: Vec<usize>,
    pub rejected: Vec<Rejected>,
    pub warnings: Vec<Warning>,
    snapshot: &'a Snapshot,
}

/// Total order used by every listing.
pub fn listing_order(a: &Recipe, b: &Recipe) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.slug.cmp(&b.slug))
}

impl<'a> Catalog<'a> {
    pub fn from_snapshot(snapshot: &'a Snapshot, config: &SiteConfig) -> Self {
        let mut published: Vec<&Recipe> =
            snapshot.recipes.iter().filter(|r| r.is_published()).collect();
        // Deterministic winner for duplicate slugs regardless of fetch order.
        published.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut recipes = Vec::with_capacity(published.len());
        let mut rejected: Vec<Rejected> = snapshot
            .malformed
            .iter()
            .map(|m| Rejected {
                id: m.id,
                slug: m.slug.clone().unwrap_or_default(),
                reason: RejectReason::Malformed(m.error.clone()),
            })
            .collect();
        let mut seen = HashSet::new();
        for recipe in published {
            if recipe.title.trim().is_empty() {
                rejected.push(Rejected::of(recipe, RejectReason::EmptyTitle));
            } else if !naming::is_valid_slug(&recipe.slug) {
                rejected.push(Rejected::of(recipe, RejectReason::InvalidSlug));
            } else if !seen.insert(recipe.slug.as_str()) {
                rejected.push(Rejected::of(recipe, RejectReason::DuplicateSlug));
            } else {
                recipes.push(recipe);
            }
        }
        recipes.sort_by(|a, b| listing_order(a, b));

        let mut warnings = Vec::new();
        let categories = category_aggregate(&recipes);
        let category_pages = group_by_slug(
            &recipes,
            |r| vec![r.category.as_str()],
            category_slug,
        );
        for (slug, labels) in collisions(&category_pages.1, true) {
            warnings.push(Warning::CategorySlugCollision { slug, labels });
        }
        let category_pages = category_pages
            .0
            .into_iter()
            .map(|(slug, title, recipes)| CategoryPage {
                slug,
                title,
                recipes,
            })
            .collect();

        let tag_groups = group_by_slug(
            &recipes,
            |r| r.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect(),
            tag_slug,
        );
        for (slug, tags) in collisions(&tag_groups.1, false) {
            warnings.push(Warning::TagSlugCollision { slug, tags });
        }
        let tag_pages = tag_groups
            .0
            .into_iter()
            .map(|(slug, title, recipes)| TagPage {
                slug,
                title,
                recipes,
            })
            .collect();

        let featured_tag = config.home.featured_tag.trim();
        let featured: Vec<usize> = if featured_tag.is_empty() {
            Vec::new()
        } else {
            let matches: Vec<usize> = recipes
                .iter()
                .enumerate()
                .filter(|(_, r)| r.has_tag(featured_tag))
                .map(|(i, _)| i)
                .take(config.home.featured_limit)
                .collect();
            if matches.is_empty() {
                warnings.push(Warning::EmptyFeatured {
                    tag: featured_tag.to_string(),
                });
            }
            matches
        };

        Self {
            recipes,
            categories,
            category_pages,
            tag_pages,
            featured,
            rejected,
            warnings,
            snapshot,
        }
    }

    pub fn reviews_for(&self, recipe: &Recipe) -> &'a [Review] {
        self.snapshot.reviews_for(recipe.id)
    }

    pub fn category_labels(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn category_page(&self, slug: &str) -> Option<&CategoryPage> {
        self.category_pages.iter().find(|p| p.slug == slug)
    }

    pub fn recipes_at(&self, indices: &[usize]) -> Vec<&'a Recipe> {
        indices.iter().map(|&i| self.recipes[i]).collect()
    }

    /// Up to `limit` other recipes from the same category slug, in catalog order.
    pub fn related(&self, recipe: &Recipe, limit: usize) -> Vec<&'a Recipe> {
        let slug = category_slug(&recipe.category);
        self.category_page(&slug)
            .map(|page| {
                page.recipes
                    .iter()
                    .map(|&i| self.recipes[i])
                    .filter(|r| r.slug != recipe.slug)
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Distinct category labels of eligible recipes, sorted, with counts.
fn category_aggregate(recipes: &[&Recipe]) -> Vec<CategoryEntry> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in recipes {
        *counts.entry(r.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| CategoryEntry {
            label: label.to_string(),
            slug: category_slug(label),
            count,
        })
        .collect()
}

type Groups = (
    Vec<(String, String, Vec<usize>)>,
    BTreeMap<String, BTreeSet<String>>,
);

/// Group recipe indices by the slug of each key they carry.
///
/// Returns `(slug, title, indices)` sorted by slug, plus every label seen per
/// slug so collisions can be reported. The title is the smallest label.
fn group_by_slug<'r>(
    recipes: &[&'r Recipe],
    keys: impl Fn(&'r Recipe) -> Vec<&'r str>,
    slug: fn(&str) -> String,
) -> Groups {
    let mut members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut labels: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (i, recipe) in recipes.iter().enumerate() {
        let mut slugs_for_recipe = BTreeSet::new();
        for key in keys(*recipe) {
            let s = slug(key);
            labels.entry(s.clone()).or_default().insert(key.to_string());
            slugs_for_recipe.insert(s);
        }
        for s in slugs_for_recipe {
            members.entry(s).or_default().push(i);
        }
    }
    let groups = members
        .into_iter()
        .map(|(s, indices)| {
            let title = labels
                .get(&s)
                .and_then(|l| l.iter().next())
                .cloned()
                .unwrap_or_else(|| s.clone());
            (s, title, indices)
        })
        .collect();
    (groups, labels)
}

/// Slugs reached from more than one distinct label. Tags differing only in
/// case are the same tag and do not collide.
fn collisions(
    labels: &BTreeMap<String, BTreeSet<String>>,
    case_sensitive: bool,
) -> Vec<(String, Vec<String>)> {
    labels
        .iter()
        .filter(|(_, l)| {
            if case_sensitive {
                l.len() > 1
            } else {
                l.iter().map(|s| s.to_lowercase()).collect::<BTreeSet<_>>().len() > 1
            }
        })
        .map(|(s, l)| (s.clone(), l.iter().cloned().collect()))
        .collect()
}
