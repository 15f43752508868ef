//! Centralized slug, route and output-path resolution.
//!
//! Every link the templates emit and every file the builder writes goes
//! through this module. Category links and category directories in particular
//! must come from the same [`category_slug`] call or navigation breaks.
//!
//! ## Routes
//!
//! Routes are site-root relative and always end in `/`; each one is served
//! from an `index.html` inside the matching directory:
//!
//! | Page | Route | File |
//! |------|-------|------|
//! | Home | `/` | `index.html` |
//! | Recipe | `/recipe/{slug}/` | `recipe/{slug}/index.html` |
//! | Category | `/category/{slug}/` | `category/{slug}/index.html` |
//! | Tag | `/tag/{slug}/` | `tag/{slug}/index.html` |
//! | Listing page 1 | `/recipes/` | `recipes/index.html` |
//! | Listing page N | `/recipes/page/{n}/` | `recipes/page/{n}/index.html` |
//!
//! ## Slugification
//!
//! Category labels and tags are free text. They are lowercased, characters
//! other than letters, digits, whitespace and `-` are dropped, and runs of
//! whitespace or hyphens collapse into one `-`:
//! - `"Main Dishes"` → `main-dishes`
//! - `"Soups & Stews"` → `soups-stews`
//! - `"  Dairy-Free  Desserts "` → `dairy-free-desserts`
//! - `"!!!"` → `uncategorized`

use std::path::{Path, PathBuf};

/// Slug used when a label has no letters or digits at all.
pub const FALLBACK_SLUG: &str = "uncategorized";

/// Derive the URL slug for a category label.
pub fn category_slug(label: &str) -> String {
    slugify(label)
}

/// Derive the URL slug for a tag. Same rule as categories.
pub fn tag_slug(tag: &str) -> String {
    slugify(tag)
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Whether a recipe slug is safe to use as a directory name and URL segment.
///
/// Accepts lowercase ASCII letters, digits and single interior hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

// ============================================================================
// Routes
// ============================================================================

pub const HOME_ROUTE: &str = "/";
pub const LISTING_ROUTE: &str = "/recipes/";

pub fn recipe_route(slug: &str) -> String {
    format!("/recipe/{slug}/")
}

pub fn category_route(category_slug: &str) -> String {
    format!("/category/{category_slug}/")
}

pub fn tag_route(tag_slug: &str) -> String {
    format!("/tag/{tag_slug}/")
}

/// Route of a 1-based listing page. Page 1 is the listing root.
pub fn listing_route(page: usize) -> String {
    if page <= 1 {
        LISTING_ROUTE.to_string()
    } else {
        format!("{LISTING_ROUTE}page/{page}/")
    }
}

// ============================================================================
// Output paths
// ============================================================================

/// Map a route to the `index.html` that serves it under `root`.
pub fn route_output_path(root: &Path, route: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in route.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.join("index.html")
}

pub fn recipe_output_path(root: &Path, slug: &str) -> PathBuf {
    route_output_path(root, &recipe_route(slug))
}

pub fn category_output_path(root: &Path, category_slug: &str) -> PathBuf {
    route_output_path(root, &category_route(category_slug))
}

pub fn tag_output_path(root: &Path, tag_slug: &str) -> PathBuf {
    route_output_path(root, &tag_route(tag_slug))
}

pub fn listing_output_path(root: &Path, page: usize) -> PathBuf {
    route_output_path(root, &listing_route(page))
}

// ============================================================================
// URLs
// ============================================================================

/// Canonical URL of a route: the site base URL (without trailing slash)
/// followed by the route.
pub fn canonical_url(base_url: &str, route: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if route.starts_with('/') {
        format!("{base}{route}")
    } else {
        format!("{base}/{route}")
    }
}

/// Absolute URL for an asset reference. Absolute URLs pass through unchanged.
pub fn absolute_url(base_url: &str, path_or_url: &str) -> String {
    if path_or_url.starts_with("http://")
        || path_or_url.starts_with("https://")
        || path_or_url.starts_with("//")
    {
        path_or_url.to_string()
    } else {
        canonical_url(base_url, path_or_url)
    }
}
