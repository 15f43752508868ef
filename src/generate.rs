//! Site builder.
//!
//! Drives one export: fetch the snapshot, build the [`Catalog`], plan every
//! page, render and write them, then publish the result.
//!
//! ## Generated Pages
//!
//! - **Home** (`/index.html`): hero, featured section, categories, latest recipes
//! - **Recipe pages** (`/recipe/{slug}/index.html`): full recipe with JSON-LD
//! - **Category pages** (`/category/{slug}/index.html`)
//! - **Tag pages** (`/tag/{slug}/index.html`)
//! - **Listing pages** (`/recipes/index.html`, `/recipes/page/{n}/index.html`)
//! - **`sitemap.xml`** and **`robots.txt`**
//!
//! ## Failure Model
//!
//! A source error aborts before anything touches the disk. After that,
//! failures are per page: a page that fails to render or write is logged
//! with its route and counted, and the rest of the build carries on.
//! Published records the catalog rejects (undecodable record, blank title,
//! bad or duplicate slug) count as failed pages too.
//!
//! ## Publishing
//!
//! Pages are written into a staging directory next to the output root.
//! When at least one HTML page succeeded, `sitemap.xml` and `robots.txt`
//! are added (the sitemap lists only the pages actually written) and the
//! staging tree replaces the output root. Otherwise it is discarded and the
//! previous site stays as it was.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/filter.js`: Listing filter, inlined on the first listing page

use crate::catalog::{Catalog, CategoryEntry, CategoryPage, RejectReason, Rejected, TagPage, Warning};
use crate::config::{self, SiteConfig};
use crate::digest;
use crate::filter::{self, FilterState, IndexEntry};
use crate::jsonld;
use crate::naming;
use crate::render::{self, ListingView, PageContext, RenderError, SitemapEntry};
use crate::source::{RecipeSource, SourceError};
use crate::types::Recipe;
use chrono::Datelike;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

const CSS_STATIC: &str = include_str!("../static/style.css");

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot read recipes: {0}")]
    Source(#[from] SourceError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot start render workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("no page could be written ({failed} failed); previous output left untouched")]
    NothingWritten { failed: usize },
}

/// Failure of a single page. Never aborts the build.
#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
    #[error("{label} not rendered: {reason}")]
    Rejected { label: String, reason: RejectReason },
}

/// Knobs that are not part of the site config.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Footer copyright year. The only time-dependent input of a build.
    pub year: i32,
    /// Overrides `build.max_workers`. Still capped at the core count.
    pub workers: Option<usize>,
}

impl BuildOptions {
    pub fn current_year() -> Self {
        Self {
            year: chrono::Utc::now().year(),
            workers: None,
        }
    }
}

/// Where writes go. Tests swap in failing writers.
pub trait PageWriter: Sync {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes straight to the filesystem.
pub struct FsWriter;

impl PageWriter for FsWriter {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// One failed page.
#[derive(Debug, Clone)]
pub struct PageFailure {
    /// Route of the page, or `recipe/<slug>` for rejected records.
    pub page: String,
    pub path: Option<PathBuf>,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<PageFailure>,
    pub warnings: Vec<Warning>,
    pub recipes: usize,
    pub categories: usize,
    pub tags: usize,
    pub listing_pages: usize,
    pub elapsed: Duration,
    /// SHA-256 of the published tree.
    pub digest: String,
}

/// Result of `check`: what a build would produce, without writing.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub source: String,
    pub recipes: usize,
    pub categories: Vec<CategoryEntry>,
    pub tags: usize,
    pub listing_pages: usize,
    pub rejected: Vec<Rejected>,
    pub warnings: Vec<Warning>,
}

/// A page to render.
#[derive(Debug, Clone, Copy)]
enum Job<'c, 'a> {
    Home,
    Listing(usize),
    Category(&'c CategoryPage),
    Tag(&'c TagPage),
    Recipe(&'a Recipe),
}

impl Job<'_, '_> {
    fn route(&self) -> String {
        match self {
            Job::Home => naming::HOME_ROUTE.to_string(),
            Job::Listing(page) => naming::listing_route(*page),
            Job::Category(page) => naming::category_route(&page.slug),
            Job::Tag(page) => naming::tag_route(&page.slug),
            Job::Recipe(recipe) => naming::recipe_route(&recipe.slug),
        }
    }

    fn output_path(&self, root: &Path) -> PathBuf {
        naming::route_output_path(root, &self.route())
    }
}

/// Everything the page jobs read, shared across workers.
struct Shared<'c, 'a> {
    ctx: PageContext<'c>,
    config: &'c SiteConfig,
    catalog: &'c Catalog<'a>,
    index: Vec<IndexEntry>,
    difficulties: Vec<String>,
    total_pages: usize,
}

/// Build the site into `output_dir`.
pub fn build(
    source: &dyn RecipeSource,
    config: &SiteConfig,
    output_dir: &Path,
    options: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    build_with_writer(source, config, output_dir, options, &FsWriter)
}

/// Build with a specific page writer (allows testing write failures).
pub fn build_with_writer(
    source: &dyn RecipeSource,
    config: &SiteConfig,
    output_dir: &Path,
    options: &BuildOptions,
    writer: &impl PageWriter,
) -> Result<BuildReport, BuildError> {
    let started = Instant::now();

    info!(source = %source.describe(), "fetching recipes");
    let snapshot = source.get_all_published()?;
    let catalog = Catalog::from_snapshot(&snapshot, config);
    log_catalog_issues(&catalog);
    info!(
        recipes = catalog.recipes.len(),
        categories = catalog.categories.len(),
        tags = catalog.tag_pages.len(),
        "catalog ready"
    );

    let total_pages = filter::total_pages(catalog.recipes.len(), config.build.page_size);
    let jobs = plan(&catalog, total_pages);

    let staging = sibling_dir(output_dir, "staging")?;
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    scaffold(&staging, &jobs)?;

    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    );
    let placeholder = &config.site.placeholder_image;
    let shared = Shared {
        ctx: PageContext {
            config,
            categories: &catalog.categories,
            css: &css,
            year: options.year,
        },
        config,
        catalog: &catalog,
        index: catalog
            .recipes
            .iter()
            .map(|r| IndexEntry::from_recipe(r, placeholder))
            .collect(),
        difficulties: filter::difficulty_options(&catalog.recipes),
        total_pages,
    };

    let mut build_config = config.build.clone();
    if options.workers.is_some() {
        build_config.max_workers = options.workers;
    }
    let threads = config::effective_threads(&build_config);
    debug!(threads, pages = jobs.len(), "rendering");
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    let outcomes: Vec<(Job, PathBuf, Result<(), PageError>)> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let path = job.output_path(&staging);
                let result = render_job(&shared, job)
                    .and_then(|html| writer.write(&path, &html).map_err(PageError::from));
                (*job, path, result)
            })
            .collect()
    });

    let mut failures = Vec::new();
    let mut written = Vec::with_capacity(outcomes.len());
    for (job, path, result) in outcomes {
        let route = job.route();
        match result {
            Ok(()) => {
                debug!(route = %route, "wrote page");
                written.push(job);
            }
            Err(e) => {
                error!(route = %route, path = %path.display(), error = %e, "page failed");
                failures.push(PageFailure {
                    page: route,
                    path: Some(path),
                    error: e.to_string(),
                });
            }
        }
    }
    for rejected in &catalog.rejected {
        let e = PageError::Rejected {
            label: rejected.label(),
            reason: rejected.reason.clone(),
        };
        failures.push(PageFailure {
            page: format!("recipe/{}", rejected.slug),
            path: None,
            error: e.to_string(),
        });
    }

    if written.is_empty() {
        fs::remove_dir_all(&staging)?;
        return Err(BuildError::NothingWritten {
            failed: failures.len(),
        });
    }

    let base_url = &config.site.base_url;
    let crawler_files = [
        ("sitemap.xml", render::render_sitemap(&sitemap_entries(&written, base_url))),
        ("robots.txt", render::render_robots(base_url)),
    ];
    let mut succeeded = written.len();
    for (name, contents) in &crawler_files {
        let path = staging.join(name);
        match writer.write(&path, contents) {
            Ok(()) => succeeded += 1,
            Err(e) => {
                let e = PageError::from(e);
                error!(file = %name, error = %e, "page failed");
                failures.push(PageFailure {
                    page: format!("/{name}"),
                    path: Some(path),
                    error: e.to_string(),
                });
            }
        }
    }
    let attempted = jobs.len() + crawler_files.len() + catalog.rejected.len();
    let failed = failures.len();

    publish(&staging, output_dir)?;
    let digest = digest::tree_digest(output_dir)?;
    info!(output = %output_dir.display(), succeeded, failed, "site published");

    Ok(BuildReport {
        output_dir: output_dir.to_path_buf(),
        attempted,
        succeeded,
        failed,
        failures,
        warnings: catalog.warnings.clone(),
        recipes: catalog.recipes.len(),
        categories: catalog.categories.len(),
        tags: catalog.tag_pages.len(),
        listing_pages: total_pages,
        elapsed: started.elapsed(),
        digest,
    })
}

/// Fetch and aggregate without writing anything.
pub fn check(source: &dyn RecipeSource, config: &SiteConfig) -> Result<CheckReport, BuildError> {
    let snapshot = source.get_all_published()?;
    let catalog = Catalog::from_snapshot(&snapshot, config);
    log_catalog_issues(&catalog);
    Ok(CheckReport {
        source: source.describe(),
        recipes: catalog.recipes.len(),
        categories: catalog.categories.clone(),
        tags: catalog.tag_pages.len(),
        listing_pages: filter::total_pages(catalog.recipes.len(), config.build.page_size),
        rejected: catalog.rejected.clone(),
        warnings: catalog.warnings.clone(),
    })
}

fn log_catalog_issues(catalog: &Catalog) {
    for warning in &catalog.warnings {
        warn!(%warning, "data inconsistency");
    }
    for rejected in &catalog.rejected {
        warn!(
            id = ?rejected.id,
            slug = %rejected.slug,
            reason = %rejected.reason,
            "published recipe rejected"
        );
    }
}

/// Every HTML page of the site, in sitemap order.
fn plan<'c, 'a>(catalog: &'c Catalog<'a>, total_pages: usize) -> Vec<Job<'c, 'a>> {
    let mut jobs = vec![Job::Home];
    jobs.extend((1..=total_pages).map(Job::Listing));
    jobs.extend(catalog.category_pages.iter().map(Job::Category));
    jobs.extend(catalog.tag_pages.iter().map(Job::Tag));
    jobs.extend(catalog.recipes.iter().map(|&r| Job::Recipe(r)));
    jobs
}

/// Create every output directory before the parallel stage.
fn scaffold(root: &Path, jobs: &[Job]) -> io::Result<()> {
    fs::create_dir_all(root)?;
    for job in jobs {
        if let Some(parent) = job.output_path(root).parent() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn sitemap_entries(jobs: &[Job], base_url: &str) -> Vec<SitemapEntry> {
    jobs.iter()
        .map(|job| SitemapEntry {
            loc: naming::canonical_url(base_url, &job.route()),
            lastmod: match job {
                Job::Recipe(recipe) => Some(recipe.created_at.format("%Y-%m-%d").to_string()),
                _ => None,
            },
        })
        .collect()
}

fn render_job(shared: &Shared, job: &Job) -> Result<String, PageError> {
    let ctx = &shared.ctx;
    let catalog = shared.catalog;
    let html = match job {
        Job::Home => render::render_home(ctx, catalog),
        Job::Listing(page) => {
            let window =
                filter::page_slice(&catalog.recipes, *page, shared.config.build.page_size);
            let no_filter = FilterState::default();
            let view = ListingView {
                recipes: window,
                page: *page,
                total_pages: shared.total_pages,
                total_recipes: catalog.recipes.len(),
                filter: &no_filter,
                difficulties: &shared.difficulties,
                index: (*page == 1).then_some(shared.index.as_slice()),
            };
            render::render_listing_page(ctx, &view)?
        }
        Job::Category(page) => {
            render::render_category_page(ctx, page, &catalog.recipes_at(&page.recipes))
        }
        Job::Tag(page) => render::render_tag_page(ctx, page, &catalog.recipes_at(&page.recipes)),
        Job::Recipe(recipe) => {
            let reviews = catalog.reviews_for(recipe);
            let data = jsonld::recipe_structured_data(recipe, reviews, shared.config);
            let related = catalog.related(recipe, shared.config.build.related_count);
            render::render_recipe_detail(ctx, recipe, reviews, &data, &related)?
        }
    };
    Ok(html.into_string())
}

// ============================================================================
// Staging and swap
// ============================================================================

/// `.{name}.{suffix}` next to `output_dir`.
fn sibling_dir(output_dir: &Path, suffix: &str) -> io::Result<PathBuf> {
    let name = output_dir.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path {} has no directory name", output_dir.display()),
        )
    })?;
    Ok(output_dir.with_file_name(format!(".{}.{suffix}", name.to_string_lossy())))
}

/// Replace `output_dir` with `staging`.
///
/// The old tree is renamed aside first so a failed swap can be rolled back.
fn publish(staging: &Path, output_dir: &Path) -> io::Result<()> {
    if !output_dir.exists() {
        if let Some(parent) = output_dir.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        return fs::rename(staging, output_dir);
    }
    let previous = sibling_dir(output_dir, "previous")?;
    if previous.exists() {
        fs::remove_dir_all(&previous)?;
    }
    fs::rename(output_dir, &previous)?;
    if let Err(e) = fs::rename(staging, output_dir) {
        fs::rename(&previous, output_dir)?;
        return Err(e);
    }
    fs::remove_dir_all(&previous)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::{MalformedRecord, Snapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn options() -> BuildOptions {
        BuildOptions {
            year: 2024,
            workers: Some(2),
        }
    }

    fn build_scenario(out: &Path) -> BuildReport {
        build(
            &StaticSource(scenario_snapshot()),
            &test_config(),
            out,
            &options(),
        )
        .unwrap()
    }

    /// Fails every write.
    struct BrokenDisk;

    impl PageWriter for BrokenDisk {
        fn write(&self, path: &Path, _contents: &str) -> io::Result<()> {
            Err(io::Error::other(format!("disk full: {}", path.display())))
        }
    }

    /// Fails every HTML page, lets other files through.
    struct BrokenHtml;

    impl PageWriter for BrokenHtml {
        fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
            if path.extension().is_some_and(|ext| ext == "html") {
                return Err(io::Error::other("read-only template dir"));
            }
            fs::write(path, contents)
        }
    }

    /// Fails writes under `recipe/`.
    struct BrokenRecipes(AtomicUsize);

    impl PageWriter for BrokenRecipes {
        fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
            if path.components().any(|c| c.as_os_str() == "recipe") {
                self.0.fetch_add(1, Ordering::Relaxed);
                return Err(io::Error::other("permission denied"));
            }
            fs::write(path, contents)
        }
    }

    #[test]
    fn scenario_writes_expected_tree() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let report = build_scenario(&out);

        for file in [
            "index.html",
            "recipe/a/index.html",
            "recipe/c/index.html",
            "category/breakfast/index.html",
            "category/dinner/index.html",
            "recipes/index.html",
            "sitemap.xml",
            "robots.txt",
        ] {
            assert!(out.join(file).is_file(), "missing {file}");
        }
        assert!(!out.join("recipe/b").exists());
        assert_eq!(report.failed, 0);
        assert_eq!(report.recipes, 2);
        assert_eq!(report.attempted, report.succeeded);
    }

    #[test]
    fn draft_never_referenced() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        build_scenario(&out);

        for page in html_pages(&out) {
            let html = read_output(&out, &page);
            assert!(!html.contains("/recipe/b/"), "{page} links the draft");
            assert!(!html.contains("Recipe b"), "{page} mentions the draft");
        }
        assert!(!read_output(&out, "sitemap.xml").contains("/recipe/b/"));
        let breakfast = read_output(&out, "category/breakfast/index.html");
        assert_eq!(breakfast.matches("data-slug=").count(), 1);
        assert!(breakfast.contains(r#"data-slug="a""#));
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let first = build_scenario(&tmp.path().join("one"));
        let second = build_scenario(&tmp.path().join("two"));
        assert_eq!(first.digest, second.digest);

        // Same output dir, built twice
        let again = build_scenario(&tmp.path().join("one"));
        assert_eq!(first.digest, again.digest);
    }

    #[test]
    fn worker_count_does_not_change_output() {
        let tmp = TempDir::new().unwrap();
        let snapshot = snapshot_of((0..30).map(|i| recipe(&format!("r{i}"), "Soups")).collect());
        let mut digests = Vec::new();
        for workers in [1, 4] {
            let report = build(
                &StaticSource(snapshot.clone()),
                &test_config(),
                &tmp.path().join(format!("w{workers}")),
                &BuildOptions {
                    year: 2024,
                    workers: Some(workers),
                },
            )
            .unwrap();
            digests.push(report.digest);
        }
        assert_eq!(digests[0], digests[1]);
    }

    #[test]
    fn source_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let result = build(&FailingSource, &test_config(), &out, &options());
        assert!(matches!(result, Err(BuildError::Source(_))));
        assert!(!out.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn zero_successes_keeps_previous_tree() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let before = build_scenario(&out);

        let result = build_with_writer(
            &StaticSource(scenario_snapshot()),
            &test_config(),
            &out,
            &options(),
            &BrokenDisk,
        );
        assert!(matches!(result, Err(BuildError::NothingWritten { .. })));
        assert_eq!(digest::tree_digest(&out).unwrap(), before.digest);
        assert!(!sibling_dir(&out, "staging").unwrap().exists());
    }

    #[test]
    fn crawler_files_alone_never_replace_the_site() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let before = build_scenario(&out);

        let result = build_with_writer(
            &StaticSource(scenario_snapshot()),
            &test_config(),
            &out,
            &options(),
            &BrokenHtml,
        );
        assert!(matches!(result, Err(BuildError::NothingWritten { .. })));
        assert!(out.join("index.html").is_file());
        assert_eq!(digest::tree_digest(&out).unwrap(), before.digest);
        assert!(!sibling_dir(&out, "staging").unwrap().exists());
    }

    #[test]
    fn page_failures_are_counted_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let writer = BrokenRecipes(AtomicUsize::new(0));
        let report = build_with_writer(
            &StaticSource(scenario_snapshot()),
            &test_config(),
            &out,
            &options(),
            &writer,
        )
        .unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(writer.0.load(Ordering::Relaxed), 2);
        assert_eq!(report.succeeded + report.failed, report.attempted);
        assert!(out.join("index.html").is_file());
        assert!(report.failures.iter().any(|f| f.page == "/recipe/a/"));

        let sitemap = read_output(&out, "sitemap.xml");
        assert!(!sitemap.contains("/recipe/a/"));
        assert!(sitemap.contains("/category/breakfast/"));
    }

    #[test]
    fn empty_title_fails_only_that_page() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let mut broken = recipe("broken", "Dinner");
        broken.title = "  ".to_string();
        let snapshot = snapshot_of(vec![recipe("good", "Dinner"), broken]);
        let report = build(&StaticSource(snapshot), &test_config(), &out, &options()).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].page, "recipe/broken");
        assert!(report.failures[0].error.contains("title is empty"));
        assert!(out.join("recipe/good/index.html").is_file());
        assert!(!out.join("recipe/broken").exists());

        for page in html_pages(&out) {
            assert!(
                !read_output(&out, &page).contains("/recipe/broken/"),
                "{page} links the untitled recipe"
            );
        }
        assert!(!read_output(&out, "sitemap.xml").contains("/recipe/broken/"));
    }

    #[test]
    fn undecodable_record_fails_only_its_page() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let mut snapshot = snapshot_of(vec![recipe("good", "Dinner")]);
        snapshot.malformed.push(MalformedRecord {
            id: Some(2),
            slug: Some("bad".into()),
            error: "missing field `title`".into(),
        });
        let report = build(&StaticSource(snapshot), &test_config(), &out, &options()).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].page, "recipe/bad");
        assert!(report.failures[0].error.contains("recipe 2 'bad' not rendered"));
        assert_eq!(report.succeeded + report.failed, report.attempted);
        assert!(out.join("recipe/good/index.html").is_file());
    }

    #[test]
    fn rejected_records_count_as_failures() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let snapshot = snapshot_of(vec![recipe("fine", "Lunch"), recipe("Not A Slug", "Lunch")]);
        let report = build(&StaticSource(snapshot), &test_config(), &out, &options()).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].page, "recipe/Not A Slug");
        assert!(report.failures[0].path.is_none());
        assert_eq!(report.succeeded + report.failed, report.attempted);
    }

    #[test]
    fn rebuild_removes_stale_pages() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        build_scenario(&out);
        assert!(out.join("recipe/c/index.html").exists());

        let snapshot = snapshot_of(vec![recipe("a", "Breakfast")]);
        build(&StaticSource(snapshot), &test_config(), &out, &options()).unwrap();
        assert!(!out.join("recipe/c").exists());
        assert!(!out.join("category/dinner").exists());
    }

    #[test]
    fn empty_catalog_still_publishes_shell() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let report = build(
            &StaticSource(Snapshot::default()),
            &test_config(),
            &out,
            &options(),
        )
        .unwrap();
        assert_eq!(report.listing_pages, 1);
        assert!(out.join("recipes/index.html").is_file());
        assert!(!out.join("recipes/page").exists());
    }

    #[test]
    fn pagination_pages_written() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let mut config = test_config();
        config.build.page_size = 2;
        let snapshot = snapshot_of((0..5).map(|i| recipe(&format!("p{i}"), "Bakes")).collect());
        let report = build(&StaticSource(snapshot), &config, &out, &options()).unwrap();

        assert_eq!(report.listing_pages, 3);
        assert!(out.join("recipes/page/2/index.html").is_file());
        assert!(out.join("recipes/page/3/index.html").is_file());
        assert!(!out.join("recipes/page/4").exists());
        let last = read_output(&out, "recipes/page/3/index.html");
        assert_eq!(last.matches("data-slug=").count(), 1);
    }

    #[test]
    fn tag_pages_written() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dist");
        let mut spooky = recipe("ghost-cookies", "Desserts");
        spooky.tags = vec!["Halloween".into()];
        let report = build(
            &StaticSource(snapshot_of(vec![spooky])),
            &test_config(),
            &out,
            &options(),
        )
        .unwrap();
        assert_eq!(report.tags, 1);
        let tag = read_output(&out, "tag/halloween/index.html");
        assert!(tag.contains(r#"data-slug="ghost-cookies""#));
    }

    #[test]
    fn check_writes_nothing_and_reports() {
        let tmp = TempDir::new().unwrap();
        let report = check(&StaticSource(scenario_snapshot()), &test_config()).unwrap();
        assert_eq!(report.recipes, 2);
        assert_eq!(report.categories.len(), 2);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn sibling_dir_is_hidden_neighbour() {
        let dir = sibling_dir(Path::new("/srv/site/dist"), "staging").unwrap();
        assert_eq!(dir, Path::new("/srv/site/.dist.staging"));
        assert!(sibling_dir(Path::new("/"), "staging").is_err());
    }
}
