//! HTML templates.
//!
//! Every page is a pure function from catalog data to [`Markup`]. Uses
//! [maud](https://maud.lambda.xyz/) for compile-time templating; its
//! interpolation is the only HTML escaper in the crate, so recipe text is
//! never concatenated into markup by hand. The two exceptions are inlined
//! assets (our own CSS and JS) and JSON embedded in `<script>` blocks, which
//! always goes through [`jsonld::to_script_json`].
//!
//! ## Page shell
//!
//! All pages share [`base_document`] (head with canonical, Open Graph and
//! Twitter tags), [`site_header`] (brand and category navigation) and
//! [`site_footer`]. The navigation is built from the category aggregate
//! alone and carries no per-page state, so it is byte-identical on every
//! page of a build.

use crate::catalog::{CategoryEntry, CategoryPage, Catalog, TagPage};
use crate::config::SiteConfig;
use crate::filter::{FilterState, IndexEntry, TimeBucket};
use crate::jsonld::{self, fmt_number};
use crate::naming::{self, category_slug, tag_slug};
use crate::types::{Recipe, Review};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html as md_html};
use thiserror::Error;

const FILTER_JS: &str = include_str!("../static/filter.js");

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("recipe '{slug}' has an empty title")]
    EmptyTitle { slug: String },
    #[error("'{slug}' is not a valid recipe slug")]
    InvalidSlug { slug: String },
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything shared by all pages of one build.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    /// Category aggregate, drives the navigation.
    pub categories: &'a [CategoryEntry],
    /// Full stylesheet (color variables + static CSS).
    pub css: &'a str,
    /// Copyright year in the footer.
    pub year: i32,
}

/// Head metadata of one page.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// Content of `<title>`.
    pub title: String,
    pub description: String,
    pub route: String,
    /// Site-root path or absolute URL for `og:image`.
    pub image: Option<String>,
    pub og_type: &'static str,
}

impl PageMeta {
    fn website(ctx: &PageContext, heading: &str, route: String) -> Self {
        Self {
            title: format!("{heading} | {}", ctx.config.site.name),
            description: ctx.config.site.description.clone(),
            route,
            image: None,
            og_type: "website",
        }
    }
}

/// One `<url>` of the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL.
    pub loc: String,
    /// `YYYY-MM-DD`.
    pub lastmod: Option<String>,
}

/// Data for one listing page.
#[derive(Debug, Clone, Copy)]
pub struct ListingView<'a> {
    /// Recipes of this page only.
    pub recipes: &'a [&'a Recipe],
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    /// Eligible recipes across all pages.
    pub total_recipes: usize,
    pub filter: &'a FilterState,
    pub difficulties: &'a [String],
    /// Full browser index, embedded on page 1 only.
    pub index: Option<&'a [IndexEntry]>,
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
pub fn base_document(
    ctx: &PageContext,
    meta: &PageMeta,
    body_class: Option<&str>,
    content: Markup,
) -> Markup {
    let site = &ctx.config.site;
    let canonical = naming::canonical_url(&site.base_url, &meta.route);
    let image = meta
        .image
        .as_deref()
        .map(|i| naming::absolute_url(&site.base_url, i));
    let twitter_card = if image.is_some() {
        "summary_large_image"
    } else {
        "summary"
    };
    let twitter_site = Some(site.twitter_handle.trim()).filter(|h| !h.is_empty());

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (meta.title) }
                meta name="description" content=(meta.description);
                link rel="canonical" href=(canonical);
                meta property="og:site_name" content=(site.name);
                meta property="og:type" content=(meta.og_type);
                meta property="og:title" content=(meta.title);
                meta property="og:description" content=(meta.description);
                meta property="og:url" content=(canonical);
                @if let Some(image) = &image {
                    meta property="og:image" content=(image);
                }
                meta name="twitter:card" content=(twitter_card);
                @if let Some(handle) = twitter_site {
                    meta name="twitter:site" content=(handle);
                }
                meta name="twitter:title" content=(meta.title);
                meta name="twitter:description" content=(meta.description);
                @if let Some(image) = &image {
                    meta name="twitter:image" content=(image);
                }
                style { (PreEscaped(ctx.css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with brand link and category navigation
pub fn site_header(ctx: &PageContext) -> Markup {
    html! {
        header.site-header {
            a.brand href=(naming::HOME_ROUTE) { (ctx.config.site.name) }
            nav.site-nav aria-label="Categories" {
                (render_nav(ctx.categories))
            }
        }
    }
}

/// Renders the category navigation. Same output for every page.
pub fn render_nav(categories: &[CategoryEntry]) -> Markup {
    html! {
        ul.nav-list {
            li { a href=(naming::LISTING_ROUTE) { "All recipes" } }
            @for category in categories {
                li { a href=(category.route()) { (category.label) } }
            }
        }
    }
}

pub fn site_footer(ctx: &PageContext) -> Markup {
    html! {
        footer.site-footer {
            p { "© " (ctx.year) " " (ctx.config.site.name) ". Every recipe is gluten-free." }
            p.footer-links {
                a href=(naming::HOME_ROUTE) { "Home" }
                " · "
                a href=(naming::LISTING_ROUTE) { "All recipes" }
            }
        }
    }
}

fn breadcrumb(trail: Markup) -> Markup {
    html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            a href=(naming::HOME_ROUTE) { "Home" }
            " › "
            (trail)
        }
    }
}

/// Inline handler swapping a broken image for the placeholder.
fn image_fallback(placeholder: &str) -> String {
    // JSON string literal is also a valid JS string literal
    let literal = serde_json::Value::from(placeholder).to_string();
    format!("this.onerror=null;this.src={literal}")
}

/// `45` → `45 min`, `90` → `1 hr 30 min`.
pub fn format_minutes(minutes: u32) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

/// Recipe card used on every listing-like page
pub fn recipe_card(recipe: &Recipe, placeholder: &str) -> Markup {
    let image = recipe.image.as_deref().unwrap_or(placeholder);
    html! {
        article.recipe-card data-slug=(recipe.slug) {
            a.card-link href=(naming::recipe_route(&recipe.slug)) {
                img.card-image src=(image) alt=(recipe.title) loading="lazy"
                    onerror=(image_fallback(placeholder));
                div.card-body {
                    h3.card-title { (recipe.title) }
                    p.card-description { (recipe.description) }
                    p.card-meta {
                        span.card-category { (recipe.category) }
                        @if let Some(minutes) = recipe.display_minutes() {
                            " · " span.card-time { (format_minutes(minutes)) }
                        }
                        @if let Some(difficulty) = &recipe.difficulty {
                            " · " span.card-difficulty { (difficulty) }
                        }
                    }
                }
            }
        }
    }
}

fn recipe_grid(recipes: &[&Recipe], placeholder: &str) -> Markup {
    html! {
        div.recipe-grid {
            @for recipe in recipes {
                (recipe_card(recipe, placeholder))
            }
        }
    }
}

/// Convert markdown to HTML with raw HTML shown as text.
pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

fn is_script_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("data:")
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page
pub fn render_home(ctx: &PageContext, catalog: &Catalog) -> Markup {
    let placeholder = &ctx.config.site.placeholder_image;
    let home = &ctx.config.home;
    let featured = catalog.recipes_at(&catalog.featured);
    let recent_count = ctx.config.build.recent_count.min(catalog.recipes.len());
    let recent = &catalog.recipes[..recent_count];
    let meta = PageMeta {
        title: ctx.config.site.name.clone(),
        ..PageMeta::website(ctx, "", naming::HOME_ROUTE.to_string())
    };

    let content = html! {
        (site_header(ctx))
        main.home-page {
            section.hero {
                h1 { (ctx.config.site.name) }
                p.hero-tagline { (ctx.config.site.description) }
                a.button href=(naming::LISTING_ROUTE) { "Browse all recipes" }
            }
            @if !home.featured_tag.trim().is_empty() {
                section.featured {
                    h2 { (home.featured_title) }
                    @if featured.is_empty() {
                        p.empty-state { "Nothing here yet. Check back soon." }
                    } @else {
                        (recipe_grid(&featured, placeholder))
                    }
                }
            }
            section.categories {
                h2 { "Categories" }
                @if catalog.categories.is_empty() {
                    p.empty-state { "No recipes have been published yet." }
                } @else {
                    div.category-grid {
                        @for category in &catalog.categories {
                            a.category-card href=(category.route()) {
                                span.category-name { (category.label) }
                                span.category-count {
                                    (category.count)
                                    @if category.count == 1 { " recipe" } @else { " recipes" }
                                }
                            }
                        }
                    }
                }
            }
            @if !recent.is_empty() {
                section.recent {
                    h2 { "Latest recipes" }
                    (recipe_grid(recent, placeholder))
                    p.more {
                        a href=(naming::LISTING_ROUTE) {
                            "See all " (catalog.recipes.len()) " recipes"
                        }
                    }
                }
            }
        }
        (site_footer(ctx))
    };

    base_document(ctx, &meta, Some("home"), content)
}

/// Renders one category page
pub fn render_category_page(
    ctx: &PageContext,
    category: &CategoryPage,
    recipes: &[&Recipe],
) -> Markup {
    let route = naming::category_route(&category.slug);
    let mut meta = PageMeta::website(ctx, &category.title, route);
    meta.description = format!(
        "{} gluten-free {} recipes from {}.",
        recipes.len(),
        category.title,
        ctx.config.site.name
    );

    let content = html! {
        (site_header(ctx))
        (breadcrumb(html! { (category.title) }))
        main.category-page {
            header.page-header {
                h1 { (category.title) }
                p.page-count { (recipes.len()) " recipes" }
            }
            (recipe_grid(recipes, &ctx.config.site.placeholder_image))
        }
        (site_footer(ctx))
    };

    base_document(ctx, &meta, None, content)
}

/// Renders one tag page
pub fn render_tag_page(ctx: &PageContext, tag: &TagPage, recipes: &[&Recipe]) -> Markup {
    let route = naming::tag_route(&tag.slug);
    let meta = PageMeta::website(ctx, &format!("Recipes tagged {}", tag.title), route);

    let content = html! {
        (site_header(ctx))
        (breadcrumb(html! { "Tag: " (tag.title) }))
        main.tag-page {
            header.page-header {
                h1 { "Tagged “" (tag.title) "”" }
                p.page-count { (recipes.len()) " recipes" }
            }
            (recipe_grid(recipes, &ctx.config.site.placeholder_image))
        }
        (site_footer(ctx))
    };

    base_document(ctx, &meta, None, content)
}

/// Renders a recipe page with its structured data block.
pub fn render_recipe_detail(
    ctx: &PageContext,
    recipe: &Recipe,
    reviews: &[Review],
    structured_data: &serde_json::Value,
    related: &[&Recipe],
) -> Result<Markup, RenderError> {
    if recipe.title.trim().is_empty() {
        return Err(RenderError::EmptyTitle {
            slug: recipe.slug.clone(),
        });
    }
    if !naming::is_valid_slug(&recipe.slug) {
        return Err(RenderError::InvalidSlug {
            slug: recipe.slug.clone(),
        });
    }
    let json_ld = jsonld::to_script_json(structured_data)?;

    let site = &ctx.config.site;
    let placeholder = &site.placeholder_image;
    let image = recipe.image.as_deref().unwrap_or(placeholder);
    let meta = PageMeta {
        title: format!(
            "{} | {}",
            recipe.seo_title.as_deref().unwrap_or(&recipe.title),
            site.name
        ),
        description: recipe
            .seo_description
            .clone()
            .unwrap_or_else(|| recipe.description.clone()),
        route: naming::recipe_route(&recipe.slug),
        image: Some(image.to_string()),
        og_type: "article",
    };

    let content = html! {
        (site_header(ctx))
        (breadcrumb(html! {
            a href=(naming::category_route(&category_slug(&recipe.category))) { (recipe.category) }
            " › "
            (recipe.title)
        }))
        main.recipe-page {
            article.recipe data-slug=(recipe.slug) {
                header.recipe-header {
                    h1 { (recipe.title) }
                    p.recipe-description { (recipe.description) }
                    p.badges {
                        @if recipe.is_naturally_gluten_free {
                            span.badge.badge-gf { "Naturally gluten-free" }
                        } @else {
                            span.badge.badge-gf { "Gluten-free" }
                        }
                        @if let Some(difficulty) = &recipe.difficulty {
                            span.badge { (difficulty) }
                        }
                    }
                }
                img.recipe-image src=(image) alt=(recipe.title) onerror=(image_fallback(placeholder));
                (recipe_facts(recipe, reviews))
                @if let Some(long) = &recipe.long_description {
                    section.recipe-story {
                        (PreEscaped(markdown_to_html(long)))
                    }
                }
                @if !recipe.ingredients.is_empty() {
                    section.ingredients {
                        h2 { "Ingredients" }
                        ul {
                            @for item in &recipe.ingredients {
                                li { (item) }
                            }
                        }
                    }
                }
                @if !recipe.instructions.is_empty() {
                    section.instructions {
                        h2 { "Instructions" }
                        ol {
                            @for step in &recipe.instructions {
                                li { (step) }
                            }
                        }
                    }
                }
                @if let Some(tips) = &recipe.tips {
                    section.tips {
                        h2 { "Tips" }
                        (PreEscaped(markdown_to_html(tips)))
                    }
                }
                @if !recipe.variations.is_empty() {
                    section.variations {
                        h2 { "Variations" }
                        ul {
                            @for variation in &recipe.variations {
                                li { (variation) }
                            }
                        }
                    }
                }
                (nutrition_table(recipe))
                @if !recipe.tags.is_empty() {
                    section.tags {
                        h2 { "Tags" }
                        ul.tag-list {
                            @for tag in recipe.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                                li { a.tag href=(naming::tag_route(&tag_slug(tag))) { (tag) } }
                            }
                        }
                    }
                }
                (review_list(reviews))
            }
            @if !related.is_empty() {
                section.related {
                    h2 { "More " (recipe.category) }
                    (recipe_grid(related, placeholder))
                }
            }
        }
        (site_footer(ctx))
        script type="application/ld+json" { (PreEscaped(json_ld)) }
    };

    Ok(base_document(ctx, &meta, Some("recipe-view"), content))
}

fn recipe_facts(recipe: &Recipe, reviews: &[Review]) -> Markup {
    let rating = rating_summary(recipe, reviews);
    html! {
        dl.recipe-facts {
            @if let Some(prep) = recipe.prep_time {
                div { dt { "Prep" } dd { (format_minutes(prep)) } }
            }
            @if let Some(cook) = recipe.cook_time {
                div { dt { "Cook" } dd { (format_minutes(cook)) } }
            }
            @if let Some(total) = recipe.display_minutes() {
                div { dt { "Total" } dd { (format_minutes(total)) } }
            }
            @if let Some(servings) = recipe.servings {
                div { dt { "Servings" } dd { (servings) } }
            }
            @if let Some(rating) = rating {
                div { dt { "Rating" } dd.rating { (rating) } }
            }
        }
    }
}

/// `4.3 / 5 (3 reviews)` from reviews, else the static rating.
fn rating_summary(recipe: &Recipe, reviews: &[Review]) -> Option<String> {
    if !reviews.is_empty() {
        let mean = reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64;
        let noun = if reviews.len() == 1 { "review" } else { "reviews" };
        return Some(format!(
            "{} / 5 ({} {noun})",
            fmt_number(mean),
            reviews.len()
        ));
    }
    recipe
        .rating
        .filter(|r| *r > 0.0)
        .map(|r| format!("{} / 5", fmt_number(r)))
}

fn nutrition_table(recipe: &Recipe) -> Markup {
    let rows: Vec<(&str, String)> = [
        ("Calories", recipe.calories.map(fmt_number)),
        ("Protein", recipe.protein.map(|v| format!("{} g", fmt_number(v)))),
        ("Carbohydrates", recipe.carbs.map(|v| format!("{} g", fmt_number(v)))),
        ("Fat", recipe.fat.map(|v| format!("{} g", fmt_number(v)))),
        ("Fiber", recipe.fiber.map(|v| format!("{} g", fmt_number(v)))),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| (label, v)))
    .collect();

    html! {
        @if !rows.is_empty() {
            section.nutrition {
                h2 { "Nutrition per serving" }
                table {
                    tbody {
                        @for (label, value) in &rows {
                            tr { th scope="row" { (label) } td { (value) } }
                        }
                    }
                }
            }
        }
    }
}

fn review_list(reviews: &[Review]) -> Markup {
    html! {
        @if !reviews.is_empty() {
            section.reviews {
                h2 { "Reviews" }
                @for review in reviews {
                    blockquote.review {
                        p.review-rating { (fmt_number(review.rating)) " / 5" }
                        @if let Some(comment) = &review.comment {
                            p.review-body { (comment) }
                        }
                        footer {
                            (review.author)
                            @if let Some(date) = review.created_at {
                                ", " time datetime=(date.format("%Y-%m-%d").to_string()) {
                                    (date.format("%B %-d, %Y").to_string())
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders one page of the full recipe listing.
///
/// The server-rendered window is the unfiltered page. Page 1 also embeds the
/// index of every recipe and the filter script, which re-renders the results
/// in place when the form changes.
pub fn render_listing_page(ctx: &PageContext, view: &ListingView) -> Result<Markup, RenderError> {
    let index_json = view.index.map(|entries| jsonld::to_script_json(entries)).transpose()?;
    let heading = if view.page > 1 {
        format!("All recipes, page {}", view.page)
    } else {
        "All recipes".to_string()
    };
    let meta = PageMeta::website(ctx, &heading, naming::listing_route(view.page));
    let filter = view.filter;

    let content = html! {
        (site_header(ctx))
        main.listing-page {
            header.page-header {
                h1 { (heading) }
                p.page-count #result-count { (view.total_recipes) " recipes" }
            }
            form.filters #recipe-filters action=(naming::LISTING_ROUTE) method="get" role="search" {
                input type="search" name="q" placeholder="Search recipes or ingredients"
                    aria-label="Search" value=(filter.search);
                select name="category" aria-label="Category" {
                    option value="" { "All categories" }
                    @for category in ctx.categories {
                        option value=(category.label)
                            selected[filter.category.as_deref() == Some(category.label.as_str())] {
                            (category.label)
                        }
                    }
                }
                select name="difficulty" aria-label="Difficulty" {
                    option value="" { "Any difficulty" }
                    @for difficulty in view.difficulties {
                        option value=(difficulty)
                            selected[filter.difficulty.as_deref() == Some(difficulty.as_str())] {
                            (difficulty)
                        }
                    }
                }
                select name="time" aria-label="Time" {
                    option value="" { "Any time" }
                    @for bucket in TimeBucket::ALL {
                        option value=(bucket.as_str()) selected[filter.time == Some(bucket)] {
                            (bucket.label())
                        }
                    }
                }
                input type="hidden" name="tag" value=(filter.tag.as_deref().unwrap_or(""));
                button type="submit" { "Filter" }
            }
            div #results {
                (recipe_grid(view.recipes, &ctx.config.site.placeholder_image))
            }
            p.empty-state #no-results hidden { "No recipes match these filters." }
            (pagination(view.page, view.total_pages))
        }
        (site_footer(ctx))
        @if let Some(json) = index_json {
            script #recipe-index type="application/json" { (PreEscaped(json)) }
            script data-placeholder=(ctx.config.site.placeholder_image) { (PreEscaped(FILTER_JS)) }
        }
    };

    Ok(base_document(ctx, &meta, Some("listing"), content))
}

fn pagination(page: usize, total_pages: usize) -> Markup {
    html! {
        @if total_pages > 1 {
            nav.pagination #pagination aria-label="Pages" {
                @if page > 1 {
                    a.page-prev href=(naming::listing_route(page - 1)) rel="prev" { "‹ Newer" }
                }
                @for n in 1..=total_pages {
                    @if n == page {
                        span.page-link.current aria-current="page" { (n) }
                    } @else {
                        a.page-link href=(naming::listing_route(n)) { (n) }
                    }
                }
                @if page < total_pages {
                    a.page-next href=(naming::listing_route(page + 1)) rel="next" { "Older ›" }
                }
            }
        }
    }
}

// ============================================================================
// Non-HTML documents
// ============================================================================

/// `sitemap.xml` listing every page route.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let body = html! {
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for entry in entries {
                url {
                    loc { (entry.loc) }
                    @if let Some(lastmod) = &entry.lastmod {
                        lastmod { (lastmod) }
                    }
                }
            }
        }
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
        body.into_string()
    )
}

pub fn render_robots(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        naming::canonical_url(base_url, "/sitemap.xml")
    )
}

// ============================================================================
// Tests
// ============================================================================
