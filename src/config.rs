//! Site configuration module.
//!
//! Handles loading and validating `gf-press.toml`. Every key has a stock
//! default, so the file only needs the keys it overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Gluten Free Kitchen"
//! base_url = "https://example.com"
//! description = "Tested gluten-free recipes for every meal."
//! placeholder_image = "/images/placeholder.svg"
//! twitter_handle = ""
//!
//! [source]
//! connection = "recipes.json"   # JSON snapshot path or sqlite:// URL
//!
//! [build]
//! output_dir = "dist"
//! page_size = 24                # Recipes per listing page
//! recent_count = 8              # Recipes in the home "latest" section
//! related_count = 3             # Related recipes on a detail page
//! # max_workers = 4             # Omit for auto (= CPU cores)
//!
//! [home]
//! featured_tag = "halloween"
//! featured_title = "Halloween Treats"
//! featured_limit = 6
//!
//! [colors.light]
//! background = "#fffdf8"
//! text = "#2b2118"
//! text_muted = "#75685c"
//! accent = "#c2571a"
//! border = "#eadfd3"
//! card = "#ffffff"
//!
//! [colors.dark]
//! background = "#17120e"
//! text = "#f3ece4"
//! text_muted = "#a89a8c"
//! accent = "#f08a4b"
//! border = "#3a2f27"
//! card = "#211a15"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "gf-press.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `gf-press.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity and SEO defaults.
    pub site: SiteInfo,
    /// Where the recipe catalog is read from.
    pub source: SourceConfig,
    /// Output layout and build parallelism.
    pub build: BuildConfig,
    /// Home page sections.
    pub home: HomeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.page_size == 0 {
            return Err(ConfigError::Validation(
                "build.page_size must be at least 1".into(),
            ));
        }
        if !self.site.base_url.starts_with("http://") && !self.site.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(
                "site.base_url must be an absolute http(s) URL".into(),
            ));
        }
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        if self.build.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "build.max_workers must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Site identity used in the page shell, meta tags and structured data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    /// Absolute base URL, used for canonical and Open Graph URLs.
    pub base_url: String,
    /// Default meta description for non-recipe pages.
    pub description: String,
    /// Image used when a recipe has none, and when a recipe image fails to load.
    pub placeholder_image: String,
    /// Twitter/X handle for `twitter:site`. Empty to omit.
    pub twitter_handle: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Gluten Free Kitchen".to_string(),
            base_url: "https://example.com".to_string(),
            description: "Tested gluten-free recipes for every meal.".to_string(),
            placeholder_image: "/images/placeholder.svg".to_string(),
            twitter_handle: String::new(),
        }
    }
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// JSON snapshot path or `sqlite://` connection string.
    pub connection: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            connection: "recipes.json".to_string(),
        }
    }
}

/// Output and parallelism settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub output_dir: String,
    /// Recipes per listing page.
    pub page_size: usize,
    /// Recipes in the home page "latest" section.
    pub recent_count: usize,
    /// Related recipes shown under a recipe.
    pub related_count: usize,
    /// Maximum parallel render workers. When absent, defaults to the number
    /// of CPU cores. Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: "dist".to_string(),
            page_size: 24,
            recent_count: 8,
            related_count: 3,
            max_workers: None,
        }
    }
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &BuildConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Home page themed section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    /// Tag selecting the featured recipes. Empty disables the section.
    pub featured_tag: String,
    pub featured_title: String,
    pub featured_limit: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            featured_tag: "halloween".to_string(),
            featured_title: "Halloween Treats".to_string(),
            featured_limit: 6,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    #[serde(deserialize_with = "light_scheme")]
    pub light: ColorScheme,
    #[serde(deserialize_with = "dark_scheme")]
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Secondary text (meta lines, footer, breadcrumbs).
    pub text_muted: String,
    /// Links, buttons and badges.
    pub accent: String,
    pub border: String,
    /// Recipe card background.
    pub card: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fffdf8".to_string(),
            text: "#2b2118".to_string(),
            text_muted: "#75685c".to_string(),
            accent: "#c2571a".to_string(),
            border: "#eadfd3".to_string(),
            card: "#ffffff".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#17120e".to_string(),
            text: "#f3ece4".to_string(),
            text_muted: "#a89a8c".to_string(),
            accent: "#f08a4b".to_string(),
            border: "#3a2f27".to_string(),
            card: "#211a15".to_string(),
        }
    }
}

/// A scheme table as written. Missing keys fall back to that mode's stock colors.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemeTable {
    background: Option<String>,
    text: Option<String>,
    text_muted: Option<String>,
    accent: Option<String>,
    border: Option<String>,
    card: Option<String>,
}

impl SchemeTable {
    fn over(self, base: ColorScheme) -> ColorScheme {
        ColorScheme {
            background: self.background.unwrap_or(base.background),
            text: self.text.unwrap_or(base.text),
            text_muted: self.text_muted.unwrap_or(base.text_muted),
            accent: self.accent.unwrap_or(base.accent),
            border: self.border.unwrap_or(base.border),
            card: self.card.unwrap_or(base.card),
        }
    }
}

fn light_scheme<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ColorScheme, D::Error> {
    Ok(SchemeTable::deserialize(deserializer)?.over(ColorScheme::default_light()))
}

fn dark_scheme<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ColorScheme, D::Error> {
    Ok(SchemeTable::deserialize(deserializer)?.over(ColorScheme::default_dark()))
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load config from the given file path.
///
/// A missing file yields the stock defaults. Every section and key is
/// `#[serde(default)]`, so the file only needs the keys it changes.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<SiteConfig>(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gf-press.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gf-press Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
name = "Gluten Free Kitchen"

# Absolute base URL. Canonical links, og:url and JSON-LD urls are built
# from it, so it must match where the site is served.
base_url = "https://example.com"

# Meta description for the home, category and listing pages.
description = "Tested gluten-free recipes for every meal."

# Shown when a recipe has no image or its image fails to load.
placeholder_image = "/images/placeholder.svg"

# Twitter/X handle for the twitter:site card tag. Empty to omit.
twitter_handle = ""

# ---------------------------------------------------------------------------
# Data source
# ---------------------------------------------------------------------------
[source]
# A JSON snapshot path, or a sqlite:// connection string.
# Overridden by --source and the GF_PRESS_SOURCE environment variable.
connection = "recipes.json"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Overridden by --output and the GF_PRESS_OUTPUT environment variable.
output_dir = "dist"

# Recipes per listing page (/recipes/, /recipes/page/2/, ...).
page_size = 24

# Recipes in the home page "latest" section.
recent_count = 8

# Related recipes (same category) shown under each recipe.
related_count = 3

# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4

# ---------------------------------------------------------------------------
# Home page
# ---------------------------------------------------------------------------
[home]
# Recipes carrying this tag fill the themed section. Empty disables it.
featured_tag = "halloween"
featured_title = "Halloween Treats"
featured_limit = 6

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fffdf8"
text = "#2b2118"
text_muted = "#75685c"
accent = "#c2571a"
border = "#eadfd3"
card = "#ffffff"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#17120e"
text = "#f3ece4"
text_muted = "#a89a8c"
accent = "#f08a4b"
border = "#3a2f27"
card = "#211a15"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-accent: {light_accent};
    --color-border: {light_border};
    --color-card: {light_card};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-accent: {dark_accent};
        --color-border: {dark_border};
        --color-card: {dark_card};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_accent = colors.light.accent,
        light_border = colors.light.border,
        light_card = colors.light.card,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_accent = colors.dark.accent,
        dark_border = colors.dark.border,
        dark_card = colors.dark.card,
    )
}
