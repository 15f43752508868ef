//! CLI output formatting for `build` and `check`.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Catalog: 312 recipes, 9 categories, 41 tags, 13 listing pages
//! Pages: 378 attempted, 377 succeeded, 1 failed
//!
//! Failures
//! 001 /recipe/quinoa-bowl/
//!     Error: recipe 'quinoa-bowl' has an empty title
//!     Path: dist/recipe/quinoa-bowl/index.html
//!
//! Warnings
//!     categories ["Main Dish", "main-dish"] all map to /category/main-dish/
//!
//! Digest: 9f2c…
//! Built dist in 0.84s
//! ```
//!
//! ## Check
//!
//! ```text
//! Source: recipes.json
//! Categories
//! 001 Breakfast (14 recipes) → /category/breakfast/
//! 002 Dinner (31 recipes) → /category/dinner/
//!
//! 45 recipes, 2 categories, 12 tags, 2 listing pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::Warning;
use crate::generate::{BuildReport, CheckReport};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 recipe`, `2 recipes`.
fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn warning_lines(warnings: &[Warning]) -> Vec<String> {
    let mut lines = Vec::new();
    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("Warnings".to_string());
        for warning in warnings {
            lines.push(format!("{}{}", indent(1), warning));
        }
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Catalog: {}, {}, {}, {}",
            plural(report.recipes, "recipe", "recipes"),
            plural(report.categories, "category", "categories"),
            plural(report.tags, "tag", "tags"),
            plural(report.listing_pages, "listing page", "listing pages"),
        ),
        format!(
            "Pages: {} attempted, {} succeeded, {} failed",
            report.attempted, report.succeeded, report.failed
        ),
    ];

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failures".to_string());
        for (i, failure) in report.failures.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), failure.page));
            lines.push(format!("{}Error: {}", indent(1), failure.error));
            if let Some(path) = &failure.path {
                lines.push(format!("{}Path: {}", indent(1), path.display()));
            }
        }
    }

    lines.extend(warning_lines(&report.warnings));

    lines.push(String::new());
    lines.push(format!("Digest: {}", report.digest));
    lines.push(format!(
        "Built {} in {:.2}s",
        report.output_dir.display(),
        report.elapsed.as_secs_f64()
    ));
    lines
}

/// Print build summary to stdout.
pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!("Source: {}", report.source)];

    if !report.categories.is_empty() {
        lines.push("Categories".to_string());
        for (i, category) in report.categories.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}) \u{2192} {}",
                format_index(i + 1),
                category.label,
                plural(category.count, "recipe", "recipes"),
                category.route()
            ));
        }
    }

    if !report.rejected.is_empty() {
        lines.push(String::new());
        lines.push("Rejected".to_string());
        for (i, rejected) in report.rejected.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), rejected.label()));
            lines.push(format!("{}{}", indent(1), rejected.reason));
        }
    }

    lines.extend(warning_lines(&report.warnings));

    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {}, {}",
        plural(report.recipes, "recipe", "recipes"),
        plural(report.categories.len(), "category", "categories"),
        plural(report.tags, "tag", "tags"),
        plural(report.listing_pages, "listing page", "listing pages"),
    ));
    lines
}

/// Print check summary to stdout.
pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryEntry, RejectReason, Rejected};
    use crate::generate::PageFailure;
    use std::path::PathBuf;
    use std::time::Duration;

    fn build_report() -> BuildReport {
        BuildReport {
            output_dir: PathBuf::from("dist"),
            attempted: 8,
            succeeded: 8,
            failed: 0,
            failures: Vec::new(),
            warnings: Vec::new(),
            recipes: 2,
            categories: 2,
            tags: 1,
            listing_pages: 1,
            elapsed: Duration::from_millis(1500),
            digest: "abc123".to_string(),
        }
    }

    fn check_report() -> CheckReport {
        CheckReport {
            source: "recipes.json".to_string(),
            recipes: 3,
            categories: vec![
                CategoryEntry {
                    label: "Breakfast".into(),
                    slug: "breakfast".into(),
                    count: 1,
                },
                CategoryEntry {
                    label: "Main Dishes".into(),
                    slug: "main-dishes".into(),
                    count: 2,
                },
            ],
            tags: 0,
            listing_pages: 1,
            rejected: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "recipe", "recipes"), "1 recipe");
        assert_eq!(plural(0, "recipe", "recipes"), "0 recipes");
        assert_eq!(plural(3, "category", "categories"), "3 categories");
    }

    // =========================================================================
    // Build report tests
    // =========================================================================

    #[test]
    fn build_report_has_exact_counts() {
        let lines = format_build_report(&build_report());
        assert_eq!(lines[0], "Catalog: 2 recipes, 2 categories, 1 tag, 1 listing page");
        assert_eq!(lines[1], "Pages: 8 attempted, 8 succeeded, 0 failed");
        assert!(lines.contains(&"Digest: abc123".to_string()));
        assert_eq!(lines.last().unwrap(), "Built dist in 1.50s");
        assert!(!lines.contains(&"Failures".to_string()));
    }

    #[test]
    fn build_report_lists_failures() {
        let mut report = build_report();
        report.succeeded = 7;
        report.failed = 1;
        report.failures.push(PageFailure {
            page: "/recipe/broken/".into(),
            path: Some(PathBuf::from("dist/recipe/broken/index.html")),
            error: "recipe 'broken' has an empty title".into(),
        });
        let lines = format_build_report(&report);
        assert!(lines.contains(&"001 /recipe/broken/".to_string()));
        assert!(lines.contains(&"    Error: recipe 'broken' has an empty title".to_string()));
        assert!(lines.contains(&"    Path: dist/recipe/broken/index.html".to_string()));
    }

    #[test]
    fn build_report_lists_warnings() {
        let mut report = build_report();
        report.warnings.push(Warning::EmptyFeatured {
            tag: "halloween".into(),
        });
        let lines = format_build_report(&report);
        let idx = lines.iter().position(|l| l == "Warnings").unwrap();
        assert!(lines[idx + 1].contains("halloween"));
    }

    // =========================================================================
    // Check report tests
    // =========================================================================

    #[test]
    fn check_report_lists_categories_with_routes() {
        let lines = format_check_report(&check_report());
        assert_eq!(lines[0], "Source: recipes.json");
        assert!(lines.contains(&"001 Breakfast (1 recipe) \u{2192} /category/breakfast/".to_string()));
        assert!(lines.contains(&"002 Main Dishes (2 recipes) \u{2192} /category/main-dishes/".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "3 recipes, 2 categories, 0 tags, 1 listing page"
        );
    }

    #[test]
    fn check_report_lists_rejected() {
        let mut report = check_report();
        report.rejected.push(Rejected {
            id: Some(7),
            slug: "Bad Slug".into(),
            reason: RejectReason::InvalidSlug,
        });
        let lines = format_check_report(&report);
        assert!(lines.contains(&"001 recipe 7 'Bad Slug'".to_string()));
    }
}
