//! Schema.org `Recipe` structured data.
//!
//! Builds the JSON-LD object embedded in every recipe page. Optional facts
//! are omitted rather than defaulted: an unknown prep time is not `PT0M`,
//! and missing nutrition values are not zeros.
//!
//! [`to_script_json`] is the only way JSON reaches a `<script>` element. It
//! escapes `<`, `>` and `&` as unicode escapes, so text such as
//! `</script>` inside a recipe field cannot end the block early.

use crate::config::SiteConfig;
use crate::naming;
use crate::types::{Recipe, Review};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// ISO-8601 duration for a number of minutes.
pub fn iso_duration(minutes: u32) -> String {
    format!("PT{minutes}M")
}

/// Serialize a value for embedding inside a `<script>` element.
pub fn to_script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_string(value)?;
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            // Line and paragraph separators are legal in JSON but not in
            // older JavaScript string literals.
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Round to one decimal place for rating values.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build the `Recipe` object for one eligible recipe.
pub fn recipe_structured_data(recipe: &Recipe, reviews: &[Review], config: &SiteConfig) -> Value {
    let site = &config.site;
    let route = naming::recipe_route(&recipe.slug);
    let image = recipe
        .image
        .as_deref()
        .unwrap_or(&site.placeholder_image);

    let mut data = Map::new();
    data.insert("@context".into(), json!("https://schema.org"));
    data.insert("@type".into(), json!("Recipe"));
    data.insert("name".into(), json!(recipe.title));
    data.insert("description".into(), json!(recipe.description));
    data.insert("url".into(), json!(naming::canonical_url(&site.base_url, &route)));
    data.insert("image".into(), json!([naming::absolute_url(&site.base_url, image)]));
    data.insert(
        "author".into(),
        json!({ "@type": "Organization", "name": site.name }),
    );
    data.insert(
        "publisher".into(),
        json!({ "@type": "Organization", "name": site.name }),
    );
    data.insert(
        "datePublished".into(),
        json!(recipe.created_at.format("%Y-%m-%d").to_string()),
    );
    data.insert("recipeCategory".into(), json!(recipe.category));
    data.insert(
        "suitableForDiet".into(),
        json!("https://schema.org/GlutenFreeDiet"),
    );
    if !recipe.tags.is_empty() {
        data.insert("keywords".into(), json!(recipe.tags.join(", ")));
    }
    if let Some(servings) = recipe.servings {
        data.insert("recipeYield".into(), json!(format!("{servings} servings")));
    }

    if let Some(prep) = recipe.prep_time {
        data.insert("prepTime".into(), json!(iso_duration(prep)));
    }
    if let Some(cook) = recipe.cook_time {
        data.insert("cookTime".into(), json!(iso_duration(cook)));
    }
    if let Some(total) = recipe.display_minutes() {
        data.insert("totalTime".into(), json!(iso_duration(total)));
    }

    data.insert("recipeIngredient".into(), json!(recipe.ingredients));
    let steps: Vec<Value> = recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(i, text)| {
            json!({
                "@type": "HowToStep",
                "position": i + 1,
                "text": text,
            })
        })
        .collect();
    data.insert("recipeInstructions".into(), Value::Array(steps));

    if let Some(nutrition) = nutrition(recipe) {
        data.insert("nutrition".into(), nutrition);
    }

    if let Some((aggregate, entries)) = ratings(recipe, reviews) {
        data.insert("aggregateRating".into(), aggregate);
        if !entries.is_empty() {
            data.insert("review".into(), Value::Array(entries));
        }
    }

    Value::Object(data)
}

fn nutrition(recipe: &Recipe) -> Option<Value> {
    let calories = recipe.calories?;
    let mut n = Map::new();
    n.insert("@type".into(), json!("NutritionInformation"));
    n.insert("calories".into(), json!(format!("{} calories", fmt_number(calories))));
    let grams = [
        ("proteinContent", recipe.protein),
        ("carbohydrateContent", recipe.carbs),
        ("fatContent", recipe.fat),
        ("fiberContent", recipe.fiber),
    ];
    for (key, value) in grams {
        if let Some(v) = value {
            n.insert(key.into(), json!(format!("{} g", fmt_number(v))));
        }
    }
    Some(Value::Object(n))
}

/// `12.0` → `"12"`, `12.5` → `"12.5"`.
pub fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{}", round1(value))
    }
}

/// Aggregate rating plus individual review entries.
///
/// Fetched reviews win over the static rating, and the review count always
/// equals the number of review entries emitted.
fn ratings(recipe: &Recipe, reviews: &[Review]) -> Option<(Value, Vec<Value>)> {
    if !reviews.is_empty() {
        let mean = reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64;
        let entries: Vec<Value> = reviews.iter().map(review_entry).collect();
        let aggregate = json!({
            "@type": "AggregateRating",
            "ratingValue": round1(mean),
            "reviewCount": entries.len(),
            "bestRating": 5,
            "worstRating": 1,
        });
        return Some((aggregate, entries));
    }
    let rating = recipe.rating.filter(|r| *r > 0.0)?;
    let aggregate = json!({
        "@type": "AggregateRating",
        "ratingValue": round1(rating),
        "ratingCount": 1,
        "bestRating": 5,
        "worstRating": 1,
    });
    Some((aggregate, Vec::new()))
}

fn review_entry(review: &Review) -> Value {
    let mut entry = Map::new();
    entry.insert("@type".into(), json!("Review"));
    entry.insert(
        "author".into(),
        json!({ "@type": "Person", "name": review.author }),
    );
    entry.insert(
        "reviewRating".into(),
        json!({ "@type": "Rating", "ratingValue": round1(review.rating), "bestRating": 5 }),
    );
    if let Some(comment) = &review.comment {
        entry.insert("reviewBody".into(), json!(comment));
    }
    if let Some(date) = review.created_at {
        entry.insert(
            "datePublished".into(),
            json!(date.format("%Y-%m-%d").to_string()),
        );
    }
    Value::Object(entry)
}
