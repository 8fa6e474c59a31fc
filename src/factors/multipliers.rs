//! Category tag to emission severity multiplier
//!
//! The estimation API only offers one weight-based food factor, so products
//! are scaled by how carbon intensive their category is relative to an
//! average food. Groups are checked in order; the first keyword hit wins.

pub const DEFAULT_MULTIPLIER: f64 = 1.0;

pub const DEFAULT_CATEGORY: &str = "Unknown Food";

const LANGUAGE_PREFIXES: &[&str] = &[
    "en:", "fr:", "de:", "es:", "it:", "pt:", "nl:", "pl:", "ru:", "ja:", "zh:", "zh-cn:",
    "zh-tw:", "ko:", "ar:",
];

const MULTIPLIER_GROUPS: &[(&[&str], f64)] = &[
    // meat
    (&["beef"], 7.3),
    (&["lamb", "mutton"], 6.5),
    (&["pork"], 3.2),
    (&["meat"], 1.6),
    (&["fish", "seafood", "salmon", "tuna", "shrimp", "prawn"], 1.1),
    // dairy
    (&["cheese"], 3.0),
    (&["butter"], 3.2),
    (&["dairy", "milk", "yogurt", "yoghurt", "cream"], 0.8),
    // snacks
    (&["chocolate"], 5.1),
    (
        &[
            "snack",
            "confectionery",
            "sweet",
            "candy",
            "dessert",
            "biscuit",
            "cookie",
            "cracker",
            "chip",
            "crisp",
        ],
        1.0,
    ),
    // drinks
    (&["coffee"], 0.4),
    (&["juice"], 0.4),
    (
        &[
            "beverage",
            "drink",
            "carbonated",
            "water",
            "soft",
            "soda",
            "tea",
            "alcoholic",
            "beer",
            "wine",
            "spirits",
            "cider",
        ],
        0.3,
    ),
    // staples
    (&["rice"], 1.1),
    (&["bread", "cereal", "grain", "pasta", "flour", "wheat"], 0.4),
    (&["fruit", "vegetable", "fresh", "organic"], 0.2),
];

fn strip_language_prefix(tag: &str) -> &str {
    LANGUAGE_PREFIXES
        .iter()
        .find_map(|prefix| {
            tag.get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &tag[prefix.len()..])
        })
        .unwrap_or(tag)
}

/// `"en:dairy-products"` becomes `"dairy products"`
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    strip_language_prefix(tag.trim())
        .replace(['-', '_'], " ")
        .trim()
        .to_string()
}

#[must_use]
pub fn multiplier_for_tags<S: AsRef<str>>(tags: &[S]) -> f64 {
    let joined = tags
        .iter()
        .map(|t| normalize_tag(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if joined.is_empty() {
        return DEFAULT_MULTIPLIER;
    }

    MULTIPLIER_GROUPS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| joined.contains(k)))
        .map_or(DEFAULT_MULTIPLIER, |&(_, multiplier)| multiplier)
}

/// Display category taken from the first tag
#[must_use]
pub fn category_label_from_tags<S: AsRef<str>>(tags: &[S]) -> String {
    let Some(first) = tags.first().map(|t| t.as_ref().trim()) else {
        return DEFAULT_CATEGORY.to_string();
    };
    if first.is_empty() {
        return DEFAULT_CATEGORY.to_string();
    }
    strip_language_prefix(first).replace('-', " ")
}
