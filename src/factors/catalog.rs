//! Dish label to kg CO2e per serving

use std::collections::HashMap;
use std::sync::LazyLock;

pub const SERVING_UNIT: &str = "kg CO2e/serving";

/// Title case labels come from the Asian dish classifier, snake case labels
/// from the Food-101 classifier. Some dishes appear in both spellings.
const DISHES: &[(&str, f64)] = &[
    ("Hainanese Chicken Rice", 1.10),
    ("Fried Rice", 0.90),
    ("Nasi Goreng", 1.20),
    ("Nasi Lemak", 1.30),
    ("Biryani", 1.70),
    ("Bibimbap", 0.90),
    ("Mango Sticky Rice", 0.70),
    ("Char Kway Teow", 1.20),
    ("Hokkien Mee", 1.20),
    ("Wanton Mee", 1.00),
    ("Laksa", 1.30),
    ("Ramen", 1.40),
    ("Udon", 0.80),
    ("Pho", 1.50),
    ("Vietnamese Pho", 1.50),
    ("Pad Thai", 1.00),
    ("Chow Mein", 0.80),
    ("Beef Rendang", 4.50),
    ("Bulgogi", 3.80),
    ("Roast Duck Rice", 1.40),
    ("Peking Duck", 1.50),
    ("Bak Kut Teh", 1.80),
    ("Sweet and Sour Pork", 1.60),
    ("Mapo Tofu", 0.60),
    ("Ma Po Tofu", 0.60),
    ("Kung Pao Chicken", 1.00),
    ("General Tso's Chicken", 1.10),
    ("Butter Chicken", 1.60),
    ("Tandoori Chicken", 1.10),
    ("Korean Fried Chicken", 1.20),
    ("Satay", 1.50),
    ("Yakitori", 1.20),
    ("Chili Crab", 1.80),
    ("Black Pepper Crab", 1.70),
    ("Curry Fish Head", 1.90),
    ("Oyster Omelette", 1.00),
    ("Sashimi", 1.30),
    ("Sushi", 0.80),
    ("Dim Sum", 1.00),
    ("Har Gow", 0.90),
    ("Siew Mai", 0.80),
    ("Xiao Long Bao", 0.90),
    ("Char Siu Bao", 0.80),
    ("Dumplings", 0.80),
    ("Wonton Soup", 0.60),
    ("Spring Rolls", 0.50),
    ("Summer Rolls", 0.40),
    ("Roti Prata", 0.60),
    ("Naan", 0.50),
    ("Samosa", 0.40),
    ("Takoyaki", 0.60),
    ("Okonomiyaki", 1.10),
    ("Tempura", 0.90),
    ("Tteokbokki", 0.70),
    ("Kimchi", 0.20),
    ("Tom Yum Soup", 0.90),
    ("Miso Soup", 0.20),
    ("Green Curry", 1.20),
    ("Hot Pot", 2.50),
    ("Bubble Tea", 0.40),
    ("filet_mignon", 5.50),
    ("prime_rib", 5.50),
    ("steak", 5.00),
    ("beef_carpaccio", 4.50),
    ("beef_tartare", 4.50),
    ("hamburger", 3.50),
    ("baby_back_ribs", 2.80),
    ("pulled_pork_sandwich", 2.50),
    ("foie_gras", 2.50),
    ("pork_chop", 2.20),
    ("lasagna", 2.20),
    ("spaghetti_bolognese", 2.00),
    ("lobster_roll_sandwich", 1.90),
    ("lobster_bisque", 1.80),
    ("cheese_plate", 1.80),
    ("breakfast_burrito", 1.80),
    ("shrimp_and_grits", 1.70),
    ("paella", 1.60),
    ("crab_cakes", 1.60),
    ("tacos", 1.60),
    ("tuna_tartare", 1.50),
    ("club_sandwich", 1.50),
    ("croque_madame", 1.50),
    ("poutine", 1.50),
    ("hot_dog", 1.50),
    ("cheesecake", 1.50),
    ("fish_and_chips", 1.40),
    ("grilled_salmon", 1.40),
    ("chicken_curry", 1.40),
    ("macaroni_and_cheese", 1.40),
    ("pizza", 1.40),
    ("chicken_quesadilla", 1.30),
    ("clam_chowder", 1.30),
    ("grilled_cheese_sandwich", 1.30),
    ("spaghetti_carbonara", 1.30),
    ("chicken_wings", 1.20),
    ("fried_calamari", 1.20),
    ("eggs_benedict", 1.20),
    ("quiche", 1.20),
    ("scallops", 1.20),
    ("nachos", 1.20),
    ("creme_brulee", 1.20),
    ("ceviche", 1.10),
    ("mussels", 1.10),
    ("risotto", 1.10),
    ("tiramisu", 1.10),
    ("chocolate_mousse", 1.10),
    ("caprese_salad", 1.00),
    ("omelette", 1.00),
    ("escargots", 1.00),
    ("guacamole", 1.00),
    ("oysters", 1.00),
    ("panna_cotta", 1.00),
    ("chocolate_cake", 1.00),
    ("ice_cream", 1.00),
    ("baklava", 0.90),
    ("bread_pudding", 0.90),
    ("french_onion_soup", 0.90),
    ("french_toast", 0.90),
    ("ravioli", 0.90),
    ("strawberry_shortcake", 0.90),
    ("red_velvet_cake", 0.90),
    ("apple_pie", 0.80),
    ("cannoli", 0.80),
    ("carrot_cake", 0.80),
    ("cup_cakes", 0.80),
    ("deviled_eggs", 0.80),
    ("frozen_yogurt", 0.80),
    ("gnocchi", 0.80),
    ("beignets", 0.70),
    ("caesar_salad", 0.70),
    ("garlic_bread", 0.70),
    ("macarons", 0.70),
    ("onion_rings", 0.70),
    ("pancakes", 0.70),
    ("waffles", 0.70),
    ("churros", 0.60),
    ("donuts", 0.60),
    ("french_fries", 0.60),
    ("greek_salad", 0.60),
    ("hot_and_sour_soup", 0.60),
    ("bruschetta", 0.50),
    ("falafel", 0.50),
    ("beet_salad", 0.40),
    ("hummus", 0.40),
    ("edamame", 0.30),
    ("seaweed_salad", 0.20),
    ("fried_rice", 0.90),
    ("dumplings", 0.80),
    ("sushi", 0.80),
    ("sashimi", 1.30),
    ("ramen", 1.40),
    ("pho", 1.50),
    ("pad_thai", 1.00),
    ("spring_rolls", 0.50),
    ("peking_duck", 1.50),
    ("bibimbap", 0.90),
    ("gyoza", 0.80),
    ("miso_soup", 0.20),
    ("samosa", 0.40),
    ("takoyaki", 0.60),
];

struct Catalog {
    exact: HashMap<&'static str, f64>,
    folded: HashMap<String, f64>,
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
    let mut folded = HashMap::new();
    for &(label, factor) in DISHES {
        folded.entry(label.to_lowercase()).or_insert(factor);
    }
    Catalog {
        exact: DISHES.iter().copied().collect(),
        folded,
    }
});

/// Exact match first, then case-insensitive
#[must_use]
pub fn lookup(label: &str) -> Option<f64> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    CATALOG
        .exact
        .get(label)
        .or_else(|| CATALOG.folded.get(&label.to_lowercase()))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hainanese Chicken Rice", 1.10)]
    #[case("Beef Rendang", 4.50)]
    #[case("steak", 5.00)]
    #[case("seaweed_salad", 0.20)]
    #[case("pad_thai", 1.00)]
    fn test_exact_lookup(#[case] label: &str, #[case] expected: f64) {
        assert_eq!(lookup(label), Some(expected));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(lookup("nasi lemak"), Some(1.30));
        assert_eq!(lookup("  HAMBURGER "), Some(3.50));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(lookup("Deep Fried Mars Bar"), None);
        assert_eq!(lookup("   "), None);
    }

    #[test]
    fn test_no_negative_factors() {
        assert!(DISHES.iter().all(|&(_, factor)| factor >= 0.0));
        assert!(DISHES.len() > 100);
    }
}
