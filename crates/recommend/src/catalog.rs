//! Gift catalog
//!
//! A static product database keyed by interest category, with a synonym map
//! so free-form interests ("gadgets", "baking") still land in a category.
//! Lookups filter by budget band, optionally by keywords, de-duplicate by
//! product id, and cap the result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use giftwise_core::{BudgetTier, Platform, Product};

/// Maximum products returned per lookup
const MAX_RESULTS: usize = 6;

/// Category used when no interest matches
const GENERAL_CATEGORY: &str = "general";

fn product(
    id: &str,
    title: &str,
    price: &str,
    image: &str,
    description: &str,
    link: &str,
    platform: Platform,
) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        price: price.to_string(),
        image: Some(image.to_string()),
        description: description.to_string(),
        link: link.to_string(),
        platform,
    }
}

/// Interest-keyed product database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: HashMap<String, Vec<Product>>,
}

impl Default for Catalog {
    fn default() -> Self {
        let mut categories = HashMap::new();

        categories.insert(
            "technology".to_string(),
            vec![
                product(
                    "tech-1",
                    "Wireless Noise-Cancelling Headphones",
                    "$149.99",
                    "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?q=80&w=500&auto=format&fit=crop",
                    "Premium wireless headphones with active noise cancellation and 30-hour battery life.",
                    "https://amazon.com/product/tech-1",
                    Platform::Amazon,
                ),
                product(
                    "tech-2",
                    "Smart Home Starter Kit",
                    "$129.95",
                    "https://images.unsplash.com/photo-1558002038-1055e2fff2ce?q=80&w=500&auto=format&fit=crop",
                    "Complete smart home solution with hub, smart bulbs, and motion sensors for automated comfort.",
                    "https://amazon.com/product/tech-2",
                    Platform::Amazon,
                ),
                product(
                    "tech-3",
                    "Handcrafted Wooden Phone Stand",
                    "$34.00",
                    "https://images.unsplash.com/photo-1517686469429-8bdb88b9f907?q=80&w=500&auto=format&fit=crop",
                    "Beautifully crafted wooden phone stand, perfect for desk or nightstand.",
                    "https://etsy.com/product/tech-3",
                    Platform::Etsy,
                ),
            ],
        );

        categories.insert(
            "cooking".to_string(),
            vec![
                product(
                    "cook-1",
                    "Professional Chef Knife Set",
                    "$89.95",
                    "https://images.unsplash.com/photo-1566454419290-57a0589c9b17?q=80&w=500&auto=format&fit=crop",
                    "8-piece premium knife set with wooden block. High-carbon stainless steel blades.",
                    "https://amazon.com/product/cook-1",
                    Platform::Amazon,
                ),
                product(
                    "cook-2",
                    "Cast Iron Dutch Oven",
                    "$69.99",
                    "https://images.unsplash.com/photo-1592155931584-901ac15763e3?q=80&w=500&auto=format&fit=crop",
                    "6-quart enameled cast iron dutch oven, perfect for slow cooking, roasting, and baking.",
                    "https://amazon.com/product/cook-2",
                    Platform::Amazon,
                ),
                product(
                    "cook-3",
                    "Personalized Recipe Book",
                    "$32.50",
                    "https://images.unsplash.com/photo-1601055283742-8b27e81b5553?q=80&w=500&auto=format&fit=crop",
                    "Custom recipe book with personalized cover and pages for favorite family recipes.",
                    "https://etsy.com/product/cook-3",
                    Platform::Etsy,
                ),
            ],
        );

        categories.insert(
            "gardening".to_string(),
            vec![
                product(
                    "garden-1",
                    "Premium Gardening Tool Set",
                    "$42.99",
                    "https://images.unsplash.com/photo-1591902916941-fb53ebe3d578?q=80&w=500&auto=format&fit=crop",
                    "This ergonomic garden tool set includes pruners, trowel, rake, and cultivator.",
                    "https://amazon.com/product/garden-1",
                    Platform::Amazon,
                ),
                product(
                    "garden-2",
                    "Indoor Herb Garden Kit",
                    "$38.95",
                    "https://images.unsplash.com/photo-1522448746354-da4936934201?q=80&w=500&auto=format&fit=crop",
                    "Self-watering indoor garden kit with basil, mint, and cilantro seeds. Includes LED grow lights.",
                    "https://amazon.com/product/garden-2",
                    Platform::Amazon,
                ),
                product(
                    "garden-3",
                    "Personalized Plant Journal",
                    "$24.50",
                    "https://images.unsplash.com/photo-1544947950-fa07a98d237f?q=80&w=500&auto=format&fit=crop",
                    "Beautiful handcrafted journal to track garden growth, plant care, and seasonal changes.",
                    "https://etsy.com/product/garden-3",
                    Platform::Etsy,
                ),
            ],
        );

        categories.insert(
            "art".to_string(),
            vec![
                product(
                    "art-1",
                    "Professional Drawing Set",
                    "$54.99",
                    "https://images.unsplash.com/photo-1513364776144-60967b0f800f?q=80&w=500&auto=format&fit=crop",
                    "Complete art set with pencils, charcoal, and sketch pad for artists of all levels.",
                    "https://amazon.com/product/art-1",
                    Platform::Amazon,
                ),
                product(
                    "art-2",
                    "Custom Portrait Commission",
                    "$85.00",
                    "https://images.unsplash.com/photo-1513364776144-60967b0f800f?q=80&w=500&auto=format&fit=crop",
                    "Personalized portrait created by a professional artist from your photo.",
                    "https://etsy.com/product/art-2",
                    Platform::Etsy,
                ),
            ],
        );

        categories.insert(
            "books".to_string(),
            vec![
                product(
                    "book-1",
                    "Bestseller Book Box Set",
                    "$49.99",
                    "https://images.unsplash.com/photo-1512820790803-83ca734da794?q=80&w=500&auto=format&fit=crop",
                    "Collection of this year's most acclaimed novels, beautifully boxed.",
                    "https://amazon.com/product/book-1",
                    Platform::Amazon,
                ),
                product(
                    "book-2",
                    "Personalized Bookmarks Set",
                    "$22.50",
                    "https://images.unsplash.com/photo-1544947950-fa07a98d237f?q=80&w=500&auto=format&fit=crop",
                    "Set of 5 handcrafted leather bookmarks with custom engraving.",
                    "https://etsy.com/product/book-2",
                    Platform::Etsy,
                ),
            ],
        );

        categories.insert(
            "fitness".to_string(),
            vec![
                product(
                    "fitness-1",
                    "Smart Fitness Tracker",
                    "$79.99",
                    "https://images.unsplash.com/photo-1576243345690-4e4b79b63eaa?q=80&w=500&auto=format&fit=crop",
                    "Advanced fitness tracker with heart rate monitoring, sleep tracking, and smartphone notifications.",
                    "https://amazon.com/product/fitness-1",
                    Platform::Amazon,
                ),
                product(
                    "fitness-2",
                    "Premium Yoga Mat",
                    "$45.99",
                    "https://images.unsplash.com/photo-1601925260368-ae2f83cf8b7f?q=80&w=500&auto=format&fit=crop",
                    "Eco-friendly, non-slip yoga mat with alignment markings and carrying strap.",
                    "https://amazon.com/product/fitness-2",
                    Platform::Amazon,
                ),
            ],
        );

        categories.insert(
            GENERAL_CATEGORY.to_string(),
            vec![
                product(
                    "general-1",
                    "Scented Candle Gift Set",
                    "$34.99",
                    "https://images.unsplash.com/photo-1603006905003-be475563bc59?q=80&w=500&auto=format&fit=crop",
                    "Luxury set of 4 hand-poured soy candles in seasonal scents, beautifully packaged.",
                    "https://amazon.com/product/general-1",
                    Platform::Amazon,
                ),
                product(
                    "general-2",
                    "Personalized Photo Frame",
                    "$29.99",
                    "https://images.unsplash.com/photo-1595274459742-4ec73744175a?q=80&w=500&auto=format&fit=crop",
                    "Custom engraved wooden frame with your choice of message and design.",
                    "https://etsy.com/product/general-2",
                    Platform::Etsy,
                ),
                product(
                    "general-3",
                    "Gourmet Chocolate Box",
                    "$39.95",
                    "https://images.unsplash.com/photo-1549007994-cb92caebd54b?q=80&w=500&auto=format&fit=crop",
                    "Assortment of 24 handcrafted artisan chocolates in an elegant gift box.",
                    "https://amazon.com/product/general-3",
                    Platform::Amazon,
                ),
            ],
        );

        Self { categories }
    }
}

/// Synonyms that map free-form interests onto catalog categories
fn category_synonyms() -> &'static [(&'static str, &'static [&'static str])] {
    &[
        ("technology", &["tech", "electronics", "gadgets", "computers", "phones"]),
        ("cooking", &["cooking", "baking", "kitchen", "culinary", "food"]),
        ("gardening", &["gardening", "plants", "outdoor", "flowers", "herbs"]),
        ("art", &["art", "painting", "drawing", "crafts", "creative"]),
        ("books", &["books", "reading", "literature", "writing", "stories"]),
        ("fitness", &["fitness", "exercise", "workout", "gym", "sports"]),
    ]
}

impl Catalog {
    /// Resolve an interest to a catalog category
    fn resolve_category(&self, interest: &str) -> Option<&str> {
        let interest = interest.to_lowercase();

        if self.categories.contains_key(interest.as_str()) {
            return self
                .categories
                .get_key_value(interest.as_str())
                .map(|(k, _)| k.as_str());
        }

        for (category, synonyms) in category_synonyms() {
            if synonyms.iter().any(|s| interest.contains(s)) && self.categories.contains_key(*category) {
                return Some(category);
            }
        }

        None
    }

    /// Find products for the given interests, budget band, and keywords
    pub fn find(
        &self,
        interests: &[String],
        budget: Option<BudgetTier>,
        keywords: Option<&[String]>,
    ) -> Vec<Product> {
        let mut matched: Vec<Product> = Vec::new();

        for interest in interests {
            match self.resolve_category(interest) {
                Some(category) => {
                    if let Some(products) = self.categories.get(category) {
                        matched.extend(products.iter().cloned());
                    }
                }
                None => {
                    if let Some(products) = self.categories.get(GENERAL_CATEGORY) {
                        matched.extend(products.iter().cloned());
                    }
                }
            }
        }

        if matched.is_empty() {
            if let Some(products) = self.categories.get(GENERAL_CATEGORY) {
                matched.extend(products.iter().cloned());
            }
        }

        let filtered: Vec<Product> = matched
            .iter()
            .filter(|p| match budget {
                Some(tier) => p.price_value().is_some_and(|price| tier.contains(price)),
                None => true,
            })
            .filter(|p| match keywords {
                Some(keywords) if !keywords.is_empty() => keywords.iter().any(|k| {
                    let k = k.to_lowercase();
                    p.title.to_lowercase().contains(&k)
                        || p.description.to_lowercase().contains(&k)
                }),
                _ => true,
            })
            .cloned()
            .collect();

        // An over-tight filter should not leave the user with nothing
        let pool = if filtered.is_empty() { matched } else { filtered };

        let mut seen = std::collections::HashSet::new();
        pool.into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .take(MAX_RESULTS)
            .collect()
    }
}
