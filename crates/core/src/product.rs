//! Product records and budget tiers
//!
//! `Product` is the wire contract shared with the recommendation and
//! affiliate collaborators. Prices travel as currency-prefixed strings
//! ("$42.99") because that is what the catalog sources emit.

use serde::{Deserialize, Serialize};

/// Marketplace a product links out to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Amazon,
    Etsy,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Etsy => "etsy",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recommendable product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog id
    pub id: String,
    /// Display title
    pub title: String,
    /// Currency-prefixed decimal, e.g. "$42.99"
    pub price: String,
    /// Optional product image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Short description
    pub description: String,
    /// Outbound (untracked) product URL
    pub link: String,
    /// Marketplace the link points to
    pub platform: Platform,
}

impl Product {
    /// Parse the numeric price out of the currency-prefixed string
    pub fn price_value(&self) -> Option<f64> {
        self.price.trim_start_matches('$').replace(',', "").parse().ok()
    }
}

/// Budget band selected during the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    /// Up to $30
    Low,
    /// $30 to $75
    Medium,
    /// $75 to $150
    High,
    /// Above $150
    Premium,
}

impl BudgetTier {
    /// Map a budget-step choice id to its tier
    pub fn from_choice_id(choice_id: &str) -> Option<BudgetTier> {
        match choice_id {
            "budget_low" => Some(BudgetTier::Low),
            "budget_medium" => Some(BudgetTier::Medium),
            "budget_high" => Some(BudgetTier::High),
            "budget_premium" => Some(BudgetTier::Premium),
            _ => None,
        }
    }

    /// Whether a price falls inside this tier's band
    pub fn contains(&self, price: f64) -> bool {
        match self {
            BudgetTier::Low => price <= 30.0,
            BudgetTier::Medium => price > 30.0 && price <= 75.0,
            BudgetTier::High => price > 75.0 && price <= 150.0,
            BudgetTier::Premium => price > 150.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Low => "low",
            BudgetTier::Medium => "medium",
            BudgetTier::High => "high",
            BudgetTier::Premium => "premium",
        }
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: &str) -> Product {
        Product {
            id: "p1".to_string(),
            title: "Test".to_string(),
            price: price.to_string(),
            image: None,
            description: "A test product".to_string(),
            link: "https://amazon.com/product/p1".to_string(),
            platform: Platform::Amazon,
        }
    }

    #[test]
    fn test_price_parsing() {
        assert_eq!(product("$42.99").price_value(), Some(42.99));
        assert_eq!(product("$1,299.00").price_value(), Some(1299.0));
        assert_eq!(product("n/a").price_value(), None);
    }

    #[test]
    fn test_budget_bands() {
        assert!(BudgetTier::Low.contains(24.50));
        assert!(!BudgetTier::Low.contains(42.99));
        assert!(BudgetTier::Medium.contains(42.99));
        assert!(BudgetTier::High.contains(129.95));
        assert!(BudgetTier::Premium.contains(151.0));
    }

    #[test]
    fn test_tier_from_choice() {
        assert_eq!(BudgetTier::from_choice_id("budget_low"), Some(BudgetTier::Low));
        assert_eq!(BudgetTier::from_choice_id("budget_premium"), Some(BudgetTier::Premium));
        assert_eq!(BudgetTier::from_choice_id("suggestions"), None);
    }

    #[test]
    fn test_product_serde() {
        let json = serde_json::to_value(product("$42.99")).unwrap();
        assert_eq!(json["platform"], "amazon");
        assert!(json.get("image").is_none());
    }
}
