use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::product::Product;
use crate::models::user::User;

const FALLBACK_VILLAGE: &str = "Sira Junction";
const DEFAULT_CATEGORY: &str = "Produce";

/// What a farmer submits when publishing a crop. `grade` and
/// `advised_price` come from the external grading service.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingDraft {
    pub name: String,
    pub price_per_kg: Option<f64>,
    pub advised_price: Option<String>,
    pub quantity_kg: f64,
    pub grade: Option<String>,
    pub category: Option<String>,
}

pub fn is_inedible(grade: &str) -> bool {
    let grade = grade.to_uppercase();
    grade.contains("INEDIBLE") || grade.contains("REJECT")
}

/// Pulls the number out of advisory text such as "₹42.50 / kg".
pub fn parse_advised_price(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().filter(|price| *price > 0.0)
}

pub fn build_listing(
    farmer: &User,
    draft: ListingDraft,
    now: DateTime<Utc>,
) -> Result<Product, LedgerError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(LedgerError::ListingRejected("crop name is missing".to_string()));
    }
    if let Some(grade) = draft.grade.as_deref().filter(|grade| is_inedible(grade)) {
        return Err(LedgerError::ListingRejected(format!(
            "crop graded {grade}"
        )));
    }

    let price = draft
        .price_per_kg
        .or_else(|| draft.advised_price.as_deref().and_then(parse_advised_price))
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| LedgerError::ListingRejected("price per kg is missing".to_string()))?;

    if !draft.quantity_kg.is_finite() || draft.quantity_kg <= 0.0 {
        return Err(LedgerError::ListingRejected(
            "quantity must be positive".to_string(),
        ));
    }

    let grade = draft
        .grade
        .as_deref()
        .map(str::trim)
        .filter(|grade| !grade.is_empty())
        .unwrap_or("Standard");

    Ok(Product {
        id: Uuid::new_v4(),
        farmer_id: farmer.id,
        farmer_name: farmer.name.clone(),
        farmer_village: farmer
            .village
            .clone()
            .unwrap_or_else(|| FALLBACK_VILLAGE.to_string()),
        name: name.to_string(),
        price_per_kg: price,
        quantity_available: draft.quantity_kg,
        category: draft
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        description: format!("{grade} grade. AI-Verified Price."),
        listed_at: now,
    })
}
