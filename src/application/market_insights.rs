//! Simulated market narrative that accompanies a valuation.
//!
//! Trend figures and comparables are random draws; only the risk flags are
//! derived from the request. Callers pass the RNG so tests can seed it.

use crate::domain::errors::ValidationError;
use crate::domain::market::insights::{
    ComparableProperty, Demographics, Infrastructure, InvestmentGrade, MarketAnalysis,
    MarketInsights, MarketOverview, MarketTrends, Recommendation, RiskProfile,
};
use crate::domain::valuation::feature_registry::numeric_field;
use crate::domain::valuation::types::round_to_cents;
use rand::Rng;
use serde_json::{Map, Value};

pub const DEFAULT_COMPARABLE_BASE_PRICE: f64 = 300_000.0;
pub const COMPARABLE_COUNT: usize = 3;

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

fn text_field(object: &Map<String, Value>, name: &str, default: &str) -> String {
    match object.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

fn number_or(object: &Map<String, Value>, name: &str, default: f64) -> Result<f64, ValidationError> {
    Ok(numeric_field(object, name)?.unwrap_or(default))
}

/// The request's numeric value as sent (so `3` stays `3`), or `default`.
fn echoed_number(object: &Map<String, Value>, name: &str, default: u32) -> Result<Value, ValidationError> {
    Ok(match numeric_field(object, name)? {
        Some(_) => object.get(name).cloned().unwrap_or(Value::Null),
        None => Value::from(default),
    })
}

pub fn market_trends<R: Rng>(rng: &mut R) -> MarketTrends {
    let price_appreciation_1yr = rng.random_range(-5.0..15.0);
    let price_appreciation_5yr = rng.random_range(10.0..50.0);
    let rental_yield = rng.random_range(3.0..8.0);
    let market_liquidity = rng.random_range(60.0..95.0);

    // Two independent draws: A above 0.7, otherwise B above 0.4, otherwise C.
    let investment_grade = if rng.random::<f64>() > 0.7 {
        InvestmentGrade::A
    } else if rng.random::<f64>() > 0.4 {
        InvestmentGrade::B
    } else {
        InvestmentGrade::C
    };

    MarketTrends {
        price_appreciation_1yr,
        price_appreciation_5yr,
        rental_yield,
        market_liquidity,
        investment_grade,
    }
}

pub fn risk_profile(object: &Map<String, Value>) -> Result<RiskProfile, ValidationError> {
    let defaults = RiskProfile::default();
    Ok(RiskProfile {
        year_built: number_or(object, "year_built", defaults.year_built)?,
        crime_rate: number_or(object, "crime_rate", defaults.crime_rate)?,
        days_on_market_avg: number_or(object, "days_on_market_avg", defaults.days_on_market_avg)?,
    })
}

pub fn comparables<R: Rng>(
    object: &Map<String, Value>,
    rng: &mut R,
) -> Result<Vec<ComparableProperty>, ValidationError> {
    let base_price = number_or(object, "estimated_value", DEFAULT_COMPARABLE_BASE_PRICE)?;
    let square_feet = number_or(object, "square_feet", 2000.0)?;
    let bedrooms = echoed_number(object, "bedrooms", 3)?;
    let bathrooms = echoed_number(object, "bathrooms", 2)?;

    Ok((1..=COMPARABLE_COUNT)
        .map(|i| ComparableProperty {
            address: format!("Comparable Property {}", i),
            price: round_to_cents(base_price * rng.random_range(0.85..1.15)),
            square_feet: square_feet * rng.random_range(0.9..1.1),
            bedrooms: bedrooms.clone(),
            bathrooms: bathrooms.clone(),
        })
        .collect())
}

/// Trends, recommendation, risks and comparables for one request body.
pub fn market_insights<R: Rng>(body: &Value, rng: &mut R) -> Result<MarketInsights, ValidationError> {
    let object = as_object(body)?;
    let market_trends = market_trends(rng);
    let investment_recommendation = Recommendation::from_trends(&market_trends).to_string();

    Ok(MarketInsights {
        location: text_field(object, "address", "Unknown Location"),
        investment_recommendation,
        market_trends,
        risk_factors: risk_profile(object)?.risk_factors(),
        comparable_properties: comparables(object, rng)?,
    })
}

/// Area-level statistics for `/market-analysis`.
pub fn market_analysis<R: Rng>(body: &Value, rng: &mut R) -> Result<MarketAnalysis, ValidationError> {
    let object = as_object(body)?;

    Ok(MarketAnalysis {
        location: text_field(object, "location", "Unknown"),
        market_overview: MarketOverview {
            median_price: rng.random_range(200_000.0..800_000.0),
            price_per_sqft: rng.random_range(100.0..300.0),
            inventory_levels: rng.random_range(1.0..6.0),
            absorption_rate: rng.random_range(0.5..3.0),
        },
        demographics: Demographics {
            population_growth: rng.random_range(-2.0..8.0),
            median_age: rng.random_range(25.0..55.0),
            median_income: rng.random_range(40_000.0..120_000.0),
            employment_rate: rng.random_range(85.0..98.0),
        },
        infrastructure: Infrastructure {
            walkability_score: rng.random_range(20.0..95.0),
            transit_score: rng.random_range(10.0..90.0),
            school_rating: rng.random_range(3.0..10.0),
            hospital_proximity: rng.random_range(1.0..20.0),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::insights::LOW_RISK;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    #[test]
    fn test_trends_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let t = market_trends(&mut rng);
            assert!((-5.0..15.0).contains(&t.price_appreciation_1yr));
            assert!((10.0..50.0).contains(&t.price_appreciation_5yr));
            assert!((3.0..8.0).contains(&t.rental_yield));
            assert!((60.0..95.0).contains(&t.market_liquidity));
        }
    }

    #[test]
    fn test_minimal_request_is_low_risk() {
        let mut rng = StdRng::seed_from_u64(1);
        let insights = market_insights(
            &json!({"square_feet": 2000, "bedrooms": 3, "bathrooms": 2}),
            &mut rng,
        )
        .unwrap();
        assert_eq!(insights.location, "Unknown Location");
        assert_eq!(insights.risk_factors, vec![LOW_RISK.to_string()]);
        assert_eq!(insights.comparable_properties.len(), COMPARABLE_COUNT);
    }

    #[test]
    fn test_risky_request_flags_risks() {
        let mut rng = StdRng::seed_from_u64(1);
        let insights = market_insights(
            &json!({
                "address": "4 Harbor Rd",
                "square_feet": 1200,
                "bedrooms": 2,
                "bathrooms": 1,
                "year_built": 1962,
                "crime_rate": 35.5,
            }),
            &mut rng,
        )
        .unwrap();
        assert_eq!(insights.location, "4 Harbor Rd");
        assert_eq!(insights.risk_factors.len(), 2);
    }

    #[test]
    fn test_comparables_follow_estimated_value() {
        let mut rng = StdRng::seed_from_u64(9);
        let body = json!({"estimated_value": 500000, "square_feet": 1800, "bedrooms": 4, "bathrooms": 3});
        let comps = comparables(body.as_object().unwrap(), &mut rng).unwrap();
        for (i, c) in comps.iter().enumerate() {
            assert_eq!(c.address, format!("Comparable Property {}", i + 1));
            assert!(c.price >= 425_000.0 && c.price <= 575_000.0);
            assert!(c.square_feet >= 1620.0 && c.square_feet <= 1980.0);
            assert_eq!(c.bedrooms, json!(4));
            assert_eq!(c.bathrooms, json!(3));
        }
    }

    #[test]
    fn test_comparables_echo_room_counts_as_sent() {
        let mut rng = StdRng::seed_from_u64(9);
        let body = json!({"bedrooms": 3, "bathrooms": 2.5});
        let comps = comparables(body.as_object().unwrap(), &mut rng).unwrap();
        let serialized = serde_json::to_string(&comps[0]).unwrap();
        assert!(serialized.contains("\"bedrooms\":3,"), "{}", serialized);
        assert!(serialized.contains("\"bathrooms\":2.5"), "{}", serialized);

        let defaults = comparables(json!({}).as_object().unwrap(), &mut rng).unwrap();
        assert_eq!(defaults[0].bedrooms, json!(3));
        assert_eq!(defaults[0].bathrooms, json!(2));

        let err = comparables(json!({"bedrooms": "three"}).as_object().unwrap(), &mut rng);
        assert!(err.is_err());
    }

    #[test]
    fn test_market_analysis_defaults_location() {
        let mut rng = StdRng::seed_from_u64(5);
        let analysis = market_analysis(&json!({}), &mut rng).unwrap();
        assert_eq!(analysis.location, "Unknown");
        assert!((85.0..98.0).contains(&analysis.demographics.employment_rate));
    }

    #[test]
    fn test_market_analysis_rejects_non_object() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(market_analysis(&json!("Austin"), &mut rng).is_err());
    }
}
