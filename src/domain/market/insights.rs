use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentGrade {
    A,
    B,
    C,
}

/// Recommendation tier derived from a trend score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Caution,
}

impl Recommendation {
    /// Weighted blend of 5-year appreciation, rental yield and liquidity.
    pub fn from_trends(trends: &MarketTrends) -> Self {
        let score = trends.price_appreciation_5yr * 0.3
            + trends.rental_yield * 0.4
            + trends.market_liquidity * 0.3;

        if score > 70.0 {
            Recommendation::StrongBuy
        } else if score > 50.0 {
            Recommendation::Buy
        } else if score > 30.0 {
            Recommendation::Hold
        } else {
            Recommendation::Caution
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => write!(f, "Strong Buy - Excellent investment potential"),
            Recommendation::Buy => write!(f, "Buy - Good investment opportunity"),
            Recommendation::Hold => write!(f, "Hold - Moderate investment potential"),
            Recommendation::Caution => write!(f, "Caution - Consider other opportunities"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketTrends {
    pub price_appreciation_1yr: f64,
    pub price_appreciation_5yr: f64,
    pub rental_yield: f64,
    pub market_liquidity: f64,
    pub investment_grade: InvestmentGrade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparableProperty {
    pub address: String,
    pub price: f64,
    pub square_feet: f64,
    /// Echoed from the request as sent
    pub bedrooms: serde_json::Value,
    pub bathrooms: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInsights {
    pub location: String,
    pub market_trends: MarketTrends,
    pub investment_recommendation: String,
    pub risk_factors: Vec<String>,
    pub comparable_properties: Vec<ComparableProperty>,
}

/// The subset of a request the risk rules look at.
/// Each field carries its own neutral default, independent of the model's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskProfile {
    pub year_built: f64,
    pub crime_rate: f64,
    pub days_on_market_avg: f64,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            year_built: 2000.0,
            crime_rate: 0.0,
            days_on_market_avg: 30.0,
        }
    }
}

pub const LOW_RISK: &str = "Low risk investment";

impl RiskProfile {
    pub fn risk_factors(&self) -> Vec<String> {
        let mut risks = Vec::new();

        if self.year_built < 1980.0 {
            risks.push("Older property may require significant maintenance".to_string());
        }
        if self.crime_rate > 30.0 {
            risks.push("High crime rate in the area".to_string());
        }
        if self.days_on_market_avg > 60.0 {
            risks.push("Properties in area take longer to sell".to_string());
        }

        if risks.is_empty() {
            risks.push(LOW_RISK.to_string());
        }
        risks
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOverview {
    pub median_price: f64,
    pub price_per_sqft: f64,
    pub inventory_levels: f64,
    pub absorption_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demographics {
    pub population_growth: f64,
    pub median_age: f64,
    pub median_income: f64,
    pub employment_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Infrastructure {
    pub walkability_score: f64,
    pub transit_score: f64,
    pub school_rating: f64,
    pub hospital_proximity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub location: String,
    pub market_overview: MarketOverview,
    pub demographics: Demographics,
    pub infrastructure: Infrastructure,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trends(five_year: f64, rental_yield: f64, liquidity: f64) -> MarketTrends {
        MarketTrends {
            price_appreciation_1yr: 0.0,
            price_appreciation_5yr: five_year,
            rental_yield,
            market_liquidity: liquidity,
            investment_grade: InvestmentGrade::B,
        }
    }

    #[test]
    fn test_recommendation_tiers() {
        // 0.3*50 + 0.4*8 + 0.3*95 = 46.7
        assert_eq!(Recommendation::from_trends(&trends(50.0, 8.0, 95.0)), Recommendation::Hold);
        // 0.3*100 + 0.4*10 + 0.3*100 = 64
        assert_eq!(Recommendation::from_trends(&trends(100.0, 10.0, 100.0)), Recommendation::Buy);
        assert_eq!(Recommendation::from_trends(&trends(150.0, 20.0, 100.0)), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_trends(&trends(10.0, 3.0, 20.0)), Recommendation::Caution);
    }

    #[test]
    fn test_default_profile_is_low_risk() {
        assert_eq!(RiskProfile::default().risk_factors(), vec![LOW_RISK.to_string()]);
    }

    #[test]
    fn test_all_risk_rules_fire() {
        let profile = RiskProfile {
            year_built: 1965.0,
            crime_rate: 42.0,
            days_on_market_avg: 75.0,
        };
        let risks = profile.risk_factors();
        assert_eq!(risks.len(), 3);
        assert!(!risks.contains(&LOW_RISK.to_string()));
    }

    #[test]
    fn test_grade_serializes_as_letter() {
        let json = serde_json::to_string(&InvestmentGrade::A).unwrap();
        assert_eq!(json, "\"A\"");
    }
}
