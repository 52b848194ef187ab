use homevalue::application::ml::forest::ForestParameters;
use homevalue::application::ml::model::TrainedModel;
use homevalue::application::ml::predictor::PricePredictor;
use homevalue::application::ml::synthetic::SyntheticDataGenerator;
use homevalue::domain::valuation::feature_registry::{FEATURE_NAMES, parse_features};
use homevalue::domain::valuation::types::MIN_TRAINING_PRICE;
use serde_json::json;

#[test]
fn test_default_training_set_is_reproducible() {
    let generator = SyntheticDataGenerator::default();
    let first = generator.generate(1000);
    let second = SyntheticDataGenerator::new(generator.seed()).generate(1000);

    assert_eq!(first.len(), 1000);
    for (a, b) in first.iter().zip(&second) {
        // Bit-level equality, not approximate
        assert_eq!(a.price.to_bits(), b.price.to_bits());
        for (x, y) in a.features.values().iter().zip(b.features.values()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }
}

#[test]
fn test_every_sample_respects_price_floor() {
    for seed in [0, 1, 42, 1234] {
        let samples = SyntheticDataGenerator::new(seed).generate(1000);
        assert!(samples.iter().all(|s| s.price >= MIN_TRAINING_PRICE));
    }
}

#[test]
fn test_bigger_houses_value_higher() {
    let samples = SyntheticDataGenerator::default().generate(600);
    let model = TrainedModel::fit(
        &samples,
        &ForestParameters {
            n_trees: 20,
            ..ForestParameters::default()
        },
    )
    .unwrap();

    let mut body = json!({
        "bedrooms": 3,
        "bathrooms": 2,
        "lot_size": 8000,
        "year_built": 1990,
        "neighborhood_score": 5.5,
        "walkability_score": 50,
        "school_rating": 5.5,
        "crime_rate": 25,
        "median_income": 60000,
        "price_per_sqft_area": 150,
        "days_on_market_avg": 30,
        "property_tax_rate": 1.5,
    });
    body["square_feet"] = json!(1000);
    let small = parse_features(&body).unwrap();
    body["square_feet"] = json!(3200);
    let large = parse_features(&body).unwrap();

    assert!(small.defaulted.is_empty());
    assert_eq!(FEATURE_NAMES.len(), 13);

    let small_value = model.predict(&small.vector).unwrap().predicted_value;
    let large_value = model.predict(&large.vector).unwrap().predicted_value;
    assert!(large_value > small_value, "{} <= {}", large_value, small_value);
}
