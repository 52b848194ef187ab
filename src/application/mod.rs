// Model training and inference
pub mod ml;

// Simulated market narrative
pub mod market_insights;

// Live model ownership
pub mod valuation_service;
