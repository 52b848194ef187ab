// Market narrative domain
pub mod market;

// Property features and valuation outputs
pub mod valuation;

// Domain-specific error types
pub mod errors;
