// Market insight narrative (trends, risks, comparables)
pub mod insights;
