pub mod priority;
pub mod risk;
