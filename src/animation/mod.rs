pub mod ease;
pub mod pose;
