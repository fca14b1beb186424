//! Token discovery & scoring engine — discover → extract → analyze → rank.

pub mod batch;
pub mod scanner;
pub mod scoring;
