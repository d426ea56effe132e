pub mod configuration;
/// Built-in similarity: greedy cosine
pub mod cosine_greedy;
pub mod error;
pub mod intersect_mz;
/// MSP export
pub mod msp;
pub mod repair_adduct;
/// Pairwise score matrix and ranking
pub mod scores;
pub mod scoring_result;
pub mod select_by_mz;
pub mod similarity_function;
pub mod spectrum;
// Element masses
pub mod utils;
