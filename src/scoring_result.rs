/// Score of a peak matching similarity together with the number of peak pairs that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringResult {
    pub score: f64,
    pub matched_peaks: usize,
}
