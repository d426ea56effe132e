use crate::{
    error::Error, scoring_result::ScoringResult, similarity_function::SimilarityFunction,
    spectrum::Spectrum,
};

/// Default m/z tolerance for matching peaks.
const DEFAULT_TOLERANCE: f64 = 0.1;

/// Cosine similarity with greedy peak matching.
///
/// Peaks of both spectra within `tolerance` are paired up, the pairs with the highest intensity
/// product are taken first and every peak is used at most once.
#[derive(Clone, Debug)]
pub struct CosineGreedy {
    pub tolerance: f64,
}

impl CosineGreedy {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Collects all peak pairs within tolerance as `(query_index, reference_index, weight)`.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `reference` - The reference spectrum.
    ///
    fn matching_pairs(&self, query: &Spectrum, reference: &Spectrum) -> Vec<(usize, usize, f64)> {
        let reference_mz = reference.peaks.mz();
        let reference_intensities = reference.peaks.intensities();

        let mut pairs = Vec::new();
        // Both m/z arrays are sorted, so the window start only ever moves forward.
        let mut window_start = 0;
        for (query_index, (mz, intensity)) in query.peaks.iter().enumerate() {
            while window_start < reference_mz.len()
                && reference_mz[window_start] < mz - self.tolerance
            {
                window_start += 1;
            }

            for reference_index in window_start..reference_mz.len() {
                if reference_mz[reference_index] > mz + self.tolerance {
                    break;
                }
                pairs.push((
                    query_index,
                    reference_index,
                    intensity * reference_intensities[reference_index],
                ));
            }
        }
        pairs
    }

    /// Calculates the cosine score and the number of matched peaks.
    ///
    /// # Arguments
    /// * `query` - The query spectrum.
    /// * `reference` - The reference spectrum.
    ///
    pub fn score_with_matches(&self, query: &Spectrum, reference: &Spectrum) -> ScoringResult {
        let norm_product = query.peaks.intensities().dot(query.peaks.intensities()).sqrt()
            * reference
                .peaks
                .intensities()
                .dot(reference.peaks.intensities())
                .sqrt();

        if norm_product == 0.0 {
            return ScoringResult {
                score: 0.0,
                matched_peaks: 0,
            };
        }

        let mut pairs = self.matching_pairs(query, reference);
        pairs.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut used_query = vec![false; query.peaks.len()];
        let mut used_reference = vec![false; reference.peaks.len()];
        let mut score = 0.0;
        let mut matched_peaks = 0;
        for (query_index, reference_index, weight) in pairs {
            if used_query[query_index] || used_reference[reference_index] {
                continue;
            }
            used_query[query_index] = true;
            used_reference[reference_index] = true;
            score += weight;
            matched_peaks += 1;
        }

        ScoringResult {
            score: score / norm_product,
            matched_peaks,
        }
    }
}

impl Default for CosineGreedy {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl SimilarityFunction<Spectrum> for CosineGreedy {
    fn pair(&self, query: &Spectrum, reference: &Spectrum) -> Result<f64, Error> {
        Ok(self.score_with_matches(query, reference).score)
    }
}
