use crate::{error::Error, similarity_function::SimilarityFunction, spectrum::Spectrum};

/// Fraction of m/z values shared by both spectra: |intersection| / |union| over exact m/z values.
#[derive(Clone, Debug, Default)]
pub struct IntersectMz;

/// Sorted m/z values without duplicates.
fn unique_mz(spectrum: &Spectrum) -> Vec<f64> {
    let mut mz = spectrum.peaks.mz().to_vec();
    mz.dedup();
    mz
}

impl SimilarityFunction<Spectrum> for IntersectMz {
    fn pair(&self, query: &Spectrum, reference: &Spectrum) -> Result<f64, Error> {
        let query_mz = unique_mz(query);
        let reference_mz = unique_mz(reference);

        let mut intersected = 0;
        let (mut i, mut j) = (0, 0);
        while i < query_mz.len() && j < reference_mz.len() {
            match query_mz[i].total_cmp(&reference_mz[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    intersected += 1;
                    i += 1;
                    j += 1;
                }
            }
        }

        let unioned = query_mz.len() + reference_mz.len() - intersected;
        if unioned == 0 {
            return Ok(0.0);
        }
        Ok(intersected as f64 / unioned as f64)
    }
}
