use crate::spectrum::Spectrum;

/// Keeps only the peaks with `mz_from <= mz <= mz_to`. Comments of removed peaks are dropped as well.
///
/// # Arguments
/// * `spectrum` - The spectrum to filter.
/// * `mz_from` - Lower m/z bound (inclusive).
/// * `mz_to` - Upper m/z bound (inclusive).
///
pub fn select_by_mz(spectrum: &Spectrum, mz_from: f64, mz_to: f64) -> Spectrum {
    let considerable_peaks_indexes = spectrum
        .peaks
        .mz()
        .iter()
        .enumerate()
        .filter(|(_, &mz)| mz_from <= mz && mz <= mz_to)
        .map(|(index, _)| index)
        .collect::<Vec<usize>>();

    let peak_comments = spectrum.peak_comments.as_ref().map(|comments| {
        comments
            .iter()
            .filter(|(mz, _)| mz_from <= *mz && *mz <= mz_to)
            .cloned()
            .collect()
    });

    Spectrum {
        peaks: spectrum.peaks.select(&considerable_peaks_indexes),
        metadata: spectrum.metadata.clone(),
        peak_comments,
    }
}
