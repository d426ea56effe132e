use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    error::Error,
    spectrum::{format_float, Spectrum},
};

/// Extensions of other spectrum formats, writing MSP into those files is refused.
const FORBIDDEN_EXTENSIONS: [&str; 4] = ["mzml", "mzxml", "json", "mgf"];

/// Peak lines are aligned at multiples of this column.
const TAB_SIZE: usize = 12;

/// Saves spectra as MSP file. Peak comments are written next to their peak.
///
/// # Arguments
/// * `spectra` - The spectra to save. A single spectrum can be passed via `std::iter::once`.
/// * `path` - Output file, overwritten if it exists.
///
pub fn save_as_msp<'a, I, P>(spectra: I, path: P) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a Spectrum>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_string())
        .unwrap_or_default();

    if FORBIDDEN_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
        return Err(Error::ForbiddenFileExtension(extension));
    }
    if extension != "msp" {
        log::warn!("Spectra will be stored as msp file with extension .{extension}");
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for spectrum in spectra {
        write_spectrum(spectrum, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a single spectrum in MSP format: metadata, peak count, peaks and a closing empty line.
///
/// # Arguments
/// * `spectrum` - The spectrum to write.
/// * `writer` - Destination.
///
pub fn write_spectrum<W: Write>(spectrum: &Spectrum, writer: &mut W) -> Result<(), Error> {
    for (key, value) in spectrum.metadata.iter() {
        if is_num_peaks(key) || is_peak_comments(key) {
            continue;
        }
        writeln!(writer, "{}: {value}", key.to_uppercase())?;
    }

    writeln!(writer, "NUM PEAKS: {}", spectrum.peaks.len())?;
    for (mz, intensity) in spectrum.peaks.iter() {
        let peak_comment = spectrum
            .peak_comment(mz)
            .map(|comment| format!("\t\"{comment}\""))
            .unwrap_or_default();
        let line = format!(
            "{}\t{}{peak_comment}",
            format_float(mz),
            format_float(intensity)
        );
        writeln!(writer, "{}", expand_tabs(&line, TAB_SIZE))?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Replaces every tab by spaces up to the next multiple of `tab_size`.
fn expand_tabs(line: &str, tab_size: usize) -> String {
    let mut expanded = String::with_capacity(line.len() + tab_size);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let spaces = tab_size - column % tab_size;
            expanded.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            expanded.push(c);
            column += 1;
        }
    }
    expanded
}

fn is_num_peaks(key: &str) -> bool {
    key.to_lowercase().starts_with("num peaks")
}

fn is_peak_comments(key: &str) -> bool {
    key.to_lowercase().starts_with("peak_comments")
}
