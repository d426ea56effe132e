use std::fmt;

use ndarray::{Array1, Axis};

use crate::error::Error;

/// Peak list of a spectrum: m/z values sorted ascending and their intensities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Peaks {
    mz: Array1<f64>,
    intensities: Array1<f64>,
}

impl Peaks {
    /// Creates a new peak list.
    ///
    /// # Arguments
    /// * `mz` - m/z values, must be sorted ascending.
    /// * `intensities` - Intensity for each m/z value.
    ///
    pub fn new(mz: Array1<f64>, intensities: Array1<f64>) -> Result<Self, Error> {
        if mz.len() != intensities.len() {
            return Err(Error::PeakShape(mz.len(), intensities.len()));
        }

        if let Some(index) = mz
            .windows(2)
            .into_iter()
            .position(|pair| pair[1] < pair[0])
        {
            return Err(Error::UnsortedMz(index + 1));
        }

        Ok(Self { mz, intensities })
    }

    pub fn mz(&self) -> &Array1<f64> {
        &self.mz
    }

    pub fn intensities(&self) -> &Array1<f64> {
        &self.intensities
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Returns a new peak list holding only the peaks at `indexes`.
    /// Indexes must be ascending to keep the m/z order.
    ///
    pub fn select(&self, indexes: &[usize]) -> Self {
        Self {
            mz: self.mz.select(Axis(0), indexes),
            intensities: self.intensities.select(Axis(0), indexes),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.mz
            .iter()
            .copied()
            .zip(self.intensities.iter().copied())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl MetadataValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Integer(value) => Some(*value as f64),
            MetadataValue::Float(value) => Some(*value),
            MetadataValue::Text(value) => value.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Formats a float the way the MSP format expects it: integral values keep a trailing `.0`,
/// decimal exponents below -4 or from 16 on are written in scientific notation (`1e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() || value == 0.0 {
        return format!("{value:.1}");
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if (-4..16).contains(&exponent) {
        if value.fract() == 0.0 {
            format!("{value:.1}")
        } else {
            value.to_string()
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(value) => write!(f, "{value}"),
            MetadataValue::Integer(value) => write!(f, "{value}"),
            MetadataValue::Float(value) => write!(f, "{}", format_float(*value)),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

/// Key/value metadata which keeps keys in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(String, MetadataValue)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value)
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(entry_key, _)| *entry_key == key) {
            Some((_, entry_value)) => *entry_value = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<MetadataValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.set(key, value);
        }
        metadata
    }
}

/// A mass spectrum: peaks, metadata and optional comments attached to single peaks.
///
/// Two spectra are equal when peaks, metadata and peak comments are all equal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    pub peaks: Peaks,
    pub metadata: Metadata,
    pub peak_comments: Option<Vec<(f64, String)>>,
}

impl Spectrum {
    pub fn new(peaks: Peaks, metadata: Metadata) -> Self {
        Self {
            peaks,
            metadata,
            peak_comments: None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.metadata.set(key, value);
    }

    /// Comment attached to the peak at exactly `mz`, if any.
    pub fn peak_comment(&self, mz: f64) -> Option<&str> {
        self.peak_comments
            .as_ref()?
            .iter()
            .find(|(comment_mz, _)| *comment_mz == mz)
            .map(|(_, comment)| comment.as_str())
    }
}

#[derive(Default)]
pub struct SpectrumBuilder {
    mz: Vec<f64>,
    intensities: Vec<f64>,
    metadata: Metadata,
    peak_comments: Option<Vec<(f64, String)>>,
}

impl SpectrumBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mz(mut self, mz: impl Into<Vec<f64>>) -> Self {
        self.mz = mz.into();
        self
    }

    pub fn with_intensities(mut self, intensities: impl Into<Vec<f64>>) -> Self {
        self.intensities = intensities.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_peak_comments(mut self, peak_comments: Vec<(f64, String)>) -> Self {
        self.peak_comments = Some(peak_comments);
        self
    }

    pub fn build(self) -> Result<Spectrum, Error> {
        let peaks = Peaks::new(Array1::from(self.mz), Array1::from(self.intensities))?;
        Ok(Spectrum {
            peaks,
            metadata: self.metadata,
            peak_comments: self.peak_comments,
        })
    }
}
