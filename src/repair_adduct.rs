use rustyms::Element::{self, Cl, Na, C, H, K, N, O};

use crate::{
    error::Error,
    spectrum::{MetadataValue, Spectrum},
    utils::{composition_mass, ELECTRON_MASS},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IonMode {
    Positive,
    Negative,
}

impl IonMode {
    fn from_metadata(value: &MetadataValue) -> Option<Self> {
        match value.as_str()?.trim().to_lowercase().as_str() {
            "positive" => Some(IonMode::Positive),
            "negative" => Some(IonMode::Negative),
            _ => None,
        }
    }
}

struct Adduct {
    name: &'static str,
    ion_mode: IonMode,
    charge: u8,
    mass_multiplier: u8,
    /// Elements added to (or, with negative counts, removed from) the neutral molecules.
    composition: &'static [(Element, i32)],
}

impl Adduct {
    const fn new(
        name: &'static str,
        ion_mode: IonMode,
        charge: u8,
        mass_multiplier: u8,
        composition: &'static [(Element, i32)],
    ) -> Self {
        Self {
            name,
            ion_mode,
            charge,
            mass_multiplier,
            composition,
        }
    }

    /// Mass added to `mass_multiplier` neutral molecules to get the ion, electrons included.
    fn correction_mass(&self) -> Result<f64, Error> {
        let electrons = self.charge as f64 * ELECTRON_MASS;
        let added = composition_mass(self.composition)?;
        Ok(match self.ion_mode {
            IonMode::Positive => added - electrons,
            IonMode::Negative => added + electrons,
        })
    }
}

// No [M]+ or [M]-: such a match is indistinguishable from a parent mass stored as precursor m/z.
static KNOWN_ADDUCTS: &[Adduct] = &[
    Adduct::new("[M+H]+", IonMode::Positive, 1, 1, &[(H, 1)]),
    Adduct::new("[M+NH4]+", IonMode::Positive, 1, 1, &[(N, 1), (H, 4)]),
    Adduct::new("[M+Na]+", IonMode::Positive, 1, 1, &[(Na, 1)]),
    Adduct::new("[M+K]+", IonMode::Positive, 1, 1, &[(K, 1)]),
    Adduct::new("[M+H-H2O]+", IonMode::Positive, 1, 1, &[(H, -1), (O, -1)]),
    Adduct::new("[M+ACN+H]+", IonMode::Positive, 1, 1, &[(C, 2), (H, 4), (N, 1)]),
    Adduct::new("[M+ACN+Na]+", IonMode::Positive, 1, 1, &[(C, 2), (H, 3), (N, 1), (Na, 1)]),
    Adduct::new("[M+2H]2+", IonMode::Positive, 2, 1, &[(H, 2)]),
    Adduct::new("[M+H+NH4]2+", IonMode::Positive, 2, 1, &[(H, 5), (N, 1)]),
    Adduct::new("[M+H+Na]2+", IonMode::Positive, 2, 1, &[(H, 1), (Na, 1)]),
    Adduct::new("[M+3H]3+", IonMode::Positive, 3, 1, &[(H, 3)]),
    Adduct::new("[2M+H]+", IonMode::Positive, 1, 2, &[(H, 1)]),
    Adduct::new("[2M+NH4]+", IonMode::Positive, 1, 2, &[(N, 1), (H, 4)]),
    Adduct::new("[2M+Na]+", IonMode::Positive, 1, 2, &[(Na, 1)]),
    Adduct::new("[2M+ACN+H]+", IonMode::Positive, 1, 2, &[(C, 2), (H, 4), (N, 1)]),
    Adduct::new("[M-H]-", IonMode::Negative, 1, 1, &[(H, -1)]),
    Adduct::new("[M+Cl]-", IonMode::Negative, 1, 1, &[(Cl, 1)]),
    Adduct::new("[M-H2O-H]-", IonMode::Negative, 1, 1, &[(H, -3), (O, -1)]),
    Adduct::new("[M+FA-H]-", IonMode::Negative, 1, 1, &[(C, 1), (H, 1), (O, 2)]),
    Adduct::new("[M+Hac-H]-", IonMode::Negative, 1, 1, &[(C, 2), (H, 3), (O, 2)]),
    Adduct::new("[M-2H]2-", IonMode::Negative, 2, 1, &[(H, -2)]),
    Adduct::new("[M-3H]3-", IonMode::Negative, 3, 1, &[(H, -3)]),
    Adduct::new("[2M-H]-", IonMode::Negative, 1, 2, &[(H, -1)]),
    Adduct::new("[2M+Cl]-", IonMode::Negative, 1, 2, &[(Cl, 1)]),
];

/// Sets `adduct` and `parent_mass` from the adduct whose expected precursor m/z lies closest to
/// the measured `precursor_mz`, provided it is within `mass_tolerance`.
///
/// The neutral monoisotopic mass is read from the `monoisotopic_mass` metadata entry, the ion
/// mode from `ionmode`. Spectra lacking one of them, or without a matching adduct, are returned
/// unchanged.
///
/// # Arguments
/// * `spectrum` - The spectrum to repair.
/// * `mass_tolerance` - Maximum m/z deviation between expected and measured precursor m/z.
///
pub fn repair_adduct_based_on_mass(
    spectrum: &Spectrum,
    mass_tolerance: f64,
) -> Result<Spectrum, Error> {
    let mut spectrum = spectrum.clone();

    let neutral_mass = spectrum.get("monoisotopic_mass").and_then(MetadataValue::as_f64);
    let precursor_mz = spectrum.get("precursor_mz").and_then(MetadataValue::as_f64);
    let ion_mode = spectrum.get("ionmode").and_then(IonMode::from_metadata);

    let (neutral_mass, precursor_mz, ion_mode) = match (neutral_mass, precursor_mz, ion_mode) {
        (Some(neutral_mass), Some(precursor_mz), Some(ion_mode)) => {
            (neutral_mass, precursor_mz, ion_mode)
        }
        _ => {
            log::debug!(
                "Adduct not repaired, monoisotopic mass, precursor m/z or ion mode is missing"
            );
            return Ok(spectrum);
        }
    };

    let mut best_match: Option<(&Adduct, f64, f64)> = None;
    for adduct in KNOWN_ADDUCTS.iter().filter(|a| a.ion_mode == ion_mode) {
        let correction_mass = adduct.correction_mass()?;
        let expected_mz = (neutral_mass * adduct.mass_multiplier as f64 + correction_mass)
            / adduct.charge as f64;
        let deviation = (expected_mz - precursor_mz).abs();

        if deviation > mass_tolerance {
            continue;
        }
        if best_match.map_or(true, |(_, _, best)| deviation < best) {
            best_match = Some((adduct, correction_mass, deviation));
        }
    }

    let Some((adduct, correction_mass, _)) = best_match else {
        log::debug!("No adduct matches precursor m/z {precursor_mz} within {mass_tolerance}");
        return Ok(spectrum);
    };

    let parent_mass =
        (precursor_mz * adduct.charge as f64 - correction_mass) / adduct.mass_multiplier as f64;
    log::debug!(
        "Adduct set to {} with parent mass {parent_mass}",
        adduct.name
    );
    spectrum.set("adduct", adduct.name);
    spectrum.set("parent_mass", parent_mass);

    Ok(spectrum)
}
