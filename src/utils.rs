use rustyms::Element;

use crate::error::Error;

/// Electron rest mass in Dalton.
pub const ELECTRON_MASS: f64 = 0.000_548_579_909_065;

/// Monoisotopic mass of an element in Dalton.
///
/// # Arguments
/// * `element` - The element to look up.
///
pub fn element_mass(element: Element) -> Result<f64, Error> {
    element
        .mass(None)
        .map(|mass| mass.value)
        .ok_or_else(|| Error::UnknownElementMass(format!("{element:?}")))
}

/// Mass of a proton (hydrogen atom without its electron) in Dalton.
pub fn proton_mass() -> Result<f64, Error> {
    Ok(element_mass(Element::H)? - ELECTRON_MASS)
}

/// Monoisotopic mass of a composition given as `(element, count)` pairs.
/// Negative counts subtract the element, e.g. for losses.
///
/// # Arguments
/// * `composition` - Elements and how often they occur.
///
pub fn composition_mass(composition: &[(Element, i32)]) -> Result<f64, Error> {
    composition
        .iter()
        .try_fold(0.0, |mass, (element, count)| {
            Ok(mass + element_mass(*element)? * *count as f64)
        })
}
