use crate::error::{Error, Result};
use std::collections::HashMap;

/// Highest atomic number the registry covers.
pub const MAX_ATOMIC_NUMBER: u32 = 118;

/// Immutable per-species data backing particle construction and rendering.
///
/// `mass` is a relative mass in the same unit for atoms and compounds;
/// `radius` is the render/collision radius in world units (pixels).
#[derive(Debug, Clone)]
pub struct SpeciesData {
    /// Display symbol, e.g. "H", "O₂", "NH₃".
    pub symbol: String,
    /// Common name for compounds ("Water", "Ammonia"); `None` for atoms.
    pub name: Option<&'static str>,
    /// Relative mass (> 0).
    pub mass: f64,
    /// Collision and render radius (> 0).
    pub radius: f64,
    /// Render color as RGB.
    pub color: [u8; 3],
}

// (atomic number, symbol, mass, color, radius) for the named light elements.
const ELEMENTS: &[(u32, &str, f64, [u8; 3], f64)] = &[
    (1, "H", 1.0, [255, 0, 0], 6.0),
    (2, "He", 4.0, [200, 200, 255], 6.0),
    (3, "Li", 7.0, [200, 200, 200], 6.0),
    (4, "Be", 9.0, [0, 255, 0], 6.0),
    (5, "B", 11.0, [255, 200, 0], 6.0),
    (6, "C", 12.0, [80, 80, 80], 7.0),
    (7, "N", 14.0, [100, 100, 255], 7.0),
    (8, "O", 16.0, [255, 100, 100], 7.0),
    (9, "F", 19.0, [0, 255, 255], 6.0),
    (10, "Ne", 20.0, [200, 200, 200], 6.0),
    (11, "Na", 23.0, [170, 170, 255], 6.0),
    (12, "Mg", 24.0, [170, 255, 170], 6.0),
];

// (symbol, common name, mass, color, radius) for every reaction product and
// a few extra compounds the host may display.
const COMPOUNDS: &[(&str, &str, f64, [u8; 3], f64)] = &[
    ("H₂", "Dihydrogen", 2.0, [255, 50, 50], 7.0),
    ("O₂", "Dioxygen", 32.0, [255, 150, 150], 8.0),
    ("N₂", "Dinitrogen", 28.0, [150, 150, 255], 8.0),
    ("H₂O", "Water", 18.0, [0, 0, 255], 9.0),
    ("N₂O", "Nitrous Oxide", 44.0, [100, 200, 255], 10.0),
    ("NO", "Nitric Oxide", 30.0, [200, 200, 100], 8.0),
    ("NH₃", "Ammonia", 17.0, [100, 255, 100], 8.0),
    ("CO", "Carbon Monoxide", 28.0, [200, 200, 200], 7.0),
    ("CO₂", "Carbon Dioxide", 44.0, [80, 200, 80], 8.0),
    ("NO₂", "Nitrogen Dioxide", 46.0, [200, 180, 120], 8.0),
    ("CH₄", "Methane", 16.0, [200, 255, 200], 7.0),
    ("He₂", "Helium Dimer", 8.0, [210, 210, 255], 6.0),
    ("HeH", "Helium Hydride", 5.0, [230, 230, 255], 6.0),
    ("Li₂", "Lithium Dimer", 14.0, [220, 220, 220], 6.0),
    ("LiH", "Lithium Hydride", 8.0, [240, 240, 240], 6.0),
    ("Be₂", "Beryllium Dimer", 18.0, [180, 255, 180], 6.0),
    ("BeO", "Beryllium Oxide", 25.0, [100, 255, 100], 7.0),
    ("B₂", "Boron Dimer", 22.0, [255, 220, 100], 6.0),
    ("F₂", "Fluorine Gas", 38.0, [0, 255, 255], 7.0),
    ("BF", "Boron Monofluoride", 30.0, [255, 160, 50], 7.0),
    ("NeF", "Neon Fluoride", 39.0, [220, 220, 255], 7.0),
];

// Placeholder data for elements beyond the named set.
const PLACEHOLDER_MASS: f64 = 50.0;
const PLACEHOLDER_COLOR: [u8; 3] = [150, 150, 150];
const PLACEHOLDER_RADIUS: f64 = 8.0;

/// Process-wide immutable species registry: all 118 elements (named data for
/// the light ones, placeholders for the rest) plus the compound table.
///
/// Built once before the simulation starts and never mutated afterwards.
/// Lookup by symbol rejects unknown symbols with [`Error::UnknownSpecies`];
/// placeholders exist only for the pre-registered `El13`..`El118` entries.
#[derive(Debug)]
pub struct Registry {
    by_symbol: HashMap<String, SpeciesData>,
    // Symbol per atomic number, index z - 1.
    atom_symbols: Vec<String>,
}

impl Registry {
    /// Build the standard registry: 118 elements and all known compounds.
    pub fn standard() -> Self {
        let mut by_symbol = HashMap::new();
        let mut atom_symbols = Vec::with_capacity(MAX_ATOMIC_NUMBER as usize);

        for z in 1..=MAX_ATOMIC_NUMBER {
            let data = match ELEMENTS.iter().copied().find(|(num, ..)| *num == z) {
                Some((_, symbol, mass, color, radius)) => SpeciesData {
                    symbol: symbol.to_string(),
                    name: None,
                    mass,
                    radius,
                    color,
                },
                None => SpeciesData {
                    symbol: format!("El{z}"),
                    name: None,
                    mass: PLACEHOLDER_MASS,
                    radius: PLACEHOLDER_RADIUS,
                    color: PLACEHOLDER_COLOR,
                },
            };
            atom_symbols.push(data.symbol.clone());
            by_symbol.insert(data.symbol.clone(), data);
        }

        for &(symbol, name, mass, color, radius) in COMPOUNDS {
            by_symbol.insert(
                symbol.to_string(),
                SpeciesData {
                    symbol: symbol.to_string(),
                    name: Some(name),
                    mass,
                    radius,
                    color,
                },
            );
        }

        Self {
            by_symbol,
            atom_symbols,
        }
    }

    /// Look up a species by symbol.
    ///
    /// Errors: [`Error::UnknownSpecies`] if the symbol has no entry.
    pub fn get(&self, symbol: &str) -> Result<&SpeciesData> {
        self.by_symbol
            .get(symbol)
            .ok_or_else(|| Error::UnknownSpecies(symbol.to_string()))
    }

    /// Look up an element by atomic number (1..=118).
    ///
    /// Errors: [`Error::InvalidParam`] if `z` is out of range.
    pub fn atom(&self, z: u32) -> Result<&SpeciesData> {
        if z == 0 || z > MAX_ATOMIC_NUMBER {
            return Err(Error::InvalidParam(format!(
                "atomic number must be in 1..={MAX_ATOMIC_NUMBER}, got {z}"
            )));
        }
        self.get(&self.atom_symbols[(z - 1) as usize])
    }

    /// Common name of a species, if it has one.
    pub fn common_name(&self, symbol: &str) -> Option<&'static str> {
        self.by_symbol.get(symbol).and_then(|d| d.name)
    }

    /// Iterate over all registered species.
    pub fn species(&self) -> impl Iterator<Item = &SpeciesData> {
        self.by_symbol.values()
    }

    /// Largest collision radius of any registered species.
    pub fn max_radius(&self) -> f64 {
        self.species().map(|d| d.radius).fold(0.0, f64::max)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
