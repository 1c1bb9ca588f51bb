//! Chilean administrative regions, north to south.

/// The 16 regions accepted on registration, user and checkout forms.
pub const REGIONS: [&str; 16] = [
    "Región de Arica y Parinacota",
    "Región de Tarapacá",
    "Región de Antofagasta",
    "Región de Atacama",
    "Región de Coquimbo",
    "Región de Valparaíso",
    "Región Metropolitana de Santiago",
    "Región del Libertador General Bernardo O'Higgins",
    "Región del Maule",
    "Región de Ñuble",
    "Región del Biobío",
    "Región de La Araucanía",
    "Región de Los Ríos",
    "Región de Los Lagos",
    "Región de Aysén del General Carlos Ibáñez del Campo",
    "Región de Magallanes y de la Antártica Chilena",
];

/// `true` if `name` is one of [`REGIONS`] (exact match after trimming).
#[must_use]
pub fn is_region(name: &str) -> bool {
    let name = name.trim();
    REGIONS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_are_unique() {
        let mut sorted = REGIONS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), REGIONS.len());
    }

    #[test]
    fn test_is_region() {
        assert!(is_region("Región del Biobío"));
        assert!(is_region("  Región de Ñuble "));
        assert!(!is_region("Biobío"));
        assert!(!is_region(""));
    }
}
