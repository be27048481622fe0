use super::LayerInfoDesk;
use crate::constants::{MAXIMUM_TEMPERATURE, MINIMUM_TEMPERATURE};
use nalgebra::RealField;

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[non_exhaustive]
/// Enum with all implemented material types
///
/// As materials may be added in future this is labelled as `non_exhaustive`
pub enum Material {
    GaN,
    AlN,
    AlGaN,
    InAlN,
    InGaN,
    SiC,
    Si,
    Sapphire,
    Diamond,
    SiN,
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Material::GaN => write!(f, "GaN"),
            Material::AlN => write!(f, "AlN"),
            Material::AlGaN => write!(f, "AlGaN"),
            Material::InAlN => write!(f, "InAlN"),
            Material::InGaN => write!(f, "InGaN"),
            Material::SiC => write!(f, "SiC"),
            Material::Si => write!(f, "Si"),
            Material::Sapphire => write!(f, "Sapphire"),
            Material::Diamond => write!(f, "Diamond"),
            Material::SiN => write!(f, "SiN"),
        }
    }
}

impl Material {
    /// Builds an instance of `LayerInfoDesk` for the given `Material` variant
    pub(crate) fn get_info<T: Copy + RealField>(&self) -> LayerInfoDesk<T> {
        match self {
            Material::GaN => LayerInfoDesk::gan(),
            Material::AlN => LayerInfoDesk::aln(),
            Material::AlGaN => LayerInfoDesk::algan(),
            Material::InAlN => LayerInfoDesk::inaln(),
            Material::InGaN => LayerInfoDesk::ingan(),
            Material::SiC => LayerInfoDesk::sic(),
            Material::Si => LayerInfoDesk::si(),
            Material::Sapphire => LayerInfoDesk::sapphire(),
            Material::Diamond => LayerInfoDesk::diamond(),
            Material::SiN => LayerInfoDesk::sin(),
        }
        .with_material(*self)
    }
}

// Conductivities in W / m K, densities in kg / m^3 and specific heats in J / kg K, all at 300K.
// The conductivity exponent and specific heat slope describe the temperature dependence.
impl<T: Copy + RealField> LayerInfoDesk<T> {
    fn tabulated(
        conductivity: T,
        conductivity_exponent: T,
        density: T,
        specific_heat: T,
        specific_heat_slope: T,
    ) -> Self {
        Self {
            material: Material::GaN,
            conductivity,
            conductivity_exponent,
            density,
            specific_heat,
            specific_heat_slope,
            temperature_range: (
                T::from_f64(MINIMUM_TEMPERATURE).unwrap(),
                T::from_f64(MAXIMUM_TEMPERATURE).unwrap(),
            ),
        }
    }

    fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn gan() -> Self {
        Self::tabulated(230.0, 1.4, 6150.0, 490.0, 6.0e-4)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn aln() -> Self {
        Self::tabulated(285.0, 1.6, 3260.0, 748.0, 6.0e-4)
    }

    // Alloy scattering dominates in the ternaries, so their conductivity barely varies with temperature
    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn algan() -> Self {
        Self::tabulated(30.0, 0.3, 5000.0, 600.0, 5.0e-4)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn inaln() -> Self {
        Self::tabulated(10.0, 0.2, 5500.0, 500.0, 4.0e-4)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn ingan() -> Self {
        Self::tabulated(20.0, 0.3, 6800.0, 420.0, 4.0e-4)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn sic() -> Self {
        Self::tabulated(420.0, 1.5, 3210.0, 690.0, 1.0e-3)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn si() -> Self {
        Self::tabulated(148.0, 1.3, 2329.0, 705.0, 5.0e-4)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn sapphire() -> Self {
        Self::tabulated(35.0, 1.0, 3980.0, 760.0, 7.0e-4)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn diamond() -> Self {
        Self::tabulated(2000.0, 1.2, 3515.0, 520.0, 1.5e-3)
    }

    #[numeric_literals::replace_float_literals(T::from_f64(literal).unwrap())]
    fn sin() -> Self {
        Self::tabulated(20.0, 0.0, 3100.0, 700.0, 4.0e-4)
    }
}
