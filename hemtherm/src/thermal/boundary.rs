use crate::error::ThermalError;
use crate::device::Boundaries;
use hemtherm_mesher::Face;
use nalgebra::RealField;
use serde::Deserialize;

/// The thermal condition applied on one face of the simulation domain
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoundaryCondition<T> {
    /// Fixed temperature in K
    Isothermal { temperature: T },
    /// Heat transfer coefficient `h` in W / m^2 K into a medium at `ambient` K
    Convective { h: T, ambient: T },
    /// Zero heat flux
    Adiabatic,
}

impl<T> Default for BoundaryCondition<T> {
    fn default() -> Self {
        Self::Adiabatic
    }
}

impl<T: Copy + RealField> BoundaryCondition<T> {
    /// Whether the condition can remove heat from the device
    pub fn is_sink(&self) -> bool {
        match self {
            BoundaryCondition::Isothermal { .. } => true,
            BoundaryCondition::Convective { h, .. } => *h > T::zero(),
            BoundaryCondition::Adiabatic => false,
        }
    }

    /// The temperature of the medium heat is exchanged with
    pub fn external_temperature(&self) -> Option<T> {
        match self {
            BoundaryCondition::Isothermal { temperature } => Some(*temperature),
            BoundaryCondition::Convective { ambient, .. } => Some(*ambient),
            BoundaryCondition::Adiabatic => None,
        }
    }
}

/// One boundary condition for each face of the domain
#[derive(Clone, Debug)]
pub struct BoundaryConditions<T> {
    faces: [BoundaryCondition<T>; 6],
}

impl<T: Copy + RealField> BoundaryConditions<T> {
    /// Applies `condition` on every face
    pub fn uniform(condition: BoundaryCondition<T>) -> Self {
        Self {
            faces: [condition; 6],
        }
    }

    /// Adiabatic faces everywhere apart from `face`
    pub fn single_sink(face: Face, condition: BoundaryCondition<T>) -> Self {
        Self::uniform(BoundaryCondition::Adiabatic).with_face(face, condition)
    }

    pub fn with_face(mut self, face: Face, condition: BoundaryCondition<T>) -> Self {
        self.faces[face.index()] = condition;
        self
    }

    pub fn from_device(boundaries: &Boundaries<T>) -> Self {
        Self::uniform(boundaries.sides)
            .with_face(Face::ZMin, boundaries.bottom)
            .with_face(Face::ZMax, boundaries.top)
    }

    pub fn condition(&self, face: Face) -> &BoundaryCondition<T> {
        &self.faces[face.index()]
    }

    pub fn has_sink(&self) -> bool {
        self.faces.iter().any(|condition| condition.is_sink())
    }

    /// The temperature the solution is referenced to
    ///
    /// This is the external temperature of the first sink found searching from the bottom of the
    /// substrate, then the top surface, then the sides.
    pub fn reference_temperature(&self) -> Result<T, ThermalError<T>> {
        [
            Face::ZMin,
            Face::ZMax,
            Face::XMin,
            Face::XMax,
            Face::YMin,
            Face::YMax,
        ]
        .into_iter()
        .map(|face| self.condition(face))
        .find(|condition| condition.is_sink())
        .and_then(|condition| condition.external_temperature())
        .ok_or(ThermalError::IllPosedBoundary)
    }

    /// Checks the set describes a well-posed problem
    pub fn validate(&self) -> Result<(), ThermalError<T>> {
        for face in Face::ALL {
            match self.condition(face) {
                BoundaryCondition::Isothermal { temperature } if *temperature <= T::zero() => {
                    return Err(ThermalError::configuration(
                        format!("boundaries.{}", face),
                        format!("temperature must be positive, found {} K", temperature),
                    ))
                }
                BoundaryCondition::Convective { h, ambient }
                    if *h < T::zero() || *ambient <= T::zero() =>
                {
                    return Err(ThermalError::configuration(
                        format!("boundaries.{}", face),
                        "the heat transfer coefficient cannot be negative and the ambient temperature must be positive",
                    ))
                }
                _ => {}
            }
        }
        if !self.has_sink() {
            return Err(ThermalError::IllPosedBoundary);
        }
        Ok(())
    }
}
