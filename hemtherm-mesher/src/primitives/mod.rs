use nalgebra::RealField;

/// The Cartesian axes of a rectilinear mesh
///
/// `X` runs along the device length (source to drain), `Y` along the gate width and
/// `Z` through the layer stack from the bottom of the substrate to the top surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// The six bounding faces of a rectilinear cell, or of the whole mesh
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    XMin,
    XMax,
    YMin,
    YMax,
    /// The bottom of the substrate
    ZMin,
    /// The top surface of the layer stack
    ZMax,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::XMin,
        Face::XMax,
        Face::YMin,
        Face::YMax,
        Face::ZMin,
        Face::ZMax,
    ];

    pub fn index(&self) -> usize {
        match self {
            Face::XMin => 0,
            Face::XMax => 1,
            Face::YMin => 2,
            Face::YMax => 3,
            Face::ZMin => 4,
            Face::ZMax => 5,
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Face::XMin | Face::XMax => Axis::X,
            Face::YMin | Face::YMax => Axis::Y,
            Face::ZMin | Face::ZMax => Axis::Z,
        }
    }

    /// Whether the face sits at the upper end of its axis
    pub fn is_upper(&self) -> bool {
        matches!(self, Face::XMax | Face::YMax | Face::ZMax)
    }

    pub fn opposite(&self) -> Face {
        match self {
            Face::XMin => Face::XMax,
            Face::XMax => Face::XMin,
            Face::YMin => Face::YMax,
            Face::YMax => Face::YMin,
            Face::ZMin => Face::ZMax,
            Face::ZMax => Face::ZMin,
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Face::XMin => write!(f, "x-min"),
            Face::XMax => write!(f, "x-max"),
            Face::YMin => write!(f, "y-min"),
            Face::YMax => write!(f, "y-max"),
            Face::ZMin => write!(f, "z-min (substrate bottom)"),
            Face::ZMax => write!(f, "z-max (top surface)"),
        }
    }
}

/// How cell widths are distributed inside a single region of a 1D segmentation
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Grading<T> {
    /// All cells in the region have the same width
    Uniform,
    /// Cells shrink geometrically towards the start of the region with the given growth ratio
    TowardsStart(T),
    /// Cells shrink geometrically towards the end of the region with the given growth ratio
    TowardsEnd(T),
}

/// A homogeneous region of a 1D segmentation
#[derive(Clone, Debug)]
pub struct Region1d<T> {
    /// Total width of the region
    pub width: T,
    /// Number of cells the region is split into
    pub cells: usize,
    /// The tag attached to every cell in the region, typically the index of a layer
    pub tag: usize,
    pub grading: Grading<T>,
}

impl<T: Copy + RealField> Region1d<T> {
    pub fn uniform(width: T, cells: usize, tag: usize) -> Self {
        Self {
            width,
            cells,
            tag,
            grading: Grading::Uniform,
        }
    }

    pub fn graded(width: T, cells: usize, tag: usize, grading: Grading<T>) -> Self {
        Self {
            width,
            cells,
            tag,
            grading,
        }
    }

    /// The widths of the cells in the region, ordered from the start of the region to the end
    pub fn cell_widths(&self) -> Vec<T> {
        assert!(self.cells > 0, "a region must contain at least one cell");
        let n = T::from_usize(self.cells).expect("Must be able to fit usize in T");
        let ratio = match self.grading {
            Grading::Uniform => T::one(),
            Grading::TowardsStart(ratio) | Grading::TowardsEnd(ratio) => ratio,
        };
        if ratio == T::one() || self.cells == 1 {
            return vec![self.width / n; self.cells];
        }
        // Geometric series: the smallest cell is h0 and each neighbour is `ratio` times wider
        let total_ratio = ratio.powi(self.cells as i32);
        let smallest = self.width * (ratio - T::one()) / (total_ratio - T::one());
        let mut widths = (0..self.cells)
            .map(|m| smallest * ratio.powi(m as i32))
            .collect::<Vec<_>>();
        if let Grading::TowardsEnd(_) = self.grading {
            widths.reverse();
        }
        widths
    }
}
