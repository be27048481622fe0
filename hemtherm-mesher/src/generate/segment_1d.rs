use crate::{Region1d, Segments1d};
use nalgebra::RealField;

pub fn create_unit_segments_1d<T>(cells: usize) -> Segments1d<T>
where
    T: Copy + RealField,
{
    create_segments_1d(T::one(), cells, T::zero())
}

/// A uniform segmentation of `[left, left + length]` into `cells` cells
pub fn create_segments_1d<T>(length: T, cells: usize, left: T) -> Segments1d<T>
where
    T: Copy + RealField,
{
    create_segments_1d_from_regions(&[Region1d::uniform(length, cells, 0)], left)
}

/// Builds a segmentation from consecutive regions, starting at `left`
///
/// Neighbouring regions share their boundary vertex, so the output contains one vertex per cell
/// boundary with no repeats.
pub fn create_segments_1d_from_regions<T>(regions: &[Region1d<T>], left: T) -> Segments1d<T>
where
    T: Copy + RealField,
{
    assert!(!regions.is_empty(), "at least one region is required");

    let num_cells = regions.iter().map(|region| region.cells).sum::<usize>();
    let mut vertices = Vec::with_capacity(num_cells + 1);
    let mut tags = Vec::with_capacity(num_cells);

    vertices.push(left);
    let mut region_start = left;
    for region in regions {
        let widths = region.cell_widths();
        let last = widths.len() - 1;
        let mut position = region_start;
        for (cell, width) in widths.into_iter().enumerate() {
            // Pin the last vertex of a region to its nominal end to stop round-off accumulating
            position = if cell == last {
                region_start + region.width
            } else {
                position + width
            };
            vertices.push(position);
            tags.push(region.tag);
        }
        region_start += region.width;
    }

    Segments1d::from_vertices_and_tags(vertices, tags)
}
