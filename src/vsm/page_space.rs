//! Page-space math for clipmap culling
//!
//! Pure functions mapping cascade NDC coordinates onto the virtual shadow
//! map's page grid, plus the hierarchy level selection that bounds the
//! residency test to four samples per draw regardless of object size.

use glam::{IVec2, Vec2};

use crate::constants::vsm::PAGE_BORDER;

/// Dimensions of the virtual shadow map's page grid, uniform across
/// cascades
#[derive(Debug, Clone, Copy)]
pub struct PageGridInfo {
    /// Pages per axis of the residency table
    pub num_pages_xy: u32,
    /// Virtual texels per axis backing the page grid
    pub num_pixels_xy: u32,
    /// Page groups per axis
    pub num_page_groups_x: u32,
    pub num_page_groups_y: u32,
}

impl PageGridInfo {
    /// Largest valid page index per axis
    pub fn max_page_index(&self) -> i32 {
        self.num_pages_xy as i32 - 1
    }

    /// Virtual texels covered by one page, per axis
    pub fn texels_per_page(&self) -> IVec2 {
        IVec2::splat((self.num_pixels_xy / self.num_pages_xy) as i32)
    }

    /// Pages covered by one page group, per axis
    pub fn pages_per_page_group(&self) -> IVec2 {
        IVec2::new(
            (self.num_pages_xy / self.num_page_groups_x) as i32,
            (self.num_pages_xy / self.num_page_groups_y) as i32,
        )
    }
}

/// Map an NDC coordinate (`[-1, 1]`) onto the page grid (`[0, max_index]`)
pub fn ndc_to_page(ndc: Vec2, max_index: f32) -> Vec2 {
    (ndc * 0.5 + 0.5) * max_index
}

/// Normalized texture coordinate of a page-space corner
pub fn page_to_texcoord(page: IVec2, max_index: f32) -> Vec2 {
    ((2.0 * page.as_vec2()) / max_index - 1.0) * 0.5 + 0.5
}

/// 2D rectangle overlap, inclusive on both ends. Degenerate (zero-area)
/// rectangles participate normally.
pub fn rects_overlap(min_a: Vec2, max_a: Vec2, min_b: Vec2, max_b: Vec2) -> bool {
    min_a.x <= max_b.x && max_a.x >= min_b.x && min_a.y <= max_b.y && max_a.y >= min_b.y
}

/// Expand a page-space rectangle by the fixed page border, then normalize
/// to `[0, 1]` and clamp. The border absorbs page-boundary sampling error
/// at the pyramid level chosen afterwards.
pub fn expand_and_normalize(min: Vec2, max: Vec2, max_index: f32) -> (Vec2, Vec2) {
    let expanded_min = ((min - PAGE_BORDER) / max_index).clamp(Vec2::ZERO, Vec2::ONE);
    let expanded_max = ((max + PAGE_BORDER) / max_index).clamp(Vec2::ZERO, Vec2::ONE);
    (expanded_min, expanded_max)
}

/// Pyramid level at which a normalized rectangle fits within one texel.
///
/// `ceil(log2(max(1, max(width, height))))` with extents measured in page
/// units; never negative, and the degenerate sub-page case resolves to
/// level 0.
pub fn pyramid_level(norm_min: Vec2, norm_max: Vec2, max_index: f32) -> u32 {
    let width = (norm_max.x - norm_min.x) * max_index;
    let height = (norm_max.y - norm_min.y) * max_index;
    let extent = width.max(height).max(1.0);
    extent.log2().ceil() as u32
}

/// Texels per axis of the residency table at a pyramid level
pub fn level_resolution(max_index: f32, level: u32) -> f32 {
    max_index / (1u32 << level) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_INDEX: f32 = 127.0;

    #[test]
    fn ndc_maps_onto_page_grid() {
        assert_eq!(ndc_to_page(Vec2::splat(-1.0), MAX_INDEX), Vec2::ZERO);
        assert_eq!(ndc_to_page(Vec2::splat(1.0), MAX_INDEX), Vec2::splat(MAX_INDEX));
        assert_eq!(ndc_to_page(Vec2::ZERO, MAX_INDEX), Vec2::splat(MAX_INDEX * 0.5));
    }

    #[test]
    fn overlap_is_inclusive() {
        let min_a = Vec2::ZERO;
        let max_a = Vec2::splat(10.0);
        assert!(rects_overlap(min_a, max_a, Vec2::splat(10.0), Vec2::splat(20.0)));
        assert!(!rects_overlap(min_a, max_a, Vec2::splat(10.1), Vec2::splat(20.0)));
    }

    #[test]
    fn degenerate_rectangle_overlaps_nothing_outside() {
        // A zero-area rectangle still participates in the test.
        let point = Vec2::splat(5.0);
        assert!(rects_overlap(point, point, Vec2::ZERO, Vec2::splat(10.0)));
        assert!(!rects_overlap(point, point, Vec2::splat(6.0), Vec2::splat(10.0)));
    }

    #[test]
    fn level_is_never_negative_and_fits_one_texel() {
        // Sweep box sizes; at the chosen level the extent in level texels
        // must be at most one.
        for pages in [0.25_f32, 1.0, 1.5, 2.0, 3.0, 8.0, 100.0, 127.0] {
            let norm_extent = pages / MAX_INDEX;
            let level = pyramid_level(Vec2::ZERO, Vec2::splat(norm_extent), MAX_INDEX);
            let texel_extent = pages / (1u32 << level) as f32;
            assert!(
                texel_extent <= 1.0 + 1e-4,
                "extent {} pages at level {} spans {} texels",
                pages,
                level,
                texel_extent
            );
        }
    }

    #[test]
    fn sub_page_boxes_resolve_to_level_zero() {
        let level = pyramid_level(Vec2::ZERO, Vec2::splat(0.5 / MAX_INDEX), MAX_INDEX);
        assert_eq!(level, 0);
    }

    #[test]
    fn border_expansion_clamps_to_unit_square() {
        let (min, max) = expand_and_normalize(Vec2::splat(-5.0), Vec2::splat(200.0), MAX_INDEX);
        assert_eq!(min, Vec2::ZERO);
        assert_eq!(max, Vec2::ONE);
    }

    #[test]
    fn texcoords_span_unit_range() {
        assert_eq!(page_to_texcoord(IVec2::ZERO, MAX_INDEX), Vec2::ZERO);
        let far = page_to_texcoord(IVec2::splat(127), MAX_INDEX);
        assert!((far - Vec2::ONE).abs().max_element() < 1e-6);
    }
}
