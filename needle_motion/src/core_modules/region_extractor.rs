// THEORY:
// The Region Extractor is the engine of the spatial grouping step. It takes the
// dilated binary mask for one frame and answers "which separate things moved,
// and where are they?".
//
// Algorithm steps:
// 1.  **Hole Filling**: Only the outer outline of a region counts. Background
//     pixels that cannot reach the ROI border without crossing foreground are
//     holes; they are painted foreground. A ring becomes a disc, and any speck
//     sitting inside the ring merges into it instead of being reported on its
//     own. Reachability is decided by labelling the inverted mask with the dual
//     connectivity (4 for 8-connected regions, 8 for 4-connected ones).
// 2.  **Labelling**: Maximal connected foreground components are labelled with
//     `imageproc`'s two-pass connected-component routine.
// 3.  **Aggregation**: One raster scan accumulates, per label, the pixel count
//     (the area enclosed by the outer outline) and the extreme coordinates.
//     Regions are emitted in the order their first pixel is met in that scan,
//     so identical masks always produce identical, identically ordered output.
// 4.  **Area Filtering**: Regions whose area is below `min_area` are dropped.
//     This is the main defence against noise that survived the blur and the
//     dilation; such leftovers are tiny compared to anything worth reporting.
// 5.  **Stateless Utility**: Nothing is remembered between frames.

use crate::core_modules::bounding_box::{Area, BoundingBox};
use crate::core_modules::threshold::{BinaryMask, BACKGROUND, FOREGROUND, is_foreground};
use imageproc::region_labelling;
use serde::{Deserialize, Serialize};

/// Which neighbours make two foreground pixels part of the same region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Edge neighbours only.
    Four,
    /// Edge and corner neighbours.
    #[default]
    Eight,
}

impl Connectivity {
    /// The connectivity background pixels need so that they cannot leak through
    /// a foreground outline of this connectivity.
    pub fn dual(self) -> Self {
        match self {
            Connectivity::Four => Connectivity::Eight,
            Connectivity::Eight => Connectivity::Four,
        }
    }

    fn labelling(self) -> region_labelling::Connectivity {
        match self {
            Connectivity::Four => region_labelling::Connectivity::Four,
            Connectivity::Eight => region_labelling::Connectivity::Eight,
        }
    }
}

/// A connected foreground region before area filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Pixels enclosed by the region's outer outline, holes included.
    pub area: Area,
    pub bounding_box: BoundingBox,
}

pub mod region_extractor {
    use super::*;
    use image::Luma;
    use std::collections::{HashMap, HashSet};

    struct RegionAccumulator {
        area: Area,
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
    }

    impl RegionAccumulator {
        fn start(x: u32, y: u32) -> Self {
            Self {
                area: 0,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            }
        }

        fn add(&mut self, x: u32, y: u32) {
            self.area += 1;
            self.min_x = self.min_x.min(x);
            self.min_y = self.min_y.min(y);
            self.max_x = self.max_x.max(x);
            self.max_y = self.max_y.max(y);
        }

        fn finish(self) -> Region {
            Region {
                area: self.area,
                bounding_box: BoundingBox::new(
                    self.min_x,
                    self.min_y,
                    self.max_x - self.min_x + 1,
                    self.max_y - self.min_y + 1,
                ),
            }
        }
    }

    /// Paints every hole of every region foreground.
    pub fn fill_holes(mask: &BinaryMask, connectivity: Connectivity) -> BinaryMask {
        let (width, height) = mask.dimensions();
        // A single pixel is all border and cannot enclose anything.
        if width as u64 * height as u64 <= 1 {
            return mask.clone();
        }

        let inverted = BinaryMask::from_fn(width, height, |x, y| {
            if is_foreground(mask.get_pixel(x, y)) {
                Luma([BACKGROUND])
            } else {
                Luma([FOREGROUND])
            }
        });
        let gaps = region_labelling::connected_components(
            &inverted,
            connectivity.dual().labelling(),
            Luma([BACKGROUND]),
        );

        // Gaps touching the border are the outside world; every other gap is a hole.
        let mut outside: HashSet<u32> = HashSet::new();
        for x in 0..width {
            outside.insert(gaps.get_pixel(x, 0)[0]);
            outside.insert(gaps.get_pixel(x, height - 1)[0]);
        }
        for y in 0..height {
            outside.insert(gaps.get_pixel(0, y)[0]);
            outside.insert(gaps.get_pixel(width - 1, y)[0]);
        }

        BinaryMask::from_fn(width, height, |x, y| {
            let label = gaps.get_pixel(x, y)[0];
            if label == 0 || !outside.contains(&label) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }

    /// Every external region of the mask, in raster discovery order, unfiltered.
    pub fn find_regions(mask: &BinaryMask, connectivity: Connectivity) -> Vec<Region> {
        // `connected_components` cannot label a single-pixel image.
        if mask.dimensions() == (1, 1) {
            return if is_foreground(mask.get_pixel(0, 0)) {
                vec![Region {
                    area: 1,
                    bounding_box: BoundingBox::new(0, 0, 1, 1),
                }]
            } else {
                Vec::new()
            };
        }

        let filled = fill_holes(mask, connectivity);
        let labels = region_labelling::connected_components(&filled, connectivity.labelling(), Luma([BACKGROUND]));

        let mut order: HashMap<u32, usize> = HashMap::new();
        let mut accumulators: Vec<RegionAccumulator> = Vec::new();
        for (x, y, label) in labels.enumerate_pixels() {
            let label = label[0];
            if label == 0 {
                continue;
            }
            let index = *order.entry(label).or_insert_with(|| {
                accumulators.push(RegionAccumulator::start(x, y));
                accumulators.len() - 1
            });
            accumulators[index].add(x, y);
        }

        accumulators.into_iter().map(RegionAccumulator::finish).collect()
    }

    /// Bounding boxes of the regions whose area is at least `min_area`.
    pub fn extract_regions(mask: &BinaryMask, min_area: Area, connectivity: Connectivity) -> Vec<BoundingBox> {
        find_regions(mask, connectivity)
            .into_iter()
            .filter(|region| region.area >= min_area)
            .map(|region| region.bounding_box)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::region_extractor::*;
    use super::*;
    use image::Luma;

    fn mask_with(width: u32, height: u32, pixels: &[(u32, u32)]) -> BinaryMask {
        let mut mask = BinaryMask::new(width, height);
        for &(x, y) in pixels {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
        mask
    }

    fn filled_rect(mask: &mut BinaryMask, x: u32, y: u32, width: u32, height: u32) {
        for yy in y..y + height {
            for xx in x..x + width {
                mask.put_pixel(xx, yy, Luma([FOREGROUND]));
            }
        }
    }

    #[test]
    fn empty_mask_has_no_regions() {
        assert!(find_regions(&BinaryMask::new(16, 16), Connectivity::Eight).is_empty());
    }

    #[test]
    fn solid_square_yields_its_exact_box() {
        let mut mask = BinaryMask::new(20, 20);
        filled_rect(&mut mask, 4, 6, 5, 7);
        let regions = find_regions(&mask, Connectivity::Eight);
        assert_eq!(
            regions,
            vec![Region {
                area: 35,
                bounding_box: BoundingBox::new(4, 6, 5, 7)
            }]
        );
    }

    #[test]
    fn diagonal_neighbours_depend_on_connectivity() {
        let mask = mask_with(4, 4, &[(1, 1), (2, 2)]);
        assert_eq!(find_regions(&mask, Connectivity::Eight).len(), 1);
        assert_eq!(find_regions(&mask, Connectivity::Four).len(), 2);
    }

    #[test]
    fn nested_speck_is_absorbed_by_enclosing_ring() {
        let mut mask = BinaryMask::new(20, 20);
        filled_rect(&mut mask, 2, 2, 11, 11);
        // Hollow out the ring, then drop a speck in the middle of the hole.
        for y in 4..11 {
            for x in 4..11 {
                mask.put_pixel(x, y, Luma([BACKGROUND]));
            }
        }
        mask.put_pixel(7, 7, Luma([FOREGROUND]));

        let regions = find_regions(&mask, Connectivity::Eight);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(2, 2, 11, 11));
        assert_eq!(regions[0].area, 121);
    }

    #[test]
    fn notch_open_to_the_border_is_not_a_hole() {
        let mut mask = BinaryMask::new(10, 10);
        filled_rect(&mut mask, 0, 0, 10, 3);
        filled_rect(&mut mask, 0, 3, 3, 7);
        // The L-shape leaves the lower right open to the ROI border.
        let regions = find_regions(&mask, Connectivity::Eight);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 30 + 21);
    }

    #[test]
    fn ring_against_the_border_still_encloses_its_hole() {
        let mut mask = BinaryMask::new(8, 8);
        filled_rect(&mut mask, 0, 0, 5, 5);
        for y in 1..4 {
            for x in 1..4 {
                mask.put_pixel(x, y, Luma([BACKGROUND]));
            }
        }
        let filled = fill_holes(&mask, Connectivity::Eight);
        assert!((1..4).all(|x| (1..4).all(|y| filled.get_pixel(x, y)[0] == FOREGROUND)));
        assert_eq!(filled.get_pixel(6, 6)[0], BACKGROUND);
    }

    #[test]
    fn single_pixel_mask_is_labelled_without_panicking() {
        let lit = mask_with(1, 1, &[(0, 0)]);
        assert_eq!(fill_holes(&lit, Connectivity::Eight), lit);
        assert_eq!(
            find_regions(&lit, Connectivity::Eight),
            vec![Region {
                area: 1,
                bounding_box: BoundingBox::new(0, 0, 1, 1)
            }]
        );
        assert_eq!(extract_regions(&lit, 2, Connectivity::Four), Vec::new());

        let dark = BinaryMask::new(1, 1);
        assert_eq!(fill_holes(&dark, Connectivity::Four), dark);
        assert!(find_regions(&dark, Connectivity::Eight).is_empty());
    }

    #[test]
    fn thin_masks_are_labelled() {
        let strip = mask_with(1, 5, &[(0, 1), (0, 2), (0, 4)]);
        let regions = find_regions(&strip, Connectivity::Eight);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(0, 1, 1, 2));
    }

    #[test]
    fn regions_come_out_in_raster_order() {
        let mut mask = BinaryMask::new(30, 30);
        filled_rect(&mut mask, 2, 20, 4, 4);
        filled_rect(&mut mask, 22, 3, 4, 4);
        filled_rect(&mut mask, 12, 12, 4, 4);
        let boxes = extract_regions(&mask, 1, Connectivity::Eight);
        assert_eq!(
            boxes,
            vec![
                BoundingBox::new(22, 3, 4, 4),
                BoundingBox::new(12, 12, 4, 4),
                BoundingBox::new(2, 20, 4, 4),
            ]
        );
    }

    #[test]
    fn regions_below_min_area_are_discarded() {
        let mut mask = BinaryMask::new(40, 40);
        filled_rect(&mut mask, 1, 1, 5, 5);
        filled_rect(&mut mask, 20, 20, 10, 10);

        let boxes = extract_regions(&mask, 26, Connectivity::Eight);
        assert_eq!(boxes, vec![BoundingBox::new(20, 20, 10, 10)]);

        let boxes = extract_regions(&mask, 25, Connectivity::Eight);
        assert_eq!(boxes.len(), 2);
    }

    #[test]
    fn every_returned_box_covers_at_least_min_area() {
        let mask = mask_with(
            32,
            32,
            &[(1, 1), (2, 1), (10, 10), (10, 11), (11, 10), (11, 11), (12, 12), (25, 3)],
        );
        for min_area in 0..8 {
            for bbox in extract_regions(&mask, min_area, Connectivity::Eight) {
                assert!(bbox.area() >= min_area);
                assert!(bbox.width > 0 && bbox.height > 0);
                assert!(bbox.right() <= 32 && bbox.bottom() <= 32);
            }
        }
    }
}
