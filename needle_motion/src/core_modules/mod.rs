// Stages of the detector, leaf to root.
pub mod frame;
pub mod roi;
pub mod grayscale;
pub mod background;
pub mod differencer;
pub mod threshold;
pub mod region_extractor;
pub mod bounding_box;
pub mod detection;
