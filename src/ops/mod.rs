pub mod alpha;
pub mod color;
pub mod composite;
pub mod entropy;
pub mod gaussian;
pub mod geometry;
pub mod grid_crop;
pub mod simulation;
pub mod slicing_crop;
pub mod smart_crop;
pub mod summed_area_table;
