pub mod contour;
pub mod render;
