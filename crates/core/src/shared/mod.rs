pub mod camera_metadata;
pub mod constants;
pub mod frame;
