pub mod camera_worker;
pub mod model_cache;
