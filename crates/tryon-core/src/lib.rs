pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod raster;

pub use config::EditorConfig;
pub use error::{TryOnError, TryOnResult};
pub use geometry::{Bounds, Corner, distance_point_to_segment};
pub use id::{AnnotationId, RasterId};
pub use model::*;
pub use raster::RasterHandle;
