pub mod hit;
pub mod paint;
pub mod scene;
pub mod surface;

pub use hit::{ArrowPart, Hit, ImagePart, hit_arrow, hit_image, hit_test, hit_text};
pub use paint::{Frame, Preview, paint_frame};
pub use scene::VelloSurface;
pub use surface::Surface;
