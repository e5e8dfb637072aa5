pub mod geometry;
pub mod hit;
pub mod paint;
pub mod scene;
pub mod theme;
pub mod view;

pub use hit::{HitTarget, hit_test, hit_test_rect};
pub use scene::{CanvasScene, ConnectionPreview, Overlay, build_scene};
pub use theme::CanvasTheme;
pub use view::{CanvasView, CollapsedMap};
