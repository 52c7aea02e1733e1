pub mod editor;
pub mod position;
pub mod storage;
pub mod url_cache;

pub use editor::{ContainerRect, DragMode, PhotoEditor, Point};
pub use position::{BackgroundStyle, CropRect, PhotoPosition};
pub use storage::{PhotoStore, is_external};
pub use url_cache::SignedUrlCache;
