pub mod compose;
pub mod hit;
pub mod order;
pub mod paint;

pub use compose::{ComposedLayer, compose};
pub use hit::{ItemKind, ItemRef, item_at_tile};
pub use order::{Placeable, RenderScene, ZOrderChange, compose_view, next_z_index, order};
pub use paint::{DisplayList, IsoProjection, PaintCmd, Projection, paint_view};
