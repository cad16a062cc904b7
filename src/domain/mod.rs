mod cell_rect;
mod section;
mod world;

pub use cell_rect::{CellPos, CellRect};
pub use section::expand_to_sections;
pub use world::{Entity, EntityId, Terrain, World, WorldBounds, WorldProvider, DEFAULT_SECTION_SIZE};
