use rand::Rng;
use rayon::prelude::*;

use super::{CellPos, CellRect};

/// Default render section edge, in cells
pub const DEFAULT_SECTION_SIZE: i32 = 17;

/// Size of the map in cells. Valid cells are `0..width` x `0..height`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
}

impl WorldBounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The whole map as a rect
    pub const fn rect(&self) -> CellRect {
        CellRect::new(0, 0, self.width, self.height)
    }

    pub fn clip(&self, rect: CellRect) -> CellRect {
        rect.clip_to(self.width, self.height)
    }

    /// Continuous center of the map
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub const fn contains(&self, cell: CellPos) -> bool {
        self.rect().contains(cell)
    }
}

/// Weak handle to a world entity. Holding one never keeps the entity alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityId(pub u32);

/// What the camera core needs to know about the world.
pub trait WorldProvider {
    /// `None` while no map is loaded
    fn bounds(&self) -> Option<WorldBounds>;

    /// Render section edge used to align view rects
    fn section_size(&self) -> i32;

    /// Live position `(x, z)` of an entity, `None` once it is gone
    fn locate(&self, entity: EntityId) -> Option<(f32, f32)>;
}

/// An absent world: no bounds and no entities.
impl<W: WorldProvider> WorldProvider for Option<W> {
    fn bounds(&self) -> Option<WorldBounds> {
        self.as_ref().and_then(WorldProvider::bounds)
    }

    fn section_size(&self) -> i32 {
        self.as_ref().map_or(DEFAULT_SECTION_SIZE, WorldProvider::section_size)
    }

    fn locate(&self, entity: EntityId) -> Option<(f32, f32)> {
        self.as_ref().and_then(|w| w.locate(entity))
    }
}

/// Ground type of a single cell
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Terrain {
    Soil,
    Grass,
    Rock,
    Water,
}

impl Terrain {
    fn random(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..100) {
            0..45 => Terrain::Grass,
            45..80 => Terrain::Soil,
            80..93 => Terrain::Rock,
            _ => Terrain::Water,
        }
    }
}

/// A wandering creature on the map
#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub x: f32,
    pub z: f32,
    /// Unit heading on the XZ plane
    pub heading: (f32, f32),
    /// Cells per second
    pub speed: f32,
}

impl Entity {
    pub fn cell(&self) -> CellPos {
        CellPos::from_world(self.x, self.z)
    }

    /// Advance along the heading, turning a little at random and bouncing off map edges
    fn step(&mut self, dt: f32, width: f32, height: f32, rng: &mut impl Rng) {
        let turn: f32 = rng.random_range(-0.6..0.6) * dt;
        let (s, c) = turn.sin_cos();
        let (hx, hz) = self.heading;
        self.heading = (hx * c - hz * s, hx * s + hz * c);

        self.x += self.heading.0 * self.speed * dt;
        self.z += self.heading.1 * self.speed * dt;

        if self.x < 0.0 || self.x >= width {
            self.heading.0 = -self.heading.0;
            self.x = self.x.clamp(0.0, width - 0.01);
        }
        if self.z < 0.0 || self.z >= height {
            self.heading.1 = -self.heading.1;
            self.z = self.z.clamp(0.0, height - 0.01);
        }
    }
}

/// The shared grid map: terrain plus the entities living on it.
pub struct World {
    width: usize,
    height: usize,
    section_size: i32,
    terrain: Vec<Terrain>,
    entities: Vec<Entity>,
    next_entity_id: u32,
}

impl World {
    /// Create a flat soil map with no entities
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            section_size: DEFAULT_SECTION_SIZE,
            terrain: vec![Terrain::Soil; width * height],
            entities: Vec::new(),
            next_entity_id: 1,
        }
    }

    /// Random terrain with `entity_count` wanderers
    pub fn generate(width: usize, height: usize, entity_count: usize) -> Self {
        let mut rng = rand::rng();
        let mut world = Self::new(width, height);
        world.terrain.iter_mut().for_each(|t| *t = Terrain::random(&mut rng));
        world.populate(entity_count, &mut rng);
        world
    }

    /// Builder for a custom section size
    pub fn with_section_size(mut self, section_size: i32) -> Self {
        self.section_size = section_size.max(1);
        self
    }

    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    const fn get_index(&self, x: usize, z: usize) -> usize {
        z * self.width + x
    }

    /// Terrain at cell (with bounds checking)
    pub fn terrain_at(&self, cell: CellPos) -> Option<Terrain> {
        (cell.x >= 0 && cell.z >= 0 && (cell.x as usize) < self.width && (cell.z as usize) < self.height)
            .then(|| self.terrain[self.get_index(cell.x as usize, cell.z as usize)])
    }

    pub fn set_terrain(&mut self, cell: CellPos, terrain: Terrain) {
        if self.terrain_at(cell).is_some() {
            let idx = self.get_index(cell.x as usize, cell.z as usize);
            self.terrain[idx] = terrain;
        }
    }

    /// Place `count` entities at random spots with random headings
    pub fn populate(&mut self, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            let x = rng.random_range(0.0..self.width as f32);
            let z = rng.random_range(0.0..self.height as f32);
            let id = self.spawn_entity(x, z);
            let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(1.0..4.0);
            if let Some(entity) = self.entity_mut(id) {
                entity.heading = (angle.cos(), angle.sin());
                entity.speed = speed;
            }
        }
    }

    /// Add an idle entity at `(x, z)`, clamped onto the map
    pub fn spawn_entity(&mut self, x: f32, z: f32) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.push(Entity {
            id,
            x: x.clamp(0.0, self.width as f32),
            z: z.clamp(0.0, self.height as f32),
            heading: (1.0, 0.0),
            speed: 0.0,
        });
        id
    }

    /// Remove an entity; returns false if it was already gone
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id != id);
        self.entities.len() != before
    }

    pub fn move_entity(&mut self, id: EntityId, x: f32, z: f32) {
        if let Some(entity) = self.entity_mut(id) {
            entity.x = x;
            entity.z = z;
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Closest entity to `(x, z)` within `max_distance` cells
    pub fn nearest_entity(&self, x: f32, z: f32, max_distance: f32) -> Option<EntityId> {
        self.entities
            .iter()
            .map(|e| (e.id, (e.x - x).powi(2) + (e.z - z).powi(2)))
            .filter(|&(_, d2)| d2 <= max_distance * max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Move every entity by `dt` seconds. Entities are independent, so this runs in parallel.
    pub fn step(&mut self, dt: f32) {
        let (w, h) = (self.width as f32, self.height as f32);
        self.entities
            .par_iter_mut()
            .for_each_init(rand::rng, |rng, entity| entity.step(dt, w, h, rng));
    }
}

impl WorldProvider for World {
    fn bounds(&self) -> Option<WorldBounds> {
        Some(WorldBounds::new(self.width as i32, self.height as i32))
    }

    fn section_size(&self) -> i32 {
        self.section_size
    }

    fn locate(&self, entity: EntityId) -> Option<(f32, f32)> {
        self.entity(entity).map(|e| (e.x, e.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_bounds_and_center() {
        let world = World::new(100, 60);
        let bounds = world.bounds().unwrap();
        assert_eq!(bounds, WorldBounds::new(100, 60));
        assert_eq!(bounds.center(), (50.0, 30.0));
        assert_eq!(bounds.rect(), CellRect::new(0, 0, 100, 60));
    }

    #[test]
    fn test_absent_world() {
        let world: Option<World> = None;
        assert!(world.bounds().is_none());
        assert!(world.locate(EntityId(1)).is_none());
        assert_eq!(world.section_size(), DEFAULT_SECTION_SIZE);
    }

    #[test]
    fn test_spawn_locate_remove() {
        let mut world = World::new(50, 50);
        let id = world.spawn_entity(10.5, 20.5);
        assert_eq!(world.locate(id), Some((10.5, 20.5)));

        world.move_entity(id, 30.0, 31.0);
        assert_eq!(world.locate(id), Some((30.0, 31.0)));

        assert!(world.remove_entity(id));
        assert!(world.locate(id).is_none());
        assert!(!world.remove_entity(id));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut world = World::new(10, 10);
        let a = world.spawn_entity(1.0, 1.0);
        world.remove_entity(a);
        let b = world.spawn_entity(1.0, 1.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_terrain_bounds_checking() {
        let mut world = World::new(4, 4);
        world.set_terrain(CellPos::new(1, 2), Terrain::Water);
        assert_eq!(world.terrain_at(CellPos::new(1, 2)), Some(Terrain::Water));
        assert_eq!(world.terrain_at(CellPos::new(4, 0)), None);
        assert_eq!(world.terrain_at(CellPos::new(-1, 0)), None);
        world.set_terrain(CellPos::new(9, 9), Terrain::Rock);
    }

    #[test]
    fn test_nearest_entity() {
        let mut world = World::new(100, 100);
        let near = world.spawn_entity(10.0, 10.0);
        let _far = world.spawn_entity(40.0, 40.0);
        assert_eq!(world.nearest_entity(12.0, 11.0, 5.0), Some(near));
        assert_eq!(world.nearest_entity(70.0, 70.0, 5.0), None);
    }

    #[test]
    fn test_step_keeps_entities_on_map() {
        let mut world = World::new(30, 20);
        let mut rng = StdRng::seed_from_u64(3);
        world.populate(200, &mut rng);
        for _ in 0..100 {
            world.step(0.5);
        }
        for entity in world.entities() {
            assert!(entity.x >= 0.0 && entity.x < 30.0, "x out of range: {}", entity.x);
            assert!(entity.z >= 0.0 && entity.z < 20.0, "z out of range: {}", entity.z);
        }
    }
}
