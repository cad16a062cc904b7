use macroquad::math::{Vec2, Vec3};

use crate::domain::CellRect;

/// Pixel size of a view's output area
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One render of the world into a view's off-screen target
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RenderPass {
    /// Camera position; `y` is the fixed elevation
    pub position: Vec3,
    /// Half of the visible world extent on X and Z
    pub half_extent: Vec2,
    /// Cells visible in this pass, clipped to the map
    pub view_rect: CellRect,
    /// Size of the target being drawn into
    pub size: OutputSize,
}

/// Off-screen buffers that secondary views draw into.
///
/// Implemented by the renderer. The camera core only asks for buffers and
/// releases them; drawing goes through [`WorldRenderer`].
pub trait RenderBackend {
    type Target;

    /// A new buffer of `size` pixels; `None` if it could not be created
    fn allocate(&mut self, size: OutputSize) -> Option<Self::Target>;

    fn release(&mut self, target: Self::Target);

    /// Copy the primary view's look onto a fresh target. Called once per allocation.
    fn sync_appearance(&mut self, _target: &mut Self::Target) {}
}

/// A backend that knows how to draw a world of type `W`
pub trait WorldRenderer<W>: RenderBackend {
    /// Draw `world` as seen by `pass` into `target`
    fn render(&mut self, target: &mut Self::Target, world: &W, pass: &RenderPass);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Backend that hands out numbered targets and records every call
    #[derive(Default, Debug)]
    pub struct RecordingBackend {
        next_target: u32,
        pub allocated: Vec<(u32, OutputSize)>,
        pub released: Vec<u32>,
        pub passes: Vec<(u32, RenderPass)>,
        pub synced: Vec<u32>,
        pub fail_allocations: bool,
    }

    impl RecordingBackend {
        /// Backend whose allocations always fail
        pub fn failing() -> Self {
            Self {
                fail_allocations: true,
                ..Self::default()
            }
        }
    }

    impl RenderBackend for RecordingBackend {
        type Target = u32;

        fn allocate(&mut self, size: OutputSize) -> Option<u32> {
            if self.fail_allocations {
                return None;
            }
            self.next_target += 1;
            self.allocated.push((self.next_target, size));
            Some(self.next_target)
        }

        fn release(&mut self, target: u32) {
            self.released.push(target);
        }

        fn sync_appearance(&mut self, target: &mut u32) {
            self.synced.push(*target);
        }
    }

    impl<W> WorldRenderer<W> for RecordingBackend {
        fn render(&mut self, target: &mut u32, _world: &W, pass: &RenderPass) {
            self.passes.push((*target, *pass));
        }
    }
}
