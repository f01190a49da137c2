//! Rendering contract
//!
//! The visualiser never draws by itself: the host calls
//! [`Matchbox::draw`](crate::sim::Matchbox::draw) once per frame with a
//! [`Surface`]. Matches are painted back-to-front in collection order.

pub mod shapes;
pub mod vertex;

pub use shapes::VertexBatch;
pub use vertex::Vertex;

use crate::sim::entity::Bounds;

/// A 2D drawing surface
pub trait Surface {
    /// Fill an axis-aligned rectangle (canvas pixels, y down) with an RGBA color
    fn fill_rect(&mut self, bounds: Bounds, color: [f32; 4]);
}
