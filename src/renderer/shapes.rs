//! Shape generation for 2D primitives

use glam::Vec2;

use super::Surface;
use super::vertex::Vertex;
use crate::sim::entity::Bounds;

/// Map a canvas pixel (origin top-left, y down) to clip space
fn to_clip(point: Vec2, canvas: Vec2) -> Vec2 {
    Vec2::new(
        point.x / canvas.x * 2.0 - 1.0,
        1.0 - point.y / canvas.y * 2.0,
    )
}

/// Generate vertices for a filled rectangle (two triangles)
pub fn rect(bounds: Bounds, canvas: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    let tl = to_clip(Vec2::new(bounds.left, bounds.top), canvas);
    let br = to_clip(Vec2::new(bounds.right, bounds.bottom), canvas);

    [
        Vertex::new(tl.x, tl.y, color),
        Vertex::new(br.x, tl.y, color),
        Vertex::new(tl.x, br.y, color),
        Vertex::new(tl.x, br.y, color),
        Vertex::new(br.x, tl.y, color),
        Vertex::new(br.x, br.y, color),
    ]
}

/// A [`Surface`] that collects triangles ready for upload to a vertex buffer
#[derive(Debug, Clone)]
pub struct VertexBatch {
    canvas: Vec2,
    vertices: Vec<Vertex>,
}

impl VertexBatch {
    pub fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            canvas: Vec2::new(canvas_width.max(1.0), canvas_height.max(1.0)),
            vertices: Vec::new(),
        }
    }

    /// Drop last frame's geometry, keeping the allocation
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of rectangles drawn since the last clear
    pub fn rect_count(&self) -> usize {
        self.vertices.len() / 6
    }

    /// Raw bytes for a vertex buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Surface for VertexBatch {
    fn fill_rect(&mut self, bounds: Bounds, color: [f32; 4]) {
        self.vertices.extend_from_slice(&rect(bounds, self.canvas, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_covers_canvas() {
        let bounds = Bounds {
            top: 0.0,
            left: 0.0,
            right: 100.0,
            bottom: 50.0,
        };
        let v = rect(bounds, Vec2::new(100.0, 50.0), [1.0; 4]);
        assert_eq!(v[0].position, [-1.0, 1.0]);
        assert_eq!(v[5].position, [1.0, -1.0]);
    }

    #[test]
    fn test_batch_collects_rects() {
        let mut batch = VertexBatch::new(200.0, 100.0);
        let bounds = Bounds {
            top: 0.0,
            left: 10.0,
            right: 30.0,
            bottom: 40.0,
        };
        batch.fill_rect(bounds, [0.5, 0.5, 0.5, 0.65]);
        batch.fill_rect(bounds, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(batch.rect_count(), 2);
        assert_eq!(batch.as_bytes().len(), 12 * Vertex::STRIDE);
        assert_eq!(batch.vertices()[6].color[3], 1.0);
        batch.clear();
        assert_eq!(batch.rect_count(), 0);
    }
}
