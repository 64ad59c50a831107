use veld_geom::Vec3;

/// CPU-side mesh buffers in the layout the rendering collaborator consumes:
/// interleaved position/normal triples, UV pairs, and u16 triangle indices.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u16>,
}

impl MeshBuild {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    /// Pre-reserve for a grid of `verts` vertices and `tris` triangles.
    #[inline]
    pub fn reserve(&mut self, verts: usize, tris: usize) {
        self.pos.reserve(verts * 3);
        self.norm.reserve(verts * 3);
        self.uv.reserve(verts * 2);
        self.idx.reserve(tris * 3);
    }

    #[inline]
    pub fn push_vertex(&mut self, p: Vec3, uv: (f32, f32)) {
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        // Placeholder normal; finalized by accumulation after indices exist.
        self.norm.extend_from_slice(&[0.0, 0.0, 0.0]);
        self.uv.extend_from_slice(&[uv.0, uv.1]);
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u16, b: u16, c: u16) {
        self.idx.extend_from_slice(&[a, b, c]);
    }

    #[inline]
    pub fn position(&self, v: usize) -> Vec3 {
        Vec3::new(self.pos[v * 3], self.pos[v * 3 + 1], self.pos[v * 3 + 2])
    }

    /// Recomputes vertex normals by accumulating unnormalized face normals
    /// over every triangle and normalizing per vertex. Degenerate vertices
    /// fall back to +Y.
    pub fn recompute_normals(&mut self) {
        for n in self.norm.iter_mut() {
            *n = 0.0;
        }
        for t in 0..self.triangle_count() {
            let ia = self.idx[t * 3] as usize;
            let ib = self.idx[t * 3 + 1] as usize;
            let ic = self.idx[t * 3 + 2] as usize;
            let a = self.position(ia);
            let b = self.position(ib);
            let c = self.position(ic);
            let face = (b - a).cross(c - a);
            for i in [ia, ib, ic] {
                self.norm[i * 3] += face.x;
                self.norm[i * 3 + 1] += face.y;
                self.norm[i * 3 + 2] += face.z;
            }
        }
        for v in 0..self.vertex_count() {
            let n = Vec3::new(self.norm[v * 3], self.norm[v * 3 + 1], self.norm[v * 3 + 2]);
            let n = if n.length() > 0.0 { n.normalized() } else { Vec3::UP };
            self.norm[v * 3] = n.x;
            self.norm[v * 3 + 1] = n.y;
            self.norm[v * 3 + 2] = n.z;
        }
    }

    pub fn positions(&self) -> &[f32] {
        &self.pos
    }
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
    pub fn uvs(&self) -> &[f32] {
        &self.uv
    }
    pub fn indices(&self) -> &[u16] {
        &self.idx
    }
}
