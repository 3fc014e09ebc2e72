//! Wireframe icosphere
//!
//! Each icosahedron face is split into a `(detail + 1)²` triangle grid and
//! pushed out to the sphere; the wireframe is the set of unique edges.

use std::collections::BTreeSet;

use glam::Vec3;

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    [
        Vec3::new(-1.0, t, 0.0), Vec3::new(1.0, t, 0.0), Vec3::new(-1.0, -t, 0.0), Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t), Vec3::new(0.0, 1.0, t), Vec3::new(0.0, -1.0, -t), Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0), Vec3::new(t, 0.0, 1.0), Vec3::new(-t, 0.0, -1.0), Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Deduplicated icosphere wireframe
#[derive(Debug, Clone)]
pub struct WireSphere {
    pub radius: f32,
    pub vertices: Vec<Vec3>,
    /// Index pairs into `vertices`, lower index first
    pub edges: Vec<[u32; 2]>,
}

impl WireSphere {
    pub fn new(radius: f32, detail: u32) -> Self {
        let base = icosahedron_vertices();
        let mut builder = Builder::default();

        for face in ICOSAHEDRON_FACES {
            let [a, b, c] = face.map(|i| base[i]);
            for [p, q, r] in subdivide(a, b, c, detail) {
                let ids = [p, q, r].map(|v| builder.vertex(v.normalize() * radius));
                builder.edge(ids[0], ids[1]);
                builder.edge(ids[1], ids[2]);
                builder.edge(ids[2], ids[0]);
            }
        }

        Self {
            radius,
            vertices: builder.vertices,
            edges: builder.edges.into_iter().collect(),
        }
    }

    /// Edge endpoints as line segments
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.edges
            .iter()
            .map(|[a, b]| (self.vertices[*a as usize], self.vertices[*b as usize]))
    }
}

#[derive(Default)]
struct Builder {
    vertices: Vec<Vec3>,
    edges: BTreeSet<[u32; 2]>,
}

impl Builder {
    fn vertex(&mut self, v: Vec3) -> u32 {
        // Shared face borders land on the same point up to rounding
        if let Some(i) = self.vertices.iter().position(|p| p.distance_squared(v) < 1e-8) {
            return i as u32;
        }
        self.vertices.push(v);
        (self.vertices.len() - 1) as u32
    }

    fn edge(&mut self, a: u32, b: u32) {
        if a != b {
            self.edges.insert([a.min(b), a.max(b)]);
        }
    }
}

/// Triangle grid over face (a, b, c), `(detail + 1)²` triangles
fn subdivide(a: Vec3, b: Vec3, c: Vec3, detail: u32) -> Vec<[Vec3; 3]> {
    let cols = detail as usize + 1;
    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = cols - i;
        let row = (0..=rows)
            .map(|j| {
                if rows == 0 {
                    aj
                } else {
                    aj.lerp(bj, j as f32 / rows as f32)
                }
            })
            .collect();
        grid.push(row);
    }

    let mut triangles = Vec::with_capacity(cols * cols);
    for i in 0..cols {
        for j in 0..2 * (cols - i) - 1 {
            let k = j / 2;
            if j % 2 == 0 {
                triangles.push([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                triangles.push([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_icosahedron() {
        let sphere = WireSphere::new(1.0, 0);
        assert_eq!(sphere.vertices.len(), 12);
        assert_eq!(sphere.edges.len(), 30);
    }

    #[test]
    fn test_detail_four_counts() {
        let sphere = WireSphere::new(2.0, 4);
        // V - E + F = 2 with F = 20 * 25
        assert_eq!(sphere.vertices.len(), 252);
        assert_eq!(sphere.edges.len(), 750);
        for v in &sphere.vertices {
            assert!((v.length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_segments_match_edges() {
        let sphere = WireSphere::new(2.0, 1);
        assert_eq!(sphere.segments().count(), sphere.edges.len());
        assert!(sphere.segments().all(|(a, b)| a != b));
    }
}
