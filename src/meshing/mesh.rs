use crate::math::Point2;

/// Elements of a mesh tagged with one physical name.
///
/// `elements` holds vertex indices for dimension 0, edge indices for
/// dimension 1 and triangle indices for dimension 2.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    pub name: String,
    pub dimension: u8,
    pub elements: Vec<u32>,
}

/// A conforming triangle mesh with physical groups.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point2>,
    /// Counter-clockwise triangles.
    pub triangles: Vec<[u32; 3]>,
    /// Edges lying on tracked curves.
    pub edges: Vec<[u32; 2]>,
    /// Physical groups in label order.
    pub groups: Vec<MeshGroup>,
}

impl Mesh {
    /// The group called `name`, if present.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&MeshGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Signed area of triangle `index`.
    #[must_use]
    pub fn triangle_area(&self, index: usize) -> f64 {
        let [a, b, c] = self.triangles[index].map(|i| self.vertices[i as usize]);
        0.5 * (b - a).perp(&(c - a))
    }

    /// Total area of all triangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        (0..self.triangles.len()).map(|i| self.triangle_area(i)).sum()
    }

    /// Area covered by the triangles of group `name`; zero for unknown or
    /// lower-dimensional groups.
    #[must_use]
    pub fn group_area(&self, name: &str) -> f64 {
        self.group(name)
            .filter(|g| g.dimension == 2)
            .map_or(0.0, |g| g.elements.iter().map(|&t| self.triangle_area(t as usize)).sum())
    }

    /// Total length of the edges of group `name`; zero for unknown groups
    /// or groups that are not made of edges.
    #[must_use]
    pub fn group_length(&self, name: &str) -> f64 {
        self.group(name).filter(|g| g.dimension == 1).map_or(0.0, |g| {
            g.elements
                .iter()
                .map(|&e| {
                    let [a, b] = self.edges[e as usize];
                    (self.vertices[b as usize] - self.vertices[a as usize]).norm()
                })
                .sum()
        })
    }

    /// Longest edge of triangle `index`.
    #[must_use]
    pub fn longest_edge(&self, index: usize) -> f64 {
        let [a, b, c] = self.triangles[index].map(|i| self.vertices[i as usize]);
        [(b - a).norm(), (c - b).norm(), (a - c).norm()]
            .into_iter()
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Mesh {
        Mesh {
            vertices: vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            edges: vec![[0, 1], [1, 2]],
            groups: vec![
                MeshGroup {
                    name: "half".into(),
                    dimension: 2,
                    elements: vec![1],
                },
                MeshGroup {
                    name: "bottom_right".into(),
                    dimension: 1,
                    elements: vec![0, 1],
                },
            ],
        }
    }

    #[test]
    fn areas_and_lengths() {
        let mesh = unit_square();
        assert_relative_eq!(mesh.area(), 1.0);
        assert_relative_eq!(mesh.group_area("half"), 0.5);
        assert_relative_eq!(mesh.group_area("bottom_right"), 0.0);
        assert_relative_eq!(mesh.group_length("bottom_right"), 2.0);
        assert_relative_eq!(mesh.longest_edge(0), 2.0_f64.sqrt());
        assert!(mesh.group("missing").is_none());
    }
}
