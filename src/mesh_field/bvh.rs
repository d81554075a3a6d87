//! Bounding volume hierarchy answering shrinking-radius nearest-point queries.

use crate::float_types::Real;
use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::float_types::parry3d::query::PointQuery;
use nalgebra::Point3;

/// Broad phase of a nearest-primitive search.
///
/// `query` offers primitives to `visit` together with the current search
/// radius. The callback may shrink the radius when it finds something closer
/// and returns whether it did. Implementations must offer every primitive whose
/// bounds come within the final radius of `point`, and may stop once the radius
/// reaches zero.
pub trait PointQueryIndex: Send + Sync {
    fn query(
        &self,
        point: &Point3<Real>,
        radius: &mut Real,
        visit: &mut dyn FnMut(usize, &mut Real) -> bool,
    );
}

const LEAF_SIZE: usize = 4;
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: u32, count: u32 },
    Inner { left: u32, right: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    aabb: Aabb,
    kind: NodeKind,
}

/// Binary BVH over primitive bounding boxes, split at the median centroid along
/// the longest axis.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<Node>,
    primitives: Vec<u32>,
}

impl Bvh {
    /// Build over one bounding box per primitive; primitive ids are positions
    /// in `bounds`.
    pub fn build(bounds: &[Aabb]) -> Bvh {
        let mut bvh = Bvh {
            nodes: Vec::with_capacity(bounds.len().div_ceil(LEAF_SIZE) * 2),
            primitives: (0..bounds.len() as u32).collect(),
        };
        if !bounds.is_empty() {
            let centroids: Vec<Point3<Real>> = bounds.iter().map(|b| b.center()).collect();
            bvh.build_node(bounds, &centroids, 0, bounds.len(), 0);
        }
        bvh
    }

    /// Build over triangles given as vertex index triples.
    pub fn from_triangles(vertices: &[Point3<Real>], triangles: &[[u32; 3]]) -> Bvh {
        let bounds: Vec<Aabb> = triangles
            .iter()
            .map(|tri| {
                let mut aabb = Aabb::new_invalid();
                for &i in tri {
                    aabb.take_point(vertices[i as usize]);
                }
                aabb
            })
            .collect();
        Bvh::build(&bounds)
    }

    fn build_node(
        &mut self,
        bounds: &[Aabb],
        centroids: &[Point3<Real>],
        start: usize,
        end: usize,
        depth: usize,
    ) -> u32 {
        let slice = &mut self.primitives[start..end];

        let mut aabb = Aabb::new_invalid();
        let mut centroid_box = Aabb::new_invalid();
        for &p in slice.iter() {
            aabb.merge(&bounds[p as usize]);
            centroid_box.take_point(centroids[p as usize]);
        }

        let extents = centroid_box.extents();
        let axis = extents.imax();
        let index = self.nodes.len() as u32;

        if slice.len() <= LEAF_SIZE || extents[axis] <= 0.0 || depth + 1 >= MAX_DEPTH / 2 {
            self.nodes.push(Node {
                aabb,
                kind: NodeKind::Leaf {
                    start: start as u32,
                    count: slice.len() as u32,
                },
            });
            return index;
        }

        let mid = slice.len() / 2;
        slice.select_nth_unstable_by(mid, |&a, &b| {
            centroids[a as usize][axis].total_cmp(&centroids[b as usize][axis])
        });

        // reserve our slot before the children so the root stays at index 0
        self.nodes.push(Node {
            aabb,
            kind: NodeKind::Leaf { start: 0, count: 0 },
        });
        let left = self.build_node(bounds, centroids, start, start + mid, depth + 1);
        let right = self.build_node(bounds, centroids, start + mid, end, depth + 1);
        self.nodes[index as usize].kind = NodeKind::Inner { left, right };
        index
    }

    /// Bounds of everything in the hierarchy, `None` when empty.
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|root| root.aabb)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    #[inline]
    fn node_distance(&self, node: u32, point: &Point3<Real>) -> Real {
        self.nodes[node as usize].aabb.distance_to_local_point(point, true)
    }
}

impl PointQueryIndex for Bvh {
    fn query(
        &self,
        point: &Point3<Real>,
        radius: &mut Real,
        visit: &mut dyn FnMut(usize, &mut Real) -> bool,
    ) {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = [(0u32, 0.0 as Real); MAX_DEPTH];
        stack[0] = (0, self.node_distance(0, point));
        let mut len = 1;

        while len > 0 {
            len -= 1;
            let (node, distance) = stack[len];
            if distance > *radius {
                continue;
            }
            match self.nodes[node as usize].kind {
                NodeKind::Leaf { start, count } => {
                    let range = start as usize..(start + count) as usize;
                    for &primitive in &self.primitives[range] {
                        visit(primitive as usize, radius);
                        if *radius <= 0.0 {
                            return;
                        }
                    }
                },
                NodeKind::Inner { left, right } => {
                    let dl = self.node_distance(left, point);
                    let dr = self.node_distance(right, point);
                    // nearer child on top of the stack
                    let (near, far) = if dl <= dr {
                        ((left, dl), (right, dr))
                    } else {
                        ((right, dr), (left, dl))
                    };
                    stack[len] = far;
                    stack[len + 1] = near;
                    len += 2;
                },
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Offers every primitive; the reference the hierarchy must agree with.
    struct Linear(usize);

    impl PointQueryIndex for Linear {
        fn query(
            &self,
            _point: &Point3<Real>,
            radius: &mut Real,
            visit: &mut dyn FnMut(usize, &mut Real) -> bool,
        ) {
            for i in 0..self.0 {
                visit(i, radius);
            }
        }
    }

    fn point_boxes(points: &[Point3<Real>]) -> Vec<Aabb> {
        points.iter().map(|p| Aabb::new(*p, *p)).collect()
    }

    fn nearest(index: &dyn PointQueryIndex, points: &[Point3<Real>], q: &Point3<Real>) -> Option<usize> {
        let mut radius = Real::INFINITY;
        let mut best = None;
        index.query(q, &mut radius, &mut |i, radius| {
            let d = (points[i] - q).norm();
            if d < *radius {
                *radius = d;
                best = Some(i);
                true
            } else {
                false
            }
        });
        best
    }

    fn scattered_points(n: usize) -> Vec<Point3<Real>> {
        // deterministic low-discrepancy scatter
        (0..n)
            .map(|i| {
                let t = i as Real;
                Point3::new(
                    (t * 0.618_033_988_75).fract() * 20.0 - 10.0,
                    (t * 0.754_877_666_24).fract() * 20.0 - 10.0,
                    (t * 0.569_840_290_99).fract() * 20.0 - 10.0,
                )
            })
            .collect()
    }

    #[test]
    fn agrees_with_linear_scan() {
        let points = scattered_points(500);
        let bvh = Bvh::build(&point_boxes(&points));
        let linear = Linear(points.len());
        for q in scattered_points(64).iter().map(|p| Point3::from(p.coords * 1.3 + nalgebra::Vector3::repeat(0.37))) {
            let a = nearest(&bvh, &points, &q).map(|i| (points[i] - q).norm());
            let b = nearest(&linear, &points, &q).map(|i| (points[i] - q).norm());
            assert_eq!(a, b, "nearest distance differs for {q}");
        }
    }

    #[test]
    fn prunes_far_subtrees() {
        let points = scattered_points(1000);
        let bvh = Bvh::build(&point_boxes(&points));
        let mut visited = 0;
        let q = points[17];
        let mut radius = Real::INFINITY;
        bvh.query(&q, &mut radius, &mut |i, radius| {
            visited += 1;
            let d = (points[i] - q).norm();
            if d < *radius {
                *radius = d;
                true
            } else {
                false
            }
        });
        assert_eq!(radius, 0.0);
        assert!(visited < points.len() / 4, "visited {visited} of {}", points.len());
    }

    #[test]
    fn bounds_cover_all_primitives() {
        let points = scattered_points(100);
        let bvh = Bvh::build(&point_boxes(&points));
        let bounds = bvh.bounds().expect("non-empty hierarchy has bounds");
        for p in &points {
            assert_eq!(bounds.distance_to_local_point(p, true), 0.0);
        }
        assert_eq!(bvh.len(), 100);
    }

    #[test]
    fn empty_hierarchy_visits_nothing() {
        let bvh = Bvh::build(&[]);
        assert!(bvh.is_empty());
        assert!(bvh.bounds().is_none());
        let mut radius = Real::INFINITY;
        bvh.query(&Point3::origin(), &mut radius, &mut |_, _| panic!("nothing to visit"));
    }

    #[test]
    fn identical_centroids_make_one_leaf() {
        let points = vec![Point3::new(1.0, 2.0, 3.0); 20];
        let bvh = Bvh::build(&point_boxes(&points));
        assert_eq!(bvh.nodes.len(), 1);
    }
}
