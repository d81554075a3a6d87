mod support;

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use sdfmesh::float_types::Real;
use sdfmesh::mesh_field::closest_point::project_onto_triangle;
use sdfmesh::{MeshField, Sdf, SdfError};
use std::collections::HashMap;
use std::sync::Arc;
use support::{cube_soup, octasphere, sample_points};

#[test]
fn cube_center_is_half_edge_inside() {
    let half = 1.5;
    let field = MeshField::from_soup(&cube_soup(half)).expect("cube is a valid soup");
    assert_eq!(field.vertices().len(), 8);
    assert_eq!(field.triangle_count(), 12);

    // the nearest points lie on face diagonals, signed by the edge pseudonormal
    assert_relative_eq!(field.distance(&Point3::origin()), -half, epsilon = 1e-12);
}

#[test]
fn cube_surface_and_surroundings() {
    let half = 1.0;
    let field = MeshField::from_soup(&cube_soup(half)).expect("cube is a valid soup");

    // centers of every face triangle lie on the surface
    for tri in cube_soup(half).chunks_exact(3) {
        let centroid = Point3::from((tri[0].coords + tri[1].coords + tri[2].coords) / 3.0);
        assert_relative_eq!(field.distance(&centroid), 0.0, epsilon = 1e-12);
    }

    // exact against the analytic box everywhere, edges and corners included
    let analytic = Sdf::cuboid(Vector3::repeat(half));
    for p in sample_points(400, 3.0) {
        assert_relative_eq!(field.distance(&p), analytic.distance(&p), epsilon = 1e-9);
    }
}

#[test]
fn corner_regions_are_signed_by_vertex_pseudonormals() {
    let field = MeshField::from_soup(&cube_soup(1.0)).expect("cube is a valid soup");
    for n in field.vertex_normals() {
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    }
    // just outside a corner along the diagonal
    let p = Point3::new(1.01, 1.01, 1.01);
    let hit = field.closest_point(&p).expect("non-empty mesh");
    assert_eq!(hit.point, Point3::new(1.0, 1.0, 1.0));
    assert!(hit.distance > 0.0);
    // just inside the same corner
    assert!(field.distance(&Point3::new(0.99, 0.99, 0.99)) < 0.0);
}

#[test]
fn sphere_pseudonormals_point_outward() {
    let field = MeshField::from_soup(&octasphere(3, 5.0)).expect("sphere is a valid soup");
    for (v, n) in field.vertices().iter().zip(field.vertex_normals()) {
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
        assert!(n.dot(&v.coords) > 0.0, "vertex normal at {v} points inward");
    }
    for (tri, normals) in field.triangles().iter().zip(field.edge_normals()) {
        let centroid: Vector3<Real> = tri.iter().map(|&i| field.vertices()[i as usize].coords).sum();
        for n in normals {
            assert!(n.dot(&centroid) > 0.0);
        }
    }
}

#[test]
fn edge_pseudonormals_are_bit_identical_across_slots() {
    let field = MeshField::from_soup(&octasphere(2, 3.0)).expect("sphere is a valid soup");
    let mut seen: HashMap<(u32, u32), Vector3<Real>> = HashMap::new();
    let mut shared = 0;

    for (&[a, b, c], normals) in field.triangles().iter().zip(field.edge_normals()) {
        for ((i, j), n) in [(a, b), (a, c), (b, c)].into_iter().zip(normals) {
            let key = (i.min(j), i.max(j));
            match seen.get(&key) {
                Some(previous) => {
                    assert_eq!(previous, n, "edge {key:?} differs between slots");
                    shared += 1;
                },
                None => {
                    seen.insert(key, *n);
                },
            }
        }
    }
    // closed mesh: every edge is read from exactly two slots
    assert_eq!(shared, seen.len());
}

#[test]
fn sphere_mesh_signs_and_magnitudes() {
    let radius = 10.0;
    let field = MeshField::from_soup(&octasphere(4, radius)).expect("sphere is a valid soup");
    for p in sample_points(300, 15.0) {
        let r = p.coords.norm();
        let d = field.distance(&p);
        if r < 0.95 * radius {
            assert!(d < 0.0, "{p} should be inside, got {d}");
        } else if r > radius {
            assert!(d > 0.0, "{p} should be outside, got {d}");
            assert!((d - (r - radius)).abs() < 0.05 * radius);
        }
    }
}

#[test]
fn index_agrees_with_brute_force() {
    let soup = octasphere(3, 4.0);
    let field = MeshField::from_soup(&soup).expect("sphere is a valid soup");

    for p in sample_points(100, 8.0) {
        let brute = soup
            .chunks_exact(3)
            .map(|t| {
                let (q, _) = project_onto_triangle(&p, &[t[0], t[1], t[2]]);
                (p - q).norm()
            })
            .fold(Real::INFINITY, Real::min);
        assert_relative_eq!(field.distance(&p).abs(), brute, epsilon = 1e-12);
    }
}

#[test]
fn degenerate_triangles_never_decide_the_sign() {
    // a sliver on the top face diagonal and a collapsed triangle, ahead of the cube
    let mut soup = vec![
        Point3::new(-1.0, -1.0, 1.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
    ];
    soup.extend(cube_soup(1.0));
    let field = MeshField::from_soup(&soup).expect("degenerate triangles are not an error");

    // straight above the sliver line, tied with the top face
    for i in -9..=9 {
        let t = i as Real / 10.0;
        assert_relative_eq!(field.distance(&Point3::new(t, t, 3.0)), 2.0, epsilon = 1e-9);
    }
    // and below it, while the top face is still the nearest
    for i in -4..=4 {
        let t = i as Real / 10.0;
        assert_relative_eq!(field.distance(&Point3::new(t, t, 0.5)), -0.5, epsilon = 1e-9);
    }
    assert_relative_eq!(field.distance(&Point3::new(0.3, -0.2, 0.1)), -0.7, epsilon = 1e-12);
    assert_relative_eq!(field.distance(&Point3::new(0.0, 0.5, 3.0)), 2.0, epsilon = 1e-12);
}

#[test]
fn lone_degenerate_triangle_still_measures_distance() {
    let sliver = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    ];
    let field = MeshField::from_soup(&sliver).expect("degenerate triangles are not an error");
    let hit = field.closest_point(&Point3::new(1.0, 3.0, 0.0)).expect("one triangle to rank");
    assert_relative_eq!(hit.distance.abs(), 3.0, epsilon = 1e-12);
}

#[test]
fn malformed_soups_are_rejected() {
    assert!(matches!(MeshField::from_soup(&[]), Err(SdfError::EmptyMesh)));
    let soup = cube_soup(1.0);
    assert!(matches!(
        MeshField::from_soup(&soup[..7]),
        Err(SdfError::IncompleteTriangle { positions: 7 })
    ));
}

#[test]
fn shared_field_under_transforms() {
    let field = Arc::new(MeshField::from_soup(&cube_soup(1.0)).expect("cube is a valid soup"));
    let left = Sdf::shared_mesh(field.clone()).translate(Vector3::new(-3.0, 0.0, 0.0));
    let right = Sdf::shared_mesh(field.clone()).scale(2.0).translate(Vector3::new(3.0, 0.0, 0.0));
    let both = left | right;

    assert_eq!(Arc::strong_count(&field), 3);
    assert_relative_eq!(both.distance(&Point3::new(-3.0, 0.0, 0.0)), -1.0, epsilon = 1e-12);
    assert_relative_eq!(both.distance(&Point3::new(3.0, 0.0, 0.0)), -2.0, epsilon = 1e-12);
}
