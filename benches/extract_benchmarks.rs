//! Benchmarks for surface extraction and mesh distance queries.
//!
//! Run with: cargo bench --bench extract_benchmarks
//!
//! To compare against baseline:
//! 1. First run: cargo bench --bench extract_benchmarks -- --save-baseline main
//! 2. After changes: cargo bench --bench extract_benchmarks -- --baseline main

#![allow(missing_docs, clippy::cast_possible_truncation)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalgebra::{Point3, Vector3};
use sdfmesh::float_types::{FRAC_PI_2, Real};
use sdfmesh::{ExtractConfig, LatticeBounds, MeshField, Sdf};

// =============================================================================
// Test Shape Generation
// =============================================================================

/// Sphere soup: an octahedron subdivided `levels` times, `8 * 4^levels` triangles.
fn sphere_soup(levels: u32, radius: Real) -> Vec<Point3<Real>> {
    let (x, y, z) = (Vector3::x(), Vector3::y(), Vector3::z());
    let mut faces = vec![
        [x, y, z],
        [y, -x, z],
        [-x, -y, z],
        [-y, x, z],
        [y, x, -z],
        [-x, y, -z],
        [-y, -x, -z],
        [x, -y, -z],
    ];
    for _ in 0..levels {
        let mid = |a: &Vector3<Real>, b: &Vector3<Real>| ((a + b) * 0.5).normalize();
        faces = faces
            .iter()
            .flat_map(|[a, b, c]| {
                let (ab, bc, ca) = (mid(a, b), mid(b, c), mid(c, a));
                [[*a, ab, ca], [ab, *b, bc], [ca, bc, *c], [ab, bc, ca]]
            })
            .collect();
    }
    faces.iter().flatten().map(|v| Point3::from(v * radius)).collect()
}

fn demo_shape(r: Real) -> Sdf {
    let mut f = Sdf::sphere(r, Point3::origin()).with_hex_color(0x000000);
    f &= Sdf::cuboid(Vector3::repeat(r * 0.75)).with_hex_color(0xFFFFFF);
    for (hex, axis) in [(0xFF0000, Vector3::x()), (0x00FF00, Vector3::y()), (0x0000FF, Vector3::z())] {
        f -= Sdf::cylinder(r / 2.0).with_hex_color(hex).rotate(FRAC_PI_2, axis);
    }
    f
}

// =============================================================================
// Extraction Benchmarks
// =============================================================================

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("Extract");
    group.sample_size(10);

    let shape = demo_shape(24.0);
    let bounds = LatticeBounds::symmetric(26, 26, 26);
    group.throughput(Throughput::Elements(bounds.cell_count()));

    for workers in [1, 4] {
        let config = ExtractConfig::default().with_workers(workers);
        group.bench_with_input(BenchmarkId::new("demo_skip", workers), &config, |b, config| {
            b.iter(|| shape.extract(black_box(&bounds), config));
        });
    }

    let exhaustive = ExtractConfig::default().with_workers(4).with_skip_empty_cells(false);
    group.bench_function("demo_exhaustive/4", |b| {
        b.iter(|| shape.extract(black_box(&bounds), &exhaustive));
    });

    group.finish();
}

// =============================================================================
// Mesh Field Benchmarks
// =============================================================================

fn bench_mesh_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("MeshField");

    let soup = sphere_soup(5, 20.0); // 8192 triangles
    group.throughput(Throughput::Elements((soup.len() / 3) as u64));
    group.bench_function("build_8192tri", |b| {
        b.iter(|| MeshField::from_soup(black_box(&soup)));
    });
    group.finish();

    let mut group = c.benchmark_group("MeshField_Query");
    let field = MeshField::from_soup(&soup).expect("sphere soup is valid");
    let queries: Vec<Point3<Real>> = (0..1000)
        .map(|i| {
            let t = i as Real;
            Point3::new((t * 0.37).sin() * 30.0, (t * 0.11).cos() * 30.0, (t * 0.23).sin() * 30.0)
        })
        .collect();
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("distance_1000", |b| {
        b.iter(|| queries.iter().map(|q| field.distance(black_box(q))).sum::<Real>());
    });
    group.finish();

    let mut group = c.benchmark_group("Extract_Mesh");
    group.sample_size(10);
    let sdf = Sdf::mesh(field);
    let bounds = LatticeBounds::symmetric(22, 22, 22);
    let config = ExtractConfig::default();
    group.bench_function("sphere_8192tri", |b| {
        b.iter(|| sdf.extract(black_box(&bounds), &config));
    });
    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_extract, bench_mesh_field);
criterion_main!(benches);
