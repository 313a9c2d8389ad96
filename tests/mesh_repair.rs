#![allow(clippy::unwrap_used)]

use std::f64::consts::PI;

use approx::assert_relative_eq;
use sweepkit::io::{read_off_polyhedron, write_off};
use sweepkit::mesh::{Polyhedron, Rgb};
use sweepkit::operations::analysis::{ThicknessParams, WallThickness};
use sweepkit::operations::creation::MakeBox;
use sweepkit::operations::query::{BoundingBox, Volume};
use sweepkit::operations::repair::FillHoles;
use sweepkit::operations::transform::Scale;

/// A 2 x 3 x 4 box with its top removed, written to OFF text.
fn open_box_off() -> Vec<u8> {
    let mut mesh = MakeBox::from_size(2.0, 3.0, 4.0).execute().unwrap().into_mesh();
    // Triangles 2 and 3 form the top.
    mesh.faces.drain(2..4);
    let mut buf = Vec::new();
    write_off(&mesh, &mut buf).unwrap();
    buf
}

#[test]
fn scale_fill_and_measure() {
    let mut poly = read_off_polyhedron(open_box_off().as_slice()).unwrap();
    assert!(!poly.is_closed());

    Scale::new(0.5).execute(&mut poly).unwrap();
    let holes = FillHoles::new().execute(&mut poly).unwrap();
    assert_eq!(holes, 1);
    assert!(poly.is_closed());

    let mesh = poly.to_surface_mesh().unwrap();
    let volume = Volume::new(&mesh).execute().unwrap();
    assert_relative_eq!(volume, 24.0 * 0.125, max_relative = 1e-12);
    let bbox = BoundingBox::new(&mesh).execute().unwrap();
    assert_relative_eq!(bbox.max.z, 2.0, epsilon = 1e-12);
}

#[test]
fn thin_plate_is_flagged() {
    let mut mesh = MakeBox::from_size(10.0, 10.0, 1.0).execute().unwrap().into_mesh();
    let params = ThicknessParams {
        cone_angle: PI / 6.0,
        ..ThicknessParams::default()
    };
    let analysis = WallThickness::new().with_params(params);
    let map = analysis.execute(&mesh).unwrap();
    assert_relative_eq!(map.min, 1.0, max_relative = 0.05);

    let painted = map.paint_below(&mut mesh, 1.1, Rgb::RED);
    assert_eq!(painted, 4);
    assert!(mesh.colors.is_some());

    let poly = Polyhedron::from_surface_mesh(&mesh).unwrap();
    let (min, max) = analysis.range(&poly).unwrap();
    assert_relative_eq!(min, map.min, epsilon = 1e-12);
    assert_relative_eq!(max, map.max, epsilon = 1e-12);
}

#[test]
fn closed_mesh_needs_no_filling() {
    let mesh = MakeBox::from_size(1.0, 1.0, 1.0).execute().unwrap().into_mesh();
    let mut poly = Polyhedron::from_surface_mesh(&mesh).unwrap();
    assert_eq!(FillHoles::new().execute(&mut poly).unwrap(), 0);
}
