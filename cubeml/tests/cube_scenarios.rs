#![allow(missing_docs)]

use cubeml::{
    from_cml_str, to_cml_string, units::Unit, CellMethod, CmlOptions, Coord, CoordBuilder,
    CoordSystem, Cube, CubeCollection, CubeError, DataDescriptor, DimensionConflictError, GeogCs,
    ShapeMismatchError,
};

fn regular(name: &str, len: usize, start: f64, step: f64) -> Coord {
    #[allow(clippy::cast_precision_loss)]
    let points: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
    CoordBuilder::new(points)
        .standard_name(name)
        .units(Unit::parse("degrees").unwrap())
        .build()
        .unwrap()
}

fn pressure(levels: Vec<f64>) -> Coord {
    CoordBuilder::new(levels)
        .long_name("pressure")
        .units(Unit::parse("hPa").unwrap())
        .build()
        .unwrap()
}

fn global_cube() -> Cube {
    let data = DataDescriptor::from_elements([3, 73, 96], &vec![0.0f32; 3 * 73 * 96]).unwrap();
    let mut cube = Cube::new(data);
    cube.set_standard_name(Some("air_temperature".to_string()))
        .set_units(Unit::parse("K").unwrap());
    cube.add_dim_coord(pressure(vec![1000.0, 850.0, 700.0]), 0)
        .unwrap();
    cube.add_dim_coord(regular("latitude", 73, -90.0, 2.5), 1)
        .unwrap();
    cube.add_dim_coord(regular("longitude", 96, 0.0, 3.75), 2)
        .unwrap();
    cube
}

#[test]
fn cube_global_validates() {
    let cube = global_cube();
    cube.validate().unwrap();
    assert_eq!(
        cube.to_string(),
        "air_temperature / (K) (pressure: 3; latitude: 73; longitude: 96)"
    );
    let names: Vec<_> = cube.dim_coords().map(Coord::name).collect();
    assert_eq!(names, ["pressure", "latitude", "longitude"]);
}

#[test]
fn cube_reassigned_pressure_shape_mismatch() {
    let mut cube = global_cube();
    let previous = cube
        .replace_coord(pressure(vec![1000.0, 850.0, 700.0, 500.0]))
        .unwrap();
    assert_eq!(previous.len(), 3);
    assert_eq!(
        cube.validate(),
        Err(ShapeMismatchError {
            cube: "air_temperature".to_string(),
            coord: "pressure".to_string(),
            dim: 0,
            expected: Some(3),
            found: 4,
        })
    );
}

#[test]
fn cube_dimension_conflict() {
    let data = DataDescriptor::from_elements([4], &[0i32; 4]).unwrap();
    let mut cube = Cube::new(data);
    cube.rename("counts");
    cube.add_dim_coord(regular("latitude", 4, 0.0, 1.0), 0)
        .unwrap();
    let err = cube
        .add_coord(regular("grid_latitude", 5, 0.0, 1.0), &[0])
        .unwrap_err();
    assert_eq!(
        err,
        CubeError::DimensionConflict(DimensionConflictError {
            cube: "counts".to_string(),
            dim: 0,
            existing: "latitude".to_string(),
            existing_len: 4,
            new: "grid_latitude".to_string(),
            new_len: 5,
        })
    );
    assert_eq!(cube.coords().count(), 1);
}

#[test]
fn coord_equality_ignores_construction_order() {
    let geog_cs = GeogCs::sphere(6_371_229.0).unwrap();
    let a = CoordBuilder::new(vec![0.0, 10.0])
        .standard_name("longitude")
        .units(Unit::parse("degrees").unwrap())
        .bounds(vec![-5.0, 5.0, 5.0, 15.0])
        .coord_system(geog_cs)
        .build()
        .unwrap();
    let b = CoordBuilder::new(vec![0.0, 10.0])
        .coord_system(CoordSystem::from(geog_cs))
        .bounds(vec![-5.0, 5.0, 5.0, 15.0])
        .units(Unit::parse("degrees").unwrap())
        .standard_name("longitude")
        .build()
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.identity(), b.identity());
    assert_eq!(a.len(), 2);
    assert_eq!(a.bounds().map(|bounds| bounds.len() / a.nbounds()), Some(a.len()));
}

#[test]
fn cube_masked_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let values = [1.5f64, -2.0, 3.25, 4.0, 5.0, 6.0];
    let mask = [false, true, false, false, true, false];
    let data = DataDescriptor::from_masked_elements([2, 3], &values, &mask)?;
    let checksum = data.checksum();
    let mask_checksum = data.mask().map(|mask| mask.checksum);
    assert!(mask_checksum.is_some());

    let mut cube = Cube::new(data);
    cube.set_long_name(Some("precipitation".to_string()))
        .set_units(Unit::parse("mm")?);
    cube.add_dim_coord(regular("latitude", 2, 0.0, 1.0), 0)?;
    cube.add_dim_coord(regular("longitude", 3, 0.0, 1.0), 1)?;
    cube.add_cell_method(CellMethod::new("sum", ["time"])?);
    cube.set_attribute("history", "accumulated")?;

    let cubes = CubeCollection::from(cube);
    let round_trip = from_cml_str(&to_cml_string(&cubes, &CmlOptions::default())?)?;
    assert_eq!(round_trip, cubes);
    let data = round_trip[0].data();
    assert_eq!(data.checksum(), checksum);
    assert_eq!(data.mask().map(|mask| mask.checksum), mask_checksum);
    Ok(())
}

#[test]
fn cube_collection_round_trip_elided() -> Result<(), Box<dyn std::error::Error>> {
    let cubes = CubeCollection::from(global_cube());
    let options = CmlOptions::default().with_threshold(50).with_edge_items(2);
    let text = to_cml_string(&cubes, &options)?;
    assert!(text.contains("points_checksum"));

    let round_trip = from_cml_str(&text)?;
    assert!(round_trip[0]
        .coord("longitude")
        .is_some_and(|longitude| longitude.points().is_elided()));
    assert_eq!(round_trip, cubes);

    let mut changed = global_cube();
    changed.replace_coord(regular("longitude", 96, 1.0, 3.75))?;
    assert_ne!(round_trip, CubeCollection::from(changed));
    Ok(())
}
