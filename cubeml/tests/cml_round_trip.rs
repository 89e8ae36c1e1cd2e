#![allow(missing_docs)]

use std::path::PathBuf;

use cubeml::{
    from_cml_str, read_cml, to_cml_string, units::Calendar, ByteOrder, Checksum, CmlOptions,
    CodecError, CoordBuilder, CoordSystem, Cube, CubeCollection, DataDescriptor, DataType,
    MemoryOrder,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn read_fixture(name: &str) -> Result<CubeCollection, CodecError> {
    read_cml(std::fs::File::open(fixture(name))?)
}

#[test]
fn cml_read_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let cubes = read_fixture("rotated_pressure.cml")?;
    assert_eq!(cubes.len(), 2);

    let cube = cubes.cube("air_temperature").ok_or("missing cube")?;
    assert_eq!(cube.long_name(), Some("air temperature"));
    assert_eq!(cube.var_name(), Some("ta"));
    assert_eq!(cube.units().to_string(), "K");
    assert_eq!(cube.attributes()["realization"], serde_json::json!(3));
    assert_eq!(cube.attributes()["source"], serde_json::json!("Unified Model"));
    assert_eq!(cube.shape(), &[2, 3, 4]);
    cube.validate()?;

    assert_eq!(cube.dim_coords().count(), 3);
    assert_eq!(cube.aux_coords().count(), 3);
    let pressure = cube.dim_coord(0).ok_or("missing dim coord")?;
    assert_eq!(pressure.name(), "air_pressure");
    assert_eq!(pressure.value_type(), DataType::Float32);

    let latitude = cube.coord("grid_latitude").ok_or("missing coord")?;
    assert_eq!(latitude.nbounds(), 2);
    assert!(latitude.has_bounds());
    assert!(matches!(
        latitude.coord_system(),
        Some(CoordSystem::RotatedGeog(_))
    ));
    assert!(cube.coord("grid_longitude").ok_or("missing coord")?.is_circular());

    assert_eq!(cube.coord_dims("surface_altitude"), Some(&[1, 2][..]));
    let altitude = cube.coord("surface_altitude").ok_or("missing coord")?;
    assert_eq!(altitude.shape(), &[3, 4]);
    assert_eq!(altitude.value_type(), DataType::Int32);

    let time = cube.coord("time").ok_or("missing coord")?;
    assert_eq!(cube.coord_dims("time"), Some(&[][..]));
    assert_eq!(time.units().calendar(), Some(Calendar::Day360));
    assert_eq!(
        cube.coord("experiment").ok_or("missing coord")?.value_type(),
        DataType::String
    );

    let methods: Vec<_> = cube.cell_methods().iter().map(|m| m.method()).collect();
    assert_eq!(methods, ["mean", "maximum"]);
    assert_eq!(cube.cell_methods()[0].intervals(), ["1 hour"]);
    assert_eq!(cube.cell_methods()[0].comments(), ["hourly samples"]);
    assert_eq!(
        cube.cell_methods()[1].coord_names(),
        ["grid_latitude", "grid_longitude"]
    );

    let data = cube.data();
    assert_eq!(data.dtype(), DataType::Float32);
    assert_eq!(data.checksum(), Checksum::new(0x1f2e_3d4c));
    assert_eq!(
        data.mask().map(|mask| mask.checksum),
        Some(Checksum::new(0x00c0_ffee))
    );

    let orography = cubes.cube("orography").ok_or("missing cube")?;
    assert_eq!(orography.data().byte_order(), ByteOrder::Big);
    assert_eq!(orography.data().order(), MemoryOrder::F);
    assert_eq!(
        orography.data().checksum(),
        Checksum::new(0xffff_ffd6),
        "signed checksums are read as their unsigned value"
    );
    Ok(())
}

#[test]
fn cml_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let cubes = read_fixture("rotated_pressure.cml")?;
    let text = to_cml_string(&cubes, &CmlOptions::default())?;
    let round_trip = from_cml_str(&text)?;
    assert_eq!(round_trip, cubes);

    for (a, b) in cubes.iter().zip(&round_trip) {
        assert_eq!(a.data().checksum(), b.data().checksum());
        assert_eq!(a.data().mask(), b.data().mask());
    }

    // Writing is deterministic.
    assert_eq!(to_cml_string(&round_trip, &CmlOptions::default())?, text);
    Ok(())
}

#[test]
fn cml_round_trip_elided() -> Result<(), Box<dyn std::error::Error>> {
    let cubes = read_fixture("elided_height.cml")?;
    let height = cubes[0].coord("height").ok_or("missing coord")?;
    assert!(height.points().is_elided());
    assert_eq!(height.len(), 100);
    assert_eq!(
        height.points().checksum(height.value_type()),
        Checksum::new(0x1234_5678)
    );

    let text = to_cml_string(&cubes, &CmlOptions::default())?;
    assert!(text.contains(r#"points="[0.5, 1.5, ..., 98.5, 99.5]""#));
    assert!(text.contains(r#"points_checksum="0x12345678""#));
    assert!(text.contains(r#"bounds_checksum="0x0badf00d""#));
    assert_eq!(from_cml_str(&text)?, cubes);
    Ok(())
}

#[test]
fn cml_round_trip_elided_fractional_bounds() -> Result<(), Box<dyn std::error::Error>> {
    let mut bounds: Vec<f64> = (0..600)
        .flat_map(|i| [f64::from(i), f64::from(i + 1)])
        .collect();
    bounds[601] = 300.5;
    let coord = CoordBuilder::new((0..600).collect::<Vec<i64>>())
        .long_name("cell")
        .value_type(DataType::Int32)
        .bounds(bounds)
        .build()?;
    assert_eq!(coord.bounds_value_type(), DataType::Float64);

    let mut cube = Cube::new(DataDescriptor::from_elements([600], &[0u8; 600])?);
    cube.add_coord(coord, &[0])?;
    let cubes = CubeCollection::from(cube);
    let text = to_cml_string(&cubes, &CmlOptions::default())?;
    assert!(text.contains(r#"bounds="[0.0, 1.0, 1.0, ..., 599.0, 599.0, 600.0]""#));
    assert!(text.contains(r#"bounds_value_type="float64""#));

    let round_trip = from_cml_str(&text)?;
    let cell = round_trip[0].coord("cell").ok_or("missing coord")?;
    assert!(cell.bounds().is_some_and(|bounds| bounds.is_elided()));
    assert_eq!(cell.value_type(), DataType::Int32);
    assert_eq!(cell.bounds_value_type(), DataType::Float64);
    assert_eq!(round_trip, cubes);
    Ok(())
}

#[test]
fn cml_round_trip_text_without_edge_items() -> Result<(), Box<dyn std::error::Error>> {
    let mut cube = Cube::new(DataDescriptor::from_elements([3], &[0u8; 3])?);
    cube.add_coord(
        CoordBuilder::new(vec!["a", "b", "c"])
            .long_name("label")
            .build()?,
        &[0],
    )?;
    cube.add_coord(
        CoordBuilder::new(vec!["x"]).long_name("experiment").build()?,
        &[],
    )?;
    let cubes = CubeCollection::from(cube);

    let options = CmlOptions::default().with_threshold(2).with_edge_items(0);
    let text = to_cml_string(&cubes, &options)?;
    assert!(text.contains(r#"points="[...]""#));
    let round_trip = from_cml_str(&text)?;
    let label = round_trip[0].coord("label").ok_or("missing coord")?;
    assert!(label.points().is_elided());
    assert_eq!(label.value_type(), DataType::String);
    assert_eq!(round_trip, cubes);

    let options = CmlOptions::default().with_threshold(0);
    let text = to_cml_string(&cubes, &options)?;
    assert!(text.contains(r#"points="[...]""#));
    assert_eq!(from_cml_str(&text)?, cubes);
    Ok(())
}

#[test]
fn cml_missing_namespace() {
    assert!(matches!(
        read_fixture("missing_namespace.cml"),
        Err(CodecError::MissingNamespace)
    ));
}

#[test]
fn cml_invalid_documents() {
    assert!(matches!(from_cml_str(""), Err(CodecError::MissingRoot)));
    assert!(matches!(
        from_cml_str(r#"<cubes xmlns="urn:x-iris:cubeml-0.2"><cube>"#),
        Err(CodecError::UnclosedElement(_))
    ));
    assert!(matches!(
        from_cml_str(r#"<cube xmlns="urn:x-iris:cubeml-0.2"/>"#),
        Err(CodecError::UnexpectedRoot(root)) if root == "cube"
    ));
    assert!(matches!(
        from_cml_str(r#"<cubes xmlns="urn:x-iris:cubeml-0.1"/>"#),
        Err(CodecError::InvalidNamespace(namespace)) if namespace == "urn:x-iris:cubeml-0.1"
    ));
    assert!(matches!(
        from_cml_str(
            r#"<cubes xmlns="urn:x-iris:cubeml-0.2"><cube long_name="empty" units="1"/></cubes>"#
        ),
        Err(CodecError::MissingElement { cube, element: "data", .. }) if cube == "empty"
    ));
    let two_roots =
        r#"<cubes xmlns="urn:x-iris:cubeml-0.2"/><cubes xmlns="urn:x-iris:cubeml-0.2"/>"#;
    assert!(matches!(
        from_cml_str(two_roots),
        Err(CodecError::MultipleRoots(root)) if root == "cubes"
    ));
}

#[test]
fn cml_dimension_conflict() {
    let text = r#"<?xml version="1.0"?>
<cubes xmlns="urn:x-iris:cubeml-0.2">
  <cube long_name="conflict" units="1">
    <coords>
      <coord datadims="[0]">
        <dimCoord points="[1, 2, 3]" shape="(3,)" long_name="a" units="1" value_type="int64"/>
      </coord>
      <coord datadims="[0]">
        <auxCoord points="[1, 2]" shape="(2,)" long_name="b" units="1" value_type="int64"/>
      </coord>
    </coords>
    <data byteorder="little" checksum="0x00000000" dtype="int8" order="C" shape="(3,)"/>
  </cube>
</cubes>"#;
    let err = from_cml_str(text).unwrap_err();
    assert!(matches!(err, CodecError::Cube { ref cube, .. } if cube == "conflict"));
    assert!(err.to_string().contains("conflict"));
}
