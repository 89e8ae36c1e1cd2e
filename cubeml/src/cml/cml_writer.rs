use std::io::Write;

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};

use crate::{
    cube::CubeCoord,
    values::ValueArray,
    Attributes, CellMethod, Checksum, Coord, CoordSystem, Cube, CubeCollection, DataDescriptor,
    DataType, Ellipsoid, GeogCs,
};

use super::{
    cml_format::{format_dims, format_elided, format_shape, format_values},
    CmlOptions, CodecError, CML_NAMESPACE,
};

type Attrs = Vec<(&'static str, String)>;

/// An element start tag with attributes in name order.
fn start(name: &str, mut attributes: Attrs) -> BytesStart<'_> {
    attributes.sort_by(|a, b| a.0.cmp(b.0));
    let mut start = BytesStart::new(name);
    for (key, value) in &attributes {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

fn push_names(
    attributes: &mut Attrs,
    standard_name: Option<&str>,
    long_name: Option<&str>,
    var_name: Option<&str>,
) {
    for (key, name) in [
        ("standard_name", standard_name),
        ("long_name", long_name),
        ("var_name", var_name),
    ] {
        if let Some(name) = name {
            attributes.push((key, name.to_string()));
        }
    }
}

fn push_units(attributes: &mut Attrs, units: &cubeml_units::Unit) {
    attributes.push(("units", units.to_string()));
    if let Some(calendar) = units.calendar() {
        attributes.push(("calendar", calendar.to_string()));
    }
}

/// The text of a value array, and the checksum of the full sequence if it is elided.
fn value_array_text(
    array: &ValueArray,
    data_type: DataType,
    shape: &[usize],
    options: &CmlOptions,
) -> (String, Option<Checksum>) {
    match array {
        ValueArray::Explicit(values) if values.len() > options.threshold() => {
            let elided = values.elide(options.edge_items(), data_type);
            (
                format_elided(elided.head(), elided.tail(), data_type),
                Some(elided.checksum()),
            )
        }
        ValueArray::Explicit(values) => (format_values(values, data_type, shape), None),
        ValueArray::Elided(elided) => (
            format_elided(elided.head(), elided.tail(), data_type),
            Some(elided.checksum()),
        ),
    }
}

struct CmlWriter<'o, W: Write> {
    writer: Writer<W>,
    options: &'o CmlOptions,
}

impl<W: Write> CmlWriter<'_, W> {
    fn empty(&mut self, element: BytesStart<'_>) -> Result<(), CodecError> {
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn open(&mut self, element: BytesStart<'_>) -> Result<(), CodecError> {
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), CodecError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn collection(&mut self, cubes: &CubeCollection) -> Result<(), CodecError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        self.open(start("cubes", vec![("xmlns", CML_NAMESPACE.to_string())]))?;
        for cube in cubes {
            self.cube(cube)?;
        }
        self.close("cubes")
    }

    fn attributes(&mut self, attributes: &Attributes) -> Result<(), CodecError> {
        if attributes.is_empty() {
            return Ok(());
        }
        self.open(start("attributes", Vec::new()))?;
        let mut sorted: Vec<_> = attributes.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in sorted {
            let mut attrs = vec![("name", name.clone())];
            match value {
                serde_json::Value::String(value) => attrs.push(("value", value.clone())),
                value => {
                    attrs.push(("value", value.to_string()));
                    attrs.push(("type", "json".to_string()));
                }
            }
            self.empty(start("attribute", attrs))?;
        }
        self.close("attributes")
    }

    fn cube(&mut self, cube: &Cube) -> Result<(), CodecError> {
        let mut attrs = Vec::new();
        push_names(
            &mut attrs,
            cube.standard_name(),
            cube.long_name(),
            cube.var_name(),
        );
        push_units(&mut attrs, cube.units());
        self.open(start("cube", attrs))?;

        self.attributes(cube.attributes())?;
        if !cube.coord_entries().is_empty() {
            self.open(start("coords", Vec::new()))?;
            for entry in cube.coord_entries() {
                self.coord_entry(entry)?;
            }
            self.close("coords")?;
        }
        if !cube.cell_methods().is_empty() {
            self.open(start("cellMethods", Vec::new()))?;
            for cell_method in cube.cell_methods() {
                self.cell_method(cell_method)?;
            }
            self.close("cellMethods")?;
        }
        self.data(cube.data())?;
        self.close("cube")
    }

    fn coord_entry(&mut self, entry: &CubeCoord) -> Result<(), CodecError> {
        let mut attrs = Vec::new();
        if !entry.dims().is_empty() {
            attrs.push(("datadims", format_dims(entry.dims())));
        }
        self.open(start("coord", attrs))?;
        let name = if entry.is_dim_coord() {
            "dimCoord"
        } else {
            "auxCoord"
        };
        self.coord(name, entry.coord())?;
        self.close("coord")
    }

    fn coord(&mut self, name: &str, coord: &Coord) -> Result<(), CodecError> {
        let mut attrs = vec![
            ("id", format!("{:08x}", coord.identity())),
            ("shape", format_shape(coord.shape())),
            ("value_type", coord.value_type().to_string()),
        ];
        push_names(
            &mut attrs,
            coord.standard_name(),
            coord.long_name(),
            coord.var_name(),
        );
        push_units(&mut attrs, coord.units());

        let (points, points_checksum) =
            value_array_text(coord.points(), coord.value_type(), coord.shape(), self.options);
        attrs.push(("points", points));
        if let Some(checksum) = points_checksum {
            attrs.push(("points_checksum", checksum.to_string()));
        }
        if let Some(bounds) = coord.bounds() {
            let mut shape = coord.shape().to_vec();
            shape.push(coord.nbounds());
            let (bounds, bounds_checksum) =
                value_array_text(bounds, coord.bounds_value_type(), &shape, self.options);
            attrs.push(("bounds", bounds));
            attrs.push(("nbounds", coord.nbounds().to_string()));
            if coord.bounds_value_type() != coord.value_type() {
                attrs.push(("bounds_value_type", coord.bounds_value_type().to_string()));
            }
            if let Some(checksum) = bounds_checksum {
                attrs.push(("bounds_checksum", checksum.to_string()));
            }
        }
        if coord.is_circular() {
            attrs.push(("circular", "True".to_string()));
        }

        let element = start(name, attrs);
        if coord.coord_system().is_none() && coord.attributes().is_empty() {
            return self.empty(element);
        }
        self.open(element)?;
        if let Some(coord_system) = coord.coord_system() {
            self.coord_system(coord_system)?;
        }
        self.attributes(coord.attributes())?;
        self.close(name)
    }

    fn geog_cs(&mut self, geog_cs: &GeogCs) -> Result<(), CodecError> {
        let attrs = match geog_cs.ellipsoid() {
            Ellipsoid::Sphere { earth_radius } => {
                vec![("earth_radius", format!("{earth_radius:?}"))]
            }
            Ellipsoid::Spheroid {
                semi_major_axis,
                semi_minor_axis,
            } => vec![
                ("semi_major_axis", format!("{semi_major_axis:?}")),
                ("semi_minor_axis", format!("{semi_minor_axis:?}")),
            ],
        };
        self.empty(start("geogCS", attrs))
    }

    fn coord_system(&mut self, coord_system: &CoordSystem) -> Result<(), CodecError> {
        match coord_system {
            CoordSystem::Geog(geog_cs) => self.geog_cs(geog_cs),
            CoordSystem::RotatedGeog(rotated) => {
                self.open(start(
                    "rotatedGeogCS",
                    vec![
                        (
                            "grid_north_pole_latitude",
                            format!("{:?}", rotated.grid_north_pole_latitude()),
                        ),
                        (
                            "grid_north_pole_longitude",
                            format!("{:?}", rotated.grid_north_pole_longitude()),
                        ),
                        (
                            "north_pole_grid_longitude",
                            format!("{:?}", rotated.north_pole_grid_longitude()),
                        ),
                    ],
                ))?;
                self.geog_cs(rotated.ellipsoid())?;
                self.close("rotatedGeogCS")
            }
        }
    }

    fn cell_method(&mut self, cell_method: &CellMethod) -> Result<(), CodecError> {
        self.open(start(
            "cellMethod",
            vec![("method", cell_method.method().to_string())],
        ))?;
        for (index, coord_name) in cell_method.coord_names().iter().enumerate() {
            let mut attrs = vec![("name", coord_name.clone())];
            if let Some(interval) = cell_method.intervals().get(index) {
                attrs.push(("interval", interval.clone()));
            }
            self.empty(start("coord", attrs))?;
        }
        for comment in cell_method.comments() {
            self.empty(start("comment", vec![("value", comment.clone())]))?;
        }
        self.close("cellMethod")
    }

    fn data(&mut self, data: &DataDescriptor) -> Result<(), CodecError> {
        let mut attrs = vec![
            ("byteorder", data.byte_order().to_string()),
            ("checksum", data.checksum().to_string()),
            ("dtype", data.dtype().to_string()),
            ("order", data.order().to_string()),
            ("shape", format_shape(data.shape())),
        ];
        if let Some(mask) = data.mask() {
            attrs.push(("mask_checksum", mask.checksum.to_string()));
            attrs.push(("mask_order", mask.order.to_string()));
        }
        self.empty(start("data", attrs))
    }
}

/// Write `cubes` as a CubeML document.
pub(super) fn write_collection<W: Write>(
    cubes: &CubeCollection,
    options: &CmlOptions,
    writer: W,
) -> Result<(), CodecError> {
    log::debug!("writing {} cubes as CubeML", cubes.len());
    let mut writer = CmlWriter {
        writer: Writer::new_with_indent(writer, b' ', 2),
        options,
    };
    writer.collection(cubes)?;
    writer.writer.get_mut().write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{values::Values, CoordBuilder, CubeCollection};

    fn to_string(cubes: &CubeCollection, options: &CmlOptions) -> String {
        let mut bytes = Vec::new();
        write_collection(cubes, options, &mut bytes).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn write_empty_collection() {
        let text = to_string(&CubeCollection::new(), &CmlOptions::default());
        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<cubes xmlns=\"urn:x-iris:cubeml-0.2\">"));
        assert!(text.ends_with("</cubes>\n"));
    }

    #[test]
    fn write_elided_points() {
        let data = DataDescriptor::from_elements([10], &[0u8; 10]).unwrap();
        let mut cube = Cube::new(data);
        cube.add_dim_coord(
            CoordBuilder::new((0..10).collect::<Vec<i64>>())
                .long_name("index")
                .value_type(DataType::Int32)
                .build()
                .unwrap(),
            0,
        )
        .unwrap();
        let options = CmlOptions::default().with_threshold(5).with_edge_items(2);
        let text = to_string(&cube.into(), &options);
        assert!(text.contains(r#"points="[0, 1, ..., 8, 9]""#));
        let checksum = Values::from(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).checksum(DataType::Int32);
        assert!(text.contains(&format!(r#"points_checksum="{checksum}""#)));
        assert!(text.contains(r#"<coord datadims="[0]">"#));
        assert!(text.contains(r#"<data byteorder="little""#));
    }
}
