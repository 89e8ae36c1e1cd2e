use std::{fmt::Display, str::FromStr};

use cubeml_units::{Calendar, Unit};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    coord::resolve_name,
    values::{ElidedValues, ValueArray},
    Attributes, CellMethod, Checksum, Coord, CoordBuilder, CoordSystem, Cube, CubeCollection,
    DataDescriptor, DataType, GeogCs, MaskDescriptor, RotatedGeogCs,
};

use super::{
    cml_format::{parse_dims, parse_shape, parse_values},
    CodecError, CML_NAMESPACE,
};

/// A parsed element with its attributes in document order.
#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, CodecError> {
        let attributes = start
            .attributes()
            .map(|attribute| -> Result<(String, String), CodecError> {
                let attribute = attribute.map_err(quick_xml::Error::from)?;
                let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
                let value = attribute.unescape_value()?.into_owned();
                Ok((key, value))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn parse_document(text: &str) -> Result<Element, CodecError> {
    fn attach(
        stack: &mut [Element],
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<(), CodecError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None if root.is_some() => return Err(CodecError::MultipleRoots(element.name)),
            None => *root = Some(element),
        }
        Ok(())
    }

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut stack = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if let Some(element) = stack.pop() {
        return Err(CodecError::UnclosedElement(element.name));
    }
    root.ok_or(CodecError::MissingRoot)
}

/// The attributes of one element within a named cube, for error reporting.
struct Fields<'a> {
    cube: &'a str,
    element: &'a Element,
}

impl<'a> Fields<'a> {
    fn new(cube: &'a str, element: &'a Element) -> Self {
        Self { cube, element }
    }

    fn optional(&self, attribute: &str) -> Option<&'a str> {
        self.element.attribute(attribute)
    }

    fn required(&self, attribute: &'static str) -> Result<&'a str, CodecError> {
        self.optional(attribute)
            .ok_or_else(|| CodecError::MissingAttribute {
                cube: self.cube.to_string(),
                element: self.element.name.clone(),
                attribute,
            })
    }

    fn invalid(&self, attribute: &str, value: &str, reason: impl Display) -> CodecError {
        CodecError::InvalidAttribute {
            cube: self.cube.to_string(),
            element: self.element.name.clone(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T>(&self, attribute: &'static str) -> Result<Option<T>, CodecError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(attribute)
            .map(|value| {
                value
                    .parse()
                    .map_err(|err| self.invalid(attribute, value, err))
            })
            .transpose()
    }

    fn parse_required<T>(&self, attribute: &'static str) -> Result<T, CodecError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.required(attribute)?;
        value
            .parse()
            .map_err(|err| self.invalid(attribute, value, err))
    }

    fn shape(&self) -> Result<Vec<usize>, CodecError> {
        let value = self.required("shape")?;
        let shape = parse_shape(value).map_err(|reason| self.invalid("shape", value, reason))?;
        let len = shape
            .iter()
            .try_fold(1usize, |len, &extent| len.checked_mul(extent));
        match len {
            Some(_) => Ok(shape),
            None => Err(self.invalid("shape", value, "shape is too large")),
        }
    }

    fn units(&self) -> Result<Unit, CodecError> {
        let calendar: Option<Calendar> = self.parse("calendar")?;
        self.optional("units").map_or(Ok(Unit::default()), |value| {
            Unit::parse_with_calendar(value, calendar)
                .map_err(|err| self.invalid("units", value, err))
        })
    }

    fn unexpected(&self, child: &Element) -> CodecError {
        CodecError::UnexpectedElement {
            cube: self.cube.to_string(),
            parent: self.element.name.clone(),
            element: child.name.clone(),
        }
    }

    fn missing_element(&self, element: &'static str) -> CodecError {
        CodecError::MissingElement {
            cube: self.cube.to_string(),
            parent: self.element.name.clone(),
            element,
        }
    }

    /// A value array of `len` values, elided if the text contains an ellipsis.
    fn values(
        &self,
        attribute: &'static str,
        checksum_attribute: &'static str,
        len: usize,
    ) -> Result<ValueArray, CodecError> {
        let text = self.required(attribute)?;
        let parsed = parse_values(text).map_err(|reason| self.invalid(attribute, text, reason))?;
        match parsed.tail {
            None => Ok(ValueArray::Explicit(parsed.head)),
            Some(tail) => {
                let checksum: Checksum = self.parse_required(checksum_attribute)?;
                Ok(ValueArray::Elided(ElidedValues::new(
                    parsed.head,
                    tail,
                    len,
                    checksum,
                )))
            }
        }
    }
}

fn read_attributes(cube: &str, element: &Element) -> Result<Attributes, CodecError> {
    let parent = Fields::new(cube, element);
    let mut attributes = Attributes::new();
    for child in &element.children {
        if child.name != "attribute" {
            return Err(parent.unexpected(child));
        }
        let fields = Fields::new(cube, child);
        let name = fields.required("name")?;
        let value = fields.required("value")?;
        let value = match fields.optional("type") {
            Some("json") => serde_json::from_str(value)
                .map_err(|err| fields.invalid("value", value, err))?,
            Some(other) => return Err(fields.invalid("type", other, "expected `json`")),
            None => serde_json::Value::String(value.to_string()),
        };
        attributes.insert(name.to_string(), value);
    }
    Ok(attributes)
}

fn read_geog_cs(cube: &str, element: &Element) -> Result<GeogCs, CodecError> {
    let fields = Fields::new(cube, element);
    let geog_cs = if let Some(earth_radius) = fields.parse::<f64>("earth_radius")? {
        GeogCs::sphere(earth_radius)
    } else {
        GeogCs::spheroid(
            fields.parse_required("semi_major_axis")?,
            fields.parse_required("semi_minor_axis")?,
        )
    };
    geog_cs.map_err(|err| fields.invalid(err.parameter, &err.value.to_string(), err.reason))
}

fn read_coord_system(cube: &str, element: &Element) -> Result<CoordSystem, CodecError> {
    let fields = Fields::new(cube, element);
    match element.name.as_str() {
        "geogCS" => read_geog_cs(cube, element).map(CoordSystem::from),
        _ => {
            let ellipsoid = element
                .children
                .iter()
                .find(|child| child.name == "geogCS")
                .ok_or_else(|| fields.missing_element("geogCS"))?;
            RotatedGeogCs::new(
                fields.parse_required("grid_north_pole_latitude")?,
                fields.parse_required("grid_north_pole_longitude")?,
                fields.parse_required("north_pole_grid_longitude")?,
                read_geog_cs(cube, ellipsoid)?,
            )
            .map(CoordSystem::from)
            .map_err(|err| fields.invalid(err.parameter, &err.value.to_string(), err.reason))
        }
    }
}

fn read_coord(cube: &str, element: &Element) -> Result<Coord, CodecError> {
    let fields = Fields::new(cube, element);
    let shape = fields.shape()?;
    let len = shape.iter().product::<usize>();
    let mut builder = CoordBuilder::new(fields.values("points", "points_checksum", len)?);
    builder.shape(shape).units(fields.units()?);
    if let Some(standard_name) = fields.optional("standard_name") {
        builder.standard_name(standard_name);
    }
    if let Some(long_name) = fields.optional("long_name") {
        builder.long_name(long_name);
    }
    if let Some(var_name) = fields.optional("var_name") {
        builder.var_name(var_name);
    }
    if let Some(value_type) = fields.parse::<DataType>("value_type")? {
        builder.value_type(value_type);
    }
    if let Some(circular) = fields.optional("circular") {
        builder.circular(match circular {
            "True" | "true" => true,
            "False" | "false" => false,
            other => return Err(fields.invalid("circular", other, "expected `True` or `False`")),
        });
    }

    let name = resolve_name(
        fields.optional("standard_name"),
        fields.optional("long_name"),
        fields.optional("var_name"),
    );
    if fields.optional("bounds").is_some() {
        let nbounds: usize = fields.parse("nbounds")?.unwrap_or(2);
        let nbounds_len = len.checked_mul(nbounds).ok_or_else(|| {
            fields.invalid("nbounds", &nbounds.to_string(), "too many bounds for the shape")
        })?;
        let bounds = fields.values("bounds", "bounds_checksum", nbounds_len)?;
        if !bounds.is_elided() && bounds.len() != nbounds_len {
            return Err(CodecError::BoundsMismatch {
                cube: cube.to_string(),
                coord: name.to_string(),
                points: len,
                nbounds,
                found: bounds.len(),
            });
        }
        builder.bounds(bounds).nbounds(nbounds);
        if let Some(bounds_value_type) = fields.parse::<DataType>("bounds_value_type")? {
            builder.bounds_value_type(bounds_value_type);
        }
    }

    for child in &element.children {
        match child.name.as_str() {
            "attributes" => {
                builder.attributes(read_attributes(cube, child)?);
            }
            "geogCS" | "rotatedGeogCS" => {
                builder.coord_system(read_coord_system(cube, child)?);
            }
            _ => return Err(fields.unexpected(child)),
        }
    }

    let coord = builder.build().map_err(|source| CodecError::Coord {
        cube: cube.to_string(),
        source,
    })?;
    if let Some(id) = fields.optional("id") {
        let id = u32::from_str_radix(id, 16).map_err(|err| fields.invalid("id", id, err))?;
        if id != coord.identity() {
            log::warn!(
                "cube `{cube}` coordinate `{}` id {id:08x} does not match its definition {:08x}",
                coord.name(),
                coord.identity()
            );
        }
    }
    Ok(coord)
}

fn read_coords(cube: &mut Cube, name: &str, element: &Element) -> Result<(), CodecError> {
    let parent = Fields::new(name, element);
    for wrapper in &element.children {
        if wrapper.name != "coord" {
            return Err(parent.unexpected(wrapper));
        }
        let fields = Fields::new(name, wrapper);
        let dims = match fields.optional("datadims") {
            Some(value) => {
                parse_dims(value).map_err(|reason| fields.invalid("datadims", value, reason))?
            }
            None => Vec::new(),
        };
        let [child] = wrapper.children.as_slice() else {
            return Err(match wrapper.children.get(1) {
                Some(extra) => fields.unexpected(extra),
                None => fields.missing_element("dimCoord"),
            });
        };
        let result = match child.name.as_str() {
            "dimCoord" => {
                let coord = read_coord(name, child)?;
                let [dim] = dims.as_slice() else {
                    return Err(fields.invalid(
                        "datadims",
                        fields.optional("datadims").unwrap_or_default(),
                        "a dimension coordinate maps to exactly one dimension",
                    ));
                };
                cube.add_dim_coord(coord, *dim)
            }
            "auxCoord" => cube.add_coord(read_coord(name, child)?, &dims),
            _ => return Err(fields.unexpected(child)),
        };
        result.map_err(|source| CodecError::Cube {
            cube: name.to_string(),
            source,
        })?;
    }
    Ok(())
}

fn read_cell_method(cube: &str, element: &Element) -> Result<CellMethod, CodecError> {
    let fields = Fields::new(cube, element);
    let method = fields.required("method")?;
    let mut coord_names = Vec::new();
    let mut intervals = Vec::new();
    let mut comments = Vec::new();
    for child in &element.children {
        let child_fields = Fields::new(cube, child);
        match child.name.as_str() {
            "coord" => {
                coord_names.push(child_fields.required("name")?);
                if let Some(interval) = child_fields.optional("interval") {
                    intervals.push(interval);
                }
            }
            "comment" => comments.push(child_fields.required("value")?),
            _ => return Err(fields.unexpected(child)),
        }
    }
    CellMethod::new(method, coord_names)
        .and_then(|cell_method| cell_method.with_intervals(intervals))
        .map(|cell_method| cell_method.with_comments(comments))
        .map_err(|source| CodecError::CellMethod {
            cube: cube.to_string(),
            source,
        })
}

fn read_data(cube: &str, element: &Element) -> Result<DataDescriptor, CodecError> {
    let fields = Fields::new(cube, element);
    let mut data = DataDescriptor::new(
        fields.shape()?,
        fields.parse_required("dtype")?,
        fields.parse_required("checksum")?,
    )
    .with_byte_order(fields.parse("byteorder")?.unwrap_or_default())
    .with_order(fields.parse("order")?.unwrap_or_default());
    if let Some(checksum) = fields.parse("mask_checksum")? {
        data = data.with_mask(MaskDescriptor {
            checksum,
            order: fields.parse("mask_order")?.unwrap_or_default(),
        });
    }
    Ok(data)
}

fn read_cube(element: &Element) -> Result<Cube, CodecError> {
    let name = resolve_name(
        element.attribute("standard_name"),
        element.attribute("long_name"),
        element.attribute("var_name"),
    )
    .to_string();
    let fields = Fields::new(&name, element);
    let data = element
        .children
        .iter()
        .find(|child| child.name == "data")
        .ok_or_else(|| fields.missing_element("data"))?;

    let mut cube = Cube::new(read_data(&name, data)?);
    cube.set_standard_name(fields.optional("standard_name").map(str::to_string))
        .set_long_name(fields.optional("long_name").map(str::to_string))
        .set_var_name(fields.optional("var_name").map(str::to_string))
        .set_units(fields.units()?);

    for child in &element.children {
        match child.name.as_str() {
            "attributes" => {
                cube.set_attributes(read_attributes(&name, child)?)
                    .map_err(|source| CodecError::Cube {
                        cube: name.clone(),
                        source,
                    })?;
            }
            "coords" => read_coords(&mut cube, &name, child)?,
            "cellMethods" => {
                for cell_method in &child.children {
                    if cell_method.name != "cellMethod" {
                        return Err(Fields::new(&name, child).unexpected(cell_method));
                    }
                    cube.add_cell_method(read_cell_method(&name, cell_method)?);
                }
            }
            "data" => {}
            _ => return Err(fields.unexpected(child)),
        }
    }
    Ok(cube)
}

/// Read a CubeML document.
pub(super) fn read_collection(text: &str) -> Result<CubeCollection, CodecError> {
    let root = parse_document(text)?;
    if root.name != "cubes" {
        return Err(CodecError::UnexpectedRoot(root.name));
    }
    match root.attribute("xmlns") {
        None => return Err(CodecError::MissingNamespace),
        Some(namespace) if namespace != CML_NAMESPACE => {
            return Err(CodecError::InvalidNamespace(namespace.to_string()));
        }
        Some(_) => {}
    }

    let cubes = root
        .children
        .iter()
        .map(|child| {
            if child.name == "cube" {
                read_cube(child)
            } else {
                Err(CodecError::UnexpectedElement {
                    cube: String::new(),
                    parent: root.name.clone(),
                    element: child.name.clone(),
                })
            }
        })
        .collect::<Result<CubeCollection, _>>()?;
    log::debug!("read {} cubes from CubeML", cubes.len());
    Ok(cubes)
}
