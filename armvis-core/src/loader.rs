//! Robot description (URDF) loader.
//!
//! Reads `<link>` and `<joint>` elements in document order into a
//! [`KinematicModel`]. Only the subset needed for visualization is
//! understood; materials, inertials, collisions and vendor extensions are
//! skipped. Any structural problem aborts the whole load.

use std::f64::consts::PI;
use std::path::Path;

use nalgebra::Vector3;
use nom::{
    character::complete::{multispace0, multispace1},
    combinator::all_consuming,
    multi::separated_list1,
    number::complete::double,
    sequence::delimited,
    IResult,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseError;
use crate::model::{
    JointKind, JointLimits, JointSpec, KinematicModel, LinkSpec, Origin, Visual, VisualGeometry,
};

type Result<T> = std::result::Result<T, ParseError>;

/// Load a robot description from disk.
///
/// # Errors
///
/// Returns [`ParseError`] if the file cannot be read, the XML is malformed,
/// or a joint lacks its type, parent or child.
pub fn load(path: impl AsRef<Path>) -> Result<KinematicModel> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)?;
    let model = parse_str(&xml)?;

    tracing::info!(
        path = %path.display(),
        joints = model.joints().len(),
        links = model.links().len(),
        "loaded robot description"
    );
    Ok(model)
}

/// Parse a robot description held in memory.
///
/// # Errors
///
/// Same conditions as [`load`], minus I/O.
pub fn parse_str(xml: &str) -> Result<KinematicModel> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut model: Option<KinematicModel> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"robot" => {
                let name = attribute_opt(e, "name")?;
                model = Some(parse_robot(&mut reader, name)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"robot" => {
                let name = attribute_opt(e, "name")?;
                model = Some(KinematicModel::new(name, Vec::new(), Vec::new()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    model.ok_or_else(|| ParseError::missing_element("robot", "robot description"))
}

fn parse_robot(reader: &mut Reader<&[u8]>, name: Option<String>) -> Result<KinematicModel> {
    let mut joints = Vec::new();
    let mut links = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"link" => links.push(parse_link(reader, e)?),
                    b"joint" => joints.push(parse_joint(reader, e)?),
                    // material, transmission, gazebo, ...
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"link" => links.push(LinkSpec::new(element_label(e, "link")?)),
                b"joint" => {
                    let label = element_label(e, "joint")?;
                    return Err(ParseError::missing_element("parent", format!("joint '{label}'")));
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"robot" => break,
            Ok(Event::Eof) => return Err(ParseError::Xml("unexpected EOF in robot".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(KinematicModel::new(name, joints, links))
}

fn parse_link(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<LinkSpec> {
    let mut link = LinkSpec::new(element_label(start, "link")?);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                if elem_name == b"visual" && link.visual.is_none() {
                    link.visual = parse_visual(reader)?;
                    if link.visual.is_none() {
                        tracing::trace!(link = %link.name, "visual without recognized geometry");
                    }
                } else {
                    skip_element(reader, &elem_name)?;
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"link" => break,
            Ok(Event::Eof) => return Err(ParseError::Xml("unexpected EOF in link".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(link)
}

/// Parse a `<visual>` body. `None` when it declares no usable shape.
fn parse_visual(reader: &mut Reader<&[u8]>) -> Result<Option<Visual>> {
    let mut origin = Origin::identity();
    let mut geometry: Option<VisualGeometry> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"geometry" => geometry = parse_geometry(reader)?,
                    b"origin" => {
                        origin = parse_origin(e)?;
                        skip_element(reader, &elem_name)?;
                    }
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"origin" => {
                origin = parse_origin(e)?;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"visual" => break,
            Ok(Event::Eof) => return Err(ParseError::Xml("unexpected EOF in visual".into())),
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(geometry.map(|geometry| Visual { geometry, origin }))
}

/// Parse a `<geometry>` body, keeping the first cylinder, box or mesh.
fn parse_geometry(reader: &mut Reader<&[u8]>) -> Result<Option<VisualGeometry>> {
    let mut geometry: Option<VisualGeometry> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let (e, is_start) = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(ref e)) if e.name().as_ref() == b"geometry" => break,
            Ok(Event::Eof) => return Err(ParseError::Xml("unexpected EOF in geometry".into())),
            Ok(_) => continue,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        };

        let elem_name = e.name().as_ref().to_vec();
        let shape = match elem_name.as_slice() {
            b"cylinder" => Some(VisualGeometry::Cylinder {
                radius: scalar_attribute(&e, "radius")?,
                length: scalar_attribute(&e, "length")?,
            }),
            b"box" => Some(VisualGeometry::Box {
                size: vector_attribute(&e, "size")?,
            }),
            b"mesh" => Some(VisualGeometry::Mesh {
                filename: attribute_opt(&e, "filename")?.unwrap_or_default(),
            }),
            other => {
                tracing::debug!(
                    shape = %String::from_utf8_lossy(other),
                    "unsupported visual geometry ignored"
                );
                None
            }
        };
        if geometry.is_none() {
            geometry = shape;
        }

        if is_start {
            skip_element(reader, &elem_name)?;
        }
    }

    Ok(geometry)
}

fn parse_joint(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<JointSpec> {
    let name = element_label(start, "joint")?;
    let kind = attribute_opt(start, "type")?
        .map(|t| JointKind::from_type_str(&t))
        .ok_or_else(|| ParseError::missing_attribute("type", format!("joint '{name}'")))?;

    let mut parent: Option<String> = None;
    let mut child: Option<String> = None;
    let mut origin = Origin::identity();
    let mut axis = Vector3::z();
    let mut limits = JointLimits::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let (e, is_start) = match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(ref e)) if e.name().as_ref() == b"joint" => break,
            Ok(Event::Eof) => return Err(ParseError::Xml("unexpected EOF in joint".into())),
            Ok(_) => continue,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        };

        let elem_name = e.name().as_ref().to_vec();
        match elem_name.as_slice() {
            b"parent" => parent = Some(required_attribute(&e, "link")?),
            b"child" => child = Some(required_attribute(&e, "link")?),
            b"origin" => origin = parse_origin(&e)?,
            b"axis" => {
                if attribute_opt(&e, "xyz")?.is_some() {
                    axis = vector_attribute(&e, "xyz")?;
                }
            }
            b"limit" => limits = parse_limit(&e)?,
            _ => {}
        }

        if is_start {
            skip_element(reader, &elem_name)?;
        }
    }

    let parent =
        parent.ok_or_else(|| ParseError::missing_element("parent", format!("joint '{name}'")))?;
    let child =
        child.ok_or_else(|| ParseError::missing_element("child", format!("joint '{name}'")))?;

    Ok(JointSpec::new(name, kind, parent, child)
        .with_origin(origin)
        .with_axis(axis)
        .with_limits(limits))
}

fn parse_origin(e: &BytesStart) -> Result<Origin> {
    let xyz = match attribute_opt(e, "xyz")? {
        Some(_) => vector_attribute(e, "xyz")?,
        None => Vector3::zeros(),
    };
    let rpy = match attribute_opt(e, "rpy")? {
        Some(_) => vector_attribute(e, "rpy")?,
        None => Vector3::zeros(),
    };
    Ok(Origin::new(xyz, rpy))
}

/// Missing bounds fall back to ±π independently.
fn parse_limit(e: &BytesStart) -> Result<JointLimits> {
    let lower = match attribute_opt(e, "lower")? {
        Some(_) => scalar_attribute(e, "lower")?,
        None => -PI,
    };
    let upper = match attribute_opt(e, "upper")? {
        Some(_) => scalar_attribute(e, "upper")?,
        None => PI,
    };
    Ok(JointLimits::new(lower, upper))
}

// ============================================================================
// Attribute helpers
// ============================================================================

/// Name attribute of a link or joint; unnamed elements get an empty name.
fn element_label(e: &BytesStart, kind: &str) -> Result<String> {
    match attribute_opt(e, "name")? {
        Some(name) => Ok(name),
        None => {
            tracing::warn!("{kind} element without a name attribute");
            Ok(String::new())
        }
    }
}

fn attribute_opt(e: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::Xml(err.to_string()))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::Xml(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(e: &BytesStart, name: &'static str) -> Result<String> {
    attribute_opt(e, name)?.ok_or_else(|| ParseError::missing_attribute(name, element_name(e)))
}

fn scalar_attribute(e: &BytesStart, name: &'static str) -> Result<f64> {
    let values = numeric_attribute(e, name)?;
    match values.as_slice() {
        [value] => Ok(*value),
        _ => Err(ParseError::invalid_attribute(
            name,
            element_name(e),
            format!("expected 1 value, got {}", values.len()),
        )),
    }
}

fn vector_attribute(e: &BytesStart, name: &'static str) -> Result<Vector3<f64>> {
    let values = numeric_attribute(e, name)?;
    match values.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(ParseError::invalid_attribute(
            name,
            element_name(e),
            format!("expected 3 values, got {}", values.len()),
        )),
    }
}

fn numeric_attribute(e: &BytesStart, name: &'static str) -> Result<Vec<f64>> {
    let raw = required_attribute(e, name)?;
    parse_numbers(&raw).ok_or_else(|| {
        ParseError::invalid_attribute(name, element_name(e), format!("not a number list: '{raw}'"))
    })
}

/// Whitespace-separated floats, e.g. `"0 0 0.12"`.
fn number_list(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(multispace0, separated_list1(multispace1, double), multispace0)(input)
}

fn parse_numbers(input: &str) -> Option<Vec<f64>> {
    all_consuming(number_list)(input)
        .ok()
        .map(|(_, values)| values)
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

/// Skip an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>, name: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == name => depth += 1,
            Ok(Event::End(ref e)) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => {
                return Err(ParseError::Xml(format!(
                    "unexpected EOF in {}",
                    String::from_utf8_lossy(name)
                )))
            }
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(())
}
