//! GPX serialization of the merged document.

use super::ExportError;
use crate::import::gpx::{Gpx, Segment, Track, TrackPoint};
use crate::xml::{write_document, XmlElement, XmlNode};
use std::path::Path;

/// Serialize a GPX document to a string.
pub fn write_gpx(gpx: &Gpx) -> Result<String, ExportError> {
    let root = gpx_element(gpx);
    write_document(&root).map_err(|e| ExportError::XmlError(e.to_string()))
}

/// Serialize a GPX document and write it to `path`.
pub fn save_gpx(gpx: &Gpx, path: &Path) -> Result<(), ExportError> {
    let content = write_gpx(gpx)?;
    std::fs::write(path, content)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn gpx_element(gpx: &Gpx) -> XmlElement {
    let mut root = XmlElement::new(gpx.root_name.as_str());
    root.attributes = gpx.attributes.clone();
    root.children.extend(gpx.head.iter().cloned());
    root.children.extend(
        gpx.tracks
            .iter()
            .map(|t| XmlNode::Element(track_element(t))),
    );
    root.children.extend(gpx.tail.iter().cloned());
    root
}

fn track_element(track: &Track) -> XmlElement {
    let mut element = XmlElement::new(track.element_name.as_str());
    element.attributes = track.attributes.clone();
    element.children.extend(track.children.iter().cloned());
    element.children.extend(
        track
            .segments
            .iter()
            .map(|s| XmlNode::Element(segment_element(s))),
    );
    element
}

fn segment_element(segment: &Segment) -> XmlElement {
    let mut element = XmlElement::new(segment.element_name.as_str());
    element.attributes = segment.attributes.clone();
    element.children.extend(
        segment
            .points
            .iter()
            .map(|p| XmlNode::Element(point_element(p))),
    );
    element.children.extend(segment.trailing.iter().cloned());
    element
}

fn point_element(point: &TrackPoint) -> XmlElement {
    let mut element = XmlElement::new(point.element_name.as_str());
    element.set_attribute("lat", &point.latitude.to_string());
    element.set_attribute("lon", &point.longitude.to_string());
    element.attributes.extend(point.attributes.iter().cloned());
    element.children.extend(point.children.iter().cloned());

    // Schema order puts extensions last.
    if !point.extensions.is_empty() {
        let mut extensions = XmlElement::new(extensions_name(&point.element_name));
        extensions.children = point.extensions.clone();
        element.push(extensions);
    }

    element
}

/// `extensions`, carrying the point's prefix if it has one.
fn extensions_name(point_name: &str) -> String {
    match point_name.rsplit_once(':') {
        Some((prefix, _)) => format!("{}:extensions", prefix),
        None => "extensions".to_string(),
    }
}
