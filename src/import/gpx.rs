//! GPX document model and reader.
//!
//! Only the track hierarchy is typed. Everything else in the document is
//! kept as opaque [`XmlElement`]s in its original position so the merged
//! file can be written back without losing data.

use super::ImportError;
use crate::xml::{local_part, parse_document, XmlElement, XmlNode};

/// A parsed GPX document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gpx {
    /// Qualified root name, normally `gpx`
    pub root_name: String,
    /// Root attributes, namespace declarations included
    pub attributes: Vec<(String, String)>,
    /// Root children before the first track (metadata, wpt, rte)
    pub head: Vec<XmlNode>,
    pub tracks: Vec<Track>,
    /// Root children after the first track that are not tracks
    pub tail: Vec<XmlNode>,
}

/// A `trk` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    pub element_name: String,
    pub attributes: Vec<(String, String)>,
    /// Non-segment children (name, desc, type, extensions ...)
    pub children: Vec<XmlNode>,
    pub segments: Vec<Segment>,
}

/// A `trkseg` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segment {
    pub element_name: String,
    pub attributes: Vec<(String, String)>,
    pub points: Vec<TrackPoint>,
    /// Non-point children, written after the points
    pub trailing: Vec<XmlNode>,
}

/// A `trkpt` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackPoint {
    pub element_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Attributes other than lat/lon
    pub attributes: Vec<(String, String)>,
    /// Children except `extensions`, in document order (ele, time, ...)
    pub children: Vec<XmlNode>,
    /// Content of the point's `extensions` element
    pub extensions: Vec<XmlNode>,
}

impl Gpx {
    /// All track points across tracks and segments, in document order.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .flat_map(|s| s.points.iter())
    }

    pub fn point_count(&self) -> usize {
        self.points().count()
    }

    /// Root attribute by qualified name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Prefix to use for elements in `uri`, declaring it on the root if
    /// needed.
    ///
    /// An existing prefix bound to `uri` is reused. Otherwise `preferred`
    /// is declared, or `preferred1`, `preferred2` ... if taken.
    pub fn ensure_namespace(&mut self, uri: &str, preferred: &str) -> String {
        let bound = self.attributes.iter().find_map(|(k, v)| {
            k.strip_prefix("xmlns:")
                .filter(|_| v == uri)
                .map(str::to_string)
        });
        if let Some(prefix) = bound {
            return prefix;
        }

        let mut prefix = preferred.to_string();
        let mut n = 0;
        while self.attribute(&format!("xmlns:{}", prefix)).is_some() {
            n += 1;
            prefix = format!("{}{}", preferred, n);
        }

        self.attributes
            .push((format!("xmlns:{}", prefix), uri.to_string()));
        prefix
    }
}

impl Track {
    /// Track name, if it has one.
    pub fn name(&self) -> Option<String> {
        child_text(&self.children, "name")
    }
}

impl TrackPoint {
    /// Raw `time` text of the point.
    pub fn time(&self) -> Option<String> {
        child_text(&self.children, "time").filter(|t| !t.trim().is_empty())
    }

    /// Append an extension block. Existing blocks are kept.
    pub fn push_extension(&mut self, block: XmlElement) {
        self.extensions.push(XmlNode::Element(block));
    }

    /// Extension blocks with the given local name.
    pub fn extension_blocks<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.extensions.iter().filter_map(move |node| match node {
            XmlNode::Element(e) if e.local_name() == local_name => Some(e),
            _ => None,
        })
    }
}

fn child_text(children: &[XmlNode], local_name: &str) -> Option<String> {
    children.iter().find_map(|node| match node {
        XmlNode::Element(e) if e.local_name() == local_name => Some(e.text()),
        _ => None,
    })
}

/// Parse GPX content into the document model.
pub fn parse_gpx(content: &str) -> Result<Gpx, ImportError> {
    let root = parse_document(content)?;

    if root.local_name() != "gpx" {
        return Err(ImportError::ParseError(format!(
            "expected <gpx> root, found <{}>",
            root.name
        )));
    }

    let mut gpx = Gpx {
        root_name: root.name,
        attributes: root.attributes,
        ..Default::default()
    };

    for node in root.children {
        match node {
            XmlNode::Element(e) if e.local_name() == "trk" => {
                gpx.tracks.push(parse_track(e)?);
            }
            other if gpx.tracks.is_empty() => gpx.head.push(other),
            other => gpx.tail.push(other),
        }
    }

    Ok(gpx)
}

fn parse_track(element: XmlElement) -> Result<Track, ImportError> {
    let mut track = Track {
        element_name: element.name,
        attributes: element.attributes,
        ..Default::default()
    };

    for node in element.children {
        match node {
            XmlNode::Element(e) if e.local_name() == "trkseg" => {
                track.segments.push(parse_segment(e)?);
            }
            other => track.children.push(other),
        }
    }

    Ok(track)
}

fn parse_segment(element: XmlElement) -> Result<Segment, ImportError> {
    let mut segment = Segment {
        element_name: element.name,
        attributes: element.attributes,
        ..Default::default()
    };

    for node in element.children {
        match node {
            XmlNode::Element(e) if e.local_name() == "trkpt" => {
                segment.points.push(parse_point(e)?);
            }
            other => segment.trailing.push(other),
        }
    }

    Ok(segment)
}

fn parse_coordinate(element: &XmlElement, key: &str) -> Result<f64, ImportError> {
    let raw = element.attribute(key).ok_or_else(|| {
        ImportError::ParseError(format!("<{}> without {} attribute", element.name, key))
    })?;
    raw.trim()
        .parse()
        .map_err(|_| ImportError::ParseError(format!("invalid {} value: {:?}", key, raw)))
}

fn parse_point(element: XmlElement) -> Result<TrackPoint, ImportError> {
    let latitude = parse_coordinate(&element, "lat")?;
    let longitude = parse_coordinate(&element, "lon")?;

    let mut point = TrackPoint {
        element_name: element.name,
        latitude,
        longitude,
        attributes: element
            .attributes
            .into_iter()
            .filter(|(k, _)| k != "lat" && k != "lon")
            .collect(),
        ..Default::default()
    };

    for node in element.children {
        match node {
            XmlNode::Element(e) if local_part(&e.name) == "extensions" => {
                point.extensions.extend(e.children);
            }
            other => point.children.push(other),
        }
    }

    Ok(point)
}
