use crate::error::ParseError;
use crate::types::plan::Waypoint;
use crate::types::track::{RawPoint, Segment};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Everything the planner needs from a GPX file, collected in one pass.
#[derive(Debug, Clone, Default)]
pub struct GpxDocument {
    /// One entry per `<trkseg>`, in document order, unfiltered.
    pub track_segments: Vec<Segment>,
    /// Whether any `<trkseg>` element was present at all.
    pub has_track_segments: bool,
    /// All `<rtept>` points, in document order.
    pub route_points: Vec<RawPoint>,
    pub waypoints: Vec<Waypoint>,
    pub route_waypoints: Vec<Waypoint>,
    pub named_track_points: Vec<Waypoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointKind {
    Waypoint,
    RoutePoint,
    TrackPoint,
}

impl PointKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "wpt" => Some(PointKind::Waypoint),
            "rtept" => Some(PointKind::RoutePoint),
            "trkpt" => Some(PointKind::TrackPoint),
            _ => None,
        }
    }
}

struct PendingPoint {
    kind: PointKind,
    lat: Option<f64>,
    lon: Option<f64>,
    elevation: Option<f64>,
    name: String,
    comment: String,
    symbol: String,
}

impl PendingPoint {
    fn label(&self) -> String {
        [&self.name, &self.comment, &self.symbol]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

pub fn parse_document(bytes: &[u8]) -> Result<GpxDocument, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);

    let mut doc = GpxDocument::default();
    let mut current_segment: Option<Segment> = None;
    let mut current_point: Option<PendingPoint> = None;
    let mut current_element = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = local_name(&e)?;
                if name == "trkseg" {
                    doc.has_track_segments = true;
                    current_segment = Some(Vec::new());
                } else if let Some(kind) = PointKind::from_tag(&name) {
                    current_point = Some(start_point(kind, &e)?);
                } else if current_point.is_some() {
                    current_element = name;
                }
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e)?;
                if name == "trkseg" {
                    doc.has_track_segments = true;
                    doc.track_segments.push(Vec::new());
                } else if let Some(kind) = PointKind::from_tag(&name) {
                    let point = start_point(kind, &e)?;
                    finish_point(point, &mut doc, current_segment.as_mut());
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(point) = current_point.as_mut() {
                    let text = e
                        .unescape()
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                    apply_text(point, &current_element, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(point) = current_point.as_mut() {
                    let text = String::from_utf8_lossy(&e);
                    apply_text(point, &current_element, &text);
                }
            }
            Ok(Event::End(e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .map_err(|e| ParseError::InvalidGpx(e.to_string()))?
                    .to_string();

                if name == "trkseg" {
                    if let Some(segment) = current_segment.take() {
                        doc.track_segments.push(segment);
                    }
                } else if PointKind::from_tag(&name).is_some() {
                    if let Some(point) = current_point.take() {
                        finish_point(point, &mut doc, current_segment.as_mut());
                    }
                    current_element.clear();
                } else {
                    current_element.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(doc)
}

fn local_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::InvalidGpx(e.to_string()))
}

fn start_point(kind: PointKind, e: &BytesStart<'_>) -> Result<PendingPoint, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match key {
            "lat" => lat = parse_number(value),
            "lon" => lon = parse_number(value),
            _ => {}
        }
    }

    Ok(PendingPoint {
        kind,
        lat,
        lon,
        elevation: None,
        name: String::new(),
        comment: String::new(),
        symbol: String::new(),
    })
}

fn apply_text(point: &mut PendingPoint, element: &str, text: &str) {
    match element {
        "ele" => point.elevation = parse_number(text),
        "name" => point.name.push_str(text),
        "cmt" => point.comment.push_str(text),
        "sym" => point.symbol.push_str(text),
        _ => {}
    }
}

fn finish_point(point: PendingPoint, doc: &mut GpxDocument, segment: Option<&mut Segment>) {
    let (Some(lat), Some(lon)) = (point.lat, point.lon) else {
        return;
    };
    let raw = RawPoint::new(lat, lon, point.elevation);
    let name = point.label();

    match point.kind {
        PointKind::Waypoint => doc.waypoints.push(Waypoint { lat, lon, name }),
        PointKind::RoutePoint => {
            doc.route_points.push(raw);
            doc.route_waypoints.push(Waypoint { lat, lon, name });
        }
        PointKind::TrackPoint => {
            if let Some(segment) = segment {
                segment.push(raw);
            }
            if !name.is_empty() {
                doc.named_track_points.push(Waypoint { lat, lon, name });
            }
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
