mod gpx;

pub use gpx::{parse_document, GpxDocument};

use crate::error::ParseError;
use crate::types::plan::Waypoint;
use crate::types::track::Segment;

impl GpxDocument {
    /// Usable segments: every `<trkseg>` with at least two points or, when the
    /// file has no track segments at all, the `<rtept>` route as one segment.
    pub fn segments(&self) -> Vec<Segment> {
        if self.has_track_segments {
            self.track_segments
                .iter()
                .filter(|segment| segment.len() >= 2)
                .cloned()
                .collect()
        } else if self.route_points.len() >= 2 {
            vec![self.route_points.clone()]
        } else {
            Vec::new()
        }
    }

    /// Named points in import order: `<wpt>`, then `<rtept>`, then named `<trkpt>`.
    pub fn named_points(&self) -> Vec<Waypoint> {
        self.waypoints
            .iter()
            .chain(&self.route_waypoints)
            .chain(&self.named_track_points)
            .cloned()
            .collect()
    }
}

pub fn parse_segments(bytes: &[u8]) -> Result<Vec<Segment>, ParseError> {
    let segments = parse_document(bytes)?.segments();
    if segments.is_empty() {
        return Err(ParseError::NoSegments);
    }
    Ok(segments)
}

pub fn parse_waypoints(bytes: &[u8]) -> Result<Vec<Waypoint>, ParseError> {
    Ok(parse_document(bytes)?.named_points())
}
