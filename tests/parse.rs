use roadbook_rs::error::ParseError;
use roadbook_rs::pipeline::parse::{parse_document, parse_segments, parse_waypoints};

const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="46.5010" lon="7.9010"><name>Hut</name></wpt>
  <wpt lat="46.5020" lon="7.9020"><cmt>  spring  </cmt></wpt>
  <trk><name>Test Hike</name>
    <trkseg>
      <trkpt lat="46.5000" lon="7.9000"><ele>1500.0</ele></trkpt>
      <trkpt lat="46.5005" lon="7.9005"></trkpt>
      <trkpt lat="bogus" lon="7.9007"><ele>1510.0</ele></trkpt>
      <trkpt lat="46.5010" lon="7.9010"><ele>1520.0</ele><name>Col</name></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="46.6000" lon="7.9500"><ele>1600.0</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="46.7000" lon="7.9600"><ele>abc</ele></trkpt>
      <trkpt lat="46.7010" lon="7.9610"/>
    </trkseg>
  </trk>
  <rte>
    <rtept lat="46.5003" lon="7.9003"><name>Bridge</name></rtept>
  </rte>
</gpx>"#;

const ROUTE_ONLY: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="planner">
  <rte>
    <rtept lat="45.0" lon="6.0"><ele>800</ele><name>Parking</name></rtept>
    <rtept lat="45.01" lon="6.01"><ele>900</ele></rtept>
    <rtept lat="45.02" lon="6.02"><sym>Summit</sym></rtept>
  </rte>
</gpx>"#;

#[test]
fn track_segments_keep_order_and_drop_short_ones() {
    let segments = parse_segments(TWO_SEGMENTS.as_bytes()).expect("segments");

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].len(), 3);
    assert_eq!(segments[0][0].elevation, Some(1500.0));
    assert_eq!(segments[0][1].elevation, None);
    assert_eq!(segments[0][2].lat, 46.5010);
    assert_eq!(segments[1].len(), 2);
    assert_eq!(segments[1][0].elevation, None);
    assert_eq!(segments[1][1].lon, 7.9610);
}

#[test]
fn waypoints_come_from_wpt_then_rtept_then_named_trkpt() {
    let waypoints = parse_waypoints(TWO_SEGMENTS.as_bytes()).expect("waypoints");
    let names: Vec<&str> = waypoints.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["Hut", "spring", "Bridge", "Col"]);
}

#[test]
fn route_points_are_a_fallback_segment() {
    let doc = parse_document(ROUTE_ONLY.as_bytes()).expect("document");
    let segments = doc.segments();

    assert!(!doc.has_track_segments);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].len(), 3);
    assert_eq!(segments[0][2].elevation, None);

    let names: Vec<String> = doc.named_points().into_iter().map(|w| w.name).collect();
    assert_eq!(names, vec!["Parking".to_string(), String::new(), "Summit".to_string()]);
}

#[test]
fn route_points_ignored_when_track_present() {
    let gpx = r#"<gpx>
      <rte><rtept lat="1" lon="1"/><rtept lat="2" lon="2"/></rte>
      <trk><trkseg><trkpt lat="0" lon="0"/></trkseg></trk>
    </gpx>"#;
    assert!(matches!(parse_segments(gpx.as_bytes()), Err(ParseError::NoSegments)));
}

#[test]
fn empty_file_has_no_segments() {
    let gpx = r#"<gpx version="1.1"></gpx>"#;
    assert!(matches!(parse_segments(gpx.as_bytes()), Err(ParseError::NoSegments)));
}

#[test]
fn malformed_xml_is_rejected() {
    let gpx = r#"<gpx><trk><trkseg></trk></gpx>"#;
    assert!(matches!(parse_document(gpx.as_bytes()), Err(ParseError::InvalidGpx(_))));
}
