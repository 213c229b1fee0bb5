use popmap_shared::geo::{self, LatLng};
use popmap_shared::models::Viewpoint;

/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Offset of a container pixel from the container's center, which is where
/// the view center is drawn.
pub fn container_to_center_offset(x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
    (x - width / 2.0, y - height / 2.0)
}

/// Geographic position under a container pixel. `None` for a collapsed container.
pub fn container_px_to_lat_lng(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    center: LatLng,
    zoom: f64,
) -> Option<LatLng> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let (dx, dy) = container_to_center_offset(x, y, width, height);
    Some(geo::screen_to_lat_lng(center, zoom, dx, dy))
}

/// Container pixel where `point` is drawn.
pub fn lat_lng_to_container_px(
    point: LatLng,
    width: f64,
    height: f64,
    center: LatLng,
    zoom: f64,
) -> (f64, f64) {
    let (dx, dy) = geo::lat_lng_to_screen(center, zoom, point);
    (dx + width / 2.0, dy + height / 2.0)
}

/// Resolve a click to a geographic position using the live container rect.
pub fn click_to_lat_lng(
    client_x: f64,
    client_y: f64,
    container_id: &str,
    center: LatLng,
    zoom: f64,
) -> Option<LatLng> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();
    let (x, y) = client_to_container(client_x, client_y, rect.left(), rect.top());
    container_px_to_lat_lng(x, y, rect.width(), rect.height(), center, zoom)
}

/// New view center after dragging the map by `(dx, dy)` screen pixels.
pub fn pan_center(center: LatLng, zoom: f64, dx_px: f64, dy_px: f64) -> LatLng {
    geo::screen_to_lat_lng(center, zoom, -dx_px, -dy_px)
}

/// New view center for a zoom change that keeps the point under the cursor fixed.
/// `offset` is the cursor's offset from the container center.
pub fn zoom_center_at_cursor(
    center: LatLng,
    old_zoom: f64,
    new_zoom: f64,
    offset: (f64, f64),
) -> LatLng {
    let anchor = geo::screen_to_lat_lng(center, old_zoom, offset.0, offset.1);
    geo::screen_to_lat_lng(anchor, new_zoom, -offset.0, -offset.1)
}

/// Viewpoint `t` of the way from `from` to `to`, interpolated in mercator
/// space so the flight path stays straight on screen.
pub fn interpolate_viewpoint(from: Viewpoint, to: Viewpoint, t: f64) -> Viewpoint {
    let t = t.clamp(0.0, 1.0);
    let a = from.center.to_web_mercator();
    let b = to.center.to_web_mercator();
    let center = geo::WebMercator {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
    .to_lat_lng();
    Viewpoint {
        center,
        zoom: from.zoom + (to.zoom - from.zoom) * t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DC: LatLng = LatLng::new(38.91, -77.03);

    fn close(a: LatLng, b: LatLng) -> bool {
        (a.latitude - b.latitude).abs() < 1e-9 && (a.longitude - b.longitude).abs() < 1e-9
    }

    #[test]
    fn test_client_to_container() {
        assert_eq!(client_to_container(150.0, 90.0, 100.0, 40.0), (50.0, 50.0));
    }

    #[test]
    fn test_container_center_is_view_center() {
        let p = container_px_to_lat_lng(400.0, 300.0, 800.0, 600.0, DC, 11.0).unwrap();
        assert!(close(p, DC));
    }

    #[test]
    fn test_collapsed_container_has_no_position() {
        assert!(container_px_to_lat_lng(0.0, 0.0, 0.0, 600.0, DC, 11.0).is_none());
        assert!(container_px_to_lat_lng(0.0, 0.0, 800.0, 0.0, DC, 11.0).is_none());
    }

    #[test]
    fn test_container_round_trip() {
        let p = container_px_to_lat_lng(620.0, 85.0, 800.0, 600.0, DC, 13.0).unwrap();
        let (x, y) = lat_lng_to_container_px(p, 800.0, 600.0, DC, 13.0);
        assert!((x - 620.0).abs() < 1e-6);
        assert!((y - 85.0).abs() < 1e-6);
    }

    #[test]
    fn test_right_and_down_is_east_and_south() {
        let p = container_px_to_lat_lng(500.0, 400.0, 800.0, 600.0, DC, 11.0).unwrap();
        assert!(p.longitude > DC.longitude);
        assert!(p.latitude < DC.latitude);
    }

    #[test]
    fn test_pan_moves_center_opposite_to_drag() {
        let c = pan_center(DC, 11.0, 100.0, 0.0);
        assert!(c.longitude < DC.longitude);
        let back = pan_center(c, 11.0, -100.0, 0.0);
        assert!(close(back, DC));
    }

    #[test]
    fn test_zoom_keeps_cursor_anchor() {
        let offset = (120.0, -80.0);
        let anchor = geo::screen_to_lat_lng(DC, 10.0, offset.0, offset.1);
        let new_center = zoom_center_at_cursor(DC, 10.0, 12.0, offset);
        let (dx, dy) = geo::lat_lng_to_screen(new_center, 12.0, anchor);
        assert!((dx - offset.0).abs() < 1e-6);
        assert!((dy - offset.1).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_at_center_keeps_center() {
        assert!(close(zoom_center_at_cursor(DC, 8.0, 15.0, (0.0, 0.0)), DC));
    }

    #[test]
    fn test_interpolate_viewpoint_endpoints_and_clamp() {
        let from = Viewpoint { center: DC, zoom: 11.0 };
        let to = Viewpoint {
            center: LatLng::new(27.5, -98.5),
            zoom: 8.0,
        };
        let start = interpolate_viewpoint(from, to, 0.0);
        let end = interpolate_viewpoint(from, to, 1.0);
        assert!(close(start.center, from.center));
        assert!(close(end.center, to.center));
        assert_eq!(end.zoom, 8.0);
        assert_eq!(interpolate_viewpoint(from, to, 2.0).zoom, 8.0);

        let mid = interpolate_viewpoint(from, to, 0.5);
        assert_eq!(mid.zoom, 9.5);
        assert!(mid.center.longitude > to.center.longitude);
        assert!(mid.center.longitude < from.center.longitude);
    }
}
