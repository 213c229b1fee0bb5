//! Geographic helpers for a Web Mercator (EPSG:3857) viewport.
//!
//! Scales follow the standard 256px tiling scheme: zoom 0 is 1:591,657,527.59
//! and every level halves the scale denominator.
use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis used by spherical mercator.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

pub const TILE_SIZE_PX: f64 = 256.0;

/// Scale denominator at zoom level 0.
pub const ZOOM0_SCALE: f64 = 591_657_527.591_555;

/// Ground resolution at zoom level 0, in meters per pixel at the equator.
pub const ZOOM0_RESOLUTION: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M / TILE_SIZE_PX;

/// Latitude where mercator y reaches the square world bounds.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        LatLng {
            latitude,
            longitude,
        }
    }

    /// Build from a `[longitude, latitude]` pair, the order map centers are
    /// usually written in.
    pub const fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        LatLng {
            latitude,
            longitude,
        }
    }

    pub fn to_web_mercator(self) -> WebMercator {
        let lat = self.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        WebMercator {
            x: EARTH_RADIUS_M * self.longitude.to_radians(),
            y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
        }
    }
}

/// Projected coordinate in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WebMercator {
    pub x: f64,
    pub y: f64,
}

impl WebMercator {
    pub fn to_lat_lng(self) -> LatLng {
        let lon = (self.x / EARTH_RADIUS_M).to_degrees();
        let lat = (2.0 * (self.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        LatLng::new(lat, lon)
    }
}

/// Axis-aligned box in Web Mercator meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn contains(&self, p: WebMercator) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    pub fn center(&self) -> WebMercator {
        WebMercator {
            x: (self.xmin + self.xmax) / 2.0,
            y: (self.ymin + self.ymax) / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Scale denominator for a (possibly fractional) zoom level.
pub fn scale_for_zoom(zoom: f64) -> f64 {
    ZOOM0_SCALE / 2f64.powf(zoom)
}

/// Inverse of [`scale_for_zoom`]. `None` for non-positive or non-finite scales.
pub fn zoom_for_scale(scale: f64) -> Option<f64> {
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    Some((ZOOM0_SCALE / scale).log2())
}

/// Meters per screen pixel at `zoom`.
pub fn resolution_for_zoom(zoom: f64) -> f64 {
    ZOOM0_RESOLUTION / 2f64.powf(zoom)
}

/// Geographic position under a screen offset from the viewport center.
/// `dx_px` grows east, `dy_px` grows south (screen convention).
pub fn screen_to_lat_lng(center: LatLng, zoom: f64, dx_px: f64, dy_px: f64) -> LatLng {
    let res = resolution_for_zoom(zoom);
    let c = center.to_web_mercator();
    WebMercator {
        x: c.x + dx_px * res,
        y: c.y - dy_px * res,
    }
    .to_lat_lng()
}

/// Screen offset from the viewport center for a geographic position.
/// Inverse of [`screen_to_lat_lng`].
pub fn lat_lng_to_screen(center: LatLng, zoom: f64, point: LatLng) -> (f64, f64) {
    let res = resolution_for_zoom(zoom);
    let c = center.to_web_mercator();
    let p = point.to_web_mercator();
    ((p.x - c.x) / res, (c.y - p.y) / res)
}

/// Popup body for a clicked location, rounded to two decimals.
pub fn format_coordinates(p: LatLng) -> String {
    format!("Latitude: {:.2}, Longitude: {:.2}", p.latitude, p.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE: LatLng = LatLng::new(38.890849, -77.086213);

    #[test]
    fn test_mercator_origin() {
        let m = LatLng::new(0.0, 0.0).to_web_mercator();
        assert!(m.x.abs() < 1e-9);
        assert!(m.y.abs() < 1e-9);
    }

    #[test]
    fn test_mercator_office() {
        let m = OFFICE.to_web_mercator();
        assert!((m.x - (-8_581_197.98)).abs() < 0.1);
        assert!((m.y - 4_706_048.67).abs() < 0.1);
    }

    #[test]
    fn test_mercator_roundtrip() {
        let back = OFFICE.to_web_mercator().to_lat_lng();
        assert!((back.latitude - OFFICE.latitude).abs() < 1e-9);
        assert!((back.longitude - OFFICE.longitude).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_clamps_poles() {
        let m = LatLng::new(90.0, 0.0).to_web_mercator();
        assert!(m.y.is_finite());
    }

    #[test]
    fn test_extent_contains_office() {
        let extent = Extent {
            xmin: -8_582_655.61,
            ymin: 4_704_861.36,
            xmax: -8_578_652.22,
            ymax: 4_707_727.75,
        };
        assert!(extent.contains(OFFICE.to_web_mercator()));
        assert!(!extent.contains(LatLng::new(27.0, -98.0).to_web_mercator()));
        let c = extent.center();
        assert!((c.x - (-8_580_653.915)).abs() < 1e-6);
    }

    #[test]
    fn test_scale_for_zoom_levels() {
        assert!((scale_for_zoom(0.0) - ZOOM0_SCALE).abs() < 1e-6);
        assert!((scale_for_zoom(8.0) - 2_311_162.217).abs() < 0.01);
        assert!((scale_for_zoom(19.0) - 1_128.497).abs() < 0.01);
    }

    #[test]
    fn test_zoom_for_scale_inverse() {
        for z in [0.0, 3.5, 8.0, 11.0, 19.0] {
            let back = zoom_for_scale(scale_for_zoom(z)).unwrap();
            assert!((back - z).abs() < 1e-9);
        }
        assert_eq!(zoom_for_scale(0.0), None);
        assert_eq!(zoom_for_scale(f64::NAN), None);
    }

    #[test]
    fn test_resolution_zoom0() {
        assert!((resolution_for_zoom(0.0) - 156_543.033_928).abs() < 1e-5);
    }

    #[test]
    fn test_screen_offset_roundtrip() {
        let center = LatLng::from_lon_lat(-98.09834411620189, 27.03680088987091);
        let p = screen_to_lat_lng(center, 8.0, 120.0, -75.0);
        let (dx, dy) = lat_lng_to_screen(center, 8.0, p);
        assert!((dx - 120.0).abs() < 1e-6);
        assert!((dy - -75.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_direction() {
        let center = LatLng::new(30.0, -90.0);
        let east_south = screen_to_lat_lng(center, 10.0, 10.0, 10.0);
        assert!(east_south.longitude > center.longitude);
        assert!(east_south.latitude < center.latitude);
        let same = screen_to_lat_lng(center, 10.0, 0.0, 0.0);
        assert!((same.longitude - -90.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(OFFICE), "Latitude: 38.89, Longitude: -77.09");
        assert_eq!(
            format_coordinates(LatLng::new(27.036, -98.098)),
            "Latitude: 27.04, Longitude: -98.10"
        );
    }
}
