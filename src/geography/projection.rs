//! Albers conic equal-area projection fitted to a pixel extent.
//!
//! Uses the lower-48 parameters of the usual US Albers map: standard
//! parallels 29.5°N and 45.5°N, central meridian 96°W.

use geo::{BoundingRect, Coord, MapCoords, MultiLineString, MultiPolygon, Rect};

use crate::error::{FogError, Result};
use crate::geography::topology::Feature;

/// Unscaled conic equal-area projection; output y grows northward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersConic {
    n: f64,
    c: f64,
    r0: f64,
    central_meridian: f64,
}

impl AlbersConic {
    pub fn new(parallels: (f64, f64), central_meridian: f64) -> Self {
        let sy0 = parallels.0.to_radians().sin();
        let sy1 = parallels.1.to_radians().sin();
        let n = (sy0 + sy1) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;
        Self {
            n,
            c,
            r0,
            central_meridian,
        }
    }

    pub fn usa() -> Self {
        Self::new((29.5, 45.5), -96.0)
    }

    pub fn project(&self, lon: f64, lat: f64) -> Coord<f64> {
        let lambda = (lon - self.central_meridian).to_radians();
        let phi = lat.to_radians();
        let r = (self.c - 2.0 * self.n * phi.sin()).sqrt() / self.n;
        let theta = lambda * self.n;
        Coord {
            x: r * theta.sin(),
            y: self.r0 - r * theta.cos(),
        }
    }
}

/// A projection scaled and translated so that a set of features fills a
/// `width` x `height` pixel box. Screen y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedProjection {
    raw: AlbersConic,
    scale: f64,
    translate: (f64, f64),
}

impl FittedProjection {
    /// Fits `raw` to the bounds of `features`, centring them in the box.
    ///
    /// # Errors
    ///
    /// [`FogError::Topology`] when the features have no extent to fit.
    pub fn fit_size(raw: AlbersConic, size: (f64, f64), features: &[Feature]) -> Result<Self> {
        let bounds = features
            .iter()
            .filter_map(|f| project_raw(&raw, &f.geometry).bounding_rect())
            .reduce(union);

        let rect = bounds.ok_or_else(|| FogError::Topology {
            reason: "cannot fit projection to an empty feature set".to_string(),
        })?;

        let (w, h) = size;
        let dx = rect.width();
        let dy = rect.height();
        if dx <= 0.0 && dy <= 0.0 {
            return Err(FogError::Topology {
                reason: "cannot fit projection to a degenerate extent".to_string(),
            });
        }

        let kx = if dx > 0.0 { w / dx } else { f64::INFINITY };
        let ky = if dy > 0.0 { h / dy } else { f64::INFINITY };
        let scale = kx.min(ky);

        let min = rect.min();
        let max = rect.max();
        let translate = (
            (w - scale * (min.x + max.x)) / 2.0,
            (h + scale * (min.y + max.y)) / 2.0,
        );

        Ok(Self {
            raw,
            scale,
            translate,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Pixel position of a longitude/latitude pair.
    pub fn project(&self, lon: f64, lat: f64) -> Coord<f64> {
        let p = self.raw.project(lon, lat);
        Coord {
            x: self.translate.0 + self.scale * p.x,
            y: self.translate.1 - self.scale * p.y,
        }
    }

    pub fn project_polygons(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|c| self.project(c.x, c.y))
    }

    pub fn project_lines(&self, geometry: &MultiLineString<f64>) -> MultiLineString<f64> {
        geometry.map_coords(|c| self.project(c.x, c.y))
    }
}

fn project_raw(raw: &AlbersConic, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry.map_coords(|c| raw.project(c.x, c.y))
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn square(lon0: f64, lat0: f64, size: f64) -> Feature {
        let ring = LineString::from(vec![
            (lon0, lat0),
            (lon0 + size, lat0),
            (lon0 + size, lat0 + size),
            (lon0, lat0 + size),
            (lon0, lat0),
        ]);
        Feature {
            id: None,
            geometry: MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    #[test]
    fn test_central_meridian_projects_to_x_zero() {
        let p = AlbersConic::usa().project(-96.0, 38.0);
        assert!(p.x.abs() < 1e-12);
    }

    #[test]
    fn test_east_is_right_north_is_up() {
        let raw = AlbersConic::usa();
        let a = raw.project(-98.0, 30.0);
        let b = raw.project(-97.0, 30.0);
        let c = raw.project(-98.0, 31.0);
        assert!(b.x > a.x);
        assert!(c.y > a.y);
    }

    #[test]
    fn test_fit_size_fills_box() {
        let features = vec![square(-100.0, 28.0, 3.0)];
        let fitted = FittedProjection::fit_size(AlbersConic::usa(), (760.0, 540.0), &features)
            .unwrap();

        let projected = fitted.project_polygons(&features[0].geometry);
        let rect = projected.bounding_rect().unwrap();

        assert!(rect.min().x >= -1e-6 && rect.min().y >= -1e-6);
        assert!(rect.max().x <= 760.0 + 1e-6 && rect.max().y <= 540.0 + 1e-6);
        // One dimension touches both edges.
        let fills_x = (rect.width() - 760.0).abs() < 1e-6;
        let fills_y = (rect.height() - 540.0).abs() < 1e-6;
        assert!(fills_x || fills_y);
    }

    #[test]
    fn test_screen_y_grows_south() {
        let features = vec![square(-100.0, 28.0, 3.0)];
        let fitted = FittedProjection::fit_size(AlbersConic::usa(), (760.0, 540.0), &features)
            .unwrap();
        let north = fitted.project(-98.5, 30.5);
        let south = fitted.project(-98.5, 29.0);
        assert!(south.y > north.y);
    }

    #[test]
    fn test_fit_size_empty_is_error() {
        assert!(FittedProjection::fit_size(AlbersConic::usa(), (100.0, 100.0), &[]).is_err());
    }
}
