//! SVG map rendering with plotters.

use geo::{Coord, LineString};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use crate::config::MapConfig;
use crate::error::{FogError, Result};
use crate::geography::{Feature, Geography};
use crate::render::color::{SequentialScale, percent_label};
use crate::station::{Mode, Station};

const STATE_FILL: RGBColor = RGBColor(0xf2, 0xf2, 0xf2);
const STATE_STROKE: RGBColor = RGBColor(0x44, 0x44, 0x44);
const COUNTY_FILL: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);
const COUNTY_STROKE: RGBColor = RGBColor(0x88, 0x88, 0x88);
const CAPTION: RGBColor = RGBColor(0x00, 0x8b, 0x8b);

fn render_err<E: std::fmt::Display>(e: E) -> FogError {
    FogError::Render(e.to_string())
}

fn pixel(c: &Coord<f64>, offset: (i32, i32)) -> (i32, i32) {
    (
        c.x.round() as i32 + offset.0,
        c.y.round() as i32 + offset.1,
    )
}

fn ring_pixels(ring: &LineString<f64>, offset: (i32, i32)) -> Vec<(i32, i32)> {
    ring.coords().map(|c| pixel(c, offset)).collect()
}

/// Marker outline per mode, so the current classification stays visible.
fn mode_stroke(mode: Mode) -> ShapeStyle {
    match mode {
        Mode::None => RGBColor(0x55, 0x55, 0x55).stroke_width(1),
        Mode::Fog => RGBColor(0xff, 0x8c, 0x00).stroke_width(3),
        Mode::Dense => RGBColor(0xd7, 0x19, 0x1c).stroke_width(3),
    }
}

fn draw_polygons<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    geography: &Geography,
    features: &[Feature],
    fill: RGBColor,
    stroke: RGBColor,
    offset: (i32, i32),
) -> Result<()> {
    for feature in features {
        let projected = geography.projection.project_polygons(&feature.geometry);
        for polygon in projected.iter() {
            let exterior = ring_pixels(polygon.exterior(), offset);
            area.draw(&Polygon::new(exterior.clone(), fill.filled()))
                .map_err(render_err)?;
            area.draw(&PathElement::new(exterior, stroke.stroke_width(1)))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

/// Draws the full map into `area`.
pub fn draw_map<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    geography: &Geography,
    stations: &[Station],
    qualifying_days: usize,
    config: &MapConfig,
) -> Result<()> {
    area.fill(&WHITE).map_err(render_err)?;

    let offset = (config.margin.left as i32, config.margin.top as i32);

    draw_polygons(
        area,
        geography,
        &geography.states,
        STATE_FILL,
        STATE_STROKE,
        offset,
    )?;
    draw_polygons(
        area,
        geography,
        &geography.counties,
        COUNTY_FILL,
        COUNTY_STROKE,
        offset,
    )?;

    let mesh = geography.projection.project_lines(&geography.mesh);
    for line in mesh.iter() {
        area.draw(&PathElement::new(
            ring_pixels(line, offset),
            WHITE.stroke_width(1),
        ))
        .map_err(render_err)?;
    }

    let scale = SequentialScale::new(config.color_domain_max);
    let label_font = ("sans-serif", 12).into_font().color(&BLACK);
    let value_font = ("sans-serif", 11).into_font().color(&RGBColor(0x33, 0x33, 0x33));
    let dx = config.label_offset;
    let r = config.marker_radius as i32;

    for station in stations {
        let (x, y) = pixel(
            &geography.projection.project(station.lon, station.lat),
            offset,
        );

        area.draw(&Text::new(station.id.clone(), (x + dx, y - 12), label_font.clone()))
            .map_err(render_err)?;
        area.draw(&Text::new(
            percent_label(station.val),
            (x + dx, y - 2),
            value_font.clone(),
        ))
        .map_err(render_err)?;

        area.draw(&Circle::new((x, y), r, scale.color(station.val).filled()))
            .map_err(render_err)?;
        area.draw(&Circle::new((x, y), r, mode_stroke(station.mode)))
            .map_err(render_err)?;
    }

    let caption_x = 10;
    let caption_y = config.height as i32 - config.margin.bottom as i32 - 10;
    area.draw(&Text::new(
        "Days in database:",
        (caption_x, caption_y),
        ("sans-serif", 16).into_font().color(&CAPTION),
    ))
    .map_err(render_err)?;
    area.draw(&Text::new(
        format!("{qualifying_days} days"),
        (caption_x, caption_y + 22),
        ("sans-serif", 30).into_font().color(&CAPTION),
    ))
    .map_err(render_err)?;

    area.present().map_err(render_err)?;
    debug!(stations = stations.len(), qualifying_days, "Map drawn");
    Ok(())
}

/// Renders the map to an SVG document.
pub fn render_svg(
    geography: &Geography,
    stations: &[Station],
    qualifying_days: usize,
    config: &MapConfig,
) -> Result<String> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (config.width, config.height))
            .into_drawing_area();
        draw_map(&root, geography, stations, qualifying_days, config)?;
    }
    Ok(buf)
}
