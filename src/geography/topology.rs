//! TopoJSON decoding.
//!
//! Supports quantized (delta-encoded) and plain arcs, polygon feature
//! extraction and boundary meshes. Only what the map needs is decoded;
//! point geometries are parsed but never turned into features.

use geo::{Coord, LineString, MultiLineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{FogError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// Feature ids appear as strings in most files and as numbers in some.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Text(String),
    Number(i64),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Text(s) => f.write_str(s),
            FeatureId::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    GeometryCollection { geometries: Vec<TopoGeometry> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    /// `"type": null`, a feature with empty geometry.
    #[serde(skip)]
    Null,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct TopoGeometry {
    pub id: Option<FeatureId>,
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    pub shape: Shape,
}

/// A geometry object before its `type` is resolved; `null` has no tag to
/// dispatch on.
#[derive(Deserialize)]
struct RawGeometry {
    #[serde(default)]
    id: Option<FeatureId>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawGeometry> for TopoGeometry {
    type Error = serde_json::Error;

    fn try_from(raw: RawGeometry) -> std::result::Result<Self, Self::Error> {
        let shape = match raw.kind {
            Some(kind) => {
                let mut fields = raw.rest;
                fields.insert("type".to_string(), serde_json::Value::String(kind));
                serde_json::from_value(serde_json::Value::Object(fields))?
            }
            None => Shape::Null,
        };
        Ok(Self {
            id: raw.id,
            properties: raw.properties,
            shape,
        })
    }
}

impl TopoGeometry {
    pub fn fips(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }

    /// Every arc index referenced by this geometry, children excluded.
    fn arc_refs(&self) -> Vec<i64> {
        match &self.shape {
            Shape::Polygon { arcs } | Shape::MultiLineString { arcs } => {
                arcs.iter().flatten().copied().collect()
            }
            Shape::MultiPolygon { arcs } => arcs.iter().flatten().flatten().copied().collect(),
            Shape::LineString { arcs } => arcs.clone(),
            _ => Vec::new(),
        }
    }
}

/// A polygon feature decoded from a topology object.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, TopoGeometry>,
}

fn arc_slot(index: i64) -> usize {
    if index < 0 { !index as usize } else { index as usize }
}

impl Topology {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn object(&self, name: &str) -> Result<&TopoGeometry> {
        self.objects.get(name).ok_or_else(|| FogError::MissingObject {
            name: name.to_string(),
        })
    }

    /// Absolute coordinates of one arc, undoing quantization if present.
    fn decode_arc(&self, slot: usize) -> Result<Vec<Coord<f64>>> {
        let raw = self.arcs.get(slot).ok_or_else(|| FogError::Topology {
            reason: format!("arc {slot} out of range ({} arcs)", self.arcs.len()),
        })?;

        let mut coords = Vec::with_capacity(raw.len());
        let (mut x, mut y) = (0.0, 0.0);

        for position in raw {
            let [px, py] = match position.as_slice() {
                [px, py, ..] => [*px, *py],
                _ => {
                    return Err(FogError::Topology {
                        reason: format!("arc {slot} has a position with fewer than two values"),
                    });
                }
            };

            let coord = match &self.transform {
                Some(t) => {
                    x += px;
                    y += py;
                    Coord {
                        x: x * t.scale[0] + t.translate[0],
                        y: y * t.scale[1] + t.translate[1],
                    }
                }
                None => Coord { x: px, y: py },
            };
            coords.push(coord);
        }

        Ok(coords)
    }

    /// Joins arcs end to start, reversing those with negative indices.
    fn stitch(&self, indices: &[i64]) -> Result<Vec<Coord<f64>>> {
        let mut points: Vec<Coord<f64>> = Vec::new();

        for &index in indices {
            let mut arc = self.decode_arc(arc_slot(index))?;
            if index < 0 {
                arc.reverse();
            }
            // Consecutive arcs share their junction point.
            if !points.is_empty() {
                points.pop();
            }
            points.extend(arc);
        }

        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Option<Polygon<f64>>> {
        let mut decoded = rings
            .iter()
            .map(|ring| self.stitch(ring).map(LineString::from))
            .collect::<Result<Vec<_>>>()?
            .into_iter();

        Ok(decoded
            .next()
            .map(|exterior| Polygon::new(exterior, decoded.collect())))
    }

    fn to_multi_polygon(&self, geometry: &TopoGeometry) -> Result<Option<MultiPolygon<f64>>> {
        let polygons: Vec<Polygon<f64>> = match &geometry.shape {
            Shape::Polygon { arcs } => self.polygon(arcs)?.into_iter().collect(),
            Shape::MultiPolygon { arcs } => arcs
                .iter()
                .map(|rings| self.polygon(rings))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect(),
            _ => return Ok(None),
        };
        Ok(Some(MultiPolygon::new(polygons)))
    }

    /// Polygon features of the named object whose geometry passes `filter`.
    pub fn features<F>(&self, object: &str, filter: F) -> Result<Vec<Feature>>
    where
        F: Fn(&TopoGeometry) -> bool,
    {
        let mut features = Vec::new();
        for geometry in leaves(self.object(object)?) {
            if !filter(geometry) {
                continue;
            }
            if let Some(mp) = self.to_multi_polygon(geometry)? {
                features.push(Feature {
                    id: geometry.fips(),
                    geometry: mp,
                });
            }
        }
        Ok(features)
    }

    /// Arcs of the named object shared by geometries `a` and `b` for which
    /// `filter(a, b)` holds. An arc used by a single geometry is offered as
    /// `filter(g, g)`.
    pub fn mesh<F>(&self, object: &str, filter: F) -> Result<MultiLineString<f64>>
    where
        F: Fn(&TopoGeometry, &TopoGeometry) -> bool,
    {
        let mut geoms_by_arc: HashMap<usize, Vec<&TopoGeometry>> = HashMap::new();

        for geometry in leaves(self.object(object)?) {
            for index in geometry.arc_refs() {
                let users = geoms_by_arc.entry(arc_slot(index)).or_default();
                if !users.last().is_some_and(|g| std::ptr::eq(*g, geometry)) {
                    users.push(geometry);
                }
            }
        }

        let mut slots: Vec<usize> = geoms_by_arc
            .iter()
            .filter(|(_, users)| match (users.first(), users.last()) {
                (Some(a), Some(b)) => filter(*a, *b),
                _ => false,
            })
            .map(|(slot, _)| *slot)
            .collect();
        slots.sort_unstable();

        let lines = slots
            .into_iter()
            .map(|slot| self.decode_arc(slot).map(LineString::from))
            .collect::<Result<Vec<_>>>()?;

        Ok(MultiLineString::new(lines))
    }
}

/// Non-collection geometries under `root`, depth first.
fn leaves(root: &TopoGeometry) -> Vec<&TopoGeometry> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(g) = stack.pop() {
        match &g.shape {
            Shape::GeometryCollection { geometries } => stack.extend(geometries.iter().rev()),
            Shape::Null => {}
            _ => out.push(g),
        }
    }
    out
}
