//! Boundary geometry for the map: state outline, county subset, the mesh of
//! shared county borders, and a projection fitted to the counties.

pub mod fips;
pub mod projection;
pub mod topology;

pub use projection::{AlbersConic, FittedProjection};
pub use topology::{Feature, TopoGeometry, Topology};

use geo::MultiLineString;
use std::collections::HashSet;
use tracing::info;

use crate::config::MapConfig;
use crate::error::Result;
use fips::{county_code, in_state};

/// Geometry ready for drawing, still in longitude/latitude.
#[derive(Debug, Clone)]
pub struct Geography {
    pub states: Vec<Feature>,
    pub counties: Vec<Feature>,
    pub mesh: MultiLineString<f64>,
    pub projection: FittedProjection,
}

impl Geography {
    /// Extracts the configured state and counties and fits the projection to
    /// the counties inside the map's inner drawing box.
    #[tracing::instrument(skip_all, fields(state = %config.state_fips))]
    pub fn from_topology(topology: &Topology, config: &MapConfig) -> Result<Self> {
        let state = config.state_fips.as_str();
        let allowed: HashSet<&str> = config.counties.iter().map(String::as_str).collect();
        let selected = |g: &TopoGeometry| {
            g.fips()
                .map(|id| county_code(&id))
                .is_some_and(|id| in_state(&id, state) && allowed.contains(id.as_str()))
        };

        let states = topology.features(&config.states_object, |g| {
            g.fips().as_deref() == Some(state)
        })?;
        let counties = topology.features(&config.counties_object, selected)?;
        let mesh = topology.mesh(&config.counties_object, |a, b| {
            !std::ptr::eq(a, b) && selected(a) && selected(b)
        })?;

        let projection =
            FittedProjection::fit_size(AlbersConic::usa(), config.inner_size(), &counties)?;

        info!(
            states = states.len(),
            counties = counties.len(),
            mesh_arcs = mesh.0.len(),
            "Geography prepared"
        );

        Ok(Self {
            states,
            counties,
            mesh,
            projection,
        })
    }
}
