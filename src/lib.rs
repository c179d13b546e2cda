//! Geometry and raster synthesis for survey-to-simulator conversion:
//! local-frame projection, footprint extrusion, road ribbons, elevation
//! grounding, and deterministic procedural textures.
//!
//! ```rust
//! use routeforge::{Building, Config, GeoPoint, RunContext};
//!
//! let mut ctx = RunContext::new(Config::default())?;
//!
//! let origin = GeoPoint::new(48.858, 2.294);
//! let hall = Building::new(
//!     vec![
//!         GeoPoint::new(48.8580, 2.2940),
//!         GeoPoint::new(48.8580, 2.2943),
//!         GeoPoint::new(48.8582, 2.2943),
//!         GeoPoint::new(48.8582, 2.2940),
//!     ],
//!     Some(12.0),
//!     "residential",
//! );
//!
//! let report = ctx.convert(&origin, &[hall], &[]);
//! assert!(report.complete);
//! assert_eq!(report.succeeded(), 1);
//! # Ok::<(), routeforge::ForgeError>(())
//! ```

pub mod elevation;
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod project;
pub mod texture;
pub mod types;

pub use error::{ForgeError, Result};

pub use types::{Building, Config, GeoPoint, LocalPoint, Route};

pub use project::{
    EARTH_RADIUS_METERS, haversine_distance, heading_between, path_length, project, project_all,
};

pub use elevation::{Capabilities, ElevationSource, Sample};

pub use mesh::{
    Face, Mesh, RoadMeshes, build_ribbon, build_road_with_sidewalks, extrude_footprint,
};

pub use texture::{RasterImage, SurfaceKind, encode, synthesize, texture_file_name};

pub use pipeline::{
    CancelFlag, EntityKind, EntityOutcome, EntityOutput, RunContext, RunReport, TextureAsset,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Building, Config, ForgeError, GeoPoint, LocalPoint, Result, Route};

    pub use crate::{RunContext, RunReport};

    pub use crate::{Mesh, build_ribbon, extrude_footprint};

    pub use crate::{ElevationSource, Sample};

    pub use crate::{SurfaceKind, synthesize};
}
