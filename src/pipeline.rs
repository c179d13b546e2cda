//! Per-run conversion pipeline.
//!
//! A `RunContext` owns everything one conversion run needs: the validated
//! configuration, the elevation source (loaded once and memoized), the
//! datum-substitution counter, and a cancellation flag. Nothing is stored in
//! process-wide state, so independent runs never interfere.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;

use crate::elevation::{self, ElevationSource};
use crate::error::Result;
use crate::mesh::{Mesh, RoadMeshes, build_road_with_sidewalks, extrude_footprint};
use crate::project;
use crate::texture::{self, SurfaceKind, texture_file_name};
use crate::types::{Building, Config, GeoPoint, Route};

/// Shared cancellation handle. Cloning yields a handle to the same flag, so
/// a caller can keep one and hand the context the other.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What kind of survey entity an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Building,
    Route,
}

/// Meshes produced for one entity.
#[derive(Debug, Clone)]
pub enum EntityOutput {
    Building(Mesh),
    Road(RoadMeshes),
}

/// Per-entity result: index into the input slice plus either the produced
/// meshes or the error that aborted this entity.
#[derive(Debug)]
pub struct EntityOutcome {
    pub kind: EntityKind,
    pub index: usize,
    pub result: Result<EntityOutput>,
}

/// Report for one conversion run.
///
/// `complete` is false when the run was cancelled mid-way; a partial report
/// must not be treated as a finished artifact.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<EntityOutcome>,
    /// Ground queries that fell back to the datum elevation.
    pub datum_substitutions: u64,
    pub complete: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// One encoded texture ready to be written to the output catalog.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub kind: SurfaceKind,
    pub file_name: String,
    pub data: Bytes,
}

/// Owns the state of one conversion run.
#[derive(Debug)]
pub struct RunContext {
    config: Config,
    elevation: Option<ElevationSource>,
    datum_substitutions: u64,
    cancel: CancelFlag,
}

impl RunContext {
    /// Create a context with a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            elevation: None,
            datum_substitutions: 0,
            cancel: CancelFlag::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle the caller can use to cancel this run from elsewhere.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn datum_substitutions(&self) -> u64 {
        self.datum_substitutions
    }

    pub fn has_elevation(&self) -> bool {
        self.elevation.is_some()
    }

    /// Try to load an elevation source, memoizing it for the rest of the run.
    ///
    /// Failure is not fatal: a missing decoder or an unreadable file is
    /// logged and every later ground query falls back to the datum. Returns
    /// whether a source is now loaded.
    pub fn load_elevation(&mut self, path: &Path) -> bool {
        match elevation::load(path, &self.config) {
            Ok(source) => {
                self.elevation = Some(source);
                true
            }
            Err(e) => {
                log::warn!(
                    "elevation source {} unavailable, using datum {} m: {e}",
                    path.display(),
                    self.config.datum_elevation
                );
                false
            }
        }
    }

    /// Ground elevation at a planar position. Falls back to the datum when
    /// no source is loaded or the source does not cover the position; every
    /// fallback is counted in the run report.
    pub fn ground_elevation(&mut self, x: f64, z: f64) -> f64 {
        let sample = match &self.elevation {
            Some(source) => source.sample_at(x, z, self.config.max_search_radius),
            None => crate::elevation::Sample::Uncovered,
        };
        if sample.is_uncovered() {
            self.datum_substitutions += 1;
        }
        sample.unwrap_or_datum(self.config.datum_elevation)
    }

    /// Convert survey entities into local-frame meshes.
    ///
    /// Structural errors (bad coordinates, degenerate footprints, too-short
    /// routes) abort only the entity that caused them; the run continues and
    /// the report carries one outcome per entity processed. Cancellation is
    /// honored between entities.
    pub fn convert(
        &mut self,
        origin: &GeoPoint,
        buildings: &[Building],
        routes: &[Route],
    ) -> RunReport {
        let mut report = RunReport::default();

        for (index, building) in buildings.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.datum_substitutions = self.datum_substitutions;
                log::info!("run cancelled after {} entities", report.outcomes.len());
                return report;
            }
            let result = self.convert_building(origin, building);
            if let Err(e) = &result {
                log::warn!("building {index} skipped: {e}");
            }
            report.outcomes.push(EntityOutcome {
                kind: EntityKind::Building,
                index,
                result,
            });
        }

        for (index, route) in routes.iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.datum_substitutions = self.datum_substitutions;
                log::info!("run cancelled after {} entities", report.outcomes.len());
                return report;
            }
            let result = self.convert_route(origin, route);
            if let Err(e) = &result {
                log::warn!("route {index} skipped: {e}");
            }
            report.outcomes.push(EntityOutcome {
                kind: EntityKind::Route,
                index,
                result,
            });
        }

        report.datum_substitutions = self.datum_substitutions;
        report.complete = true;
        log::info!(
            "converted {} of {} entities ({} datum substitutions)",
            report.succeeded(),
            report.outcomes.len(),
            report.datum_substitutions
        );
        report
    }

    fn convert_building(&mut self, origin: &GeoPoint, building: &Building) -> Result<EntityOutput> {
        let ring = project::project_all(origin, &building.footprint)?;

        // Ground the footprint at its planar centroid.
        let n = ring.len().max(1) as f64;
        let cx = ring.iter().map(|p| p.x).sum::<f64>() / n;
        let cz = ring.iter().map(|p| p.z).sum::<f64>() / n;
        let base = self.ground_elevation(cx, cz);

        let height = building
            .height
            .unwrap_or(self.config.default_building_height);
        let mesh = extrude_footprint(&ring, height, base)?;
        Ok(EntityOutput::Building(mesh))
    }

    fn convert_route(&mut self, origin: &GeoPoint, route: &Route) -> Result<EntityOutput> {
        let mut path = project::project_all(origin, &route.stops)?;
        for point in &mut path {
            point.y = self.ground_elevation(point.x, point.z);
        }
        let meshes = build_road_with_sidewalks(&path, &self.config)?;
        Ok(EntityOutput::Road(meshes))
    }

    /// Synthesize and encode the full texture catalog.
    ///
    /// An encoding failure loses only that texture; the rest of the catalog
    /// is still produced.
    pub fn synthesize_textures(&self, width: u32, height: u32) -> Vec<TextureAsset> {
        let mut assets = Vec::with_capacity(SurfaceKind::ALL.len());
        for kind in SurfaceKind::ALL {
            let image = texture::synthesize(kind, width, height, self.config.texture_seed);
            match texture::encode(&image) {
                Ok(data) => assets.push(TextureAsset {
                    kind,
                    file_name: texture_file_name(kind),
                    data,
                }),
                Err(e) => log::error!("texture {kind:?} dropped: {e}"),
            }
        }
        assets
    }

    /// Texture catalog at the configured size.
    pub fn synthesize_texture_catalog(&self) -> Vec<TextureAsset> {
        self.synthesize_textures(self.config.texture_size, self.config.texture_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForgeError;

    fn origin() -> GeoPoint {
        GeoPoint::new(48.858, 2.294)
    }

    fn square_building() -> Building {
        // Roughly 20 m x 20 m near the origin.
        Building::new(
            vec![
                GeoPoint::new(48.8580, 2.2940),
                GeoPoint::new(48.8580, 2.2943),
                GeoPoint::new(48.8582, 2.2943),
                GeoPoint::new(48.8582, 2.2940),
            ],
            Some(12.0),
            "residential",
        )
    }

    fn short_route() -> Route {
        Route::new(vec![
            GeoPoint::new(48.8580, 2.2940),
            GeoPoint::new(48.8585, 2.2950),
            GeoPoint::new(48.8590, 2.2960),
        ])
    }

    #[test]
    fn test_convert_produces_one_outcome_per_entity() {
        let mut ctx = RunContext::new(Config::default()).unwrap();
        let report = ctx.convert(&origin(), &[square_building()], &[short_route()]);

        assert!(report.complete);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.succeeded(), 2);
        assert!(matches!(
            report.outcomes[0].result,
            Ok(EntityOutput::Building(_))
        ));
        assert!(matches!(report.outcomes[1].result, Ok(EntityOutput::Road(_))));
    }

    #[test]
    fn test_bad_entity_does_not_abort_run() {
        let degenerate = Building::new(
            vec![GeoPoint::new(48.858, 2.294), GeoPoint::new(48.858, 2.294)],
            None,
            "shed",
        );
        let mut ctx = RunContext::new(Config::default()).unwrap();
        let report = ctx.convert(&origin(), &[degenerate, square_building()], &[]);

        assert!(report.complete);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert!(report.outcomes[0].result.is_err());
        assert!(report.outcomes[1].result.is_ok());
    }

    #[test]
    fn test_invalid_coordinate_is_per_entity() {
        let bad = Building::new(
            vec![
                GeoPoint::new(91.0, 0.0),
                GeoPoint::new(48.0, 2.0),
                GeoPoint::new(48.1, 2.0),
            ],
            None,
            "glitch",
        );
        let mut ctx = RunContext::new(Config::default()).unwrap();
        let report = ctx.convert(&origin(), &[bad], &[]);
        let err = report.outcomes[0].result.as_ref().unwrap_err();
        assert!(matches!(err, ForgeError::InvalidCoordinate(_)));
        assert!(err.is_per_entity());
    }

    #[test]
    fn test_missing_height_uses_default() {
        let building = Building::new(square_building().footprint, None, "residential");
        let mut ctx = RunContext::new(Config::default()).unwrap();
        let report = ctx.convert(&origin(), &[building], &[]);

        let Ok(EntityOutput::Building(mesh)) = &report.outcomes[0].result else {
            panic!("expected building mesh");
        };
        // Default height is 10 m; the roof sits 10 m above the floor.
        let floor_y = mesh.positions[0][1];
        let roof_y = mesh.positions[mesh.vertex_count() / 2][1];
        assert!((f64::from(roof_y - floor_y) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_ground_elevation_counts_datum_fallbacks() {
        let config = Config::default().with_datum_elevation(7.5);
        let mut ctx = RunContext::new(config).unwrap();

        assert!(!ctx.has_elevation());
        assert_eq!(ctx.ground_elevation(0.0, 0.0), 7.5);
        assert_eq!(ctx.ground_elevation(10.0, 10.0), 7.5);
        assert_eq!(ctx.datum_substitutions(), 2);
    }

    #[test]
    fn test_load_elevation_failure_is_nonfatal() {
        let mut ctx = RunContext::new(Config::default()).unwrap();
        assert!(!ctx.load_elevation(Path::new("/nonexistent/dem.xyz")));
        assert!(!ctx.has_elevation());
        assert_eq!(ctx.ground_elevation(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_load_elevation_from_ascii_rows() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.xyz");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "0 0 25.0\n50 50 30.0").unwrap();

        let mut ctx = RunContext::new(Config::default()).unwrap();
        assert!(ctx.load_elevation(&path));
        assert_eq!(ctx.ground_elevation(1.0, 1.0), 25.0);
        assert_eq!(ctx.datum_substitutions(), 0);
    }

    #[test]
    fn test_cancelled_run_is_incomplete() {
        let mut ctx = RunContext::new(Config::default()).unwrap();
        ctx.cancel_flag().cancel();
        let report = ctx.convert(&origin(), &[square_building()], &[short_route()]);

        assert!(!report.complete);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_cancelled_report_carries_substitution_count() {
        let config = Config::default().with_datum_elevation(3.0);
        let mut ctx = RunContext::new(config).unwrap();

        // Two datum fallbacks before the run is cancelled.
        ctx.ground_elevation(0.0, 0.0);
        ctx.ground_elevation(10.0, 10.0);
        ctx.cancel_flag().cancel();

        let report = ctx.convert(&origin(), &[square_building()], &[short_route()]);
        assert!(!report.complete);
        assert_eq!(report.datum_substitutions, 2);
    }

    #[test]
    fn test_texture_catalog_is_complete() {
        let ctx = RunContext::new(Config::default()).unwrap();
        let assets = ctx.synthesize_textures(16, 16);
        assert_eq!(assets.len(), 5);
        for asset in &assets {
            assert!(!asset.data.is_empty());
            assert!(!asset.file_name.is_empty());
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config::default().with_road_width(-1.0);
        assert!(RunContext::new(config).is_err());
    }
}
