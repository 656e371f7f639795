//! Test scenes: a grid of named blocks plus the tool queries to run against it.
//!
//! Sphere, cylinder and cuboid shapes are given in the grid's cell space, the way a tool hands
//! them to the query engine. Line and point queries take world positions.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use cgmath::{Deg, Euler, Point3, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use toolcore_grid::shape::oriented_box_cell_bounds;
use toolcore_grid::{
    BlockGrid, BlockId, BlockQuery, BuildCheck, Builder, Cylinder, GridFrame, QueryTarget,
    RecordingDraw, Sphere,
};
use toolcore_util::{Bounds, OrientedBox, Timings};

use crate::settings::Settings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub frame: FrameConfig,
    pub blocks: Vec<BlockConfig>,
    #[serde(default)]
    pub projector: Option<ProjectorConfig>,
    /// The player the tool builds for, checked against the world limits.
    #[serde(default)]
    pub builder: Builder,
    pub queries: Vec<QueryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    pub position: Point3<f64>,
    /// Euler angles applied about x, then y, then z.
    #[serde(default = "zero_rotation")]
    pub rotation_degrees: Vector3<f64>,
    pub cell_size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    pub name: String,
    pub min: Point3<i64>,
    /// Defaults to `min` for single-cell blocks.
    #[serde(default)]
    pub max: Option<Point3<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectorConfig {
    /// Names of blocks the projector refuses to build.
    #[serde(default)]
    pub denied: Vec<String>,
    #[serde(default = "default_refusal")]
    pub result: BuildCheck,
}

/// Inclusive range of cells to scan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CellRange {
    pub min: Point3<i64>,
    pub max: Point3<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueryConfig {
    Sphere {
        center: Point3<f64>,
        radius: f64,
        #[serde(default)]
        bounds: Option<CellRange>,
    },
    Cylinder {
        center: Point3<f64>,
        forward: Vector3<f64>,
        radius: f64,
        length: f64,
        #[serde(default)]
        bounds: Option<CellRange>,
    },
    Cuboid {
        center: Point3<f64>,
        half_extents: Vector3<f64>,
        #[serde(default = "zero_rotation")]
        rotation_degrees: Vector3<f64>,
        #[serde(default)]
        bounds: Option<CellRange>,
    },
    Line {
        start: Point3<f64>,
        end: Point3<f64>,
    },
    Point {
        position: Point3<f64>,
    },
}

/// What a single query found.
#[derive(Debug, Clone)]
pub struct QueryReport {
    pub kind: &'static str,
    /// Names of the blocks hit, in the order the query reported them.
    pub hits: Vec<String>,
    /// Whether the world limits let the builder build every block hit.
    pub within_limits: bool,
    /// Debug primitives, when debug drawing is enabled and the query draws.
    pub draw: Option<RecordingDraw>,
}

/// A block grid built from a `SceneConfig`, ready to run its queries.
#[derive(Debug)]
pub struct Scene {
    grid: BlockGrid,
    builder: Builder,
    queries: Vec<QueryConfig>,
}

fn zero_rotation() -> Vector3<f64> {
    Vector3::new(0., 0., 0.)
}

fn default_refusal() -> BuildCheck {
    BuildCheck::NotConnected
}

fn rotation(degrees: Vector3<f64>) -> Quaternion<f64> {
    Quaternion::from(Euler::new(Deg(degrees.x), Deg(degrees.y), Deg(degrees.z)))
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0., 0., 0.),
            rotation_degrees: zero_rotation(),
            cell_size: 1.,
        }
    }
}

impl CellRange {
    pub fn bounds(self) -> Bounds<i64> {
        Bounds::from_inclusive(self.min, self.max)
    }
}

impl QueryConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryConfig::Sphere { .. } => "sphere",
            QueryConfig::Cylinder { .. } => "cylinder",
            QueryConfig::Cuboid { .. } => "cuboid",
            QueryConfig::Line { .. } => "line",
            QueryConfig::Point { .. } => "point",
        }
    }
}

impl Scene {
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading scene from {:?}", path);
        let file = std::fs::File::open(path).context("Opening scene file")?;
        let config: SceneConfig = serde_yaml::from_reader(file).context("Parsing scene file")?;
        Self::build(config)
    }

    pub fn build(config: SceneConfig) -> Result<Self> {
        if !(config.frame.cell_size.is_finite() && config.frame.cell_size > 0.) {
            return Err(anyhow!(
                "cell size must be positive, got {}",
                config.frame.cell_size
            ));
        }

        let frame = GridFrame::new(
            config.frame.position,
            rotation(config.frame.rotation_degrees),
            config.frame.cell_size,
        );
        let mut grid = BlockGrid::new(frame);

        for block in &config.blocks {
            grid.place(&block.name, block.min, block.max.unwrap_or(block.min))
                .with_context(|| format!("Placing block {}", block.name))?;
        }

        for query in &config.queries {
            if let QueryConfig::Cuboid { half_extents, .. } = query {
                let valid = |h: f64| h.is_finite() && h >= 0.;
                if !(valid(half_extents.x) && valid(half_extents.y) && valid(half_extents.z)) {
                    return Err(anyhow!("cuboid has invalid half extents {:?}", half_extents));
                }
            }
        }

        if let Some(projector) = &config.projector {
            grid.attach_projector();
            for name in &projector.denied {
                let id = grid
                    .block_by_name(name)
                    .ok_or_else(|| anyhow!("projector denies unknown block {}", name))?;
                grid.set_build_check(id, projector.result)?;
            }
        }

        log::info!(
            "Built scene with {} blocks and {} queries",
            grid.block_count(),
            config.queries.len()
        );

        Ok(Scene {
            grid,
            builder: config.builder,
            queries: config.queries,
        })
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    pub fn queries(&self) -> &[QueryConfig] {
        &self.queries
    }

    /// Runs every query once, recording each duration under the query's kind.
    pub fn run(
        &self,
        settings: &Settings,
        query: &mut BlockQuery<BlockId>,
        timings: &mut Timings,
        tick: u64,
    ) -> Vec<QueryReport> {
        let mut hits = Vec::new();

        self.queries
            .iter()
            .map(|config| {
                hits.clear();

                timings.start();
                let draw = self.run_one(settings, config, query, &mut hits);
                let elapsed = timings.complete(config.kind(), true, settings.log_timings, tick);
                metrics::timing!("toolcore.query", elapsed);

                let within_limits = settings.world_limits.permits(
                    &self.builder,
                    self.grid.block_count(),
                    hits.len(),
                );

                QueryReport {
                    kind: config.kind(),
                    hits: hits.iter().map(|&id| self.grid.name(id).to_string()).collect(),
                    within_limits,
                    draw,
                }
            })
            .collect()
    }

    fn run_one(
        &self,
        settings: &Settings,
        config: &QueryConfig,
        query: &mut BlockQuery<BlockId>,
        hits: &mut Vec<BlockId>,
    ) -> Option<RecordingDraw> {
        let target = QueryTarget::new(&self.grid, &self.grid);

        match *config {
            QueryConfig::Sphere {
                center,
                radius,
                bounds,
            } => {
                let sphere = Sphere::new(center, radius);
                let bounds = bounds.map_or_else(|| sphere.cell_bounds(), CellRange::bounds);
                query.sphere(&target, bounds, &sphere, hits);
                None
            }
            QueryConfig::Cylinder {
                center,
                forward,
                radius,
                length,
                bounds,
            } => {
                let cylinder = Cylinder::new(center, forward, radius, length);
                let bounds = bounds.map_or_else(|| cylinder.cell_bounds(), CellRange::bounds);
                if settings.debug_draw {
                    let mut draw = RecordingDraw::new();
                    query.cylinder_debug(&target, bounds, &cylinder, hits, &mut draw);
                    Some(draw)
                } else {
                    query.cylinder(&target, bounds, &cylinder, hits);
                    None
                }
            }
            QueryConfig::Cuboid {
                center,
                half_extents,
                rotation_degrees,
                bounds,
            } => {
                let obb = OrientedBox::new(center, half_extents, rotation(rotation_degrees));
                let bounds =
                    bounds.map_or_else(|| oriented_box_cell_bounds(&obb), CellRange::bounds);
                query.cuboid(&target, bounds, &obb, hits);
                None
            }
            QueryConfig::Line { start, end } => {
                query.line(&target, start, end, hits);
                None
            }
            QueryConfig::Point { position } => {
                if settings.debug_draw {
                    let mut draw = RecordingDraw::new();
                    query.point_debug(&target, position, hits, &mut draw);
                    Some(draw)
                } else {
                    query.point(&target, position, hits);
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use toolcore_grid::{BlockLimitsMode, WorldLimits};

    const SCENE: &str = r#"
frame:
  position: {x: 0.0, y: 0.0, z: 0.0}
  cell_size: 2.5
blocks:
  - name: Armor0
    min: {x: 0, y: 0, z: 0}
  - name: Armor1
    min: {x: 1, y: 0, z: 0}
  - name: Refinery
    min: {x: 2, y: 0, z: 0}
    max: {x: 3, y: 1, z: 1}
projector:
  denied: [Armor1]
  result: IntersectedWithGrid
builder:
  is_admin: false
queries:
  - Sphere:
      center: {x: 0.0, y: 0.0, z: 0.0}
      radius: 1.0
  - Cylinder:
      center: {x: 1.5, y: 0.0, z: 0.0}
      forward: {x: 1.0, y: 0.0, z: 0.0}
      radius: 0.5
      length: 3.0
  - Cuboid:
      center: {x: 2.5, y: 0.5, z: 0.5}
      half_extents: {x: 0.4, y: 0.4, z: 0.4}
      bounds:
        min: {x: 2, y: 0, z: 0}
        max: {x: 3, y: 1, z: 1}
  - Line:
      start: {x: 9.0, y: 0.0, z: 0.0}
      end: {x: -1.0, y: 0.0, z: 0.0}
  - Point:
      position: {x: 2.4, y: 0.0, z: 0.0}
"#;

    fn scene() -> Scene {
        Scene::build(serde_yaml::from_str(SCENE).unwrap()).unwrap()
    }

    fn run(scene: &Scene, settings: &Settings) -> Vec<QueryReport> {
        let mut query = BlockQuery::new();
        let mut timings = Timings::new();
        scene.run(settings, &mut query, &mut timings, 0)
    }

    #[test]
    fn test_build_scene() {
        let scene = scene();
        assert_eq!(scene.grid().block_count(), 3);
        assert!(scene.grid().has_projector());
        assert_eq!(scene.queries().len(), 5);
        assert_eq!(
            scene
                .queries()
                .iter()
                .map(QueryConfig::kind)
                .collect::<Vec<_>>(),
            vec!["sphere", "cylinder", "cuboid", "line", "point"]
        );
    }

    #[test]
    fn test_run_scene() {
        let scene = scene();
        let reports = run(&scene, &Settings::default());

        let hits: Vec<Vec<&str>> = reports
            .iter()
            .map(|report| report.hits.iter().map(String::as_str).collect())
            .collect();

        // Armor1 is refused by the projector everywhere
        assert_eq!(hits[0], vec!["Armor0"]);
        assert_eq!(hits[1], vec!["Armor0", "Refinery"]);
        assert_eq!(hits[2], vec!["Refinery"]);
        assert_eq!(hits[3], vec!["Refinery", "Armor0"]);
        assert!(hits[4].is_empty());

        assert!(reports.iter().all(|report| report.within_limits));
        assert!(reports.iter().all(|report| report.draw.is_none()));
    }

    #[test]
    fn test_run_scene_with_limits_and_drawing() {
        let scene = scene();
        let settings = Settings {
            log_timings: false,
            debug_draw: true,
            world_limits: WorldLimits {
                mode: BlockLimitsMode::GlobalOnly,
                max_grid_size: 4,
            },
        };
        let reports = run(&scene, &settings);

        // three blocks in the grid, so only single hits fit under the cap
        assert!(reports[0].within_limits);
        assert!(!reports[1].within_limits);
        assert!(reports[1].draw.is_some());
        assert!(reports[4].draw.is_some());
        assert!(reports[0].draw.is_none());
    }

    #[test]
    fn test_timings_recorded_per_kind() {
        let scene = scene();
        let mut query = BlockQuery::new();
        let mut timings = Timings::new();
        for tick in 0..3 {
            scene.run(&Settings::default(), &mut query, &mut timings, tick);
        }

        let mut names: Vec<&str> = timings.names().collect();
        names.sort();
        assert_eq!(names, vec!["cuboid", "cylinder", "line", "point", "sphere"]);
        assert_eq!(timings.stats("sphere").unwrap().events, 3);
    }

    #[test]
    fn test_rejects_bad_scenes() {
        let mut config: SceneConfig = serde_yaml::from_str(SCENE).unwrap();
        config.blocks.push(BlockConfig {
            name: "Overlap".into(),
            min: Point3::new(3, 1, 1),
            max: None,
        });
        assert!(Scene::build(config).is_err());

        let mut config: SceneConfig = serde_yaml::from_str(SCENE).unwrap();
        config.projector = Some(ProjectorConfig {
            denied: vec!["Missing".into()],
            result: BuildCheck::NotFound,
        });
        assert!(Scene::build(config).is_err());

        for &cell_size in &[0., -1., f64::NAN, f64::INFINITY] {
            let mut config: SceneConfig = serde_yaml::from_str(SCENE).unwrap();
            config.frame.cell_size = cell_size;
            assert!(Scene::build(config).is_err(), "cell size {}", cell_size);
        }

        for &extent in &[-0.5, f64::NAN] {
            let mut config: SceneConfig = serde_yaml::from_str(SCENE).unwrap();
            config.queries.push(QueryConfig::Cuboid {
                center: Point3::new(0., 0., 0.),
                half_extents: Vector3::new(1., extent, 1.),
                rotation_degrees: Vector3::new(0., 0., 0.),
                bounds: None,
            });
            assert!(Scene::build(config).is_err(), "half extent {}", extent);
        }
    }

    #[test]
    fn test_rejects_nan_cell_size_from_yaml() {
        let yaml = SCENE.replace("cell_size: 2.5", "cell_size: .nan");
        let config: SceneConfig = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.frame.cell_size.is_nan());
        assert!(Scene::build(config).is_err());
    }
}
