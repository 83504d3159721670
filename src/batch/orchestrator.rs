use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::batch::config::BatchConfig;
use crate::batch::naming::OutputNaming;
use crate::batch::reassemble::{compose_hdr_tiles, compose_tiles};
use crate::batch::unit::{RenderUnit, TileCoord, TileGeometry, UnitKind};
use crate::flame::model::Flame;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlameError, FlameResult};
use crate::render::executor::{RenderExecutor, RenderRequest};
use crate::render::output::{
    HDR_SUFFIX, INTENSITY_SUFFIX, save_hdr, save_png, sibling_path, write_rendered,
};
use crate::render::progress::{NoProgress, ProgressSink};
use crate::variation::VariationRegistry;

/// File extensions accepted as flame descriptions.
const FLAME_EXTENSIONS: [&str; 2] = ["json", "flame"];

/// What happened to one dequeued unit.
#[derive(Debug)]
pub enum UnitOutcome {
    /// A whole-image unit was replaced by its tiles and a reassembly unit.
    Expanded { tiles: usize },
    Rendered { outputs: Vec<PathBuf> },
    /// Target already existed and overwriting is off.
    Skipped { path: PathBuf },
    Reassembled {
        path: PathBuf,
        /// Composited HDR and intensity images, when requested.
        auxiliary: Vec<PathBuf>,
        removed_tiles: usize,
    },
    Failed { error: FlameError },
}

#[derive(Debug)]
pub struct UnitReport {
    pub unit: RenderUnit,
    pub outcome: UnitOutcome,
    pub elapsed: Duration,
}

impl UnitReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, UnitOutcome::Failed { .. })
    }
}

/// Callback invoked after every completed unit.
pub trait BatchObserver {
    fn unit_finished(&mut self, report: &UnitReport, remaining: usize);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoObserver;

impl BatchObserver for NoObserver {
    fn unit_finished(&mut self, _report: &UnitReport, _remaining: usize) {}
}

/// Every unit processed by [`BatchRenderer::run`], in completion order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
}

impl BatchReport {
    /// Units that produced images, including reassemblies.
    pub fn rendered(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|r| {
            matches!(
                r.outcome,
                UnitOutcome::Rendered { .. } | UnitOutcome::Reassembled { .. }
            )
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|r| matches!(r.outcome, UnitOutcome::Skipped { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&RenderUnit, &FlameError)> {
        self.units.iter().filter_map(|r| match &r.outcome {
            UnitOutcome::Failed { error } => Some((&r.unit, error)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.units.iter().any(UnitReport::is_failure)
    }
}

/// Sequential render queue owning its configuration and executor.
///
/// Units run one at a time in queue order. In low-memory mode each job is
/// split into an 8x8 grid of tiles followed by a reassembly unit; failures stay
/// local to the job that raised them.
pub struct BatchRenderer<E> {
    config: BatchConfig,
    naming: OutputNaming,
    executor: E,
    queue: VecDeque<RenderUnit>,
    progress: Box<dyn ProgressSink>,
    observer: Box<dyn BatchObserver>,
    registry: VariationRegistry,
}

impl<E: RenderExecutor> BatchRenderer<E> {
    /// Fails with a configuration error before anything is queued.
    pub fn new(config: BatchConfig, executor: E) -> FlameResult<Self> {
        config.validate()?;
        Ok(Self {
            naming: OutputNaming::from_config(&config),
            config,
            executor,
            queue: VecDeque::new(),
            progress: Box::new(NoProgress),
            observer: Box::new(NoObserver),
            registry: VariationRegistry::builtin(),
        })
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_observer(mut self, observer: impl BatchObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Variations flames are checked against when a job is loaded.
    pub fn with_registry(mut self, registry: VariationRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn queue(&self) -> &VecDeque<RenderUnit> {
        &self.queue
    }

    /// Queue one flame file as a whole-image job.
    ///
    /// Returns `false` (and queues nothing) for files that are not flame
    /// descriptions.
    pub fn enqueue(&mut self, flame_path: impl Into<PathBuf>) -> bool {
        let flame_path = flame_path.into();
        let is_flame = flame_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FLAME_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if !is_flame {
            tracing::warn!(path = %flame_path.display(), "not a flame file, ignoring");
            return false;
        }
        self.queue.push_back(RenderUnit::whole(
            flame_path,
            self.config.width,
            self.config.height,
            self.config.effective_quality(),
        ));
        true
    }

    /// Final output path for `unit`: its tile image, or the job image.
    pub fn output_path(&self, unit: &RenderUnit) -> PathBuf {
        let tile = match unit.kind {
            UnitKind::Tile(t) => Some(t),
            UnitKind::Whole | UnitKind::Reassemble => None,
        };
        self.naming.image_path(&unit.flame_path, tile)
    }

    /// Dequeue and execute one unit. `None` once the queue is empty.
    pub fn step(&mut self) -> Option<UnitReport> {
        let unit = self.queue.pop_front()?;
        let started = Instant::now();
        let outcome = match self.execute(&unit) {
            Ok(outcome) => outcome,
            Err(error) => UnitOutcome::Failed { error },
        };
        let report = UnitReport {
            unit,
            outcome,
            elapsed: started.elapsed(),
        };
        let remaining = self.queue.len();
        log_outcome(&report, remaining);
        self.observer.unit_finished(&report, remaining);
        Some(report)
    }

    /// Drain the queue.
    pub fn run(&mut self) -> BatchReport {
        let mut report = BatchReport::default();
        while let Some(unit) = self.step() {
            report.units.push(unit);
        }
        tracing::info!(
            units = report.units.len(),
            failed = report.failures().count(),
            "batch finished"
        );
        report
    }

    #[tracing::instrument(skip(self, unit), fields(unit = %unit.label()))]
    fn execute(&mut self, unit: &RenderUnit) -> FlameResult<UnitOutcome> {
        match unit.kind {
            UnitKind::Reassemble => self.reassemble(unit),
            UnitKind::Whole | UnitKind::Tile(_) => {
                let target = self.output_path(unit);
                if !self.config.overwrite && self.is_satisfied(unit, &target) {
                    return Ok(UnitOutcome::Skipped { path: target });
                }
                match unit.kind {
                    UnitKind::Whole if self.config.low_memory => Ok(self.split(unit)),
                    UnitKind::Tile(tile) => self.render_tile(unit, tile, &target),
                    _ => self.render_whole(unit, &target),
                }
            }
        }
    }

    /// A tile also needs the auxiliary buffers reassembly will read.
    fn is_satisfied(&self, unit: &RenderUnit, target: &Path) -> bool {
        if !target.exists() {
            return false;
        }
        match unit.kind {
            UnitKind::Tile(_) => self
                .auxiliary_suffixes()
                .iter()
                .all(|suffix| sibling_path(target, suffix).exists()),
            UnitKind::Whole | UnitKind::Reassemble => true,
        }
    }

    fn split(&mut self, unit: &RenderUnit) -> UnitOutcome {
        let grid = u32::from(crate::batch::config::GRID);
        let mut tiles = 0;
        for tile in TileCoord::all() {
            self.queue.push_back(RenderUnit {
                flame_path: unit.flame_path.clone(),
                kind: UnitKind::Tile(tile),
                width: unit.width / grid,
                height: unit.height / grid,
                quality: unit.quality,
            });
            tiles += 1;
        }
        self.queue.push_back(RenderUnit {
            kind: UnitKind::Reassemble,
            ..unit.clone()
        });
        UnitOutcome::Expanded { tiles }
    }

    fn render_whole(&mut self, unit: &RenderUnit, target: &Path) -> FlameResult<UnitOutcome> {
        let flame = self.load_job(unit)?;
        self.render_to(unit, &flame, target)
    }

    fn render_tile(
        &mut self,
        unit: &RenderUnit,
        tile: TileCoord,
        target: &Path,
    ) -> FlameResult<UnitOutcome> {
        let mut flame = self.load_job(unit)?;
        let geometry = TileGeometry::compute(&flame, self.logical(), tile);
        tracing::debug!(
            %tile,
            old_centre_x = flame.centre_x,
            old_centre_y = flame.centre_y,
            old_zoom = flame.cam_zoom,
            offset_x = geometry.offset_x,
            offset_y = geometry.offset_y,
            centre_x = geometry.centre_x,
            centre_y = geometry.centre_y,
            "tile camera remap"
        );
        geometry.apply(&mut flame);
        self.render_to(unit, &flame, target)
    }

    fn render_to(
        &mut self,
        unit: &RenderUnit,
        flame: &Flame,
        target: &Path,
    ) -> FlameResult<UnitOutcome> {
        let request = RenderRequest {
            width: unit.width,
            height: unit.height,
            quality: unit.quality,
            hdr: self.config.hdr,
            intensity_map: self.config.intensity_map,
        };
        self.progress.begin(&unit.label());
        let rendered = self
            .executor
            .render(flame, &request, self.progress.as_mut())
            .map_err(|e| match e {
                FlameError::Execution(_) => e,
                other => FlameError::execution(format!("{}: {other}", unit.label())),
            })?;
        let outputs = write_rendered(&rendered, target)?;
        Ok(UnitOutcome::Rendered { outputs })
    }

    /// Load the unit's flame. A flame that cannot be read dooms every
    /// remaining unit of its job, so those are dropped from the queue.
    fn load_job(&mut self, unit: &RenderUnit) -> FlameResult<Flame> {
        Flame::load_with(&unit.flame_path, &self.registry).inspect_err(|_| {
            let before = self.queue.len();
            self.queue.retain(|u| u.flame_path != unit.flame_path);
            let dropped = before - self.queue.len();
            if dropped > 0 {
                tracing::warn!(job = %unit.job_name(), dropped, "abandoning job");
            }
        })
    }

    /// Auxiliary suffixes each tile carries under the current config.
    fn auxiliary_suffixes(&self) -> Vec<&'static str> {
        let mut suffixes = Vec::with_capacity(2);
        if self.config.hdr {
            suffixes.push(HDR_SUFFIX);
        }
        if self.config.intensity_map {
            suffixes.push(INTENSITY_SUFFIX);
        }
        suffixes
    }

    fn reassemble(&mut self, unit: &RenderUnit) -> FlameResult<UnitOutcome> {
        let job = unit.job_name();
        let logical = self.logical();
        let tile_path = |t| self.naming.image_path(&unit.flame_path, Some(t));

        // Composite everything before writing anything.
        let image = compose_tiles(&job, logical, tile_path)?;
        let suffixes = self.auxiliary_suffixes();
        let buffers = suffixes
            .iter()
            .map(|suffix| {
                compose_hdr_tiles(&job, logical, |t| sibling_path(&tile_path(t), suffix))
            })
            .collect::<FlameResult<Vec<_>>>()?;

        let path = self.output_path(unit);
        save_png(&image, &path).map_err(|e| FlameError::reassembly(&job, None, e.to_string()))?;
        let mut auxiliary = Vec::with_capacity(buffers.len());
        for (suffix, buffer) in suffixes.iter().zip(&buffers) {
            let aux = sibling_path(&path, suffix);
            save_hdr(buffer, &aux).map_err(|e| FlameError::reassembly(&job, None, e.to_string()))?;
            auxiliary.push(aux);
        }

        let mut removed_tiles = 0;
        if !self.config.keep_tiles {
            for tile in TileCoord::all() {
                let tile_png = tile_path(tile);
                for suffix in &suffixes {
                    let p = sibling_path(&tile_png, suffix);
                    if let Err(e) = std::fs::remove_file(&p) {
                        tracing::warn!(path = %p.display(), error = %e, "could not remove tile output");
                    }
                }
                match std::fs::remove_file(&tile_png) {
                    Ok(()) => removed_tiles += 1,
                    Err(e) => {
                        tracing::warn!(path = %tile_png.display(), error = %e, "could not remove tile")
                    }
                }
            }
        }
        Ok(UnitOutcome::Reassembled {
            path,
            auxiliary,
            removed_tiles,
        })
    }

    fn logical(&self) -> Canvas {
        Canvas {
            width: self.config.width,
            height: self.config.height,
        }
    }
}

fn log_outcome(report: &UnitReport, remaining: usize) {
    let unit = report.unit.label();
    let elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX);
    match &report.outcome {
        UnitOutcome::Expanded { tiles } => {
            tracing::info!(%unit, tiles, remaining, "split into tiles");
        }
        UnitOutcome::Rendered { outputs } => {
            let path = outputs.first().map(|p| p.display().to_string());
            tracing::info!(%unit, path = path.as_deref().unwrap_or(""), elapsed_ms, remaining, "rendered");
        }
        UnitOutcome::Skipped { path } => {
            tracing::warn!(%unit, path = %path.display(), remaining, "output exists, skipping");
        }
        UnitOutcome::Reassembled {
            path,
            removed_tiles,
            ..
        } => {
            tracing::info!(%unit, path = %path.display(), removed_tiles, elapsed_ms, remaining, "reassembled");
        }
        UnitOutcome::Failed { error } => {
            tracing::error!(%unit, %error, remaining, "unit failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/orchestrator.rs"]
mod tests;
