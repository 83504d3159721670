use rayon::prelude::*;

use crate::flame::model::Flame;
use crate::flame::xform::FlameStages;
use crate::foundation::core::{Canvas, Rng64, XyzPoint};
use crate::foundation::error::{FlameError, FlameResult};
use crate::render::executor::{RenderExecutor, RenderRequest, RenderedFlame};
use crate::render::progress::ProgressSink;
use crate::render::tonemap::{Bin, ToneMap};
use crate::variation::{TransformContext, VariationRegistry};

const BAD_VALUE_LIMIT: f64 = 1e10;

/// Tuning for [`CpuRenderer`].
#[derive(Clone, Debug)]
pub struct CpuRenderSettings {
    /// Worker thread count; `None` uses rayon's default.
    pub threads: Option<usize>,
    pub seed: u64,
    /// Number of progress steps reported per render.
    pub progress_steps: u64,
    /// Iterations discarded per worker before plotting.
    pub fuse: u32,
}

impl Default for CpuRenderSettings {
    fn default() -> Self {
        Self {
            threads: None,
            seed: 0x5EED_F1A3,
            progress_steps: 100,
            fuse: 20,
        }
    }
}

/// Chaos-game renderer: every worker iterates its own copy of the flame's stages
/// into a private histogram; histograms are summed and tone mapped at the end.
pub struct CpuRenderer {
    registry: VariationRegistry,
    settings: CpuRenderSettings,
    pool: rayon::ThreadPool,
}

struct Worker {
    ctx: TransformContext,
    stages: FlameStages,
    point: XyzPoint,
    hist: Vec<Bin>,
    done: u64,
    bad: u64,
}

impl Worker {
    fn reseed_point(&mut self) {
        self.point = XyzPoint {
            x: self.ctx.random() * 2.0 - 1.0,
            y: self.ctx.random() * 2.0 - 1.0,
            z: 0.0,
            color: self.ctx.random(),
        };
    }

    fn fuse(&mut self, iterations: u32) {
        self.reseed_point();
        for _ in 0..iterations {
            let (next, _) = self.stages.step(&mut self.ctx, &self.point);
            self.point = next;
        }
    }

    fn run(&mut self, samples: u64, cam: &Camera, flame: &Flame) {
        for _ in 0..samples {
            let (next, plotted) = self.stages.step(&mut self.ctx, &self.point);
            if !next.is_finite()
                || next.x.abs() > BAD_VALUE_LIMIT
                || next.y.abs() > BAD_VALUE_LIMIT
            {
                self.bad += 1;
                self.reseed_point();
                continue;
            }
            self.point = next;
            if let Some(idx) = cam.bin_index(&plotted) {
                let [r, g, b] = flame.palette_color(plotted.color);
                let bin = &mut self.hist[idx];
                bin[0] += r;
                bin[1] += g;
                bin[2] += b;
                bin[3] += 1.0;
            }
        }
        self.done += samples;
    }
}

/// Flame space to pixel mapping; image y grows downward with flame y.
#[derive(Clone, Copy, Debug)]
struct Camera {
    centre_x: f64,
    centre_y: f64,
    scale: f64,
    canvas: Canvas,
}

impl Camera {
    fn new(flame: &Flame) -> Self {
        Self {
            centre_x: flame.centre_x,
            centre_y: flame.centre_y,
            scale: flame.pixel_scale(),
            canvas: flame.canvas(),
        }
    }

    fn bin_index(&self, p: &XyzPoint) -> Option<usize> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let px = (p.x - self.centre_x) * self.scale + w * 0.5;
        let py = (p.y - self.centre_y) * self.scale + h * 0.5;
        if !(px >= 0.0 && px < w && py >= 0.0 && py < h) {
            return None;
        }
        Some(py as usize * self.canvas.width as usize + px as usize)
    }
}

fn build_thread_pool(threads: Option<usize>) -> FlameResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FlameError::configuration(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FlameError::execution(format!("failed to build rayon thread pool: {e}")))
}

impl CpuRenderer {
    pub fn new(registry: VariationRegistry, settings: CpuRenderSettings) -> FlameResult<Self> {
        let pool = build_thread_pool(settings.threads)?;
        Ok(Self {
            registry,
            settings,
            pool,
        })
    }

    pub fn with_defaults() -> FlameResult<Self> {
        Self::new(VariationRegistry::builtin(), CpuRenderSettings::default())
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads().max(1)
    }
}

impl RenderExecutor for CpuRenderer {
    #[tracing::instrument(skip(self, flame, progress), fields(flame = %flame.name))]
    fn render(
        &mut self,
        flame: &Flame,
        request: &RenderRequest,
        progress: &mut dyn ProgressSink,
    ) -> FlameResult<RenderedFlame> {
        if request.width == 0 || request.height == 0 {
            return Err(FlameError::execution("render size must be non-zero"));
        }
        flame.validate()?;

        let canvas = request.canvas();
        let mut fitted = flame.clone();
        fitted.fit_to(canvas);
        let cam = Camera::new(&fitted);
        let stages = FlameStages::build(&fitted, &self.registry)?;

        let n = self.worker_count();
        let total = u64::from(request.quality).saturating_mul(canvas.pixel_count() as u64);
        let per_worker = total.div_ceil(n as u64);
        let steps = self.settings.progress_steps.clamp(1, per_worker.max(1));
        let per_step = per_worker.div_ceil(steps);

        let mut workers: Vec<Worker> = (0..n)
            .map(|i| {
                let mut ctx = TransformContext::from_rng(Rng64::for_worker(
                    self.settings.seed,
                    i as u64,
                ));
                let mut stages = stages.clone();
                stages.init(&mut ctx);
                Worker {
                    ctx,
                    stages,
                    point: XyzPoint::ZERO,
                    hist: vec![[0.0; 4]; canvas.pixel_count()],
                    done: 0,
                    bad: 0,
                }
            })
            .collect();

        let fuse = self.settings.fuse;
        self.pool
            .install(|| workers.par_iter_mut().for_each(|w| w.fuse(fuse)));

        progress.init_total(steps);
        for step in 1..=steps {
            self.pool.install(|| {
                workers.par_iter_mut().for_each(|w| {
                    let todo = per_step.min(per_worker.saturating_sub(w.done));
                    w.run(todo, &cam, &fitted);
                })
            });
            progress.advance(step);
        }

        let bad: u64 = workers.iter().map(|w| w.bad).sum();
        if bad > 0 {
            tracing::debug!(bad, total, "discarded out-of-range iterates");
        }

        let mut iter = workers.into_iter();
        let mut hist = iter.next().map(|w| w.hist).unwrap_or_default();
        for w in iter {
            for (acc, bin) in hist.iter_mut().zip(&w.hist) {
                for (a, b) in acc.iter_mut().zip(bin) {
                    *a += b;
                }
            }
        }

        let tone = ToneMap::new(&fitted, request.quality);
        Ok(tone.apply(&hist, canvas, request.hdr, request.intensity_map))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
