use super::*;
use crate::flame::model::{VariationDesc, XFormDesc};

fn sierpinski() -> Flame {
    let mut f = Flame::new(32, 32, 32.0);
    f.centre_x = 0.5;
    f.centre_y = 0.5;
    f.brightness = 2.0;
    f.gamma = 1.0;
    f.xforms = [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5)]
        .into_iter()
        .map(|(e, g)| XFormDesc {
            coefs: [0.5, 0.0, 0.0, 0.5, e, g],
            variations: vec![VariationDesc::new("linear", 1.0)],
            ..XFormDesc::default()
        })
        .collect();
    f
}

fn renderer(threads: usize) -> CpuRenderer {
    CpuRenderer::new(
        VariationRegistry::builtin(),
        CpuRenderSettings {
            threads: Some(threads),
            progress_steps: 10,
            ..CpuRenderSettings::default()
        },
    )
    .unwrap()
}

fn request(quality: u32) -> RenderRequest {
    RenderRequest {
        width: 32,
        height: 32,
        quality,
        hdr: false,
        intensity_map: false,
    }
}

#[derive(Default)]
struct RecordingProgress {
    total: Option<u64>,
    steps: Vec<u64>,
}

impl ProgressSink for RecordingProgress {
    fn init_total(&mut self, total_steps: u64) {
        self.total = Some(total_steps);
    }

    fn advance(&mut self, step: u64) {
        self.steps.push(step);
    }
}

#[test]
fn renders_attractor_over_background() {
    let mut r = renderer(2);
    let out = r
        .render(&sierpinski(), &request(8), &mut crate::render::NoProgress)
        .unwrap();
    assert_eq!(out.image.dimensions(), (32, 32));
    let lit = out.image.pixels().filter(|p| p[0] > 0).count();
    assert!(lit > 32, "only {lit} lit pixels");
    // The Sierpinski gasket leaves its upper-right-to-lower-right half empty.
    assert_eq!(out.image.get_pixel(30, 30)[0], 0);
}

#[test]
fn progress_is_monotonic_and_complete() {
    let mut r = renderer(2);
    let mut progress = RecordingProgress::default();
    r.render(&sierpinski(), &request(2), &mut progress).unwrap();
    assert_eq!(progress.total, Some(10));
    assert_eq!(progress.steps, (1..=10).collect::<Vec<_>>());
}

#[test]
fn same_seed_and_threads_render_identically() {
    let a = renderer(1)
        .render(&sierpinski(), &request(2), &mut crate::render::NoProgress)
        .unwrap();
    let b = renderer(1)
        .render(&sierpinski(), &request(2), &mut crate::render::NoProgress)
        .unwrap();
    assert_eq!(a.image, b.image);
}

#[test]
fn auxiliary_buffers_follow_request() {
    let mut r = renderer(1);
    let req = RenderRequest {
        hdr: true,
        intensity_map: true,
        ..request(1)
    };
    let out = r
        .render(&sierpinski(), &req, &mut crate::render::NoProgress)
        .unwrap();
    assert_eq!(out.hdr.unwrap().dimensions(), (32, 32));
    assert_eq!(out.intensity_map.unwrap().dimensions(), (32, 32));
}

#[test]
fn render_fits_flame_to_requested_size() {
    let mut r = renderer(1);
    let req = RenderRequest {
        width: 16,
        height: 8,
        ..request(1)
    };
    let out = r
        .render(&sierpinski(), &req, &mut crate::render::NoProgress)
        .unwrap();
    assert_eq!(out.image.dimensions(), (16, 8));
}

#[test]
fn zero_size_and_zero_threads_are_rejected() {
    let mut r = renderer(1);
    let req = RenderRequest {
        width: 0,
        ..request(1)
    };
    assert!(matches!(
        r.render(&sierpinski(), &req, &mut crate::render::NoProgress),
        Err(FlameError::Execution(_))
    ));

    let err = CpuRenderer::new(
        VariationRegistry::builtin(),
        CpuRenderSettings {
            threads: Some(0),
            ..CpuRenderSettings::default()
        },
    )
    .err()
    .unwrap();
    assert!(matches!(err, FlameError::Configuration(_)));
}
