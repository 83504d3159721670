use crate::flame::model::{Flame, VariationDesc, XFormDesc};
use crate::foundation::core::{Affine, XyzPoint};
use crate::foundation::error::{FlameError, FlameResult};
use crate::variation::{ParamMap, StageInfo, TransformContext, Variation, VariationRegistry};

#[derive(Clone, Debug)]
struct VariationSlot {
    variation: Box<dyn Variation>,
    amount: f64,
}

/// Runtime form of one xform: affine map plus its variations grouped by priority.
///
/// Variations with non-zero priority rewrite the point handed to them as `affine`
/// in place; regular variations (priority 0) sum into a fresh accumulator.
#[derive(Clone, Debug)]
pub struct XForm {
    info: StageInfo,
    color_symmetry: f64,
    pre: Vec<VariationSlot>,
    regular: Vec<VariationSlot>,
    post: Vec<VariationSlot>,
}

fn to_affine(c: [f64; 6]) -> Affine {
    Affine::new(c)
}

impl XForm {
    pub fn from_desc(desc: &XFormDesc, registry: &VariationRegistry) -> FlameResult<Self> {
        let mut slots = Vec::with_capacity(desc.variations.len());
        for vd in &desc.variations {
            let mut variation = registry.create(&vd.name)?;
            for (name, value) in vd.params.iter() {
                variation.set_parameter(name, value)?;
            }
            slots.push(VariationSlot {
                variation,
                amount: vd.amount,
            });
        }
        // Stable: equal priorities keep document order.
        slots.sort_by_key(|s| s.variation.priority());

        let mut out = Self {
            info: StageInfo {
                coefs: to_affine(desc.coefs),
                post: desc.post.map(to_affine),
                weight: desc.weight,
                color: desc.color,
            },
            color_symmetry: desc.color_symmetry,
            pre: Vec::new(),
            regular: Vec::new(),
            post: Vec::new(),
        };
        for slot in slots {
            match slot.variation.priority() {
                p if p < 0 => out.pre.push(slot),
                0 => out.regular.push(slot),
                _ => out.post.push(slot),
            }
        }
        Ok(out)
    }

    /// Export back into a description, parameters in schema order.
    pub fn to_desc(&self) -> XFormDesc {
        let c = self.info.coefs.as_coeffs();
        XFormDesc {
            weight: self.info.weight,
            color: self.info.color,
            color_symmetry: self.color_symmetry,
            coefs: c,
            post: self.info.post.map(|p| p.as_coeffs()),
            variations: self
                .slots()
                .map(|s| VariationDesc {
                    name: s.variation.name().to_string(),
                    amount: s.amount,
                    params: ParamMap::from_variation(s.variation.as_ref()),
                })
                .collect(),
        }
    }

    fn slots(&self) -> impl Iterator<Item = &VariationSlot> {
        self.pre.iter().chain(&self.regular).chain(&self.post)
    }

    pub fn info(&self) -> &StageInfo {
        &self.info
    }

    /// Variation names in execution order.
    pub fn variation_names(&self) -> Vec<&'static str> {
        self.slots().map(|s| s.variation.name()).collect()
    }

    pub fn init(&mut self, ctx: &mut TransformContext) {
        let info = self.info;
        for slot in self
            .pre
            .iter_mut()
            .chain(&mut self.regular)
            .chain(&mut self.post)
        {
            slot.variation.init(ctx, &info);
        }
    }

    /// Map one point through this stage.
    pub fn apply(&mut self, ctx: &mut TransformContext, src: &XyzPoint) -> XyzPoint {
        let s = 0.5 * self.color_symmetry;
        let color = src.color * (0.5 + s) + self.info.color * (0.5 - s);

        let mapped = self.info.coefs * kurbo::Point::new(src.x, src.y);
        let mut affine = XyzPoint {
            x: mapped.x,
            y: mapped.y,
            z: src.z,
            color,
        };

        let mut scratch = affine;
        for slot in &mut self.pre {
            slot.variation
                .transform(ctx, &self.info, &mut affine, &mut scratch, slot.amount);
        }

        let mut var = if self.regular.is_empty() {
            affine
        } else {
            let mut var = XyzPoint {
                color,
                ..XyzPoint::ZERO
            };
            for slot in &mut self.regular {
                slot.variation
                    .transform(ctx, &self.info, &mut affine, &mut var, slot.amount);
            }
            var
        };

        for slot in &mut self.post {
            let mut scratch = var;
            slot.variation
                .transform(ctx, &self.info, &mut var, &mut scratch, slot.amount);
        }

        if let Some(post) = self.info.post {
            let p = post * kurbo::Point::new(var.x, var.y);
            var.x = p.x;
            var.y = p.y;
        }
        var.color = color;
        var
    }
}

/// Every stage of a flame, ready for iteration by one worker.
#[derive(Clone, Debug)]
pub struct FlameStages {
    xforms: Vec<XForm>,
    cumulative: Vec<f64>,
    final_xform: Option<XForm>,
}

impl FlameStages {
    pub fn build(flame: &Flame, registry: &VariationRegistry) -> FlameResult<Self> {
        if flame.xforms.is_empty() {
            return Err(FlameError::validation("flame has no xforms"));
        }
        let xforms = flame
            .xforms
            .iter()
            .map(|x| XForm::from_desc(x, registry))
            .collect::<FlameResult<Vec<_>>>()?;
        let mut acc = 0.0;
        let cumulative = xforms
            .iter()
            .map(|x| {
                acc += x.info.weight.max(0.0);
                acc
            })
            .collect();
        let final_xform = flame
            .final_xform
            .as_ref()
            .map(|x| XForm::from_desc(x, registry))
            .transpose()?;
        Ok(Self {
            xforms,
            cumulative,
            final_xform,
        })
    }

    pub fn xforms(&self) -> &[XForm] {
        &self.xforms
    }

    pub fn init(&mut self, ctx: &mut TransformContext) {
        for x in &mut self.xforms {
            x.init(ctx);
        }
        if let Some(x) = &mut self.final_xform {
            x.init(ctx);
        }
    }

    /// Index of the xform selected by a uniform draw in `[0, 1)`.
    pub fn pick(&self, r: f64) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        let target = r * total;
        self.cumulative
            .iter()
            .position(|&c| target < c)
            .unwrap_or(self.cumulative.len() - 1)
    }

    /// One chaos-game step. Returns the next iteration point and the point to plot.
    pub fn step(&mut self, ctx: &mut TransformContext, p: &XyzPoint) -> (XyzPoint, XyzPoint) {
        let idx = self.pick(ctx.random());
        let next = self.xforms[idx].apply(ctx, p);
        let plotted = match &mut self.final_xform {
            Some(f) => f.apply(ctx, &next),
            None => next,
        };
        (next, plotted)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flame/xform.rs"]
mod tests;
