/// armvis Web - WASM bindings for evaluating an arm in the browser
///
/// The page owns drawing (WebGL, three.js, ...); this module hands it flat
/// buffers for each render primitive of the latest evaluation.
use armvis_core::{evaluate, parse_str, KinematicModel, PrimitiveKind, RenderMode, RenderPrimitive};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WebArm {
    model: KinematicModel,
    primitives: Vec<RenderPrimitive>,
}

#[wasm_bindgen]
impl WebArm {
    /// Parse a URDF document
    #[wasm_bindgen(constructor)]
    pub fn new(urdf: &str) -> Result<WebArm, JsValue> {
        let model = parse_str(urdf).map_err(|e| report(&e.to_string()))?;
        Ok(WebArm {
            model,
            primitives: Vec::new(),
        })
    }

    pub fn name(&self) -> Option<String> {
        self.model.name().map(str::to_owned)
    }

    pub fn joint_count(&self) -> usize {
        self.model.joint_count()
    }

    pub fn joint_name(&self, index: usize) -> Option<String> {
        self.model.joints().get(index).map(|j| j.name.clone())
    }

    pub fn lower_limit(&self, index: usize) -> Option<f64> {
        self.model.joints().get(index).map(|j| j.limits.lower)
    }

    pub fn upper_limit(&self, index: usize) -> Option<f64> {
        self.model.joints().get(index).map(|j| j.limits.upper)
    }

    /// Evaluate the arm and keep the primitives for the getters below.
    /// Returns the number of primitives.
    pub fn evaluate(&mut self, angles: Vec<f64>, skeleton: bool) -> Result<usize, JsValue> {
        let mode = if skeleton {
            RenderMode::Skeleton
        } else {
            RenderMode::Detailed
        };
        self.primitives = evaluate(&self.model, &angles, mode).map_err(|e| report(&e.to_string()))?;
        Ok(self.primitives.len())
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// `[x0, y0, z0, x1, ...]` of primitive `index`; empty if out of range
    pub fn vertices(&self, index: usize) -> Vec<f32> {
        self.primitives
            .get(index)
            .map(RenderPrimitive::flat_vertices)
            .unwrap_or_default()
    }

    /// Triangle indices of primitive `index`; empty for polylines
    pub fn indices(&self, index: usize) -> Vec<u32> {
        self.primitives
            .get(index)
            .map(RenderPrimitive::flat_indices)
            .unwrap_or_default()
    }

    /// `#rrggbb`
    pub fn color(&self, index: usize) -> Option<String> {
        self.primitives.get(index).map(|p| p.color.to_hex())
    }

    pub fn opacity(&self, index: usize) -> Option<f32> {
        self.primitives.get(index).map(|p| p.opacity)
    }

    pub fn label(&self, index: usize) -> Option<String> {
        self.primitives.get(index).map(|p| p.label.clone())
    }

    pub fn is_polyline(&self, index: usize) -> bool {
        self.primitives
            .get(index)
            .is_some_and(|p| p.kind == PrimitiveKind::Polyline)
    }
}

/// Log to the browser console and turn the message into a JS error value
fn report(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&JsValue::from_str(message));
    JsValue::from_str(message)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    const SIX_AXIS_ARM: &str = include_str!("../../urdf/six_axis_arm.urdf");

    #[test]
    fn test_joint_metadata() {
        let arm = WebArm::new(SIX_AXIS_ARM).expect("bundled arm should parse");
        assert_eq!(arm.joint_count(), 6);
        assert_eq!(arm.joint_name(0).as_deref(), Some("joint1"));
        assert_eq!(arm.lower_limit(1), Some(-2.35));
        assert_eq!(arm.upper_limit(5), Some(3.03));
        assert_eq!(arm.joint_name(6), None);
    }

    #[test]
    fn test_buffers_after_evaluate() {
        let mut arm = WebArm::new(SIX_AXIS_ARM).expect("bundled arm should parse");
        assert_eq!(arm.evaluate(vec![0.0; 6], false).ok(), Some(8));

        assert_eq!(arm.color(0).as_deref(), Some("#808080"));
        assert_eq!(arm.opacity(1), Some(0.7));
        assert_eq!(arm.vertices(0).len(), 42 * 3);
        assert_eq!(arm.indices(0).len(), 80 * 3);

        assert!(arm.is_polyline(7));
        assert!(arm.indices(7).is_empty());
        assert!(arm.vertices(99).is_empty());
        assert!(!arm.is_polyline(99));

        assert_eq!(arm.evaluate(vec![0.0; 6], true).ok(), Some(13));
        assert_eq!(arm.label(12).as_deref(), Some("marker:6"));
    }
}
