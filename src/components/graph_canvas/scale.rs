//! Zoom-dependent scaling configuration for canvas visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the coordinate system of the graph. Node boxes are sized
//!   in world units and grow when zoomed in.
//! - **Screen-space**: pixel coordinates on the canvas. Strokes, hit
//!   tolerances and arrow heads are specified in pixels and divided by the zoom
//!   factor `k` before drawing so they keep a constant on-screen size.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => {
				// screen_size = world_size * k
				let min_world = min_screen / k;
				let max_world = max_screen / k;
				base.clamp(min_world, max_world)
			}
		}
	}
}

/// Fades an element in between two zoom levels.
#[derive(Clone, Debug)]
pub struct Fade {
	pub zero_alpha_k: f64,
	pub full_alpha_k: f64,
}

impl Fade {
	pub fn apply(&self, k: f64) -> f64 {
		if self.zero_alpha_k == self.full_alpha_k {
			return 1.0;
		}
		let t = (k - self.zero_alpha_k) / (self.full_alpha_k - self.zero_alpha_k);
		t.clamp(0.0, 1.0)
	}
}

/// Complete scale configuration for all canvas elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Zoom factor change per wheel notch at sensitivity 1.0.
	pub wheel_step: f64,
	/// Edge stroke width in screen pixels.
	pub line_width: f64,
	/// Extra stroke width for the selected element, in screen pixels.
	pub selected_width: f64,
	/// Distance from an edge that still counts as a hit, in screen pixels.
	pub edge_hit_tolerance: f64,
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
	/// Claim text size in world units.
	pub label_size: f64,
	/// Relation label size in screen pixels.
	pub edge_label_size: f64,
	/// Relation labels disappear when zoomed out.
	pub edge_label_fade: Fade,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.1,
			max_zoom: 10.0,
			wheel_step: 0.1,
			line_width: 1.5,
			selected_width: 2.0,
			edge_hit_tolerance: 6.0,
			arrow_size: 9.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: 18.0,
			},
			label_size: 12.0,
			edge_label_size: 11.0,
			edge_label_fade: Fade {
				zero_alpha_k: 0.35,
				full_alpha_k: 0.7,
			},
		}
	}
}

impl ScaleConfig {
	/// Zoom multiplier for one wheel notch. `zoom_in` follows the wheel direction.
	pub fn wheel_factor(&self, zoom_in: bool, sensitivity: f64) -> f64 {
		let step = (self.wheel_step * sensitivity).clamp(0.01, 0.9);
		if zoom_in { 1.0 + step } else { 1.0 / (1.0 + step) }
	}

	pub fn clamp_zoom(&self, k: f64) -> f64 {
		k.clamp(self.min_zoom, self.max_zoom)
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	pub line_width: f64,
	pub selected_width: f64,
	pub edge_hit_tolerance: f64,
	pub arrow_size: f64,
	/// Claim text font string (e.g., "12px sans-serif").
	pub label_font: String,
	pub edge_label_font: String,
	/// Relation label alpha multiplier [0, 1].
	pub edge_label_alpha: f64,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			line_width: ScaleBehavior::Screen.apply(config.line_width, k),
			selected_width: ScaleBehavior::Screen.apply(config.selected_width, k),
			edge_hit_tolerance: ScaleBehavior::Screen.apply(config.edge_hit_tolerance, k),
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			label_font: format!("{}px sans-serif", config.label_size),
			edge_label_font: format!("{}px sans-serif", config.edge_label_size / k),
			edge_label_alpha: config.edge_label_fade.apply(k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_sizes_shrink_in_world_space_when_zoomed_in() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 2.0);
		assert_eq!(scaled.line_width, 0.75);
		assert_eq!(scaled.edge_hit_tolerance, 3.0);
	}

	#[test]
	fn arrows_stay_within_screen_bounds() {
		let config = ScaleConfig::default();
		// 9 world units at k = 4 would be 36px on screen.
		assert_eq!(ScaledValues::new(&config, 4.0).arrow_size, 18.0 / 4.0);
		// and 0.9px at k = 0.1.
		assert_eq!(ScaledValues::new(&config, 0.1).arrow_size, 4.0 / 0.1);
	}

	#[test]
	fn wheel_steps_are_symmetric() {
		let config = ScaleConfig::default();
		let k = config.wheel_factor(true, 1.0) * config.wheel_factor(false, 1.0);
		assert!((k - 1.0).abs() < 1e-12);
		assert!(config.wheel_factor(true, 2.0) > config.wheel_factor(true, 1.0));
	}

	#[test]
	fn edge_labels_fade_out() {
		let fade = ScaleConfig::default().edge_label_fade;
		assert_eq!(fade.apply(0.2), 0.0);
		assert_eq!(fade.apply(1.0), 1.0);
	}
}
