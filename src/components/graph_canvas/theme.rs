//! Visual theming for the argument canvas.
//!
//! Claims are colored by their type and relations by their kind.

use crate::model::{RelationKind, UnitType};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Fill colors per claim type plus shared node decoration.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub fact: Color,
	pub value: Color,
	pub policy: Color,
	pub other: Color,
	pub text: Color,
	pub border: Color,
	/// Outline drawn around the selected node.
	pub selected: Color,
	pub badge_fill: Color,
	pub badge_text: Color,
	pub corner_radius: f64,
}

/// Stroke colors per relation kind.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub support: Color,
	pub attack: Color,
	pub undercut: Color,
	pub rebut: Color,
	pub label: Color,
	pub label_background: Color,
	pub selected: Color,
	/// Rubber-band line shown while drawing a new edge.
	pub draft: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub node: NodeStyle,
	pub edge: EdgeStyle,
}

impl Theme {
	/// Dark slate theme (default)
	pub fn default_theme() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			node: NodeStyle {
				fact: Color::rgb(94, 129, 172),
				value: Color::rgb(130, 120, 150),
				policy: Color::rgb(180, 136, 100),
				other: Color::rgb(122, 133, 145),
				text: Color::rgba(255, 255, 255, 0.92),
				border: Color::rgba(255, 255, 255, 0.18),
				selected: Color::rgb(255, 214, 102),
				badge_fill: Color::rgb(236, 239, 244),
				badge_text: Color::rgb(22, 27, 34),
				corner_radius: 8.0,
			},
			edge: EdgeStyle {
				support: Color::rgba(120, 190, 140, 0.85),
				attack: Color::rgba(224, 108, 117, 0.85),
				undercut: Color::rgba(229, 165, 90, 0.85),
				rebut: Color::rgba(186, 130, 210, 0.85),
				label: Color::rgba(220, 226, 234, 0.9),
				label_background: Color::rgba(22, 27, 34, 0.75),
				selected: Color::rgb(255, 214, 102),
				draft: Color::rgba(255, 255, 255, 0.6),
			},
		}
	}

	pub fn unit_color(&self, unit_type: UnitType) -> Color {
		match unit_type {
			UnitType::Fact => self.node.fact,
			UnitType::Value => self.node.value,
			UnitType::Policy => self.node.policy,
			UnitType::Other => self.node.other,
		}
	}

	pub fn relation_color(&self, kind: RelationKind) -> Color {
		match kind {
			RelationKind::Support => self.edge.support,
			RelationKind::Attack => self.edge.attack,
			RelationKind::Undercut => self.edge.undercut,
			RelationKind::Rebut => self.edge.rebut,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opaque_colors_render_as_hex() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgb(1, 2, 3).with_alpha(0.5).to_css(),
			"rgba(1, 2, 3, 0.5)"
		);
	}

	#[test]
	fn lighten_and_darken_saturate() {
		let c = Color::rgb(100, 100, 100);
		assert_eq!(c.lighten(1.0), Color::rgb(255, 255, 255));
		assert_eq!(c.darken(2.0), Color::rgb(0, 0, 0));
	}

	#[test]
	fn kinds_have_distinct_colors() {
		let theme = Theme::default();
		let colors: Vec<_> = RelationKind::ALL
			.into_iter()
			.map(|k| theme.relation_color(k).to_css())
			.collect();
		for (i, a) in colors.iter().enumerate() {
			assert!(colors[i + 1..].iter().all(|b| a != b));
		}
	}
}
