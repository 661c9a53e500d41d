use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{config, types::Rgb};

pub const DEFAULT_EYE_ANGLE: f64 = 30.0;
pub const DEFAULT_EYE_POSITION: (f64, f64) = (0.7, 0.4);
pub const DEFAULT_MOUTH_CURVE: f64 = 0.2;
pub const DEFAULT_FLAGELLUM_CURVE: f64 = 0.3;

pub const DEFAULT_BODY_COLOR: Rgb = Rgb::new(173, 216, 230);
pub const DEFAULT_EYE_COLOR: Rgb = Rgb::new(0, 0, 0);
pub const DEFAULT_MOUTH_COLOR: Rgb = Rgb::new(255, 0, 0);
pub const DEFAULT_FLAGELLUM_COLOR: Rgb = Rgb::new(200, 200, 200);

/// Named genetic parameters of one organism. Unset fields fall back to
/// their documented defaults when resolved; size-relative defaults follow
/// the resolved `size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genotype {
    /// Base body scale. Default 10.
    pub size: Option<f64>,
    /// Width-to-height skew in [0, 1). Default 0.3.
    pub eccentricity: Option<f64>,
    /// Default `size * 0.2`.
    pub eye_size: Option<f64>,
    /// Degrees. Default 30.
    pub eye_angle: Option<f64>,
    /// Fractions of the half-axes. Default (0.7, 0.4).
    pub eye_position: Option<(f64, f64)>,
    /// Default `size * 0.3`.
    pub mouth_size: Option<f64>,
    pub mouth_curve: Option<f64>,
    /// Default `size * 0.8`.
    pub flagellum_length: Option<f64>,
    pub flagellum_curve: Option<f64>,
    pub body_color: Option<Rgb>,
    pub eye_color: Option<Rgb>,
    pub mouth_color: Option<Rgb>,
    pub flagellum_color: Option<Rgb>,
}

/// The stat-bearing genes, the only inputs of phenotype synthesis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreGenes {
    pub size: f64,
    pub eccentricity: f64,
}

/// Cosmetic genes, consumed only by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Appearance {
    pub eccentricity: f64,
    pub eye_size: f64,
    pub eye_angle: f64,
    pub eye_position: (f64, f64),
    pub mouth_size: f64,
    pub mouth_curve: f64,
    pub flagellum_length: f64,
    pub flagellum_curve: f64,
    pub body_color: Rgb,
    pub eye_color: Rgb,
    pub mouth_color: Rgb,
    pub flagellum_color: Rgb,
}

impl Genotype {
    #[cfg(test)]
    pub fn with_size(size: f64) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn core(&self) -> CoreGenes {
        CoreGenes {
            size: self.size.unwrap_or(config::DEFAULT_SIZE),
            eccentricity: self.eccentricity.unwrap_or(config::DEFAULT_ECCENTRICITY),
        }
    }

    pub fn appearance(&self) -> Appearance {
        let CoreGenes { size, eccentricity } = self.core();
        Appearance {
            eccentricity,
            eye_size: self.eye_size.unwrap_or(size * 0.2),
            eye_angle: self.eye_angle.unwrap_or(DEFAULT_EYE_ANGLE),
            eye_position: self.eye_position.unwrap_or(DEFAULT_EYE_POSITION),
            mouth_size: self.mouth_size.unwrap_or(size * 0.3),
            mouth_curve: self.mouth_curve.unwrap_or(DEFAULT_MOUTH_CURVE),
            flagellum_length: self.flagellum_length.unwrap_or(size * 0.8),
            flagellum_curve: self.flagellum_curve.unwrap_or(DEFAULT_FLAGELLUM_CURVE),
            body_color: self.body_color.unwrap_or(DEFAULT_BODY_COLOR),
            eye_color: self.eye_color.unwrap_or(DEFAULT_EYE_COLOR),
            mouth_color: self.mouth_color.unwrap_or(DEFAULT_MOUTH_COLOR),
            flagellum_color: self.flagellum_color.unwrap_or(DEFAULT_FLAGELLUM_COLOR),
        }
    }

    /// Layers `other`'s set fields over `self`.
    pub fn overlay(self, other: Genotype) -> Genotype {
        Genotype {
            size: other.size.or(self.size),
            eccentricity: other.eccentricity.or(self.eccentricity),
            eye_size: other.eye_size.or(self.eye_size),
            eye_angle: other.eye_angle.or(self.eye_angle),
            eye_position: other.eye_position.or(self.eye_position),
            mouth_size: other.mouth_size.or(self.mouth_size),
            mouth_curve: other.mouth_curve.or(self.mouth_curve),
            flagellum_length: other.flagellum_length.or(self.flagellum_length),
            flagellum_curve: other.flagellum_curve.or(self.flagellum_curve),
            body_color: other.body_color.or(self.body_color),
            eye_color: other.eye_color.or(self.eye_color),
            mouth_color: other.mouth_color.or(self.mouth_color),
            flagellum_color: other.flagellum_color.or(self.flagellum_color),
        }
    }

    /// Samples a complete genotype. Sizes stay large enough to draw and
    /// eccentricity stays inside [0, 1).
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let size = rng.gen_range(5.0..120.0_f64).round();
        Genotype {
            size: Some(size),
            eccentricity: Some(rng.gen_range(0.0..0.95)),
            eye_size: Some(size * rng.gen_range(0.1..0.3)),
            eye_angle: Some(rng.gen_range(0.0..90.0)),
            eye_position: Some((rng.gen_range(0.4..0.9), rng.gen_range(0.2..0.6))),
            mouth_size: Some(size * rng.gen_range(0.2..0.4)),
            mouth_curve: Some(rng.gen_range(0.0..0.5)),
            flagellum_length: Some(size * rng.gen_range(0.4..1.2)),
            flagellum_curve: Some(rng.gen_range(0.0..0.6)),
            body_color: Some(color(rng)),
            eye_color: Some(color(rng)),
            mouth_color: Some(color(rng)),
            flagellum_color: Some(color(rng)),
        }
    }
}

fn color<R: Rng>(rng: &mut R) -> Rgb {
    Rgb::new(rng.r#gen(), rng.r#gen(), rng.r#gen())
}
