use serde::Serialize;

use crate::{
    config,
    error::GenotypeError,
    genome::{CoreGenes, Genotype},
};

/// Body dimensions and stats derived from a genotype. Never mutated after
/// synthesis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Phenotype {
    /// Truncated toward zero, like `height`.
    pub width: f64,
    pub height: f64,
    /// Per-axis velocity cap used by the kinematic controller.
    pub speed: f64,
    pub defense: f64,
    pub max_hp: f64,
    pub attack: f64,
}

pub fn sigmoid(t: f64) -> f64 {
    1.0 / (1.0 + (-t).exp())
}

/// Damps `value` by `SPEED_DAMPING` until it no longer exceeds `SPEED_CAP`.
/// Values already at or below the cap pass through unchanged; anything above
/// ends strictly below it.
pub fn saturate(value: f64) -> f64 {
    let mut value = value;
    while value > config::SPEED_CAP {
        value *= config::SPEED_DAMPING;
    }
    value
}

pub fn synthesize(genotype: &Genotype) -> Result<Phenotype, GenotypeError> {
    synthesize_core(genotype.core())
}

pub fn synthesize_core(genes: CoreGenes) -> Result<Phenotype, GenotypeError> {
    let CoreGenes { size, eccentricity } = genes;
    let height = size.trunc();
    if !(height.is_finite() && height >= 1.0) {
        return Err(GenotypeError::InvalidGenotype { size, height });
    }
    let width = (size * (1.0 + eccentricity)).trunc();
    let skew = width - height;

    Ok(Phenotype {
        width,
        height,
        speed: saturate(sigmoid(skew) * size),
        defense: sigmoid(-skew) * size,
        max_hp: size * config::HP_PER_SIZE,
        attack: size * config::ATTACK_BASE.powf(width / height),
    })
}
