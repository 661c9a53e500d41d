use tracing::{debug, info};

use crate::{
    config::{self, ArenaConfig},
    error::GenotypeError,
    genome::{Appearance, Genotype},
    phenotype::{self, Phenotype},
    types::{BacteriumSnapshot, Facing, InputFlags, Vec2},
};

/// Live motion state of one organism. Fully initialized at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub facing: Facing,
    max_speed: f64,
    arena: ArenaConfig,
}

impl Kinematics {
    /// Starts at rest in the arena center, facing right.
    pub fn new(max_speed: f64, arena: ArenaConfig) -> Self {
        Self {
            pos: Vec2::new(arena.width / 2.0, arena.height / 2.0),
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            facing: Facing::Right,
            max_speed,
            arena,
        }
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn arena(&self) -> ArenaConfig {
        self.arena
    }

    /// Advances one tick and returns the new position.
    ///
    /// Flags are applied in the order up, down, left, right, so `right`
    /// decides facing when both horizontal flags are held. Drag is applied
    /// after displacement, and wall contact clamps position without touching
    /// velocity.
    pub fn tick(&mut self, input: InputFlags) -> Vec2 {
        self.acc = Vec2::ZERO;
        if input.up {
            self.acc.y -= config::ACCELERATION_STEP;
        }
        if input.down {
            self.acc.y += config::ACCELERATION_STEP;
        }
        if input.left {
            self.acc.x -= config::ACCELERATION_STEP;
            self.facing = Facing::Left;
        }
        if input.right {
            self.acc.x += config::ACCELERATION_STEP;
            self.facing = Facing::Right;
        }

        self.vel += self.acc;
        self.vel = self.vel.clamp_axes(self.max_speed);

        self.pos += self.vel;
        self.vel *= config::DRAG;

        self.pos.x = self.pos.x.max(0.0).min(self.arena.width);
        self.pos.y = self.pos.y.max(0.0).min(self.arena.height);
        self.pos
    }

    pub fn touching_wall(&self) -> bool {
        self.pos.x <= 0.0
            || self.pos.y <= 0.0
            || self.pos.x >= self.arena.width
            || self.pos.y >= self.arena.height
    }
}

/// One organism: its immutable phenotype plus the motion state it drives.
#[derive(Clone, Debug)]
pub struct Bacterium {
    pub phenotype: Phenotype,
    pub appearance: Appearance,
    pub kinematics: Kinematics,
    ticks: u64,
    at_wall: bool,
}

impl Bacterium {
    /// Synthesizes the phenotype and places the organism in the arena center.
    /// Fails before any state exists when the genotype is invalid.
    pub fn new(genotype: &Genotype, arena: ArenaConfig) -> Result<Self, GenotypeError> {
        let phenotype = phenotype::synthesize(genotype)?;
        info!(
            width = phenotype.width,
            height = phenotype.height,
            speed = phenotype.speed,
            defense = phenotype.defense,
            max_hp = phenotype.max_hp,
            attack = phenotype.attack,
            "phenotype synthesized"
        );
        Ok(Self {
            phenotype,
            appearance: genotype.appearance(),
            kinematics: Kinematics::new(phenotype.speed, arena),
            ticks: 0,
            at_wall: false,
        })
    }

    pub fn tick(&mut self, input: InputFlags) -> Vec2 {
        let pos = self.kinematics.tick(input);
        self.ticks += 1;
        let at_wall = self.kinematics.touching_wall();
        if at_wall != self.at_wall {
            debug!(tick = self.ticks, x = pos.x, y = pos.y, at_wall, "wall contact changed");
            self.at_wall = at_wall;
        }
        pos
    }

    pub fn run(&mut self, input: InputFlags, ticks: u64) -> Vec2 {
        for _ in 0..ticks {
            self.tick(input);
        }
        self.kinematics.pos
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> BacteriumSnapshot {
        BacteriumSnapshot {
            pos: self.kinematics.pos,
            vel: self.kinematics.vel,
            facing: self.kinematics.facing,
            width: self.phenotype.width,
            height: self.phenotype.height,
            appearance: self.appearance,
        }
    }
}
