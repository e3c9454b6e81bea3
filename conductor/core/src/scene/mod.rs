//! Scene Description and World State
//!
//! A [`SceneDescription`] says *what* to build (variant, roster size,
//! entity counts, torch mounts) and an [`AssetSet`] says *which models* to
//! draw it with. [`Scene`] is the live world built from them: avatars,
//! links, the entity pool and the set dressing.
//!
//! ```text
//! SceneVariant ──► SceneDescription ──┐
//! model name  ──► AssetSet ───────────┴─► Scene::build(rng)
//!                                           ├─ avatars + LinkSet
//!                                           ├─ EntityPool (comets | torches, pools)
//!                                           └─ Dressing (cosmos | crypt)
//! ```

mod dressing;
mod roster;

pub use dressing::{Dressing, DressingKind, FlowerCircle, FLOWER_RADIUS, NEBULA_COUNT, STAR_COUNT};
pub use roster::{
    default_identity, roll_traits, PersonaPreset, AGENT_COLORS, AGENT_NAMES, DEFAULT_AGENT_COUNT,
    TRAITS_PER_AVATAR, TRAIT_CATEGORIES,
};

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::avatar::{Avatar, AvatarIdentity, AvatarModel, LinkSet};
use crate::entity::{
    Comet, CometSpec, EntityPool, QuantumParticle, ShootingStar, TorchFlame, COMETS,
    QUANTUM_POOL, SHOOTING_STAR_POOL,
};

/// Distance of the inner hexagon from the center seat
pub const SEAT_RADIUS: f32 = 8.0;

const DUNGEON_ARC_RADIUS: f32 = 10.0;

/// Which tableau to stage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneVariant {
    /// Orbs on the flower of life under a comet sky
    #[default]
    OrbCircle,
    /// Angels around an altar in a torch-lit crypt
    Dungeon,
}

impl SceneVariant {
    /// Config / env spelling
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrbCircle => "orb-circle",
            Self::Dungeon => "dungeon",
        }
    }
}

impl fmt::Display for SceneVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orb-circle" | "orb_circle" | "orbs" | "orb" => Ok(Self::OrbCircle),
            "dungeon" | "crypt" | "angels" => Ok(Self::Dungeon),
            other => Err(format!("unknown scene variant: {other}")),
        }
    }
}

/// Models and backdrop a scene is drawn with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSet {
    /// Avatar geometry
    pub avatar_model: AvatarModel,
    /// Backdrop
    pub dressing: DressingKind,
}

impl AssetSet {
    /// Default assets for a variant
    #[must_use]
    pub fn for_variant(variant: SceneVariant) -> Self {
        match variant {
            SceneVariant::OrbCircle => Self {
                avatar_model: AvatarModel::Orb,
                dressing: DressingKind::Cosmos,
            },
            SceneVariant::Dungeon => Self {
                avatar_model: AvatarModel::Angel,
                dressing: DressingKind::Crypt,
            },
        }
    }

    /// Resolve assets, substituting a plain sphere for an unknown model
    #[must_use]
    pub fn resolve(variant: SceneVariant, model: Option<&str>) -> Self {
        let mut assets = Self::for_variant(variant);
        if let Some(name) = model {
            assets.avatar_model = match name.trim().to_ascii_lowercase().as_str() {
                "orb" => AvatarModel::Orb,
                "angel" => AvatarModel::Angel,
                "plain-sphere" | "sphere" => AvatarModel::PlainSphere,
                missing => {
                    tracing::warn!(model = %missing, "Avatar model not available, using placeholder sphere");
                    AvatarModel::PlainSphere
                }
            };
        }
        assets
    }
}

/// Everything needed to build a scene
#[derive(Clone, Debug, PartialEq)]
pub struct SceneDescription {
    /// Tableau
    pub variant: SceneVariant,
    /// Models and backdrop
    pub assets: AssetSet,
    /// Avatars in the roster
    pub agent_count: usize,
    /// Orbiting comets
    pub comets: Vec<CometSpec>,
    /// Shooting-star pool size
    pub shooting_stars: usize,
    /// Quantum-mote pool size
    pub quantum_motes: usize,
    /// Torch mounts
    pub torches: Vec<Vec3>,
    /// Center the motes orbit
    pub altar: Vec3,
}

impl SceneDescription {
    /// Description for a variant with its default assets
    #[must_use]
    pub fn for_variant(variant: SceneVariant, agent_count: usize) -> Self {
        Self::with_assets(variant, AssetSet::for_variant(variant), agent_count)
    }

    /// Description for a variant with explicit assets
    #[must_use]
    pub fn with_assets(variant: SceneVariant, assets: AssetSet, agent_count: usize) -> Self {
        match variant {
            SceneVariant::OrbCircle => Self {
                variant,
                assets,
                agent_count,
                comets: COMETS.to_vec(),
                shooting_stars: SHOOTING_STAR_POOL,
                quantum_motes: 0,
                torches: Vec::new(),
                altar: Vec3::ZERO,
            },
            SceneVariant::Dungeon => Self {
                variant,
                assets,
                agent_count,
                comets: Vec::new(),
                shooting_stars: 0,
                quantum_motes: QUANTUM_POOL,
                torches: vec![
                    Vec3::new(-14.0, 3.0, -14.0),
                    Vec3::new(14.0, 3.0, -14.0),
                    Vec3::new(-14.0, 3.0, 14.0),
                    Vec3::new(14.0, 3.0, 14.0),
                ],
                altar: Vec3::new(0.0, 1.0, 0.0),
            },
        }
    }

    /// Rest position of the avatar in `seat`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn seat_position(&self, seat: usize) -> Vec3 {
        match self.variant {
            SceneVariant::OrbCircle => {
                if seat == 0 {
                    return Vec3::ZERO;
                }
                // Center plus a hexagon; later seats continue on wider rings
                let ring = (seat - 1) / 6;
                let slot = (seat - 1) % 6;
                let radius = SEAT_RADIUS * (ring + 1) as f32;
                let angle = TAU * slot as f32 / 6.0 + ring as f32 * PI / 6.0;
                Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
            }
            SceneVariant::Dungeon => {
                let count = self.agent_count.max(1) as f32;
                let angle = PI + PI * (seat as f32 + 1.0) / (count + 1.0);
                Vec3::new(
                    angle.cos() * DUNGEON_ARC_RADIUS,
                    0.0,
                    angle.sin() * DUNGEON_ARC_RADIUS,
                )
            }
        }
    }
}

/// Live world: avatars, links, entities, dressing
#[derive(Clone, Debug)]
pub struct Scene {
    description: SceneDescription,
    avatars: Vec<Avatar>,
    links: LinkSet,
    entities: EntityPool,
    dressing: Dressing,
    roster_epoch: u64,
}

impl Scene {
    /// Build the world with the default roster
    pub fn build<R: Rng + ?Sized>(description: SceneDescription, rng: &mut R) -> Self {
        let mut entities = EntityPool::new();
        for spec in &description.comets {
            entities.push(Comet::new(*spec));
        }
        for _ in 0..description.shooting_stars {
            entities.push(ShootingStar::new());
        }
        for _ in 0..description.quantum_motes {
            entities.push(QuantumParticle::new(description.altar));
        }
        #[allow(clippy::cast_precision_loss)]
        for (i, mount) in description.torches.iter().enumerate() {
            entities.push(TorchFlame::new(*mount, i as f32 * 1.7));
        }

        let dressing = Dressing::generate(description.assets.dressing, rng);
        let mut scene = Self {
            description,
            avatars: Vec::new(),
            links: LinkSet::default(),
            entities,
            dressing,
            roster_epoch: 0,
        };
        let identities = (0..scene.description.agent_count)
            .map(default_identity)
            .collect();
        scene.populate(identities, rng);
        tracing::info!(
            variant = %scene.description.variant,
            avatars = scene.avatars.len(),
            entities = scene.entities.len(),
            "Scene built"
        );
        scene
    }

    /// Replace the roster and rebuild every link
    pub fn populate<R: Rng + ?Sized>(&mut self, identities: Vec<AvatarIdentity>, rng: &mut R) {
        let model = self.description.assets.avatar_model;
        self.avatars = identities
            .into_iter()
            .enumerate()
            .map(|(seat, identity)| {
                let position = self.description.seat_position(seat);
                Avatar::new(seat, identity, position, model, rng)
            })
            .collect();
        self.links = LinkSet::for_avatars(self.avatars.len());
        self.roster_epoch += 1;
    }

    /// Bumped every time the roster is replaced
    ///
    /// Timers addressed to a seat carry the epoch they were scheduled in, so
    /// they never reach the avatar that took the seat over.
    #[must_use]
    pub fn roster_epoch(&self) -> u64 {
        self.roster_epoch
    }

    /// What the scene was built from
    #[must_use]
    pub fn description(&self) -> &SceneDescription {
        &self.description
    }

    /// Avatars in seat order
    #[must_use]
    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    /// Avatars, mutable
    pub fn avatars_mut(&mut self) -> &mut [Avatar] {
        &mut self.avatars
    }

    /// One avatar, mutable
    pub fn avatar_mut(&mut self, index: usize) -> Option<&mut Avatar> {
        self.avatars.get_mut(index)
    }

    /// Index of the avatar named `name`, case-insensitively
    #[must_use]
    pub fn find_avatar(&self, name: &str) -> Option<usize> {
        self.avatars
            .iter()
            .position(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Links
    #[must_use]
    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    /// Links, mutable
    pub fn links_mut(&mut self) -> &mut LinkSet {
        &mut self.links
    }

    /// Animated entities
    #[must_use]
    pub fn entities(&self) -> &EntityPool {
        &self.entities
    }

    /// Animated entities, mutable
    pub fn entities_mut(&mut self) -> &mut EntityPool {
        &mut self.entities
    }

    /// Set dressing
    #[must_use]
    pub fn dressing(&self) -> &Dressing {
        &self.dressing
    }

    /// Set dressing, mutable
    pub fn dressing_mut(&mut self) -> &mut Dressing {
        &mut self.dressing
    }

    /// Live avatar positions, in seat order
    #[must_use]
    pub fn avatar_positions(&self) -> Vec<Vec3> {
        self.avatars.iter().map(|a| a.pose().position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_orb_circle_layout() {
        let description = SceneDescription::for_variant(SceneVariant::OrbCircle, 7);
        assert_eq!(description.seat_position(0), Vec3::ZERO);
        for seat in 1..7 {
            let p = description.seat_position(seat);
            assert!((p.length() - SEAT_RADIUS).abs() < 1e-4);
        }
        let first = description.seat_position(1);
        assert!((first - Vec3::new(SEAT_RADIUS, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_build_orb_circle() {
        let mut rng = StdRng::seed_from_u64(3);
        let scene = Scene::build(SceneDescription::for_variant(SceneVariant::OrbCircle, 7), &mut rng);
        assert_eq!(scene.avatars().len(), 7);
        assert_eq!(scene.links().len(), 21);
        assert_eq!(scene.avatars()[1].name(), "Osiris");
        assert_eq!(scene.entities().count(EntityKind::Comet), 4);
        assert_eq!(scene.entities().count(EntityKind::ShootingStar), 5);
        assert_eq!(scene.entities().count(EntityKind::TorchFlame), 0);
        assert_eq!(scene.find_avatar("azura"), Some(3));
    }

    #[test]
    fn test_build_dungeon() {
        let mut rng = StdRng::seed_from_u64(3);
        let scene = Scene::build(SceneDescription::for_variant(SceneVariant::Dungeon, 7), &mut rng);
        assert_eq!(scene.entities().count(EntityKind::TorchFlame), 4);
        assert_eq!(scene.entities().count(EntityKind::QuantumParticle), QUANTUM_POOL);
        assert_eq!(scene.entities().active_count(EntityKind::QuantumParticle), 0);
        assert_eq!(scene.avatars()[0].model(), AvatarModel::Angel);
        assert_eq!(scene.dressing().kind(), DressingKind::Crypt);
    }

    #[test]
    fn test_unknown_model_falls_back_to_sphere() {
        let assets = AssetSet::resolve(SceneVariant::OrbCircle, Some("dragon"));
        assert_eq!(assets.avatar_model, AvatarModel::PlainSphere);
        assert_eq!(assets.dressing, DressingKind::Cosmos);
        let assets = AssetSet::resolve(SceneVariant::Dungeon, None);
        assert_eq!(assets.avatar_model, AvatarModel::Angel);
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("dungeon".parse::<SceneVariant>(), Ok(SceneVariant::Dungeon));
        assert_eq!("Orb-Circle".parse::<SceneVariant>(), Ok(SceneVariant::OrbCircle));
        assert!("castle".parse::<SceneVariant>().is_err());
    }

    #[test]
    fn test_populate_rebuilds_links() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut scene = Scene::build(SceneDescription::for_variant(SceneVariant::OrbCircle, 7), &mut rng);
        scene.populate((0..4).map(default_identity).collect(), &mut rng);
        assert_eq!(scene.avatars().len(), 4);
        assert_eq!(scene.links().len(), 6);
    }
}
