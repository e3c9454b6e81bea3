//! Heterogeneous entity pool with uniform recycling

use rand::seq::SliceRandom;
use rand::Rng;

use super::{AnimatedEntity, EntityKind};

/// All animated entities of a scene
#[derive(Clone, Debug, Default)]
pub struct EntityPool {
    entities: Vec<AnimatedEntity>,
}

impl EntityPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity
    pub fn push(&mut self, entity: impl Into<AnimatedEntity>) {
        self.entities.push(entity.into());
    }

    /// Number of entities of every kind
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the pool is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over every entity
    pub fn iter(&self) -> impl Iterator<Item = &AnimatedEntity> {
        self.entities.iter()
    }

    /// Entity by index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AnimatedEntity> {
        self.entities.get(index)
    }

    /// Number of entities of `kind`
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind() == kind).count()
    }

    /// Number of live entities of `kind`
    #[must_use]
    pub fn active_count(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind() == kind && e.is_active())
            .count()
    }

    /// Activate one inactive entity of `kind`, chosen uniformly
    ///
    /// Returns the index of the activated entity, or `None` when every
    /// entity of that kind is already live.
    pub fn spawn<R: Rng + ?Sized>(&mut self, kind: EntityKind, rng: &mut R) -> Option<usize> {
        let candidates: Vec<usize> = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind() == kind && !e.is_active())
            .map(|(i, _)| i)
            .collect();
        let index = *candidates.choose(rng)?;
        self.entities[index].activate(rng);
        tracing::trace!(?kind, index, "Entity activated");
        Some(index)
    }

    /// Advance every live entity
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        for entity in &mut self.entities {
            entity.update(dt, rng);
        }
    }
}
