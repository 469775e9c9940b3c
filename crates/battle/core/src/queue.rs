//! Turn order selection.

use crate::entity::{Entity, EntityId, Schedulable, Snapshot};

/// Which end of the timeline acts first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueuePriority {
    /// Lowest time-to-next-turn acts first.
    Low,
    /// Highest time-to-next-turn acts first.
    High,
}

/// Picks the next entity to act from a fixed set of members.
///
/// The queue stores member ids only; the entities themselves stay owned by the
/// battle and are passed in at query time.
#[derive(Clone, Debug)]
pub struct BattleQueue {
    members: Vec<EntityId>,
    priority: QueuePriority,
}

impl BattleQueue {
    pub fn new(members: impl IntoIterator<Item = EntityId>, priority: QueuePriority) -> Self {
        Self {
            members: members.into_iter().collect(),
            priority,
        }
    }

    pub fn priority(&self) -> QueuePriority {
        self.priority
    }

    pub fn add_entity(&mut self, id: EntityId) {
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    /// Returns true if the entity was a member.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != id);
        self.members.len() != before
    }

    /// Selects the member that acts next.
    ///
    /// Only members that can act are considered. Ties keep the first member in
    /// insertion order. Returns `None` when nobody can act, which the battles
    /// treat as a broken invariant.
    pub fn next_entity<S>(&self, entities: &[Entity<S>]) -> Option<EntityId>
    where
        S: Snapshot + Schedulable,
    {
        let mut best: Option<(EntityId, f32)> = None;
        for (id, time) in self.candidates(entities) {
            let better = match best {
                None => true,
                Some((_, best_time)) => match self.priority {
                    QueuePriority::Low => time < best_time,
                    QueuePriority::High => time > best_time,
                },
            };
            if better {
                best = Some((id, time));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Members that can act, in the order they would be picked.
    pub fn order<S>(&self, entities: &[Entity<S>]) -> Vec<(EntityId, f32)>
    where
        S: Snapshot + Schedulable,
    {
        let mut order: Vec<(EntityId, f32)> = self.candidates(entities).collect();
        match self.priority {
            QueuePriority::Low => order.sort_by(|a, b| a.1.total_cmp(&b.1)),
            QueuePriority::High => order.sort_by(|a, b| b.1.total_cmp(&a.1)),
        }
        order
    }

    fn candidates<'a, S>(
        &'a self,
        entities: &'a [Entity<S>],
    ) -> impl Iterator<Item = (EntityId, f32)> + 'a
    where
        S: Snapshot + Schedulable,
    {
        self.members.iter().filter_map(move |&id| {
            let entity = entities.iter().find(|entity| entity.id() == id)?;
            entity
                .can_act()
                .then(|| (id, entity.time_to_next_turn()))
        })
    }
}
