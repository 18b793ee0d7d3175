//! Actor store, spawning, and actor-vs-actor collision
//!
//! The store is the single registry of tanks for a round. Components that
//! need actor data borrow it from the session; nothing reaches it globally.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::geometry::{Hitbox, hitbox_corners, polygons_intersect};
use super::maze::{Cell, Maze};
use super::walls::is_colliding_with_wall;
use crate::error::ArenaError;
use crate::settings::ArenaSettings;
use crate::wrap_degrees;

/// Opaque actor identifier, minted at spawn and never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Host-side render handle. The core only stores and returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// Center position and heading (degrees, 0° up, clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            angle: wrap_degrees(angle),
        }
    }
}

/// A tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Seat of the controlling player (stable across rounds)
    pub player_index: usize,
    pub alive: bool,
    /// Kills scored this round
    pub kills: u32,
    pub pose: Pose,
    /// Bounding width/height in pixels
    pub size: Vec2,
    #[serde(skip)]
    pub visual: Option<VisualHandle>,
}

impl Actor {
    pub fn corners(&self, hitbox: Hitbox) -> [Vec2; 4] {
        hitbox_corners(self.pose.position, self.pose.angle, self.size, hitbox)
    }
}

/// Registry of the round's actors
#[derive(Debug, Default)]
pub struct ActorStore {
    actors: Vec<Actor>,
    next_id: u32,
}

impl ActorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `count` actors into distinct random cells, centered, with random
    /// headings. Player indices follow spawn order.
    pub fn spawn<R: Rng>(
        &mut self,
        count: usize,
        maze: &Maze,
        cell_size: f32,
        settings: &ArenaSettings,
        rng: &mut R,
    ) -> Result<Vec<ActorId>, ArenaError> {
        if count == 0 {
            return Err(ArenaError::NoActors);
        }
        let cells = maze.cell_count();
        if count > cells {
            return Err(ArenaError::TooManyActors { requested: count, cells });
        }

        let mut free: Vec<Cell> = maze
            .cells()
            .filter(|cell| !self.occupies(*cell, cell_size))
            .collect();
        if count > free.len() {
            return Err(ArenaError::TooManyActors {
                requested: count,
                cells: free.len(),
            });
        }
        free.shuffle(rng);

        let size = Vec2::splat(cell_size * settings.actor_scale);
        let mut ids = Vec::with_capacity(count);
        for (player_index, cell) in free.into_iter().take(count).enumerate() {
            let id = self.mint_id();
            let angle = rng.random_range(0.0..360.0);
            self.actors.push(Actor {
                id,
                player_index,
                alive: true,
                kills: 0,
                pose: Pose::new(cell.center(cell_size), angle),
                size,
                visual: None,
            });
            ids.push(id);
        }

        log::info!("Spawned {} actors into {} cells", count, cells);
        Ok(ids)
    }

    fn mint_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    fn occupies(&self, cell: Cell, cell_size: f32) -> bool {
        self.actors
            .iter()
            .any(|a| a.alive && Cell::containing(a.pose.position, cell_size) == cell)
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    /// Live actor for a player seat
    pub fn for_player(&self, player_index: usize) -> Option<&Actor> {
        self.actors
            .iter()
            .find(|a| a.player_index == player_index && a.alive)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|a| a.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|a| a.alive)
    }

    /// Publish a new pose. Dead or unknown actors are left untouched.
    pub fn commit_pose(&mut self, id: ActorId, pose: Pose) -> bool {
        match self.get_mut(id) {
            Some(actor) if actor.alive => {
                actor.pose = Pose::new(pose.position, pose.angle);
                true
            }
            _ => false,
        }
    }

    /// Mark an actor dead. Returns false if it was already dead or unknown.
    pub fn kill(&mut self, id: ActorId) -> bool {
        match self.get_mut(id) {
            Some(actor) if actor.alive => {
                actor.alive = false;
                true
            }
            _ => false,
        }
    }

    pub fn credit_kill(&mut self, id: ActorId) {
        if let Some(actor) = self.get_mut(id) {
            actor.kills += 1;
        }
    }

    pub fn attach_visual(&mut self, id: ActorId, visual: VisualHandle) -> bool {
        match self.get_mut(id) {
            Some(actor) => {
                actor.visual = Some(visual);
                true
            }
            None => false,
        }
    }

    /// Drop every actor, handing back their visuals for the host to release
    pub fn clear(&mut self) -> Vec<VisualHandle> {
        self.actors.drain(..).filter_map(|a| a.visual).collect()
    }
}

/// First other live actor whose body overlaps `me` posed at `pose`
pub fn find_colliding_actor(store: &ActorStore, me: ActorId, pose: Pose, size: Vec2) -> Option<ActorId> {
    colliding_actor_excluding(store, &[me], pose, size)
}

fn colliding_actor_excluding(store: &ActorStore, skip: &[ActorId], pose: Pose, size: Vec2) -> Option<ActorId> {
    let mine = hitbox_corners(pose.position, pose.angle, size, Hitbox::Body);
    store
        .alive()
        .filter(|other| !skip.contains(&other.id))
        .find(|other| polygons_intersect(&mine, &other.corners(Hitbox::Body)))
        .map(|other| other.id)
}

/// Try to shove `other` along `push` (the `pusher`'s step this sub-step).
///
/// The pushed actor moves by a fraction of the step and twists by a torque
/// proportional to the sine between the push direction and the line from
/// pusher to pushed. A nearly head-on push gets a small random twist instead
/// so two actors never lock in a perfect standoff. If the new position hits a
/// wall the twist alone is tried in place. Rejected when the result overlaps a
/// wall or a third actor; otherwise the pose is committed in one write.
#[allow(clippy::too_many_arguments)]
pub fn try_push<R: Rng>(
    store: &mut ActorStore,
    pusher: ActorId,
    other: ActorId,
    push: Vec2,
    pusher_position: Vec2,
    cell_size: f32,
    maze: &Maze,
    settings: &ArenaSettings,
    rng: &mut R,
) -> bool {
    let Some(target) = store.get(other).filter(|a| a.alive) else {
        return false;
    };
    let (start, size) = (target.pose, target.size);

    let to_target = start.position - pusher_position;
    let mut torque = (push.y.atan2(push.x) - to_target.y.atan2(to_target.x)).sin();
    if torque.abs() < 0.1 {
        torque = (rng.random::<f32>() - 0.5) * 0.2;
    }
    let angle = wrap_degrees(start.angle + torque * settings.push_torque_gain);

    let mut position = start.position + push * settings.push_factor;
    if is_colliding_with_wall(position, angle, size, cell_size, maze) {
        position = start.position;
        if is_colliding_with_wall(position, angle, size, cell_size, maze) {
            log::debug!("Push on {:?} rejected by wall", other);
            return false;
        }
    }

    let next = Pose::new(position, angle);
    if colliding_actor_excluding(store, &[other, pusher], next, size).is_some() {
        log::debug!("Push on {:?} rejected by third actor", other);
        return false;
    }

    store.commit_pose(other, next)
}
