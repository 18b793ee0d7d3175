//! Projectile manager
//!
//! Owns every live projectile. Each frame projectiles are advanced in
//! sub-steps shorter than both a quarter cell and the wall contact band.
//! Every sub-step checks for a wall contact (a bounce, or removal once the
//! ricochet budget is spent) and then tests the projectile's polygon against
//! live actor hitboxes. A projectile reflects at most once per frame.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actors::{Actor, ActorId, ActorStore, VisualHandle};
use super::geometry::{Hitbox, circle_polygon, polygons_intersect};
use super::ricochet::{find_wall_contact, half_wall_thickness};
use super::state::{Arena, GameEvent};
use crate::consts::{OUT_OF_BOUNDS_SLACK, PROJECTILE_POLYGON_SIDES};
use crate::heading_to_dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: ActorId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Session clock at spawn (seconds)
    pub spawned_at: f64,
    /// Bounces left before the next wall contact removes it
    pub ricochets_left: u32,
    #[serde(skip)]
    pub visual: Option<VisualHandle>,
}

/// Why a projectile left play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Expired,
    OutOfBounds,
    Spent,
    Hit(ActorId),
}

#[derive(Debug, Default)]
pub struct ProjectileManager {
    projectiles: Vec<Projectile>,
    last_fired: HashMap<ActorId, f64>,
    next_id: u32,
}

impl ProjectileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    /// Fire from `owner`'s muzzle along its heading.
    ///
    /// No-op when the owner is dead or unknown, still cooling down, or the
    /// active cap is reached.
    pub fn fire(&mut self, owner: ActorId, now: f64, arena: &Arena, store: &ActorStore) -> Option<ProjectileId> {
        let settings = arena.settings;
        let Some(actor) = store.get(owner).filter(|a| a.alive) else {
            log::debug!("Fire from {:?} ignored: not alive", owner);
            return None;
        };
        if let Some(&last) = self.last_fired.get(&owner) {
            if now - last < settings.fire_cooldown as f64 {
                log::debug!("Fire from {:?} ignored: cooling down", owner);
                return None;
            }
        }
        if self.projectiles.len() >= settings.max_active_projectiles {
            log::debug!("Fire from {:?} ignored: {} projectiles active", owner, self.projectiles.len());
            return None;
        }

        let direction = heading_to_dir(actor.pose.angle);
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.projectiles.push(Projectile {
            id,
            owner,
            position: muzzle(actor),
            velocity: direction * settings.projectile_speed_cells * arena.cell_size,
            radius: settings.projectile_radius_factor * arena.cell_size,
            spawned_at: now,
            ricochets_left: settings.ricochet_budget,
            visual: None,
        });
        self.last_fired.insert(owner, now);
        Some(id)
    }

    /// Advance all projectiles one frame, resolving bounces and hits.
    ///
    /// Victims are marked dead and owners credited in `store` immediately.
    /// Returns the number of actors hit.
    pub fn update(
        &mut self,
        dt: f32,
        now: f64,
        arena: &Arena,
        store: &mut ActorStore,
        events: &mut Vec<GameEvent>,
    ) -> usize {
        let dt = dt.min(arena.settings.max_projectile_dt);
        if dt <= 0.0 {
            return 0;
        }

        let mut hits = 0;
        let mut survivors = Vec::with_capacity(self.projectiles.len());
        for mut projectile in self.projectiles.drain(..) {
            match advance(&mut projectile, dt, now, arena, store, events) {
                None => survivors.push(projectile),
                Some(removal) => {
                    if let Removal::Hit(victim) = removal {
                        hits += 1;
                        resolve_hit(&projectile, victim, store, events);
                    }
                    log::trace!("{:?} removed: {:?}", projectile.id, removal);
                    events.push(GameEvent::ProjectileRemoved {
                        projectile: projectile.id,
                        visual: projectile.visual,
                    });
                }
            }
        }
        self.projectiles = survivors;
        hits
    }

    pub fn attach_visual(&mut self, id: ProjectileId, visual: VisualHandle) -> bool {
        match self.projectiles.iter_mut().find(|p| p.id == id) {
            Some(projectile) => {
                projectile.visual = Some(visual);
                true
            }
            None => false,
        }
    }

    /// Drop every projectile and cooldown, handing back visuals
    pub fn clear(&mut self) -> Vec<VisualHandle> {
        self.last_fired.clear();
        self.projectiles.drain(..).filter_map(|p| p.visual).collect()
    }
}

/// Front-most vertex of the turret hitbox
pub fn muzzle(actor: &Actor) -> Vec2 {
    let facing = heading_to_dir(actor.pose.angle);
    actor
        .corners(Hitbox::Turret)
        .into_iter()
        .fold(None::<Vec2>, |best, corner| match best {
            Some(b) if b.dot(facing) >= corner.dot(facing) => Some(b),
            _ => Some(corner),
        })
        .unwrap_or(actor.pose.position)
}

fn advance(
    projectile: &mut Projectile,
    dt: f32,
    now: f64,
    arena: &Arena,
    store: &ActorStore,
    events: &mut Vec<GameEvent>,
) -> Option<Removal> {
    let settings = arena.settings;
    let age = now - projectile.spawned_at;
    if age >= settings.projectile_lifetime as f64 {
        return Some(Removal::Expired);
    }

    // Shorter than the contact band so the center cannot skip over a wall line
    let reach = projectile.radius + half_wall_thickness(arena.cell_size);
    let max_step = (arena.cell_size * 0.25).min(reach * 0.9);
    let steps = (projectile.velocity.length() * dt / max_step).ceil().max(1.0) as u32;
    let h = dt / steps as f32;
    let bounds = arena.maze.pixel_size(arena.cell_size);
    let mut bounced = false;

    for _ in 0..steps {
        let from = projectile.position;
        projectile.position += projectile.velocity * h;

        if let Some(contact) = find_wall_contact(
            projectile.position,
            from,
            projectile.radius,
            arena.cell_size,
            arena.maze,
        ) {
            if bounced {
                // One reflection per frame; wait out the rest clear of the wall
                projectile.position = from;
                break;
            }
            if projectile.ricochets_left == 0 {
                return Some(Removal::Spent);
            }
            contact.apply(&mut projectile.position, &mut projectile.velocity, settings.ricochet_damping);
            projectile.ricochets_left -= 1;
            bounced = true;
            events.push(GameEvent::ProjectileRicocheted {
                projectile: projectile.id,
                position: contact.point,
            });
        }

        let p = projectile.position;
        if p.x < -OUT_OF_BOUNDS_SLACK
            || p.y < -OUT_OF_BOUNDS_SLACK
            || p.x > bounds.x + OUT_OF_BOUNDS_SLACK
            || p.y > bounds.y + OUT_OF_BOUNDS_SLACK
        {
            return Some(Removal::OutOfBounds);
        }

        let owner_immune = age < settings.owner_grace as f64;
        if let Some(victim) = hit_actor(projectile, owner_immune, store) {
            return Some(Removal::Hit(victim));
        }
    }
    None
}

/// First live actor whose body or turret overlaps the projectile
fn hit_actor(projectile: &Projectile, owner_immune: bool, store: &ActorStore) -> Option<ActorId> {
    let shape = circle_polygon(projectile.position, projectile.radius, PROJECTILE_POLYGON_SIDES);
    store
        .alive()
        .filter(|actor| !(owner_immune && actor.id == projectile.owner))
        .find(|actor| {
            polygons_intersect(&shape, &actor.corners(Hitbox::Body))
                || polygons_intersect(&shape, &actor.corners(Hitbox::Turret))
        })
        .map(|actor| actor.id)
}

fn resolve_hit(projectile: &Projectile, victim: ActorId, store: &mut ActorStore, events: &mut Vec<GameEvent>) {
    if !store.kill(victim) {
        return;
    }
    let killer = (projectile.owner != victim).then_some(projectile.owner);
    if let Some(owner) = killer {
        store.credit_kill(owner);
    }
    log::info!("{:?} hit by {:?}", victim, projectile.owner);
    events.push(GameEvent::ActorHit { victim, killer });
}
