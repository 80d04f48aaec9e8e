//! # Arena Loop
//!
//! The frame orchestrator. Owns the sprite pool, the actors and their
//! input, and runs each frame in the one order the pool's batching
//! contract wants: every logical mutation first, one bake at the end, so
//! deferred mode produces exactly one hardware write per changed sprite
//! per frame.

use serde::Deserialize;
use spritebox_core::{BakeMode, SpriteHandle, SpritePool, SpriteSink, SpriteState};
use std::path::Path;

use crate::input::{Input, InputSource};
use crate::physics::{
    self, CollisionShape, PhysicsBody, INPUT_FORCE, PLAYER_FRICTION, PROP_FRICTION,
};

/// Failure loading an [`ArenaConfig`] from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`ArenaConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for an [`Arena`], loadable from TOML.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Playfield width in pixels.
    pub width: f32,
    /// Playfield height in pixels.
    pub height: f32,
    /// Collision radius for player bodies.
    pub player_radius: f32,
    /// Collision radius for prop bodies.
    pub prop_radius: f32,
    /// Force applied per frame while a direction is held.
    pub input_force: f32,
    /// Per-frame velocity decay for players.
    pub player_friction: f32,
    /// Whether sprite changes bake immediately or at end of frame.
    pub deferred_bake: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 240.0,
            player_radius: 8.0,
            prop_radius: 8.0,
            input_force: INPUT_FORCE,
            player_friction: PLAYER_FRICTION,
            deferred_bake: true,
        }
    }
}

impl ArenaConfig {
    /// Loads a config from a TOML file. Missing keys fall back to
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Returns the bake mode this config asks for.
    #[must_use]
    pub fn bake_mode(&self) -> BakeMode {
        if self.deferred_bake {
            BakeMode::Deferred
        } else {
            BakeMode::Immediate
        }
    }
}

/// Per-frame bookkeeping from [`Arena::update`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frames run so far, counting this one.
    pub frame: u64,
    /// Hardware writes baked at the end of this frame.
    pub writes: usize,
    /// Body pairs that overlapped this frame.
    pub collisions: usize,
    /// Live sprites after this frame.
    pub live_sprites: usize,
}

/// An input-driven actor: one sprite, one body, one input.
struct Player {
    sprite: SpriteHandle,
    body: PhysicsBody,
    input: Input,
    friction: f32,
}

/// An actor with no input. Static props never move; movable props slide
/// with prop friction when shoved.
struct Prop {
    sprite: SpriteHandle,
    body: PhysicsBody,
}

/// The arena: a playfield of players and props over a sprite pool.
pub struct Arena<S: SpriteSink> {
    config: ArenaConfig,
    pool: SpritePool<S>,
    players: Vec<Player>,
    props: Vec<Prop>,
    frame: u64,
}

impl<S: SpriteSink> Arena<S> {
    /// Creates an empty arena writing through `sink`.
    pub fn new(config: ArenaConfig, sink: S) -> Self {
        let pool = SpritePool::new(config.bake_mode(), sink);
        tracing::info!(
            width = config.width,
            height = config.height,
            mode = ?config.bake_mode(),
            "arena created"
        );
        Self {
            config,
            pool,
            players: Vec::new(),
            props: Vec::new(),
            frame: 0,
        }
    }

    /// Spawns a player at `(x, y)` driven by `source`.
    ///
    /// Returns the player's sprite handle, null if the sprite budget is
    /// exhausted (in which case nothing is spawned).
    pub fn spawn_player(
        &mut self,
        x: f32,
        y: f32,
        image: u8,
        palette: u8,
        source: Box<dyn InputSource>,
    ) -> SpriteHandle {
        #[allow(clippy::cast_possible_truncation)]
        let sprite = self
            .pool
            .alloc_sprite(SpriteState::new(x as i16, y as i16, image, palette));
        if sprite.is_null() {
            tracing::warn!("sprite budget exhausted, player not spawned");
            return sprite;
        }
        let mut input = Input::new();
        input.set_source(source);
        self.players.push(Player {
            sprite,
            body: PhysicsBody::new(CollisionShape::new([x, y], self.config.player_radius)),
            input,
            friction: self.config.player_friction,
        });
        sprite
    }

    /// Spawns a prop at `(x, y)`. Static props absorb every collision.
    ///
    /// Returns the prop's sprite handle, null if the sprite budget is
    /// exhausted.
    pub fn spawn_prop(
        &mut self,
        x: f32,
        y: f32,
        image: u8,
        palette: u8,
        is_static: bool,
    ) -> SpriteHandle {
        #[allow(clippy::cast_possible_truncation)]
        let sprite = self
            .pool
            .alloc_sprite(SpriteState::new(x as i16, y as i16, image, palette));
        if sprite.is_null() {
            tracing::warn!("sprite budget exhausted, prop not spawned");
            return sprite;
        }
        let shape = if is_static {
            CollisionShape::fixed([x, y], self.config.prop_radius)
        } else {
            CollisionShape::new([x, y], self.config.prop_radius)
        };
        self.props.push(Prop {
            sprite,
            body: PhysicsBody::new(shape),
        });
        sprite
    }

    /// Removes an actor and returns its sprite slot to the pool.
    pub fn despawn(&mut self, sprite: SpriteHandle) {
        if let Some(index) = self.players.iter().position(|p| p.sprite == sprite) {
            self.players.swap_remove(index);
            self.pool.free_sprite(sprite);
        } else if let Some(index) = self.props.iter().position(|p| p.sprite == sprite) {
            self.props.swap_remove(index);
            self.pool.free_sprite(sprite);
        }
    }

    /// Runs one frame: input, forces, collisions, integration, bake.
    pub fn update(&mut self) -> FrameStats {
        self.frame += 1;

        // 1. INPUT + FORCES: held direction becomes force.
        for player in &mut self.players {
            player.input.update();
            let [dx, dy] = player.input.direction_vector();
            player.body.force[0] += dx * self.config.input_force;
            player.body.force[1] += dy * self.config.input_force;
        }

        // 2. COLLIDE: every pair once, against next-frame positions.
        let collisions = self.resolve_collisions();

        // 3. INTEGRATE + MOVE: settle bodies, push positions at the pool.
        let bounds = [self.config.width, self.config.height];
        for player in &mut self.players {
            player.body.post_update(player.friction);
            clamp_to_bounds(&mut player.body, bounds);
            move_body_sprite(&mut self.pool, player.sprite, &player.body);
        }
        for prop in &mut self.props {
            if prop.body.collision.is_static {
                continue;
            }
            prop.body.post_update(PROP_FRICTION);
            clamp_to_bounds(&mut prop.body, bounds);
            move_body_sprite(&mut self.pool, prop.sprite, &prop.body);
        }

        // 4. BAKE: one write per changed sprite.
        let writes = self.pool.flush();
        let stats = FrameStats {
            frame: self.frame,
            writes,
            collisions,
            live_sprites: self.pool.live_count(),
        };
        tracing::debug!(
            frame = stats.frame,
            writes = stats.writes,
            collisions = stats.collisions,
            live = stats.live_sprites,
            "frame complete"
        );
        stats
    }

    /// Tests and resolves every body pair once, returning how many
    /// overlapped.
    fn resolve_collisions(&mut self) -> usize {
        let mut collisions = 0;
        let player_count = self.players.len();

        // Player vs player.
        for i in 0..player_count {
            let (head, tail) = self.players.split_at_mut(i + 1);
            for other in tail {
                collisions += usize::from(physics::resolve(&mut head[i].body, &mut other.body));
            }
        }

        // Player vs prop.
        for player in &mut self.players {
            for prop in &mut self.props {
                collisions += usize::from(physics::resolve(&mut player.body, &mut prop.body));
            }
        }

        // Prop vs prop.
        for i in 0..self.props.len() {
            let (head, tail) = self.props.split_at_mut(i + 1);
            for other in tail {
                collisions += usize::from(physics::resolve(&mut head[i].body, &mut other.body));
            }
        }

        collisions
    }

    /// Read access to the underlying sprite pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &SpritePool<S> {
        &self.pool
    }

    /// Mutable access to the underlying sprite pool.
    #[inline]
    pub fn pool_mut(&mut self) -> &mut SpritePool<S> {
        &mut self.pool
    }

    /// Number of frames run so far.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Keeps a body's circle fully inside the playfield and kills velocity
/// into the wall it hit.
fn clamp_to_bounds(body: &mut PhysicsBody, bounds: [f32; 2]) {
    let radius = body.collision.radius;
    for axis in 0..2 {
        let low = radius;
        let high = bounds[axis] - radius;
        let position = &mut body.collision.position[axis];
        if *position < low {
            *position = low;
            body.velocity[axis] = 0.0;
        } else if *position > high {
            *position = high;
            body.velocity[axis] = 0.0;
        }
    }
}

/// Pushes a body's settled position into the pool.
#[allow(clippy::cast_possible_truncation)]
fn move_body_sprite<S: SpriteSink>(
    pool: &mut SpritePool<S>,
    sprite: SpriteHandle,
    body: &PhysicsBody,
) {
    pool.move_sprite(
        sprite,
        body.collision.position[0].round() as i16,
        body.collision.position[1].round() as i16,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, ScriptedInput};
    use spritebox_core::RecordingSink;

    fn test_arena() -> Arena<RecordingSink> {
        Arena::new(ArenaConfig::default(), RecordingSink::new())
    }

    #[test]
    fn test_held_direction_moves_player() {
        let mut arena = test_arena();
        let sprite = arena.spawn_player(
            100.0,
            100.0,
            0,
            0,
            Box::new(ScriptedInput::holding(Button::Right)),
        );

        let start_x = arena.pool().sprite_state(sprite).x;
        for _ in 0..10 {
            arena.update();
        }
        let end_x = arena.pool().sprite_state(sprite).x;
        assert!(end_x > start_x, "player should drift right: {start_x} -> {end_x}");
    }

    #[test]
    fn test_player_cannot_leave_playfield() {
        let mut arena = test_arena();
        let sprite = arena.spawn_player(
            10.0,
            100.0,
            0,
            0,
            Box::new(ScriptedInput::holding(Button::Left)),
        );

        for _ in 0..120 {
            arena.update();
        }
        let x = f32::from(arena.pool().sprite_state(sprite).x);
        assert!(
            (x - arena.config.player_radius).abs() <= 1.0,
            "player should rest against the left wall, got x={x}"
        );
    }

    #[test]
    fn test_static_prop_stops_player() {
        let mut arena = test_arena();
        let player = arena.spawn_player(
            60.0,
            100.0,
            0,
            0,
            Box::new(ScriptedInput::holding(Button::Right)),
        );
        let wall = arena.spawn_prop(100.0, 100.0, 1, 0, true);

        for _ in 0..240 {
            arena.update();
        }

        assert_eq!(f32::from(arena.pool().sprite_state(wall).x), 100.0);
        // The push eases overlap out over several frames, so the player
        // settles with a small cushion of interpenetration but never
        // reaches the prop's rim.
        let player_x = f32::from(arena.pool().sprite_state(player).x);
        let rim = 100.0 - arena.config.prop_radius;
        assert!(
            player_x > 80.0 && player_x < rim,
            "player should rest against the prop, got x={player_x}"
        );
    }

    #[test]
    fn test_despawn_returns_slot() {
        let mut arena = test_arena();
        let sprite = arena.spawn_player(50.0, 50.0, 0, 0, Box::new(ScriptedInput::default()));
        let free_before = arena.pool().free_slots();

        arena.despawn(sprite);
        assert_eq!(arena.pool().free_slots(), free_before + 1);
        assert!(!arena.pool().is_live(sprite));
    }

    #[test]
    fn test_pool_stays_consistent_across_frames() {
        let mut arena = test_arena();
        arena.spawn_player(
            80.0,
            60.0,
            0,
            0,
            Box::new(ScriptedInput::new(vec![
                Button::Right.bit(),
                Button::Right.bit() | Button::Down.bit(),
                Button::Down.bit(),
                0,
            ])),
        );
        arena.spawn_player(
            120.0,
            60.0,
            1,
            0,
            Box::new(ScriptedInput::holding(Button::Left)),
        );
        arena.spawn_prop(100.0, 120.0, 2, 1, false);

        for _ in 0..30 {
            arena.update();
            arena.pool().verify_sync(true, true).unwrap();
        }
    }
}
