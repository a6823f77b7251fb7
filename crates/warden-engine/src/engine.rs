//! The guard engine — owns the hecs ECS world, processes operator
//! commands, runs all systems, and produces `EngineSnapshot`s.

use std::collections::{HashMap, VecDeque};

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use warden_core::commands::OperatorCommand;
use warden_core::components::*;
use warden_core::constants::*;
use warden_core::enums::*;
use warden_core::events::EngagementEvent;
use warden_core::state::EngineSnapshot;
use warden_core::types::{Position, SimTime, Velocity};

use crate::commitment::Commitment;
use crate::systems;
use crate::systems::{countermeasures, guard, inventory, sequencer};
use crate::world_setup;

/// Configuration for starting a new engine.
pub struct EngineConfig {
    /// RNG seed for determinism. Same seed = same run.
    pub seed: u64,
    /// Skip ammunition bookkeeping (training/cheat mode).
    pub unlimited_ammo: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            unlimited_ammo: false,
        }
    }
}

/// The engagement engine. Owns the ECS world and all engagement state.
pub struct GuardEngine {
    world: World,
    time: SimTime,
    paused: bool,
    rng: ChaCha8Rng,
    unlimited_ammo: bool,
    next_track_id: u32,
    next_mount_id: u32,
    next_commitment_id: u32,
    command_queue: VecDeque<OperatorCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    events: Vec<EngagementEvent>,
    commitments: HashMap<u32, Commitment>,
}

impl GuardEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            paused: false,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            unlimited_ammo: config.unlimited_ammo,
            next_track_id: 1,
            next_mount_id: 1,
            next_commitment_id: 1,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            commitments: HashMap::new(),
        }
    }

    /// Queue an operator command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: OperatorCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = OperatorCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the engine by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> EngineSnapshot {
        self.process_commands();

        if !self.paused {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build(&self.world, &self.time, self.paused, &self.commitments, events)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn commitments(&self) -> &HashMap<u32, Commitment> {
        &self.commitments
    }

    // --- world population ---

    pub fn spawn_platform(
        &mut self,
        team: u8,
        position: Position,
        velocity: Velocity,
        status: PlatformStatus,
    ) -> u32 {
        let (_, track_id) = world_setup::spawn_platform(
            &mut self.world,
            &mut self.next_track_id,
            team,
            position,
            velocity,
            status,
        );
        track_id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_weapon(
        &mut self,
        platform_track: u32,
        name: &str,
        priority: u8,
        roles: EngageRoles,
        min_range_m: f64,
        max_range_m: f64,
        ammo: u32,
        spec: WeaponSpec,
        turret: Option<TurretMount>,
    ) -> u32 {
        world_setup::add_weapon(
            &mut self.world,
            &mut self.next_mount_id,
            platform_track,
            name,
            priority,
            roles,
            min_range_m,
            max_range_m,
            ammo,
            spec,
            turret,
        )
    }

    pub fn add_sensor(&mut self, platform_track: u32, kind: SensorKind, enabled: bool) {
        world_setup::add_sensor(&mut self.world, platform_track, kind, enabled);
    }

    pub fn add_bay(&mut self, platform_track: u32, bay_id: u32) {
        world_setup::add_bay(&mut self.world, platform_track, bay_id);
    }

    pub fn add_designator(&mut self, platform_track: u32) {
        world_setup::add_designator(&mut self.world, platform_track);
    }

    pub fn add_dispenser(
        &mut self,
        platform_track: u32,
        cm_type: CountermeasureType,
        rounds: u32,
        priority: u8,
    ) {
        world_setup::add_dispenser(&mut self.world, platform_track, cm_type, rounds, priority);
    }

    pub fn spawn_air_target(&mut self, team: u8, position: Position, velocity: Velocity) -> u32 {
        world_setup::spawn_air_target(&mut self.world, &mut self.next_track_id, team, position, velocity).1
    }

    pub fn spawn_surface_target(&mut self, team: u8, position: Position, velocity: Velocity) -> u32 {
        world_setup::spawn_surface_target(&mut self.world, &mut self.next_track_id, team, position, velocity).1
    }

    pub fn spawn_submerged_target(&mut self, team: u8, position: Position, velocity: Velocity) -> u32 {
        world_setup::spawn_submerged_target(&mut self.world, &mut self.next_track_id, team, position, velocity).1
    }

    pub fn spawn_target(
        &mut self,
        position: Position,
        velocity: Velocity,
        params: world_setup::TargetParams,
    ) -> u32 {
        world_setup::spawn_target(&mut self.world, &mut self.next_track_id, position, velocity, params).1
    }

    pub fn spawn_inbound_missile(
        &mut self,
        team: u8,
        position: Position,
        velocity: Velocity,
        aimed_at_track: u32,
        seeker: TargetingMode,
    ) -> u32 {
        world_setup::spawn_inbound_missile(
            &mut self.world,
            &mut self.next_track_id,
            team,
            position,
            velocity,
            aimed_at_track,
            seeker,
        )
        .1
    }

    /// Spawn a jittered wave of hostile air targets around a center point.
    pub fn spawn_hostile_wave(&mut self, team: u8, center: Position, count: usize) -> Vec<u32> {
        world_setup::spawn_hostile_wave(
            &mut self.world,
            &mut self.rng,
            &mut self.next_track_id,
            team,
            center,
            count,
        )
    }

    // --- command processing ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: OperatorCommand) {
        match command {
            OperatorCommand::ToggleGuardMode { platform_track } => {
                self.toggle_guard(platform_track);
            }
            OperatorCommand::SetTargetPolicy {
                platform_track,
                policy,
            } => {
                guard::set_guard(&mut self.world, platform_track, |g| g.policy = policy);
            }
            OperatorCommand::ToggleBurstMode { platform_track } => {
                guard::set_guard(&mut self.world, platform_track, |g| {
                    g.burst_mode = !g.burst_mode;
                });
            }
            OperatorCommand::Fire { platform_track } => {
                self.manual_fire(platform_track);
            }
            OperatorCommand::CycleWeapon { platform_track } => {
                self.cycle_weapon(platform_track);
            }
            OperatorCommand::OverrideTarget {
                platform_track,
                target_track,
            } => {
                let deadline = self.time.tick + (TARGET_OVERRIDE_DURATION / DT) as u64;
                guard::set_guard(&mut self.world, platform_track, |g| {
                    g.override_target = Some(target_track);
                    g.override_deadline_tick = deadline;
                    // Immediate re-scan so the override takes effect now.
                    g.scan_remaining_secs = 0.0;
                });
            }
            OperatorCommand::DropCountermeasure {
                platform_track,
                cm_type,
            } => {
                if countermeasures::dispatch(&mut self.world, platform_track, cm_type) {
                    self.events.push(EngagementEvent::CountermeasureDispatched {
                        platform_track,
                        cm_type,
                        threat_track: 0,
                    });
                }
            }
            OperatorCommand::Pause => self.paused = true,
            OperatorCommand::Resume => self.paused = false,
        }
    }

    fn toggle_guard(&mut self, platform_track: u32) {
        let mut now_engaging = None;
        guard::set_guard(&mut self.world, platform_track, |g| {
            g.phase = match g.phase {
                GuardPhase::Disengaged => GuardPhase::Engaging,
                GuardPhase::Engaging => GuardPhase::Disengaged,
            };
            now_engaging = Some(g.phase == GuardPhase::Engaging);
            if g.phase == GuardPhase::Engaging {
                g.scan_remaining_secs = 0.0;
                g.point_defense_remaining_secs = 0.0;
            } else {
                g.primary_target = None;
                g.selected_weapon = None;
                g.secondary_targets.clear();
                g.fixed_weapon_solution = false;
            }
        });

        match now_engaging {
            Some(true) => {
                // Standing engagement needs the sensor fit back up after a
                // previous disengage safed it.
                systems::sensors::enable_all(&mut self.world, platform_track);
                self.events.push(EngagementEvent::GuardEngaged { platform_track });
            }
            Some(false) => {
                self.events
                    .push(EngagementEvent::GuardDisengaged { platform_track });
                self.disengage_cleanup(platform_track);
            }
            None => {}
        }
    }

    /// Leaving guard mode cancels the platform's live commitments and safes
    /// its turrets.
    fn disengage_cleanup(&mut self, platform_track: u32) {
        let ids: Vec<u32> = self
            .commitments
            .iter()
            .filter(|(_, c)| !c.finished() && c.platform_track == platform_track)
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            if let Some(mut c) = self.commitments.remove(&id) {
                sequencer::finish(
                    &mut self.world,
                    &mut c,
                    CommitmentOutcome::Cancelled,
                    self.time.tick,
                    &mut self.events,
                );
                self.commitments.insert(id, c);
            }
        }

        for (_, (aboard, mount)) in self.world.query_mut::<(&Aboard, &mut WeaponMount)>() {
            if aboard.platform_track == platform_track {
                mount.status.mid_burst = false;
                if let Some(turret) = &mut mount.turret {
                    turret.slaved_to_track = None;
                }
            }
        }
        systems::sensors::safe_all(&mut self.world, platform_track);
    }

    /// Fire the currently selected weapon at the primary target right now,
    /// skipping the scan wait.
    fn manual_fire(&mut self, platform_track: u32) {
        let (primary, selected) = match self
            .world
            .query::<(&CombatPlatform, &TargetTrack, &GuardState)>()
            .iter()
            .find(|(_, (_, t, _))| t.track_id == platform_track)
            .map(|(_, (_, _, g))| (g.primary_target, g.selected_weapon))
        {
            Some(v) => v,
            None => return,
        };
        if let (Some(target), Some(mount_id)) = (primary, selected) {
            guard::commit(
                &mut self.world,
                &mut self.commitments,
                &mut self.next_commitment_id,
                platform_track,
                mount_id,
                target,
                self.time.tick,
                &mut self.events,
            );
        }
    }

    fn cycle_weapon(&mut self, platform_track: u32) {
        let order = inventory::cycle_order(&self.world, platform_track);
        if order.is_empty() {
            return;
        }
        guard::set_guard(&mut self.world, platform_track, |g| {
            let next = match g.selected_weapon {
                Some(current) => {
                    let idx = order.iter().position(|&id| id == current);
                    match idx {
                        Some(i) => order[(i + 1) % order.len()],
                        None => order[0],
                    }
                }
                None => order[0],
            };
            g.selected_weapon = Some(next);
        });
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Inventory rescan (groups, anti-emission, dry-platform flag)
        inventory::run(&mut self.world);
        // 2. Guard controller (detection, scan, selection, commitment)
        guard::run(
            &mut self.world,
            &mut self.commitments,
            &mut self.next_commitment_id,
            self.time.tick,
            &mut self.events,
            self.unlimited_ammo,
        );
        // 3. Firing sequencers
        sequencer::run(
            &mut self.world,
            &mut self.commitments,
            &mut self.next_track_id,
            self.time.tick,
            &mut self.events,
            self.unlimited_ammo,
        );
        // 4. Point defense sub-loop
        systems::point_defense::run(
            &mut self.world,
            &mut self.commitments,
            &mut self.next_commitment_id,
            self.time.tick,
            &mut self.events,
        );
        // 5. Countermeasure dispatcher
        countermeasures::run(&mut self.world, &mut self.events);
        // 6. Sensor bookkeeping (designator slew, lock pruning)
        let protected = sequencer::protected_tracks(&self.commitments);
        systems::sensors::run(&mut self.world, &protected);
        // 7. Movement integration
        systems::movement::run(&mut self.world);
        // 8. Cleanup (retirement, override expiry, decay, despawn)
        systems::cleanup::run(
            &mut self.world,
            &mut self.commitments,
            &mut self.despawn_buffer,
            self.time.tick,
        );
    }
}
