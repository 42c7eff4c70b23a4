//! The simulation pool.
//!
//! [`ParticlePool`] owns every live [`ParticleGroup`]. Groups enter through
//! [`emit`](ParticlePool::emit) (or the cross-thread queue) and leave only
//! through the retirement pass at the end of [`tick`](ParticlePool::tick).
//!
//! # Storage
//!
//! Groups live in a slot arena indexed by [`GroupHandle`]:
//!
//! - `slots` holds each group plus a generation counter
//! - `live` is a dense list of occupied slot indices, iterated every tick
//! - `free` lists slots whose group has been retired
//!
//! Retiring a slot bumps its generation, so handles to the old group stop
//! resolving even after the slot is reused. Removal from `live` happens in a
//! single `retain` pass after every group has been stepped, never while
//! iterating.
//!
//! # Tick Order
//!
//! 1. Drain requests queued through [`EmissionSender`]s
//! 2. Step every live group (decay, then integrate if still alive)
//! 3. Compact `live` and free every expired slot
//! 4. Notify the observer, once the pool no longer holds those groups

use crate::config::PoolConfig;
use crate::emitter::{EmissionRequest, Emitter};
use crate::error::{ConfigError, EmitError};
use crate::group::{GroupHandle, ParticleGroup, StepOutcome, StepParams};
use crate::lifecycle::GroupObserver;
use crate::queue::{EmissionQueue, EmissionSender};
use crate::render::GroupView;

/// What happened during one [`tick`](ParticlePool::tick).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Groups created from queued requests at the start of the tick.
    pub spawned: Vec<GroupHandle>,
    /// Groups whose life ran out this tick. Their handles no longer resolve.
    pub retired: Vec<GroupHandle>,
    /// Queued requests that could not be turned into groups.
    pub rejected: usize,
    /// Retirements whose observer reported a disposal failure.
    pub dispose_failures: usize,
}

/// Running counters for a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub live_groups: usize,
    pub live_particles: u64,
    pub total_emitted_groups: u64,
    pub total_retired_groups: u64,
    pub total_dispose_failures: u64,
    pub ticks: u64,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    group: Option<ParticleGroup>,
}

/// Owns, advances, and retires particle groups.
///
/// The type parameter is the [`GroupObserver`] notified on spawn and
/// retirement; the default `()` ignores both.
///
/// # Example
///
/// ```
/// use burstpool::{Color, EmissionRequest, ParticlePool, Vec3};
///
/// let mut pool = ParticlePool::new();
/// let handle = pool
///     .emit(EmissionRequest::new(10, Color::WHITE).at(Vec3::ZERO).lifetime(1.0))
///     .unwrap();
///
/// for _ in 0..60 {
///     pool.tick(1.0 / 60.0);
/// }
/// assert!(!pool.contains(handle));
/// ```
#[derive(Debug)]
pub struct ParticlePool<O: GroupObserver = ()> {
    config: PoolConfig,
    emitter: Emitter,
    slots: Vec<Slot>,
    live: Vec<u32>,
    free: Vec<u32>,
    queue: EmissionQueue,
    observer: O,
    stats: PoolStats,
}

impl ParticlePool<()> {
    /// Pool with default settings and no observer.
    pub fn new() -> Self {
        Self::build(PoolConfig::default(), ())
    }

    /// Pool with the given settings and no observer.
    pub fn with_config(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, ()))
    }
}

impl Default for ParticlePool<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: GroupObserver> ParticlePool<O> {
    fn build(config: PoolConfig, observer: O) -> Self {
        let emitter = match config.seed {
            Some(seed) => Emitter::from_seed(seed),
            None => Emitter::from_entropy(),
        };
        Self {
            slots: Vec::with_capacity(config.initial_capacity),
            live: Vec::with_capacity(config.initial_capacity),
            free: Vec::new(),
            queue: EmissionQueue::new(),
            stats: PoolStats::default(),
            config,
            emitter,
            observer,
        }
    }

    /// Swap in a different observer, keeping all groups and settings.
    ///
    /// Live groups are handed over: the outgoing observer gets `on_retire`
    /// for each so it can release what it allocated, then the new observer
    /// gets `on_spawn` for each. Every observer therefore sees balanced
    /// callbacks. Handoff disposal failures are logged and counted.
    pub fn with_observer<P: GroupObserver>(mut self, mut observer: P) -> ParticlePool<P> {
        let handles: Vec<GroupHandle> = self.iter().map(|(handle, _)| handle).collect();
        for &handle in &handles {
            if let Err(e) = self.observer.on_retire(handle) {
                log::warn!("{} handed off but its resources leaked: {}", handle, e);
                self.stats.total_dispose_failures += 1;
            }
        }
        for (handle, group) in self.iter() {
            observer.on_spawn(handle, group);
        }
        ParticlePool {
            config: self.config,
            emitter: self.emitter,
            slots: self.slots,
            live: self.live,
            free: self.free,
            queue: self.queue,
            observer,
            stats: self.stats,
        }
    }

    // =========================================================================
    // EMISSION
    // =========================================================================

    /// Create a group from `request` and add it to the pool.
    ///
    /// The group is fully initialized before it is registered, and is first
    /// integrated on the next call to [`tick`](Self::tick).
    pub fn emit(&mut self, request: EmissionRequest) -> Result<GroupHandle, EmitError> {
        let group = self.emitter.build(&request, self.config.assumed_frame_rate)?;
        let handle = self.insert(group);
        log::debug!(
            "emitted {} with {} particles at {}",
            handle,
            request.count,
            request.origin
        );
        Ok(handle)
    }

    /// Handle for queueing emissions from other threads.
    ///
    /// Queued requests become groups at the start of the next tick.
    pub fn sender(&self) -> EmissionSender {
        self.queue.sender()
    }

    /// Number of queued requests waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn insert(&mut self, group: ParticleGroup) -> GroupHandle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.group.is_none());
        let handle = GroupHandle {
            index,
            generation: slot.generation,
        };

        self.stats.live_particles += group.count() as u64;
        self.stats.total_emitted_groups += 1;
        self.observer.on_spawn(handle, &group);
        slot.group = Some(group);
        self.live.push(index);
        handle
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// Advance every live group by one frame of `dt` seconds.
    ///
    /// Non-finite or negative `dt` is treated as zero: life still decays by
    /// one tick, but nothing moves.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        for request in self.queue.drain() {
            match self.emit(request) {
                Ok(handle) => report.spawned.push(handle),
                Err(e) => {
                    log::warn!("dropping queued emission: {}", e);
                    report.rejected += 1;
                }
            }
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let fps = self.config.assumed_frame_rate;
        let params = StepParams {
            dt,
            elapsed_ticks: self.config.decay_mode.scale(dt, fps),
            drag_factor: self.config.drag_mode.factor(self.config.drag, dt, fps),
        };

        let mut expired = Vec::new();
        for &index in &self.live {
            if let Some(group) = self.slots[index as usize].group.as_mut() {
                if group.step(params) == StepOutcome::Expired {
                    expired.push(index);
                }
            }
        }

        if !expired.is_empty() {
            let slots = &self.slots;
            self.live.retain(|&index| {
                slots[index as usize]
                    .group
                    .as_ref()
                    .is_some_and(|g| !g.is_expired())
            });
            report.retired = expired.into_iter().map(|i| self.free_slot(i)).collect();
            report.dispose_failures = self.notify_retired(&report.retired);
        }

        self.stats.ticks += 1;
        log::trace!(
            "tick {}: dt={:.4} live={} spawned={} retired={}",
            self.stats.ticks,
            dt,
            self.live.len(),
            report.spawned.len(),
            report.retired.len()
        );
        report
    }

    /// Drop the group in `index` and recycle its slot.
    ///
    /// The caller must already have removed `index` from `live`.
    fn free_slot(&mut self, index: u32) -> GroupHandle {
        let slot = &mut self.slots[index as usize];
        let handle = GroupHandle {
            index,
            generation: slot.generation,
        };
        let count = slot.group.take().map_or(0, |g| g.count());
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);

        self.stats.live_particles -= count as u64;
        self.stats.total_retired_groups += 1;
        handle
    }

    /// Tell the observer about groups already freed. Returns the number of
    /// disposal failures.
    fn notify_retired(&mut self, handles: &[GroupHandle]) -> usize {
        let mut failures = 0;
        for &handle in handles {
            match self.observer.on_retire(handle) {
                Ok(()) => log::debug!("retired {}", handle),
                Err(e) => {
                    log::warn!("{} retired but its resources leaked: {}", handle, e);
                    self.stats.total_dispose_failures += 1;
                    failures += 1;
                }
            }
        }
        failures
    }

    /// Retire every live group immediately.
    ///
    /// Each group's observer `on_retire` fires once, as if its life had run
    /// out. Queued requests are left in the queue.
    pub fn clear(&mut self) -> TickReport {
        let retired: Vec<GroupHandle> = std::mem::take(&mut self.live)
            .into_iter()
            .map(|i| self.free_slot(i))
            .collect();
        let dispose_failures = self.notify_retired(&retired);
        TickReport {
            retired,
            dispose_failures,
            ..TickReport::default()
        }
    }

    // =========================================================================
    // ACCESS
    // =========================================================================

    /// Look up a live group.
    pub fn get(&self, handle: GroupHandle) -> Option<&ParticleGroup> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.group.as_ref())
    }

    /// Whether `handle` still names a live group.
    pub fn contains(&self, handle: GroupHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live groups.
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of particles across all live groups.
    #[inline]
    pub fn particle_count(&self) -> u64 {
        self.stats.live_particles
    }

    /// Every live group with its handle. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (GroupHandle, &ParticleGroup)> + '_ {
        self.live.iter().filter_map(move |&index| {
            let slot = &self.slots[index as usize];
            slot.group.as_ref().map(|group| {
                (
                    GroupHandle {
                        index,
                        generation: slot.generation,
                    },
                    group,
                )
            })
        })
    }

    /// Render views of every live group.
    pub fn views(&self) -> impl Iterator<Item = GroupView<'_>> + '_ {
        self.iter().map(|(handle, group)| GroupView::new(handle, group))
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            live_groups: self.live.len(),
            ..self.stats
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::DisposeError;
    use crate::lifecycle::RetirementLog;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    fn seeded() -> ParticlePool<RetirementLog> {
        ParticlePool::with_config(PoolConfig::default().with_seed(11))
            .unwrap()
            .with_observer(RetirementLog::new())
    }

    fn burst(lifetime: f32) -> EmissionRequest {
        EmissionRequest::new(10, Color::WHITE).lifetime(lifetime)
    }

    #[test]
    fn test_emit_registers_group() {
        let mut pool = seeded();
        let h = pool.emit(burst(1.0)).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.particle_count(), 10);
        assert!(pool.contains(h));
        assert_eq!(pool.observer().spawned, vec![h]);
    }

    #[test]
    fn test_rejected_emit_leaves_pool_untouched() {
        let mut pool = seeded();
        assert_eq!(pool.emit(burst(0.0)), Err(EmitError::InvalidLifetime(0.0)));
        assert!(pool.is_empty());
        assert!(pool.observer().spawned.is_empty());
        assert_eq!(pool.stats().total_emitted_groups, 0);
    }

    #[test]
    fn test_retired_slot_is_reused_with_new_generation() {
        let mut pool = seeded();
        let old = pool.emit(burst(1.0 / 60.0)).unwrap();
        let report = pool.tick(1.0 / 60.0);
        assert_eq!(report.retired, vec![old]);
        assert!(!pool.contains(old));

        let new = pool.emit(burst(1.0)).unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(pool.get(old).is_none());
        assert!(pool.get(new).is_some());
    }

    #[test]
    fn test_mixed_retirement_keeps_survivors() {
        let mut pool = seeded();
        let short_a = pool.emit(burst(2.0 / 60.0)).unwrap();
        let long = pool.emit(burst(1.0)).unwrap();
        let short_b = pool.emit(burst(2.0 / 60.0)).unwrap();

        pool.tick(1.0 / 60.0);
        assert_eq!(pool.len(), 3);
        let report = pool.tick(1.0 / 60.0);

        let mut retired = report.retired.clone();
        retired.sort();
        let mut expected = vec![short_a, short_b];
        expected.sort();
        assert_eq!(retired, expected);
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(long));
        assert_eq!(pool.iter().count(), 1);
        assert_eq!(pool.particle_count(), 10);
        assert_eq!(pool.get(long).unwrap().ticks(), 2);
    }

    #[test]
    fn test_queue_drained_before_integration() {
        let mut pool = seeded();
        let sender = pool.sender();
        sender.send(burst(1.0).at(Vec3::ONE)).unwrap();
        assert_eq!(pool.pending(), 1);
        assert!(pool.is_empty());

        let report = pool.tick(1.0 / 60.0);
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(pool.pending(), 0);

        // Integrated in the same tick it was drained.
        let g = pool.get(report.spawned[0]).unwrap();
        assert_eq!(g.ticks(), 1);
        assert!(g.positions().iter().all(|p| *p != Vec3::ONE));
    }

    #[test]
    fn test_negative_dt_does_not_move_particles() {
        let mut pool = seeded();
        let h = pool.emit(burst(1.0)).unwrap();
        pool.tick(-1.0);
        pool.tick(f32::NAN);
        let g = pool.get(h).unwrap();
        assert!(g.positions().iter().all(|p| *p == Vec3::ZERO));
        assert!((g.life() - (1.0 - 2.0 / 60.0)).abs() < 1e-6);
    }

    #[test]
    fn test_clear_retires_everything_once() {
        let mut pool = seeded();
        let a = pool.emit(burst(1.0)).unwrap();
        let b = pool.emit(burst(1.0)).unwrap();
        let report = pool.clear();
        assert_eq!(report.retired.len(), 2);
        assert!(pool.is_empty());
        assert_eq!(pool.particle_count(), 0);
        assert_eq!(pool.observer().retire_count(a), 1);
        assert_eq!(pool.observer().retire_count(b), 1);
        assert!(pool.tick(1.0 / 60.0).retired.is_empty());
    }

    struct FailingDisposal {
        attempts: usize,
    }

    impl GroupObserver for FailingDisposal {
        fn on_retire(&mut self, _handle: GroupHandle) -> Result<(), DisposeError> {
            self.attempts += 1;
            Err(DisposeError::new("device lost"))
        }
    }

    #[test]
    fn test_dispose_failure_still_removes_group() {
        let mut pool = ParticlePool::new().with_observer(FailingDisposal { attempts: 0 });
        let h = pool.emit(burst(1.0 / 60.0)).unwrap();
        let report = pool.tick(1.0 / 60.0);

        assert_eq!(report.retired, vec![h]);
        assert_eq!(report.dispose_failures, 1);
        assert!(pool.is_empty());
        assert_eq!(pool.observer().attempts, 1);
        assert_eq!(pool.stats().total_dispose_failures, 1);

        pool.tick(1.0 / 60.0);
        assert_eq!(pool.observer().attempts, 1);
    }

    #[test]
    fn test_with_observer_announces_existing_groups() {
        let mut pool = ParticlePool::new();
        let h = pool.emit(burst(1.0)).unwrap();
        let pool = pool.with_observer(RetirementLog::new());
        assert_eq!(pool.observer().spawned, vec![h]);
    }

    /// Records into a log the test keeps a handle to after the swap.
    struct SharedLog(Rc<RefCell<RetirementLog>>);

    impl GroupObserver for SharedLog {
        fn on_spawn(&mut self, handle: GroupHandle, group: &ParticleGroup) {
            self.0.borrow_mut().on_spawn(handle, group);
        }

        fn on_retire(&mut self, handle: GroupHandle) -> Result<(), DisposeError> {
            self.0.borrow_mut().on_retire(handle)
        }
    }

    #[test]
    fn test_with_observer_hands_groups_off_from_previous_observer() {
        let first = Rc::new(RefCell::new(RetirementLog::new()));
        let mut pool = ParticlePool::new().with_observer(SharedLog(first.clone()));
        let a = pool.emit(burst(1.0)).unwrap();
        let b = pool.emit(burst(1.0)).unwrap();

        let mut pool = pool.with_observer(RetirementLog::new());
        assert_eq!(first.borrow().spawned, vec![a, b]);
        assert_eq!(first.borrow().retire_count(a), 1);
        assert_eq!(first.borrow().retire_count(b), 1);

        assert!(pool.contains(a) && pool.contains(b));
        assert_eq!(pool.observer().spawned, vec![a, b]);
        assert!(pool.observer().retired.is_empty());

        pool.clear();
        assert_eq!(pool.observer().retire_count(a), 1);
        assert_eq!(first.borrow().retired.len(), 2);
    }

    struct PanicOnRetire;

    impl GroupObserver for PanicOnRetire {
        fn on_retire(&mut self, _handle: GroupHandle) -> Result<(), DisposeError> {
            panic!("renderer crashed");
        }
    }

    #[test]
    fn test_panicking_observer_still_frees_every_expired_group() {
        let mut pool = ParticlePool::new().with_observer(PanicOnRetire);
        let a = pool.emit(burst(1.0 / 60.0)).unwrap();
        let b = pool.emit(burst(1.0 / 60.0)).unwrap();
        let keep = pool.emit(burst(1.0)).unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| pool.tick(1.0 / 60.0)));
        assert!(result.is_err());

        assert!(!pool.contains(a));
        assert!(!pool.contains(b));
        assert!(pool.contains(keep));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.particle_count(), 10);
        assert_eq!(pool.stats().total_retired_groups, 2);

        // Both freed slots are reusable.
        let c = pool.emit(burst(1.0)).unwrap();
        let d = pool.emit(burst(1.0)).unwrap();
        let mut reused = vec![c.index(), d.index()];
        reused.sort();
        let mut freed = vec![a.index(), b.index()];
        freed.sort();
        assert_eq!(reused, freed);
    }

    #[test]
    fn test_stats_track_lifetimes() {
        let mut pool = seeded();
        pool.emit(burst(1.0 / 60.0)).unwrap();
        pool.emit(burst(1.0)).unwrap();
        pool.tick(1.0 / 60.0);

        let stats = pool.stats();
        assert_eq!(stats.live_groups, 1);
        assert_eq!(stats.live_particles, 10);
        assert_eq!(stats.total_emitted_groups, 2);
        assert_eq!(stats.total_retired_groups, 1);
        assert_eq!(stats.ticks, 1);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = PoolConfig {
            drag: 0.0,
            ..PoolConfig::default()
        };
        assert!(ParticlePool::with_config(config).is_err());
    }
}
