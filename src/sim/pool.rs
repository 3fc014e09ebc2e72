//! Fixed-capacity slot arena for streaks
//!
//! Each slot owns at most one streak (and with it the renderer-visible mesh).
//! `acquire` and `release` are the only lifecycle transitions: a handle is
//! acquired once at spawn and released once at retirement or teardown.

use serde::{Deserialize, Serialize};

use super::streak::{Streak, StreakPhase};

/// Index of a slot in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotHandle(pub u32);

impl SlotHandle {
    /// Placeholder for streaks not yet placed in a slot
    pub const UNASSIGNED: SlotHandle = SlotHandle(u32::MAX);

    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Fixed-size streak pool with round-robin slot assignment
#[derive(Debug)]
pub struct StreakPool {
    slots: Vec<Option<Streak>>,
    /// Next slot to try
    cursor: usize,
    acquired: u64,
    released: u64,
}

impl StreakPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            cursor: 0,
            acquired: 0,
            released: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Total acquisitions since creation
    pub fn acquired(&self) -> u64 {
        self.acquired
    }

    /// Total releases since creation
    pub fn released(&self) -> u64 {
        self.released
    }

    /// Place a streak in the next free slot, scanning round-robin from the cursor.
    ///
    /// Returns `None` when every slot is occupied; the streak is dropped and the
    /// caller simply tries again at its next spawn opportunity.
    pub fn acquire(&mut self, mut streak: Streak) -> Option<SlotHandle> {
        let capacity = self.capacity();
        if capacity == 0 {
            return None;
        }

        let index = (0..capacity)
            .map(|offset| (self.cursor + offset) % capacity)
            .find(|&i| self.slots[i].is_none())?;

        let handle = SlotHandle(index as u32);
        streak.handle = handle;
        streak.phase = StreakPhase::Spawned;
        self.slots[index] = Some(streak);
        self.cursor = (index + 1) % capacity;
        self.acquired += 1;
        Some(handle)
    }

    /// Free a slot, returning its streak marked `Retired`.
    ///
    /// Releasing an empty slot is a lifecycle bug: it trips a debug assertion and
    /// is otherwise ignored.
    pub fn release(&mut self, handle: SlotHandle) -> Option<Streak> {
        let slot = self.slots.get_mut(handle.index())?;
        let mut streak = match slot.take() {
            Some(streak) => streak,
            None => {
                debug_assert!(false, "double release of slot {}", handle.0);
                log::error!("Double release of slot {}", handle.0);
                return None;
            }
        };
        streak.phase = StreakPhase::Retired;
        self.released += 1;
        Some(streak)
    }

    /// Release every occupied slot (scene teardown)
    pub fn release_all(&mut self) -> Vec<Streak> {
        let handles: Vec<_> = self.handles().collect();
        handles.into_iter().filter_map(|h| self.release(h)).collect()
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&Streak> {
        self.slots.get(handle.index())?.as_ref()
    }

    pub fn get_mut(&mut self, handle: SlotHandle) -> Option<&mut Streak> {
        self.slots.get_mut(handle.index())?.as_mut()
    }

    /// Handles of occupied slots in index order
    pub fn handles(&self) -> impl Iterator<Item = SlotHandle> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| SlotHandle(i as u32))
    }

    /// Live streaks in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Streak> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Streak> {
        self.slots.iter_mut().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::ColorClass;
    use crate::sim::streak::{CubicBezier, TubeShape};
    use glam::Vec3;

    fn streak() -> Streak {
        let curve = CubicBezier::new(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z);
        let tube = TubeShape {
            radius: 0.02,
            radial_segments: 8,
        };
        Streak::new(curve, ColorClass::White, 0.0, 1.0, 8, tube)
    }

    #[test]
    fn test_round_robin_assignment() {
        let mut pool = StreakPool::with_capacity(3);
        let a = pool.acquire(streak()).unwrap();
        let b = pool.acquire(streak()).unwrap();
        assert_eq!((a.0, b.0), (0, 1));

        // Freed slot 0 is not reused until the cursor wraps
        pool.release(a);
        let c = pool.acquire(streak()).unwrap();
        assert_eq!(c.0, 2);
        let d = pool.acquire(streak()).unwrap();
        assert_eq!(d.0, 0);
        assert_eq!(pool.get(d).map(|s| s.handle), Some(d));
    }

    #[test]
    fn test_full_pool_skips() {
        let mut pool = StreakPool::with_capacity(2);
        assert!(pool.acquire(streak()).is_some());
        assert!(pool.acquire(streak()).is_some());
        assert!(pool.is_full());
        assert!(pool.acquire(streak()).is_none());
        assert_eq!(pool.live(), 2);
        assert_eq!(pool.acquired(), 2);
    }

    #[test]
    fn test_zero_capacity() {
        let mut pool = StreakPool::with_capacity(0);
        assert!(pool.acquire(streak()).is_none());
    }

    #[test]
    fn test_release_marks_retired_and_counts() {
        let mut pool = StreakPool::with_capacity(2);
        let h = pool.acquire(streak()).unwrap();
        let retired = pool.release(h).unwrap();
        assert_eq!(retired.phase, StreakPhase::Retired);
        assert_eq!(pool.released(), 1);
        assert_eq!(pool.live(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "double release")]
    fn test_double_release_asserts() {
        let mut pool = StreakPool::with_capacity(1);
        let h = pool.acquire(streak()).unwrap();
        pool.release(h);
        pool.release(h);
    }

    #[test]
    fn test_release_all() {
        let mut pool = StreakPool::with_capacity(4);
        for _ in 0..3 {
            pool.acquire(streak());
        }
        let released = pool.release_all();
        assert_eq!(released.len(), 3);
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.acquired(), pool.released());
    }
}
