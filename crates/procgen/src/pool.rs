use cityscape_render::LineSegment;
use glam::Vec3;

/// Counters describing pool traffic since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Segments allocated because the pool was empty.
    pub constructed: usize,
    /// Acquisitions served from the free list.
    pub reused: usize,
    pub released: usize,
    /// Segments currently waiting in the free list.
    pub pooled: usize,
}

/// Free list of road line segments.
///
/// A segment is either held by exactly one section or sitting here. Pooled
/// segments keep stale endpoints until `acquire` overwrites them, and the
/// pool exposes no way to read them in between. The free list is unbounded;
/// it grows only as fast as sections are evicted.
#[derive(Debug, Default)]
pub struct LineSegmentPool {
    free: Vec<LineSegment>,
    constructed: usize,
    reused: usize,
    released: usize,
}

impl LineSegmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a segment spanning `start..end`, reusing a pooled one when
    /// available.
    pub fn acquire(&mut self, start: Vec3, end: Vec3) -> LineSegment {
        match self.free.pop() {
            Some(mut segment) => {
                segment.set_endpoints(start, end);
                self.reused += 1;
                segment
            }
            None => {
                self.constructed += 1;
                LineSegment::new(start, end)
            }
        }
    }

    /// Take back a segment detached from its previous owner.
    pub fn release(&mut self, segment: LineSegment) {
        self.released += 1;
        self.free.push(segment);
    }

    pub fn release_all(&mut self, segments: impl IntoIterator<Item = LineSegment>) -> usize {
        let before = self.free.len();
        for segment in segments {
            self.release(segment);
        }
        self.free.len() - before
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Total segments ever allocated by this pool. Nothing is ever disposed,
    /// so this equals pooled plus live segments.
    pub fn constructed(&self) -> usize {
        self.constructed
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            constructed: self.constructed,
            reused: self.reused,
            released: self.released,
            pooled: self.free.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(z: f32) -> (Vec3, Vec3) {
        (Vec3::new(-250.0, 0.1, z), Vec3::new(250.0, 0.1, z))
    }

    #[test]
    fn empty_pool_constructs() {
        let mut pool = LineSegmentPool::new();
        let (a, b) = endpoints(0.0);
        let segment = pool.acquire(a, b);

        assert_eq!(segment.endpoints(), (a, b));
        assert!(segment.needs_upload());
        assert_eq!(pool.stats().constructed, 1);
        assert_eq!(pool.stats().reused, 0);
    }

    #[test]
    fn released_segment_is_reused_with_new_endpoints() {
        let mut pool = LineSegmentPool::new();
        let (a, b) = endpoints(0.0);
        let mut segment = pool.acquire(a, b);
        segment.mark_uploaded();
        let id = segment.id();
        pool.release(segment);
        assert_eq!(pool.len(), 1);

        let (c, d) = endpoints(-500.0);
        let reused = pool.acquire(c, d);
        assert_eq!(reused.id(), id);
        assert_eq!(reused.endpoints(), (c, d));
        assert!(reused.needs_upload());
        assert!(pool.is_empty());
        assert_eq!(
            pool.stats(),
            PoolStats {
                constructed: 1,
                reused: 1,
                released: 1,
                pooled: 0,
            }
        );
    }

    #[test]
    fn release_all_counts_segments() {
        let mut pool = LineSegmentPool::new();
        let segments: Vec<_> = (0..5)
            .map(|i| {
                let (a, b) = endpoints(-(i as f32));
                pool.acquire(a, b)
            })
            .collect();
        assert_eq!(pool.release_all(segments), 5);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.constructed(), 5);
    }
}
