//! The track: an ordered run of segments along the travel axis.

use std::collections::VecDeque;

use crate::{Direction, Error, RideConfig, Result, Segment, SegmentGenerator};

/// Region ahead of the viewpoint in which a curve may be spliced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookaheadWindow {
    /// Distance from the viewpoint to the near edge.
    pub distance: f32,
    /// Depth of the window along the travel axis.
    pub depth: f32,
}

impl LookaheadWindow {
    /// Near (inclusive) and far (exclusive) Z bounds for a viewpoint at `viewpoint_z`.
    #[must_use]
    pub fn bounds(&self, viewpoint_z: f32) -> (f32, f32) {
        let near = viewpoint_z - self.distance;
        (near, near - self.depth)
    }

    #[must_use]
    pub fn contains(&self, viewpoint_z: f32, position: f32) -> bool {
        let (near, far) = self.bounds(viewpoint_z);
        position <= near && position > far
    }
}

/// Record of a successful splice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpliceReceipt {
    /// Index of the replaced segment at splice time.
    pub index: usize,
    /// Start position of the new curve segment.
    pub position: f32,
    pub direction: Direction,
}

/// Segments ordered front to back, with strictly decreasing positions.
#[derive(Debug, Clone)]
pub struct Track {
    segments: VecDeque<Segment>,
    step: f32,
    segment_length: f32,
    /// Position of a spliced curve that has not been traversed yet.
    pending_curve: Option<f32>,
    revision: u64,
}

impl Track {
    /// Build an all-straight track starting at the origin.
    #[must_use]
    pub fn new(generator: &SegmentGenerator, config: &RideConfig) -> Self {
        let step = config.segment_step();
        let segments = (0..config.segment_count)
            .map(|i| generator.generate_straight(-(i as f32) * step, config.segment_length))
            .collect();

        Self {
            segments,
            step,
            segment_length: config.segment_length,
            pending_curve: None,
            revision: 0,
        }
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = &Segment> {
        self.segments.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distance between consecutive segment positions.
    #[must_use]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Incremented whenever any segment is replaced, added or removed.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Position of the spliced curve still waiting to be traversed.
    #[must_use]
    pub fn pending_curve(&self) -> Option<f32> {
        self.pending_curve
    }

    /// Index of the first segment inside the splice window.
    #[must_use]
    pub fn find_in_window(&self, viewpoint_z: f32, window: LookaheadWindow) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| window.contains(viewpoint_z, segment.position))
    }

    /// Replace the first segment inside the splice window with a curve.
    ///
    /// On failure the track is left untouched.
    pub fn splice(
        &mut self,
        generator: &SegmentGenerator,
        viewpoint_z: f32,
        window: LookaheadWindow,
        direction: Direction,
        radius: f32,
    ) -> Result<SpliceReceipt> {
        if let Some(position) = self.pending_curve {
            return Err(Error::SplicePending { position });
        }

        let Some(index) = self.find_in_window(viewpoint_z, window) else {
            let (near, far) = window.bounds(viewpoint_z);
            return Err(Error::SpliceWindowMissed {
                viewpoint_z,
                near,
                far,
            });
        };

        let position = self.segments[index].position;
        let curve = generator.generate_curve(position, direction, radius)?;
        self.segments[index] = curve;
        self.pending_curve = Some(position);
        self.revision += 1;

        tracing::info!("Switched track segment at z={position} to {direction} curve");

        Ok(SpliceReceipt {
            index,
            position,
            direction,
        })
    }

    /// Mark the pending curve as traversed, allowing the next splice.
    pub fn release_curve(&mut self) -> Option<f32> {
        self.pending_curve.take()
    }

    /// Drop segments more than `margin` behind the viewpoint and extend the
    /// far end with straight segments, keeping the segment count constant.
    ///
    /// Returns the number of segments recycled.
    pub fn recycle(&mut self, generator: &SegmentGenerator, viewpoint_z: f32, margin: f32) -> usize {
        let mut recycled = 0;
        // A segment's far end is one step beyond its start.
        while self.segments.len() > 1
            && self
                .segments
                .front()
                .is_some_and(|s| s.position - self.step > viewpoint_z + margin)
        {
            let Some(back) = self.segments.back().map(|s| s.position) else {
                break;
            };
            self.segments.pop_front();
            self.segments
                .push_back(generator.generate_straight(back - self.step, self.segment_length));
            recycled += 1;
        }

        if recycled > 0 {
            self.revision += 1;
            tracing::debug!("Recycled {recycled} track segment(s) behind z={viewpoint_z}");
        }
        recycled
    }

    /// Whether positions are contiguous and strictly decreasing by the step.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        let tolerance = self.step * 1e-4;
        self.segments
            .iter()
            .zip(self.segments.iter().skip(1))
            .all(|(a, b)| (a.position - b.position - self.step).abs() <= tolerance.max(1e-3))
    }
}
