use smallvec::SmallVec;

use crate::core::types::Point;

#[derive(Debug, Clone, Copy)]
struct VerticalRun {
    x: i32,
    min: i32,
    max: i32,
    end: i32,
}

/// Groups consecutive clipped segments into polylines.
///
/// With vertical-run coalescing enabled, segments that stay in one pixel
/// column are merged into a single stroke spanning their min and max.
#[derive(Debug, Default)]
pub struct CurveBatcher {
    coalesce_vertical_runs: bool,
    current: SmallVec<[Point; 64]>,
    run: Option<VerticalRun>,
    polylines: Vec<Vec<Point>>,
    segments: usize,
}

impl CurveBatcher {
    #[must_use]
    pub fn new(coalesce_vertical_runs: bool) -> Self {
        Self {
            coalesce_vertical_runs,
            ..Self::default()
        }
    }

    /// Adds one visible segment. A segment not starting where the previous
    /// one ended opens a new polyline.
    pub fn push_segment(&mut self, from: Point, to: Point) {
        self.segments += 1;
        if self.last_point() != Some(from) {
            self.break_line();
            self.current.push(from);
        }

        if self.coalesce_vertical_runs && from.x == to.x {
            if let Some(run) = self.run.as_mut().filter(|run| run.x == from.x) {
                run.min = run.min.min(to.y);
                run.max = run.max.max(to.y);
                run.end = to.y;
                return;
            }
            self.flush_run();
            self.run = Some(VerticalRun {
                x: from.x,
                min: from.y.min(to.y),
                max: from.y.max(to.y),
                end: to.y,
            });
            return;
        }

        self.flush_run();
        self.push_point(to);
    }

    /// Ends the current polyline, e.g. at a segment break.
    pub fn break_line(&mut self) {
        self.flush_run();
        if self.current.len() >= 2 {
            self.polylines.push(self.current.to_vec());
        }
        self.current.clear();
    }

    /// Number of segments pushed so far.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    #[must_use]
    pub fn finish(mut self) -> Vec<Vec<Point>> {
        self.break_line();
        self.polylines
    }

    fn last_point(&self) -> Option<Point> {
        match self.run {
            Some(run) => Some(Point::new(run.x, run.end)),
            None => self.current.last().copied(),
        }
    }

    fn flush_run(&mut self) {
        if let Some(run) = self.run.take() {
            self.push_point(Point::new(run.x, run.min));
            self.push_point(Point::new(run.x, run.max));
            self.push_point(Point::new(run.x, run.end));
        }
    }

    fn push_point(&mut self, point: Point) {
        if self.current.last() != Some(&point) {
            self.current.push(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn connected_segments_form_one_polyline() {
        let mut batcher = CurveBatcher::new(false);
        batcher.push_segment(p(0, 0), p(1, 5));
        batcher.push_segment(p(1, 5), p(2, 3));
        assert_eq!(batcher.finish(), vec![vec![p(0, 0), p(1, 5), p(2, 3)]]);
    }

    #[test]
    fn disjoint_segment_starts_new_polyline() {
        let mut batcher = CurveBatcher::new(false);
        batcher.push_segment(p(0, 0), p(1, 5));
        batcher.push_segment(p(3, 5), p(4, 3));
        assert_eq!(
            batcher.finish(),
            vec![vec![p(0, 0), p(1, 5)], vec![p(3, 5), p(4, 3)]]
        );
    }

    #[test]
    fn vertical_run_collapses_to_one_stroke() {
        let mut batcher = CurveBatcher::new(true);
        batcher.push_segment(p(0, 10), p(5, 10));
        batcher.push_segment(p(5, 10), p(5, 2));
        batcher.push_segment(p(5, 2), p(5, 30));
        batcher.push_segment(p(5, 30), p(5, 12));
        batcher.push_segment(p(5, 12), p(6, 12));

        assert_eq!(batcher.segment_count(), 5);
        assert_eq!(
            batcher.finish(),
            vec![vec![p(0, 10), p(5, 10), p(5, 2), p(5, 30), p(5, 12), p(6, 12)]]
        );
    }

    #[test]
    fn without_coalescing_every_point_is_kept() {
        let mut batcher = CurveBatcher::new(false);
        batcher.push_segment(p(5, 10), p(5, 2));
        batcher.push_segment(p(5, 2), p(5, 30));
        batcher.push_segment(p(5, 30), p(5, 12));
        assert_eq!(
            batcher.finish(),
            vec![vec![p(5, 10), p(5, 2), p(5, 30), p(5, 12)]]
        );
    }

    #[test]
    fn break_splits_polylines() {
        let mut batcher = CurveBatcher::new(true);
        batcher.push_segment(p(0, 0), p(1, 1));
        batcher.break_line();
        batcher.push_segment(p(1, 1), p(2, 2));
        assert_eq!(
            batcher.finish(),
            vec![vec![p(0, 0), p(1, 1)], vec![p(1, 1), p(2, 2)]]
        );
    }
}
