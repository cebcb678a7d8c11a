use crate::layout::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Index of the backing-surface row currently shown at the top of the
/// viewport. Every transition keeps it within `0..=geometry.max_scroll()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollCursor {
    offset: usize,
}

impl ScrollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn step(&mut self, direction: Direction, geometry: &Geometry) {
        self.shift(direction, 1, geometry);
    }

    pub fn page_jump(&mut self, direction: Direction, geometry: &Geometry) {
        self.shift(direction, geometry.page_size(), geometry);
    }

    pub fn to_top(&mut self) {
        self.offset = 0;
    }

    pub fn to_bottom(&mut self, geometry: &Geometry) {
        self.offset = geometry.max_scroll();
    }

    /// Pulls the cursor back into range after the geometry changed. The
    /// position is kept whenever it is still valid.
    pub fn resize_clamp(&mut self, new_max_scroll: usize) {
        self.offset = self.offset.min(new_max_scroll);
    }

    fn shift(&mut self, direction: Direction, amount: usize, geometry: &Geometry) {
        if geometry.item_count == 0 {
            return;
        }
        self.offset = match direction {
            Direction::Down => self.offset.saturating_add(amount).min(geometry.max_scroll()),
            Direction::Up => self.offset.saturating_sub(amount),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twelve_items() -> Geometry {
        // 15 list rows: five item blocks fit at once
        Geometry::compute(19, 80, 12)
    }

    #[test]
    fn steps_stop_at_both_edges() {
        let geometry = twelve_items();
        let mut cursor = ScrollCursor::new();
        cursor.step(Direction::Up, &geometry);
        assert_eq!(cursor.offset(), 0);

        for _ in 0..100 {
            cursor.step(Direction::Down, &geometry);
        }
        assert_eq!(cursor.offset(), geometry.max_scroll());
        cursor.step(Direction::Down, &geometry);
        assert_eq!(cursor.offset(), geometry.max_scroll());
    }

    #[test]
    fn step_up_then_down_is_inverse_away_from_edges() {
        let geometry = twelve_items();
        for start in 1..geometry.max_scroll() {
            let mut cursor = ScrollCursor { offset: start };
            cursor.step(Direction::Up, &geometry);
            cursor.step(Direction::Down, &geometry);
            assert_eq!(cursor.offset(), start);
        }
    }

    #[test]
    fn page_jumps_converge_on_max_scroll() {
        let geometry = twelve_items();
        let mut cursor = ScrollCursor::new();

        cursor.page_jump(Direction::Down, &geometry);
        assert_eq!(cursor.offset(), geometry.page_size());

        cursor.page_jump(Direction::Down, &geometry);
        assert_eq!(cursor.offset(), geometry.max_scroll());
        cursor.page_jump(Direction::Down, &geometry);
        assert_eq!(cursor.offset(), geometry.max_scroll());

        cursor.page_jump(Direction::Up, &geometry);
        assert_eq!(cursor.offset(), geometry.max_scroll() - geometry.page_size());
        cursor.page_jump(Direction::Up, &geometry);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn mixed_transitions_stay_in_range() {
        let geometry = Geometry::compute(11, 40, 7);
        let mut cursor = ScrollCursor::new();
        let script = [
            (true, Direction::Down),
            (false, Direction::Down),
            (false, Direction::Down),
            (true, Direction::Up),
            (false, Direction::Down),
            (false, Direction::Down),
            (false, Direction::Down),
            (true, Direction::Down),
            (false, Direction::Up),
            (false, Direction::Up),
            (true, Direction::Up),
        ];
        for _ in 0..5 {
            for (page, direction) in script {
                if page {
                    cursor.page_jump(direction, &geometry);
                } else {
                    cursor.step(direction, &geometry);
                }
                assert!(cursor.offset() <= geometry.max_scroll());
            }
        }
    }

    #[test]
    fn empty_list_ignores_scrolling() {
        let geometry = Geometry::compute(19, 80, 0);
        let mut cursor = ScrollCursor::new();
        cursor.step(Direction::Down, &geometry);
        cursor.page_jump(Direction::Down, &geometry);
        cursor.to_bottom(&geometry);
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn resize_keeps_cursor_while_still_in_range() {
        let geometry = twelve_items();
        let mut cursor = ScrollCursor::new();
        cursor.page_jump(Direction::Down, &geometry);
        let before = cursor.offset();

        let taller = Geometry::compute(30, 80, 12);
        cursor.resize_clamp(taller.max_scroll());
        assert_eq!(cursor.offset(), taller.max_scroll().min(before));

        let shorter = Geometry::compute(10, 80, 12);
        cursor.to_bottom(&twelve_items());
        cursor.resize_clamp(shorter.max_scroll());
        assert_eq!(cursor.offset(), twelve_items().max_scroll());
    }

    #[test]
    fn growing_viewport_clamps_cursor_down() {
        let geometry = twelve_items();
        let mut cursor = ScrollCursor::new();
        cursor.to_bottom(&geometry);

        let roomy = Geometry::compute(40, 80, 12);
        cursor.resize_clamp(roomy.max_scroll());
        assert_eq!(cursor.offset(), 0);
    }
}
