use ratatui::layout::Rect;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const ROWS_PER_ITEM: usize = 3;
/// Cells taken by the `(a) ` shortcut label in front of each headline.
pub const SHORTCUT_COLUMN_WIDTH: usize = 4;
pub const ELLIPSIS: &str = "...";

const BORDER: u16 = 1;
const SIDE_PADDING: u16 = 1;
// title row plus the blank row beneath it
const HEADER_ROWS: u16 = 2;
const CHROME_ROWS: u16 = BORDER * 2 + HEADER_ROWS;
const CHROME_COLS: u16 = (BORDER + SIDE_PADDING) * 2;

/// Everything the renderer and the scroll cursor need to know about the
/// terminal. Always rebuilt as a whole through [`Geometry::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub terminal_rows: u16,
    pub terminal_cols: u16,
    pub viewport_rows: usize,
    pub viewport_cols: usize,
    pub rows_per_item: usize,
    pub item_count: usize,
}

impl Geometry {
    pub fn compute(terminal_rows: u16, terminal_cols: u16, item_count: usize) -> Self {
        Self {
            terminal_rows,
            terminal_cols,
            viewport_rows: terminal_rows.saturating_sub(CHROME_ROWS) as usize,
            viewport_cols: terminal_cols.saturating_sub(CHROME_COLS) as usize,
            rows_per_item: ROWS_PER_ITEM,
            item_count,
        }
    }

    /// Height of the backing surface holding every item block.
    pub fn content_rows(&self) -> usize {
        self.item_count.saturating_mul(self.rows_per_item)
    }

    /// Largest cursor value. At this offset the bottom of the viewport lines
    /// up with the end of the last item block, so that block is fully shown.
    pub fn max_scroll(&self) -> usize {
        self.content_rows().saturating_sub(self.viewport_rows)
    }

    /// Rows moved by a page jump. One item block of overlap is kept between
    /// consecutive pages.
    pub fn page_size(&self) -> usize {
        self.viewport_rows.saturating_sub(self.rows_per_item).max(1)
    }

    pub fn headline_width(&self) -> usize {
        self.viewport_cols.saturating_sub(SHORTCUT_COLUMN_WIDTH)
    }

    pub fn visible_blocks(&self) -> usize {
        self.viewport_rows / self.rows_per_item.max(1)
    }

    pub fn frame_area(&self) -> Rect {
        Rect::new(0, 0, self.terminal_cols, self.terminal_rows)
    }

    pub fn title_area(&self) -> Rect {
        let height = u16::from(self.terminal_rows > BORDER * 2);
        Rect::new(
            BORDER + SIDE_PADDING,
            BORDER,
            self.viewport_cols as u16,
            height,
        )
    }

    pub fn list_area(&self) -> Rect {
        Rect::new(
            BORDER + SIDE_PADDING,
            BORDER + HEADER_ROWS,
            self.viewport_cols as u16,
            self.viewport_rows as u16,
        )
    }
}

/// Cuts a headline so it fits in `width` terminal cells. Anything that does
/// not fit is shortened to `width - 3` cells, trimmed, and suffixed with
/// [`ELLIPSIS`].
pub fn truncate_headline(headline: &str, width: usize) -> String {
    if UnicodeWidthStr::width(headline) <= width {
        return headline.to_string();
    }

    let ellipsis_width = ELLIPSIS.len();
    if width <= ellipsis_width {
        return ELLIPSIS[..width].to_string();
    }

    let budget = width - ellipsis_width;
    let mut used = 0usize;
    let mut cut = 0usize;
    for (idx, ch) in headline.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        cut = idx + ch.len_utf8();
    }

    format!("{}{}", headline[..cut].trim(), ELLIPSIS)
}
