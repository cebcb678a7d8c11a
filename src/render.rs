use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::data::DisplayItem;
use crate::layout::{truncate_headline, Geometry, SHORTCUT_COLUMN_WIDTH};
use crate::shortcuts::{ActivationMarks, ShortcutAlphabet};

const COLOR_BORDER: Color = Color::Magenta;
const COLOR_TITLE: Color = Color::Green;
const COLOR_SHORTCUT: Color = Color::Magenta;
const COLOR_VISITED: Color = Color::Green;
const COLOR_SCORE: Color = Color::Yellow;

fn border_style() -> Style {
    Style::default().fg(COLOR_BORDER).add_modifier(Modifier::BOLD)
}

fn title_style() -> Style {
    Style::default()
        .fg(COLOR_TITLE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

fn shortcut_style(visited: bool) -> Style {
    let color = if visited { COLOR_VISITED } else { COLOR_SHORTCUT };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn headline_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn score_style() -> Style {
    Style::default().fg(COLOR_SCORE).add_modifier(Modifier::BOLD)
}

/// Off-screen rendering of every item block. Built once per launch or
/// resize; the viewport then shows a window of it.
#[derive(Debug, Clone)]
pub struct Surface {
    buffer: Buffer,
    rows_per_item: usize,
}

impl Surface {
    pub fn draw(
        items: &[DisplayItem],
        geometry: &Geometry,
        alphabet: &ShortcutAlphabet,
        marks: &ActivationMarks,
    ) -> Self {
        let width = geometry.viewport_cols as u16;
        let height = backing_height(geometry.content_rows(), width);
        let mut surface = Self {
            buffer: Buffer::empty(Rect::new(0, 0, width, height)),
            rows_per_item: geometry.rows_per_item,
        };
        if width == 0 {
            return surface;
        }

        let headline_width = geometry.headline_width();
        for (index, item) in items.iter().enumerate() {
            let Some(row) = surface.block_row(index) else {
                break;
            };
            surface.draw_shortcut(index, alphabet, marks.is_marked(index));
            surface.put(
                SHORTCUT_COLUMN_WIDTH,
                row,
                &truncate_headline(&item.headline, headline_width),
                headline_style(),
            );
            surface.put(
                SHORTCUT_COLUMN_WIDTH,
                row + 1,
                &item.score.to_string(),
                score_style(),
            );
        }
        surface
    }

    pub fn height(&self) -> usize {
        self.buffer.area.height as usize
    }

    /// Redraws just the shortcut label of one item in the visited colour.
    pub fn mark_visited(&mut self, index: usize, alphabet: &ShortcutAlphabet) {
        self.draw_shortcut(index, alphabet, true);
    }

    /// Copies rows `cursor..cursor + area.height` of the surface into `area`.
    pub fn present(&self, target: &mut Buffer, area: Rect, cursor: usize) {
        let area = area.intersection(*target.area());
        let width = area.width.min(self.buffer.area.width);
        let rows = self.height().saturating_sub(cursor).min(area.height as usize);
        for dy in 0..rows {
            let src_y = (cursor + dy) as u16;
            for dx in 0..width {
                *target.get_mut(area.x + dx, area.y + dy as u16) =
                    self.buffer.get(dx, src_y).clone();
            }
        }
    }

    fn block_row(&self, index: usize) -> Option<usize> {
        let row = index.checked_mul(self.rows_per_item)?;
        (row < self.height()).then_some(row)
    }

    fn draw_shortcut(&mut self, index: usize, alphabet: &ShortcutAlphabet, visited: bool) {
        let (Some(row), Some(glyph)) = (self.block_row(index), alphabet.glyph(index)) else {
            return;
        };
        self.put(0, row, &format!("({glyph})"), shortcut_style(visited));
    }

    fn put(&mut self, col: usize, row: usize, text: &str, style: Style) {
        let area = self.buffer.area;
        if col >= area.width as usize || row >= area.height as usize {
            return;
        }
        let room = area.width as usize - col;
        self.buffer
            .set_stringn(col as u16, row as u16, text, room, style);
    }
}

// A ratatui buffer holds at most u16::MAX cells; rows past that are dropped.
fn backing_height(content_rows: usize, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let max_rows = u16::MAX as usize / width as usize;
    content_rows.min(max_rows) as u16
}

/// Border and title around the list. This is all that is shown when there
/// is nothing to list.
pub fn draw_chrome(frame: &mut Frame<'_>, geometry: &Geometry, title: &str) {
    let area = geometry.frame_area().intersection(frame.size());
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style()),
        area,
    );

    let title_area = geometry.title_area().intersection(area);
    if title_area.area() == 0 {
        return;
    }
    let title = truncate_headline(title, title_area.width as usize);
    frame.render_widget(Paragraph::new(Span::styled(title, title_style())), title_area);
}

pub fn render(
    frame: &mut Frame<'_>,
    geometry: &Geometry,
    surface: &Surface,
    cursor: usize,
    title: &str,
) {
    draw_chrome(frame, geometry, title);
    surface.present(frame.buffer_mut(), geometry.list_area(), cursor);
}
