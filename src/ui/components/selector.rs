use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use kanadr::catalog::{Catalog, KanaClass};
use kanadr::engine::filter::{CategorySelection, KanaSelection};

use crate::ui::theme::Theme;

pub const GRID_COLUMNS: usize = 10;
const CELL_WIDTH: usize = 7;

/// Move a flat grid cursor by (dx, dy) cells, staying in `0..len`.
pub fn move_cursor(cursor: usize, len: usize, dx: isize, dy: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let step = dx + dy * GRID_COLUMNS as isize;
    (cursor as isize + step).clamp(0, len as isize - 1) as usize
}

/// Every kana in catalog order, `GRID_COLUMNS` per row, with per-class counts.
pub struct KanaGrid<'a> {
    pub kana: &'a Catalog,
    pub selection: &'a KanaSelection,
    pub cursor: usize,
    pub theme: &'a Theme,
}

impl Widget for KanaGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" Kana ({} selected) ", self.selection.len()))
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 {
            return;
        }

        let mut summary = Vec::new();
        for (i, class) in KanaClass::ALL.iter().enumerate() {
            let (on, total) = self.selection.count(self.kana, *class);
            let style = if on == 0 {
                Style::default().fg(colors.unselected())
            } else {
                Style::default().fg(colors.selected())
            };
            summary.push(Span::styled(
                format!(" [{}] {} {on}/{total} ", i + 1, class.label()),
                style,
            ));
        }

        let entries = self.kana.entries();
        let rows: Vec<&[kanadr::catalog::Entry]> = entries.chunks(GRID_COLUMNS).collect();
        let visible = (inner.height as usize).saturating_sub(2);
        let cursor_row = self.cursor / GRID_COLUMNS;
        let offset = (cursor_row + 1).saturating_sub(visible);

        let mut lines = vec![Line::from(summary), Line::from("")];
        for (r, row) in rows.iter().enumerate().skip(offset).take(visible) {
            let mut spans = Vec::new();
            for (c, entry) in row.iter().enumerate() {
                let idx = r * GRID_COLUMNS + c;
                let mut style = if self.selection.is_selected(&entry.id) {
                    Style::default().fg(colors.selected())
                } else {
                    Style::default().fg(colors.unselected())
                };
                if idx == self.cursor {
                    style = style.bg(colors.accent_dim()).add_modifier(Modifier::BOLD);
                }
                let cell = format!("{} {}", entry.phonetic, entry.romaji);
                // kana are double width
                let width = entry.phonetic.chars().count() * 2 + 1 + entry.romaji.len();
                let pad = CELL_WIDTH.saturating_sub(width) + 1;
                spans.push(Span::styled(cell, style));
                spans.push(Span::raw(" ".repeat(pad)));
            }
            lines.push(Line::from(spans));
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

/// Phrase categories in catalog order with a check box each.
pub struct CategoryList<'a> {
    pub phrases: &'a Catalog,
    pub selection: &'a CategorySelection,
    pub cursor: usize,
    pub theme: &'a Theme,
}

impl Widget for CategoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Categories ")
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .phrases
            .categories()
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let on = self.selection.contains(key);
                let mark = if on { "[x]" } else { "[ ]" };
                let count = self.phrases.in_category(key).count();
                let mut style = Style::default().fg(if on {
                    colors.selected()
                } else {
                    colors.unselected()
                });
                if i == self.cursor {
                    style = style.bg(colors.accent_dim()).add_modifier(Modifier::BOLD);
                }
                Line::from(Span::styled(format!(" {mark} {key} ({count})"), style))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_moves_by_rows_and_clamps() {
        assert_eq!(move_cursor(0, 104, 1, 0), 1);
        assert_eq!(move_cursor(3, 104, 0, 1), 13);
        assert_eq!(move_cursor(3, 104, 0, -1), 0);
        assert_eq!(move_cursor(100, 104, 0, 1), 103);
        assert_eq!(move_cursor(5, 0, 1, 0), 0);
    }
}
