use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Header, prompt area, optional cycle bar, footer. The bar is dropped on
/// short terminals.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub progress: Option<Rect>,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let show_progress = area.height >= 16;
        let mut constraints = vec![Constraint::Length(1), Constraint::Min(5)];
        if show_progress {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(footer_lines.max(1)));

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            progress: show_progress.then(|| vertical[2]),
            footer: vertical[vertical.len() - 1],
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 72;
    const MIN_POPUP_HEIGHT: u16 = 18;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_terminal_drops_progress_bar() {
        let tall = AppLayout::new(Rect::new(0, 0, 80, 24), 2);
        assert!(tall.progress.is_some());
        assert_eq!(tall.footer.height, 2);
        let short = AppLayout::new(Rect::new(0, 0, 80, 12), 1);
        assert!(short.progress.is_none());
    }

    #[test]
    fn hints_pack_into_width() {
        let lines = pack_hint_lines(&["[space] next", "[h] hint", "[p] speak"], 24);
        assert_eq!(lines, vec!["  [space] next  [h] hint", "  [p] speak"]);
        assert!(pack_hint_lines(&["[h] hint"], 0).is_empty());
    }

    #[test]
    fn popup_stays_inside_area() {
        let area = Rect::new(0, 0, 60, 15);
        let popup = centered_rect(50, 50, area);
        assert!(popup.width <= area.width && popup.height <= area.height);
    }
}
