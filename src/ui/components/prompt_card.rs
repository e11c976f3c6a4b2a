use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use kanadr::session::Prompt;

use crate::ui::theme::Theme;

pub struct PromptCard<'a> {
    pub prompt: Option<&'a Prompt>,
    pub hint_visible: bool,
    pub title: String,
    pub theme: &'a Theme,
}

impl<'a> PromptCard<'a> {
    pub fn new(prompt: Option<&'a Prompt>, hint_visible: bool, title: String, theme: &'a Theme) -> Self {
        Self {
            prompt,
            hint_visible,
            title,
            theme,
        }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let colors = &self.theme.colors;
        let Some(prompt) = self.prompt else {
            return vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Press space to start",
                    Style::default().fg(colors.hint()),
                )),
            ];
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                prompt.primary.clone(),
                Style::default()
                    .fg(colors.prompt())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        if let Some(pitch) = prompt.entry.pitch()
            && self.hint_visible
        {
            lines.push(Line::from(Span::styled(
                format!("pitch {pitch}"),
                Style::default().fg(colors.hint_label()),
            )));
        }

        if self.hint_visible {
            for part in &prompt.parts {
                let label = part.label.as_str();
                let mut spans = Vec::new();
                if !label.is_empty() {
                    spans.push(Span::styled(
                        format!("{label}  "),
                        Style::default().fg(colors.hint_label()),
                    ));
                }
                spans.push(Span::styled(
                    part.text.clone(),
                    Style::default().fg(colors.hint()),
                ));
                lines.push(Line::from(spans));
            }
        } else {
            lines.push(Line::from(Span::styled(
                "[h] hint",
                Style::default().fg(colors.hint_label()),
            )));
        }
        lines
    }
}

impl Widget for PromptCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        // vertically centre the text block
        let lines = self.lines();
        let top_pad = inner.height.saturating_sub(lines.len() as u16) / 2;
        let body = Rect::new(
            inner.x,
            inner.y + top_pad,
            inner.width,
            inner.height.saturating_sub(top_pad),
        );
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(body, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanadr::catalog::{Entry, KanaClass};
    use kanadr::engine::display::{self, DisplayMode, KanaMode};

    fn prompt() -> Prompt {
        let entry = Entry::kana("a", "あ", "ア", "a", KanaClass::Seion);
        let resolved = display::resolve(&entry, DisplayMode::Kana(KanaMode::Hiragana), true);
        Prompt::new(entry, resolved, true)
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn hidden_hint_shows_only_primary() {
        let theme = Theme::default();
        let p = prompt();
        let card = PromptCard::new(Some(&p), false, "Kana".into(), &theme);
        let rendered = text(&card.lines());
        assert!(rendered.contains('あ'));
        assert!(!rendered.contains('ア'));
    }

    #[test]
    fn visible_hint_lists_labelled_parts() {
        let theme = Theme::default();
        let p = prompt();
        let card = PromptCard::new(Some(&p), true, "Kana".into(), &theme);
        let rendered = text(&card.lines());
        assert!(rendered.contains("katakana  ア"));
        assert!(rendered.contains("romaji  a"));
    }

    #[test]
    fn renders_into_small_area_without_panicking() {
        let theme = Theme::default();
        let p = prompt();
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 3));
        PromptCard::new(Some(&p), true, "Kana".into(), &theme).render(buf.area, &mut buf);
    }
}
