//! 通用 UI 组件
//!
//! 对话框、输入框、条目卡片等通用组件

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::image::describe_payload;
use crate::models::Entry;

/// [组件] 弹窗基础框架
pub fn render_dialog_framework(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 带有标题和样式的输入框
pub fn render_input_widget(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    is_focused: bool,
    active_color: Color,
) {
    let style = if is_focused {
        Style::default()
            .fg(active_color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let input = Paragraph::new(value)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}

/// [组件] 条目卡片：标题行、正文、可选的图片行、分隔空行
pub fn entry_card_lines(entry: &Entry) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("Entry - {}", entry.date),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))];

    lines.extend(
        entry
            .text
            .lines()
            .map(|line| Line::from(format!("  {}", line))),
    );

    if let Some(payload) = &entry.image {
        let summary = describe_payload(payload).unwrap_or_else(|| "embedded image".to_string());
        lines.push(Line::from(Span::styled(
            format!("  [image: {}]", summary),
            Style::default().fg(Color::Magenta),
        )));
    }

    lines.push(Line::default());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_card_without_image() {
        let entry = Entry {
            id: "1".to_string(),
            date: "5/4/2025".to_string(),
            text: "first line\nsecond line".to_string(),
            image: None,
        };

        let lines: Vec<String> = entry_card_lines(&entry).iter().map(plain).collect();
        assert_eq!(
            lines,
            vec!["Entry - 5/4/2025", "  first line", "  second line", ""]
        );
    }

    #[test]
    fn test_card_with_image() {
        let entry = Entry {
            id: "1".to_string(),
            date: "5/4/2025".to_string(),
            text: "beach".to_string(),
            image: Some("data:image/jpeg;base64,YWJj".to_string()),
        };

        let lines: Vec<String> = entry_card_lines(&entry).iter().map(plain).collect();
        assert_eq!(lines[2], "  [image: image/jpeg, 3 B]");
        assert_eq!(lines.len(), 4);
    }
}
