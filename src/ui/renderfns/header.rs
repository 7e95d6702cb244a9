use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, API host, cache size and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  base_url: &str,
  cached: Option<usize>,
  shortcuts: &[ShortcutInfo],
) {
  let mut spans = vec![
    Span::styled(" swx ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", extract_domain(base_url)),
      Style::default().fg(Color::White),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(cache_label(cached), Style::default().fg(Color::Yellow)),
    Span::raw(" "),
  ];

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);
  for shortcut in shortcuts {
    // Keys and brackets highlighted, descriptions dimmed
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::raw("  "));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn cache_label(cached: Option<usize>) -> String {
  match cached {
    Some(count) => format!(" {} cached ", count),
    None => " cache empty ".to_string(),
  }
}

/// Host part of the API base URL
fn extract_domain(url: &str) -> &str {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url);
  rest.split('/').next().unwrap_or(rest)
}
