//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching the presenter.
//!
//! ## For contributors
//!
//! * The layout is a headline list beside a detail pane, with a one-line
//!   status bar at the bottom.  Fetch errors draw as a centred popup on top.
//! * Colours and styles are defined inline.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Phase};
use crate::source::Thumbnail;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
            .areas(main_area);

    draw_headline_list(app, frame, list_area);
    draw_detail(app, frame, detail_area);
    draw_status_bar(app, frame, status_area);

    if let Some(message) = &app.error {
        draw_error_popup(message, frame);
    }
}

fn thumbnail_glyph(thumbnail: &Thumbnail) -> Span<'static> {
    match thumbnail {
        Thumbnail::Pending => Span::styled("·", Style::default().fg(Color::DarkGray)),
        Thumbnail::Placeholder => Span::styled("□", Style::default().fg(Color::DarkGray)),
        Thumbnail::Ready { .. } => Span::styled("▣", Style::default().fg(Color::Magenta)),
    }
}

/// Render the scrollable headline list.
fn draw_headline_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .articles
        .iter()
        .zip(&app.thumbnails)
        .map(|(article, slot)| {
            let line = Line::from(vec![
                thumbnail_glyph(&slot.thumbnail),
                Span::raw(" "),
                Span::styled(
                    format!("{:<16}", article.display_date()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(&article.title, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", article.source_name),
                    Style::default().fg(Color::Cyan),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = match app.phase {
        _ if app.is_refreshing() => " Top Headlines ⟳ ",
        Phase::LoadFailed => " Top Headlines · last refresh failed ",
        Phase::Idle | Phase::Loading | Phase::Loaded => " Top Headlines ",
    };

    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the selected article's fields.
fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Article ").borders(Borders::ALL);

    let Some(article) = app.selected_article() else {
        frame.render_widget(Paragraph::new("No article selected").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(
            article.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("Source  ", label),
            Span::raw(article.source_name.as_str()),
        ]),
    ];
    if let Some(author) = &article.author {
        lines.push(Line::from(vec![
            Span::styled("Author  ", label),
            Span::raw(author.as_str()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Date    ", label),
        Span::raw(article.display_date()),
    ]));

    let image = app
        .list_state
        .selected()
        .and_then(|i| app.thumbnails.get(i))
        .map(|slot| match &slot.thumbnail {
            Thumbnail::Pending => "loading…".to_string(),
            Thumbnail::Placeholder => "none".to_string(),
            Thumbnail::Ready { content_type, size } => format!(
                "{} ({} KiB)",
                content_type.as_deref().unwrap_or("image"),
                size.div_ceil(1024)
            ),
        })
        .unwrap_or_default();
    lines.push(Line::from(vec![Span::styled("Image   ", label), Span::raw(image)]));

    lines.push(Line::default());
    if let Some(description) = &article.description {
        lines.push(Line::raw(description.as_str()));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        article.url.as_str(),
        Style::default().fg(Color::Blue),
    )));

    let detail = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} headlines", app.articles.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  r: refresh  ⏎: open  s: share"),
    ]));
    frame.render_widget(status, area);
}

/// Render the dismissible error popup over everything else.
fn draw_error_popup(message: &str, frame: &mut Frame) {
    let area = centered(frame.area(), 60, 7);
    let popup = Paragraph::new(vec![
        Line::raw(message),
        Line::default(),
        Line::from(Span::styled(
            "Esc/Enter: dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::source::make_article;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();

        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    fn loaded_app() -> App {
        let mut app = App::new();
        let seq = app.begin_fetch();
        app.apply_fetch(
            seq,
            Ok(vec![make_article("Alpha headline", "http://a"), make_article("B", "http://b")]),
        );
        app
    }

    #[test]
    fn draw_does_not_panic_with_no_articles() {
        let mut app = App::new();
        let text = render(&mut app);
        assert!(text.contains("No article selected"));
    }

    #[test]
    fn draw_shows_titles_and_count() {
        let mut app = loaded_app();
        let text = render(&mut app);
        assert!(text.contains("Alpha headline"));
        assert!(text.contains("2 headlines"), "status bar should show count");
    }

    #[test]
    fn detail_pane_shows_selected_url() {
        let mut app = loaded_app();
        app.select_last();
        let text = render(&mut app);
        assert!(text.contains("http://b"));
    }

    #[test]
    fn error_popup_is_drawn_until_dismissed() {
        let mut app = loaded_app();
        let seq = app.begin_fetch();
        app.apply_fetch(seq, Err(FetchError::EmptyBody));

        let text = render(&mut app);
        assert!(text.contains("Failed to refresh news"));

        app.dismiss_error();
        let text = render(&mut app);
        assert!(!text.contains("Failed to refresh news"));
    }

    #[test]
    fn list_title_marks_failed_refresh() {
        let mut app = loaded_app();
        assert!(!render(&mut app).contains("last refresh failed"));

        let seq = app.begin_fetch();
        assert!(render(&mut app).contains("⟳"));

        app.apply_fetch(seq, Err(FetchError::EmptyBody));
        app.dismiss_error();
        let text = render(&mut app);
        assert!(text.contains("last refresh failed"));
        assert!(text.contains("Alpha headline"), "previous list stays visible");
    }

    #[test]
    fn draw_handles_tiny_terminal() {
        let mut app = loaded_app();
        let backend = TestBackend::new(10, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(&mut app, f)).unwrap();
    }
}
