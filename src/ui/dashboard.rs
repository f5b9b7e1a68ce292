use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::Rng;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::error::Error;
use std::io;
use tokio::sync::mpsc;

use crate::core::clock::Clock;
use crate::core::context::{LiveContext, LiveEvent};
use crate::core::notifications::{Notification, NotificationKind};
use crate::core::tracker::TrackedAsset;
use crate::format::{format_compact_number, format_currency, format_signed_percent};

type DynError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Prices,
    Notifications,
}

/// Terminal front end. Owns the live context and is the only place events are
/// applied while it runs.
pub struct Dashboard<C: Clock, R: Rng> {
    context: LiveContext<C, R>,
    current_view: DashboardView,
    /// Highlighted notification, tracked by id so head inserts don't move it.
    selected_id: Option<String>,
    running: bool,
    price_ticks: u64,
}

impl<C: Clock, R: Rng> Dashboard<C, R> {
    pub fn new(context: LiveContext<C, R>) -> Self {
        Self {
            context,
            current_view: DashboardView::Prices,
            selected_id: None,
            running: true,
            price_ticks: 0,
        }
    }

    pub async fn run(&mut self, mut receiver: mpsc::Receiver<LiveEvent>) -> Result<(), DynError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        while self.running {
            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key_input(key);
                }
            }

            while let Ok(event) = receiver.try_recv() {
                self.apply_event(event);
            }

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(3),
                        Constraint::Min(5),
                        Constraint::Length(3),
                    ])
                    .split(f.size());

                self.render_header(f, chunks[0]);
                self.render_main_content(f, chunks[1]);
                self.render_footer(f, chunks[2]);
            })?;
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        Ok(())
    }

    fn apply_event(&mut self, event: LiveEvent) {
        if let LiveEvent::Prices(batch) = &event {
            self.price_ticks += batch.len() as u64;
        }
        for notification in self.context.apply(event) {
            log::debug!("notification: {}", notification.title);
        }
    }

    fn handle_key_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('v') => self.current_view = DashboardView::Prices,
            KeyCode::Char('n') => {
                self.current_view = DashboardView::Notifications;
                self.move_selection(0);
            }
            KeyCode::Char('a') => self.context.mark_all_read(),
            KeyCode::Char('c') => {
                self.context.clear_notifications();
                self.selected_id = None;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => {
                if self.current_view == DashboardView::Notifications {
                    if let Some(id) = self.selected_notification().map(|n| n.id.clone()) {
                        self.context.mark_read(&id);
                    }
                }
            }
            _ => (),
        }
    }

    /// Position of the highlighted notification; falls back to the head when
    /// nothing is selected or the selection was evicted.
    fn selected_index(&self) -> usize {
        self.selected_id
            .as_ref()
            .and_then(|id| {
                self.context
                    .notifications()
                    .iter()
                    .position(|n| &n.id == id)
            })
            .unwrap_or(0)
    }

    fn selected_notification(&self) -> Option<&Notification> {
        self.context
            .notifications()
            .iter()
            .nth(self.selected_index())
    }

    fn move_selection(&mut self, offset: isize) {
        let store = self.context.notifications();
        if store.is_empty() {
            self.selected_id = None;
            return;
        }
        let last = store.len() as isize - 1;
        let index = (self.selected_index() as isize + offset).clamp(0, last) as usize;
        self.selected_id = store.iter().nth(index).map(|n| n.id.clone());
    }

    fn render_header(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect) {
        let connection_status = if self.context.is_connected() {
            Span::styled("CONNECTED", Style::default().fg(Color::Green))
        } else {
            Span::styled("RECONNECTING", Style::default().fg(Color::Red))
        };

        let unread = self.context.notifications().unread_count();
        let badge = if unread > 0 {
            Span::styled(
                format!("  {} new", unread),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        };

        let header = Paragraph::new(Text::from(vec![
            Line::from(vec![
                Span::styled(
                    "CRYPTOWEATHER NEXUS ",
                    Style::default()
                        .fg(Color::LightCyan)
                        .add_modifier(Modifier::BOLD),
                ),
                connection_status,
                badge,
            ]),
            Line::from(Span::styled(
                format!(
                    "Last update: {} | Ticks: {}",
                    Local::now().format("%H:%M:%S"),
                    format_compact_number(self.price_ticks as f64)
                ),
                Style::default().fg(Color::Gray),
            )),
        ]))
        .block(Block::default().borders(Borders::BOTTOM));

        f.render_widget(header, area);
    }

    fn render_prices_view(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect) {
        let rows = self.context.tracker().iter().map(|asset| {
            let (change_text, change_color) = price_change(asset);
            let last_alert = asset
                .last_alert_at
                .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(asset.id.to_uppercase()),
                Cell::from(format_currency(asset.current_price)),
                Cell::from(format_currency(asset.previous_price)),
                Cell::from(Span::styled(change_text, Style::default().fg(change_color))),
                Cell::from(last_alert),
            ])
        });

        let table = Table::new(rows)
            .header(
                Row::new(vec!["Asset", "Price", "Previous", "Change", "Last alert"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title("Live Prices"))
            .widths(&[
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Length(16),
                Constraint::Length(10),
                Constraint::Length(12),
            ]);

        f.render_widget(table, area);
    }

    fn render_notifications_view(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect) {
        let store = self.context.notifications();
        let block = Block::default().borders(Borders::ALL).title(format!(
            "Notifications ({} unread / {})",
            store.unread_count(),
            store.len()
        ));

        if store.is_empty() {
            let empty = Paragraph::new("No notifications yet")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = store.iter().map(notification_item).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        state.select(Some(self.selected_index()));
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_main_content(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect) {
        match self.current_view {
            DashboardView::Prices => self.render_prices_view(f, area),
            DashboardView::Notifications => self.render_notifications_view(f, area),
        }
    }

    fn render_footer(&self, f: &mut Frame<CrosstermBackend<io::Stdout>>, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let controls = match self.current_view {
            DashboardView::Prices => vec![
                Span::raw("Controls: "),
                Span::styled("n", bold),
                Span::raw(" Notifications  "),
                Span::styled("a", bold),
                Span::raw(" Mark all read  "),
                Span::styled("q", bold),
                Span::raw(" Quit"),
            ],
            DashboardView::Notifications => vec![
                Span::raw("Controls: "),
                Span::styled("↑/↓", bold),
                Span::raw(" Navigate  "),
                Span::styled("Enter", bold),
                Span::raw(" Mark read  "),
                Span::styled("a", bold),
                Span::raw(" Mark all read  "),
                Span::styled("c", bold),
                Span::raw(" Clear  "),
                Span::styled("v", bold),
                Span::raw(" Prices  "),
                Span::styled("q", bold),
                Span::raw(" Quit"),
            ],
        };

        let footer = Paragraph::new(Line::from(controls))
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::TOP));

        f.render_widget(footer, area);
    }
}

fn price_change(asset: &TrackedAsset) -> (String, Color) {
    if asset.previous_price <= 0.0 {
        return ("-".to_string(), Color::Gray);
    }
    let percent = (asset.current_price - asset.previous_price) / asset.previous_price * 100.0;
    let color = if percent > 0.0 {
        Color::Green
    } else if percent < 0.0 {
        Color::Red
    } else {
        Color::Gray
    };
    (format_signed_percent(percent), color)
}

fn notification_item(notification: &Notification) -> ListItem<'static> {
    let kind_color = match notification.kind {
        NotificationKind::PriceAlert => Color::Yellow,
        NotificationKind::WeatherAlert => Color::LightBlue,
    };
    let title_style = if notification.read {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(if notification.read { "  " } else { "● " }, Style::default().fg(Color::Red)),
            Span::styled(
                format!("{:<8}", notification.kind.label()),
                Style::default().fg(kind_color),
            ),
            Span::styled(notification.title.clone(), title_style),
            Span::styled(
                format!(
                    "  {}",
                    notification
                        .timestamp
                        .with_timezone(&Local)
                        .format("%H:%M:%S")
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::raw(format!("          {}", notification.message))),
    ])
}
