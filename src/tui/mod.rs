//! TUI module - интерактивный поиск (ratatui)

use std::io::{Stdout, stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use tokio::runtime::Handle;

use crate::exercises::Exercise;
use crate::search::{SearchPhase, SearchSession, SearchState, SearchSuggestion};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const MAX_SUGGESTIONS_SHOWN: usize = 5;

/// App state for TUI
pub struct App {
    session: Arc<SearchSession>,
    runtime: Handle,
    input: String,
    suggestions: Vec<SearchSuggestion>,
    status: Option<String>,
    /// Name being typed for a saved search (ctrl+s)
    naming: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Arc<SearchSession>) -> Result<Self> {
        let runtime = Handle::try_current().context("TUI needs a tokio runtime")?;
        let suggestions = session.suggestions("");
        Ok(Self {
            session,
            runtime,
            input: String::new(),
            suggestions,
            status: None,
            naming: None,
            should_quit: false,
        })
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            let state = self.session.state();
            terminal.draw(|frame| self.render(frame, &state))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame, state: &SearchState) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(MAX_SUGGESTIONS_SHOWN as u16 + 2),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Search box
        let phase = match state.phase {
            SearchPhase::Idle => "",
            SearchPhase::Searching => " (searching...)",
            SearchPhase::Settled => "",
        };
        let input = Paragraph::new(format!("> {}", self.input))
            .style(Style::default().fg(Color::Cyan).bold())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("gymscout - search{}", phase)),
            );
        frame.render_widget(input, chunks[0]);

        // Suggestions
        let lines: Vec<Line> = self
            .suggestions
            .iter()
            .take(MAX_SUGGESTIONS_SHOWN)
            .map(|s| {
                let detail = s.detail.as_deref().unwrap_or_default();
                Line::from(vec![
                    Span::styled(format!("[{}] ", s.kind.label()), Style::default().fg(Color::DarkGray)),
                    Span::raw(s.text.clone()),
                    Span::styled(format!("  {}", detail), Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();
        let suggestions = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Suggestions (Tab)"));
        frame.render_widget(suggestions, chunks[1]);

        // Results table
        let rows: Vec<Row> = state.result.items.iter().map(exercise_row).collect();

        let title = if state.phase == SearchPhase::Idle {
            "Results".to_string()
        } else {
            format!(
                "Results {}/{} of {} ({:.1} ms){}",
                state.result.items.len(),
                state.result.filtered_count,
                state.result.total_count,
                state.result.search_time_ms,
                if state.result.has_more { " - PgDn for more" } else { "" }
            )
        };

        let table = Table::new(
            rows,
            [
                Constraint::Length(30),
                Constraint::Length(14),
                Constraint::Length(28),
                Constraint::Length(22),
                Constraint::Length(13),
                Constraint::Min(6),
            ],
        )
        .header(
            Row::new(vec!["Exercise", "Category", "Muscles", "Equipment", "Difficulty", "Media"])
                .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(table, chunks[2]);

        // Footer
        let footer_text = match (&self.naming, &self.status) {
            (Some(name), _) => format!("save as: {}_  (enter: save | esc: cancel)", name),
            (None, Some(status)) => status.clone(),
            (None, None) if state.filters.is_empty() => {
                "esc: clear/quit | tab: accept | ctrl+s: save | pgdn: more".to_string()
            }
            (None, None) => format!(
                "filters ({}): {}",
                state.filters.active_count(),
                state.filters.to_operator_string()
            ),
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key);
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if let Some(name) = self.naming.as_mut() {
            match key.code {
                KeyCode::Char(c) if !ctrl => name.push(c),
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Enter => self.finish_save(),
                KeyCode::Esc => {
                    self.naming = None;
                    self.status = Some("save cancelled".to_string());
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('s') if ctrl => self.start_save(),
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                self.input_changed();
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.input_changed();
            }
            KeyCode::Tab => {
                if let Some(first) = self.suggestions.first() {
                    self.input = first.text.clone();
                    self.input_changed();
                }
            }
            KeyCode::PageDown => {
                let session = Arc::clone(&self.session);
                self.runtime.spawn(async move {
                    session.load_more().await;
                });
            }
            KeyCode::Esc => {
                if self.input.is_empty() {
                    self.should_quit = true;
                } else {
                    self.input.clear();
                    self.session.clear();
                    self.suggestions = self.session.suggestions("");
                    self.status = None;
                }
            }
            _ => {}
        }
    }

    fn input_changed(&mut self) {
        self.status = None;
        self.session.set_query(self.input.clone());
        self.suggestions = self.session.suggestions(&self.input);
    }

    fn start_save(&mut self) {
        if self.session.query().trim().is_empty() && self.session.filters().is_empty() {
            self.status = Some("nothing to save".to_string());
        } else {
            self.naming = Some(String::new());
        }
    }

    /// Save under the typed name; a blank name falls back to the query text
    fn finish_save(&mut self) {
        let Some(name) = self.naming.take() else {
            return;
        };
        let name = match name.trim() {
            "" => self.input.trim().to_string(),
            typed => typed.to_string(),
        };
        self.status = Some(match self.session.save_current(&name) {
            Some(saved) => {
                self.suggestions = self.session.suggestions(&self.input);
                format!("saved '{}'", saved.name)
            }
            None => "nothing to save".to_string(),
        });
    }
}

fn exercise_row(e: &Exercise) -> Row<'static> {
    let muscles: Vec<_> = e.muscle_groups.iter().map(|m| m.as_str()).collect();
    let equipment: Vec<_> = e.equipment.iter().map(|q| q.as_str()).collect();
    let media = match (e.video_url.is_some(), e.image_url.is_some()) {
        (true, true) => "V I",
        (true, false) => "V",
        (false, true) => "I",
        (false, false) => "-",
    };
    let name = if e.is_custom {
        format!("{} *", e.name)
    } else {
        e.name.clone()
    };
    Row::new(vec![
        Cell::from(name),
        Cell::from(format!("{} {}", e.category.emoji(), e.category.as_str())),
        Cell::from(muscles.join(", ")),
        Cell::from(equipment.join(", ")),
        Cell::from(e.difficulty.as_str()),
        Cell::from(media),
    ])
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocalCatalog;
    use crate::config::SearchConfig;
    use crate::db::MemoryStore;
    use crate::search::SearchHistory;

    fn app() -> App {
        let history = SearchHistory::new(Arc::new(MemoryStore::new()), 10);
        let session =
            SearchSession::new(Arc::new(LocalCatalog::new()), history, SearchConfig::default())
                .unwrap();
        App::new(Arc::new(session)).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_s_saves_under_typed_name() {
        let mut app = app();
        type_text(&mut app, "squat");
        ctrl(&mut app, 's');
        assert!(app.naming.is_some());

        // typing now edits the name, not the query
        type_text(&mut app, "Leg day");
        press(&mut app, KeyCode::Enter);

        assert!(app.naming.is_none());
        assert_eq!(app.input, "squat");
        let saved = app.session.history().saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Leg day");
        assert_eq!(saved[0].query, "squat");
        assert_eq!(app.status.as_deref(), Some("saved 'Leg day'"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_esc_cancels_naming() {
        let mut app = app();
        type_text(&mut app, "row");
        ctrl(&mut app, 's');
        type_text(&mut app, "Pull");
        press(&mut app, KeyCode::Esc);

        assert!(app.naming.is_none());
        assert_eq!(app.input, "row");
        assert!(app.session.history().saved().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_name_falls_back_to_query() {
        let mut app = app();
        type_text(&mut app, "bench");
        ctrl(&mut app, 's');
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.history().saved()[0].name, "bench");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_s_on_empty_input_does_not_prompt() {
        let mut app = app();
        ctrl(&mut app, 's');
        assert!(app.naming.is_none());
        assert_eq!(app.status.as_deref(), Some("nothing to save"));
    }
}
