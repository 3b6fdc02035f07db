//! Ratatui-based terminal form.
//!
//! One slider per feature, a submit action, and a result area. The request
//! runs on a `SubmissionWorker` thread so sliders stay editable while it is
//! outstanding; edits made meanwhile only affect the next submission.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::info;

use crate::data::{PredictionClient, Predictor};
use crate::debug::{SubmissionRecord, write_debug_bundle};
use crate::domain::{FeatureId, RATING_MAX, Rating};
use crate::error::AppError;
use crate::form::{FormController, SubmissionWorker};
use crate::report;

/// Start the TUI.
pub fn run(client: PredictionClient) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    info!(endpoint = %client.endpoint(), "starting form");
    let mut app = App::new(client.endpoint().to_string(), Arc::new(client));
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    form: FormController,
    worker: SubmissionWorker,
    endpoint: String,
    selected: usize,
    status: String,
}

impl App {
    fn new(endpoint: String, predictor: Arc<dyn Predictor + Send + Sync>) -> Self {
        Self {
            form: FormController::new(),
            worker: SubmissionWorker::new(predictor),
            endpoint,
            selected: 0,
            status: "Adjust the sliders to rate each feature from 1 to 10.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_submission() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Hand a finished request to the form. Returns `true` if one arrived.
    fn poll_submission(&mut self) -> bool {
        if !self.worker.poll(&mut self.form) {
            return false;
        }
        if let Some(result) = self.form.prediction() {
            self.status = report::describe_outcome(result);
        }
        true
    }

    fn selected_feature(&self) -> FeatureId {
        FeatureId::ALL[self.selected]
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < FeatureId::COUNT {
                    self.selected += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.form.adjust_rating(self.selected_feature(), -1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.form.adjust_rating(self.selected_feature(), 1);
            }
            KeyCode::Char(c @ '0'..='9') => {
                let value = match c.to_digit(10) {
                    Some(0) => RATING_MAX,
                    Some(d) => d as u8,
                    None => return Ok(false),
                };
                self.form.set_rating(self.selected_feature(), Some(value));
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char('r') => {
                self.form.reset();
                self.status = "Ratings reset to 5.".to_string();
            }
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }

        Ok(false)
    }

    fn submit(&mut self) {
        if self.form.is_submitting() {
            self.status = "A prediction is already in progress.".to_string();
            return;
        }
        match self.worker.dispatch(&mut self.form) {
            Some(submission) => {
                self.status = format!("Submitted request #{}.", submission.seq + 1);
            }
            None => {
                if let Some(result) = self.form.prediction() {
                    self.status = report::describe_outcome(result);
                }
            }
        }
    }

    fn write_debug(&mut self) {
        let Some(submission) = self.form.last_submission() else {
            self.status = "Nothing submitted yet.".to_string();
            return;
        };
        let result = if self.form.is_submitting() {
            None
        } else {
            self.form.prediction().cloned()
        };
        let record = SubmissionRecord {
            submission: *submission,
            endpoint: self.endpoint.clone(),
            result,
        };
        self.status = match write_debug_bundle(&record) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_form(frame, chunks[1]);
        self.draw_result(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled(report::TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(format!("  → {}", self.endpoint), Style::default().fg(Color::DarkGray)),
            ]),
            Line::from(Span::styled(report::INTRO, Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FeatureId::ALL
            .iter()
            .map(|&id| {
                let rating = self.form.rating(id);
                let category = rating.category(id.num_categories());
                ListItem::new(vec![
                    Line::from(Span::raw(id.question())),
                    Line::from(vec![
                        Span::styled(slider_bar(rating), Style::default().fg(Color::Cyan)),
                        Span::raw(format!(" {:>2}", rating.value())),
                        Span::styled(
                            format!("   category {}/{}", category, id.num_categories()),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Rate Features").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (text, style) = if self.form.is_submitting() {
            (report::SUBMITTING_LABEL.to_string(), Style::default().fg(Color::Yellow))
        } else {
            let line = report::format_result(self.form.prediction()).unwrap_or_default();
            (line, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        };
        let p = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Prediction").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let submit = if self.form.is_submitting() {
            report::SUBMITTING_LABEL
        } else {
            report::SUBMIT_LABEL
        };
        let help = format!("↑/↓ select  ←/→ adjust  1-9,0 set  Enter {submit}  r reset  d debug  q quit");
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Ten-cell slider track with the first `rating` cells filled.
fn slider_bar(rating: Rating) -> String {
    let filled = usize::from(rating.value());
    let empty = usize::from(RATING_MAX) - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::data::{PredictionCode, PredictionResult};
    use crate::domain::MappedInputs;

    /// Answers once the test releases the gate.
    struct GatedPredictor {
        gate: Mutex<Receiver<()>>,
        code: f64,
    }

    impl Predictor for GatedPredictor {
        fn predict(&self, _inputs: &MappedInputs) -> PredictionResult {
            let _ = self.gate.lock().unwrap().recv();
            PredictionResult::Predicted(PredictionCode(self.code))
        }
    }

    fn test_app(code: f64) -> (App, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let predictor = Arc::new(GatedPredictor {
            gate: Mutex::new(gate),
            code,
        });
        (App::new("http://localhost:1/predict".to_string(), predictor), release)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn wait_for_result(app: &mut App) {
        for _ in 0..500 {
            if app.poll_submission() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("submission never completed");
    }

    #[test]
    fn slider_bar_fills_up_to_rating() {
        assert_eq!(slider_bar(Rating::new(1).unwrap()), "[█░░░░░░░░░]");
        assert_eq!(slider_bar(Rating::DEFAULT), "[█████░░░░░]");
        assert_eq!(slider_bar(Rating::new(10).unwrap()), "[██████████]");
    }

    #[test]
    fn keys_move_selection_and_adjust_rating() {
        let (mut app, _release) = test_app(1.0);
        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.form.rating(FeatureId::IntelligenceLevel).value(), 6);

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Char('0')).unwrap();
        assert_eq!(app.form.rating(FeatureId::ArgumentType).value(), 10);

        app.handle_key(KeyCode::Up).unwrap();
        app.handle_key(KeyCode::Up).unwrap();
        assert_eq!(app.selected, 0);

        for _ in 0..20 {
            app.handle_key(KeyCode::Down).unwrap();
        }
        assert_eq!(app.selected, FeatureId::COUNT - 1);

        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn submit_shows_progress_then_verdict() {
        let (mut app, release) = test_app(1.0);
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.form.is_submitting());
        assert!(screen(&app).contains(report::SUBMITTING_LABEL));

        // Second Enter while in flight is refused.
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.status, "A prediction is already in progress.");

        // Sliders stay live.
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.form.rating(FeatureId::IntelligenceLevel).value(), 4);

        release.send(()).unwrap();
        wait_for_result(&mut app);

        assert!(!app.form.is_submitting());
        assert!(screen(&app).contains(report::POSITIVE_LABEL));
        assert_eq!(app.status, "prediction code 1");
    }

    #[test]
    fn result_area_empty_before_first_submit() {
        let (app, _release) = test_app(0.0);
        let text = screen(&app);
        assert!(!text.contains(report::POSITIVE_LABEL));
        assert!(!text.contains(report::NEGATIVE_LABEL));
        assert!(text.contains(report::TITLE));
    }
}
