use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use house_price_client::{Control, EditableField, FormState, PredictionService};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

pub struct App {
    pub form: FormState,
    service: Box<dyn PredictionService>,
    pub sending: bool,
    pub payload_scroll: u16,
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Submit,
    Quit,
}

impl App {
    pub fn new(form: FormState, service: Box<dyn PredictionService>) -> Self {
        Self {
            form,
            service,
            sending: false,
            payload_scroll: 0,
        }
    }

    pub fn submit(&mut self) {
        self.form.submit(self.service.as_ref());
        self.sending = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab | KeyCode::Down => self.form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.form.focus_previous(),
            KeyCode::Left => self.form.step(-1),
            KeyCode::Right => self.form.step(1),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::PageDown => self.payload_scroll = self.payload_scroll.saturating_add(10),
            KeyCode::PageUp => self.payload_scroll = self.payload_scroll.saturating_sub(10),
            KeyCode::Enter => match self.form.focus() {
                Control::Predict => {
                    self.sending = true;
                    return Action::Submit;
                }
                Control::ShowPayload => self.form.toggle_payload(),
                _ => self.form.focus_next(),
            },
            KeyCode::Char(c) => self.form.input_char(c),
            _ => {}
        }

        Action::Continue
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                Action::Submit => {
                    // Show the pending state before blocking on the request
                    terminal.draw(|f| ui(f, app))?;
                    app.submit();
                }
                Action::Continue => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Min(0),    // Form + payload
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);

    if app.form.show_payload {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_form(f, content_chunks[0], app);
        render_payload(f, content_chunks[1], app);
    } else {
        render_form(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "House Price Prediction System",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Sends a prediction request to your running model deployment.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let header = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn control_block(app: &App, control: Control) -> Block<'static> {
    let focused = app.form.focus() == control;
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", control.title()))
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // URL
            Constraint::Length(3), // Field row 1
            Constraint::Length(3), // Field row 2
            Constraint::Length(3), // Field row 3
            Constraint::Length(3), // Checkbox + button
            Constraint::Min(0),    // Result
        ])
        .split(area);

    let cursor = if app.form.focus() == Control::Url { "▏" } else { "" };
    let url = Paragraph::new(format!("{}{}", app.form.url, cursor))
        .block(control_block(app, Control::Url));
    f.render_widget(url, rows[0]);

    // Two columns, same split as the housing sheet: lot/quality/year | area/garage/basement
    let fields = EditableField::ALL;
    let (left, right) = fields.split_at(3);
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[i + 1]);
        render_field(f, cols[0], app, *l);
        render_field(f, cols[1], app, *r);
    }

    let actions = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[4]);
    render_checkbox(f, actions[0], app);
    render_button(f, actions[1], app);

    render_result(f, rows[5], app);
}

fn render_field(f: &mut Frame, area: Rect, app: &App, field: EditableField) {
    let control = Control::Field(field);
    let block = control_block(app, control);

    if let Some((min, max)) = field.range() {
        let value = app.form.inputs().get(field);
        let ratio = (value - min) as f64 / (max - min) as f64;
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{} / {}", value, max));
        f.render_widget(gauge, area);
    } else {
        let focused = app.form.focus() == control;
        let text = if focused {
            format!("{}▏", app.form.field_text(field))
        } else {
            app.form.field_text(field)
        };
        f.render_widget(Paragraph::new(text).block(block), area);
    }
}

fn render_checkbox(f: &mut Frame, area: Rect, app: &App) {
    let mark = if app.form.show_payload { "[x]" } else { "[ ]" };
    let checkbox = Paragraph::new(format!("{} raw JSON", mark))
        .block(control_block(app, Control::ShowPayload));
    f.render_widget(checkbox, area);
}

fn render_button(f: &mut Frame, area: Rect, app: &App) {
    let style = if app.form.focus() == Control::Predict {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let label = if app.sending { "  Sending...  " } else { "  ▶ Predict  " };
    let button = Paragraph::new(Line::from(Span::styled(label, style)))
        .block(control_block(app, Control::Predict));
    f.render_widget(button, area);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![];

    match app.form.last_outcome() {
        None => lines.push(Line::from(Span::styled(
            "Fill in the features and press Predict.",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(outcome) => {
            let stamp = outcome.completed_at.format("%H:%M:%S").to_string();
            match &outcome.result {
                Ok(prediction) => {
                    lines.push(Line::from(Span::styled(
                        "Prediction Successful!",
                        Style::default().fg(Color::Green),
                    )));
                    lines.push(Line::from(""));
                    let label = if prediction.price().is_some() {
                        "Predicted House Price: "
                    } else {
                        "Response: "
                    };
                    lines.push(Line::from(vec![
                        Span::raw(label),
                        Span::styled(
                            prediction.display(),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]));
                }
                Err(e) => {
                    for (i, text) in e.to_string().lines().enumerate() {
                        let style = if i == 0 {
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(Color::Red)
                        };
                        lines.push(Line::from(Span::styled(text.to_string(), style)));
                    }
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("at {}", stamp),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let result = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Result "));
    f.render_widget(result, area);
}

fn render_payload(f: &mut Frame, area: Rect, app: &App) {
    let payload = Paragraph::new(app.form.payload_json())
        .scroll((app.payload_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Raw JSON Payload "),
        );
    f.render_widget(payload, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let status_spans = vec![
        Span::styled(" Tab/↓", key),
        Span::raw(" Next | "),
        Span::styled("Shift+Tab/↑", key),
        Span::raw(" Prev | "),
        Span::styled("←/→", key),
        Span::raw(" Step | "),
        Span::styled("Enter", key),
        Span::raw(" Activate | "),
        Span::styled("PgUp/PgDn", key),
        Span::raw(" Scroll JSON | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}
