//! Terminal UI for the signup wizard.
//!
//! Layout:
//! - Centered window titled "Club Signup"
//! - Header ("Welcome to the Club") and a progress gauge
//! - The active stage with its fields and inline error messages
//! - Bottom button row: [ Back ] [ Next ] [ Cancel ]
//! - Modal confirmation for Cancel and for submission failures
//!
//! Logging is file-only while the TUI runs so the terminal is not corrupted.

mod input;

use crate::models::settings::ThemeSettings;
use crate::models::values::{FieldKind, FieldName};
use crate::wizard::sink::{SubmissionReceipt, SubmissionSink};
use crate::wizard::validation::RuleSet;
use crate::wizard::view::{StageView, HEADLINE, TAGLINE};
use crate::wizard::{Phase, Transition, Wizard, WizardError};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use input::TextInput;
use log::{error, info};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::Terminal;
use std::collections::BTreeMap;
use std::io::{self, Stdout};
use std::time::Duration;

const WINDOW_WIDTH: u16 = 72;
const WINDOW_HEIGHT: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel { confirm_selected: bool },
    Message { title: String, body: String },
}

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    highlight: Color,
    disabled: Color,
    error: Color,
}

impl Theme {
    fn from_settings(t: &ThemeSettings) -> Self {
        Self {
            accent: parse_color(&t.accent, Color::Green),
            highlight: parse_color(&t.highlight, Color::Yellow),
            disabled: parse_color(&t.disabled, Color::DarkGray),
            error: parse_color(&t.error, Color::Red),
        }
    }
}

fn parse_color(name: &str, fallback: Color) -> Color {
    name.trim().parse::<Color>().unwrap_or(fallback)
}

struct App<S: SubmissionSink> {
    wizard: Wizard<S>,
    inputs: BTreeMap<FieldName, TextInput>,
    focus: FocusTarget,
    modal: Option<Modal>,
    theme: Theme,
    quit: bool,
}

impl<S: SubmissionSink> App<S> {
    fn new(rules: RuleSet, sink: S, theme: &ThemeSettings) -> Self {
        let inputs = FieldName::ALL
            .into_iter()
            .filter(|f| f.kind() == FieldKind::Text)
            .map(|f| (f, TextInput::new("")))
            .collect();
        Self {
            wizard: Wizard::new(rules, sink),
            inputs,
            focus: FocusTarget::Field(0),
            modal: None,
            theme: Theme::from_settings(theme),
            quit: false,
        }
    }

    fn active_fields(&self) -> &'static [FieldName] {
        match self.wizard.phase() {
            Phase::Step(step) => step.fields(),
            Phase::Done => &[],
        }
    }

    fn focused_field(&self) -> Option<FieldName> {
        match self.focus {
            FocusTarget::Field(i) => self.active_fields().get(i).copied(),
            FocusTarget::Button(_) => None,
        }
    }

    /// Focus ring: the active stage's fields, then Back, Next, Cancel.
    fn focus_ring(&self) -> Vec<FocusTarget> {
        let mut ring: Vec<FocusTarget> = (0..self.active_fields().len())
            .map(FocusTarget::Field)
            .collect();
        ring.extend([
            FocusTarget::Button(ButtonFocus::Back),
            FocusTarget::Button(ButtonFocus::Next),
            FocusTarget::Button(ButtonFocus::Cancel),
        ]);
        ring
    }

    fn move_focus(&mut self, forward: bool) {
        let ring = self.focus_ring();
        let pos = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % ring.len()
        } else {
            (pos + ring.len() - 1) % ring.len()
        };
        self.focus = ring[next];
    }

    fn set_text(&mut self, field: FieldName, value: String) {
        if let Err(e) = self.wizard.set_field(field, value) {
            error!("[PHASE: tui] [STEP: set_field] {}", e);
        }
    }

    fn toggle(&mut self, field: FieldName) {
        if let Err(e) = self.wizard.toggle(field) {
            error!("[PHASE: tui] [STEP: toggle] {}", e);
        }
    }

    fn go_next(&mut self) {
        match self.wizard.advance() {
            Ok(Transition::Moved { .. }) => {
                self.focus = FocusTarget::Field(0);
            }
            Ok(Transition::Completed(receipt)) => {
                info!(
                    "[PHASE: tui] [STEP: complete] Signup finished (submission_id={})",
                    receipt.submission_id
                );
                self.focus = FocusTarget::Button(ButtonFocus::Next);
            }
            Err(WizardError::StepInvalid { fields, .. }) => {
                // Errors are now visible; put the cursor on the first offending field.
                let first = fields.first().and_then(|f| {
                    self.active_fields().iter().position(|a| a == f)
                });
                if let Some(i) = first {
                    self.focus = FocusTarget::Field(i);
                }
            }
            Err(e @ WizardError::Submission(_)) => {
                self.modal = Some(Modal::Message {
                    title: "Submission failed".to_string(),
                    body: e.to_string(),
                });
            }
            Err(e) => {
                info!("[PHASE: tui] [STEP: next] Ignored: {}", e);
            }
        }
    }

    fn go_back(&mut self) {
        match self.wizard.retreat() {
            Ok(_) => self.focus = FocusTarget::Field(0),
            Err(e) => info!("[PHASE: tui] [STEP: back] Ignored: {}", e),
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        if let Some(modal) = self.modal.clone() {
            self.handle_modal_key(modal, code);
            return;
        }

        if self.wizard.phase() == Phase::Done {
            if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                self.quit = true;
            }
            return;
        }

        match code {
            KeyCode::Esc => {
                self.modal = Some(Modal::ConfirmCancel {
                    confirm_selected: false,
                });
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                return;
            }
            _ => {}
        }

        match self.focus {
            FocusTarget::Field(i) => {
                let Some(field) = self.focused_field() else {
                    self.focus = FocusTarget::Field(0);
                    return;
                };
                match (field.kind(), code) {
                    (_, KeyCode::Enter) => {
                        // Last field of the stage: Enter finishes the section.
                        if i + 1 < self.active_fields().len() {
                            self.focus = FocusTarget::Field(i + 1);
                        } else {
                            self.go_next();
                        }
                    }
                    (FieldKind::Checkbox, KeyCode::Char(' ')) => self.toggle(field),
                    (FieldKind::Text, code) => {
                        let changed = match self.inputs.get_mut(&field) {
                            Some(input) => input.handle_key(code).then(|| input.value.clone()),
                            None => None,
                        };
                        if let Some(value) = changed {
                            self.set_text(field, value);
                        }
                    }
                    _ => {}
                }
            }
            FocusTarget::Button(b) => match code {
                KeyCode::Left => {
                    self.focus = FocusTarget::Button(match b {
                        ButtonFocus::Back => ButtonFocus::Back,
                        ButtonFocus::Next => ButtonFocus::Back,
                        ButtonFocus::Cancel => ButtonFocus::Next,
                    })
                }
                KeyCode::Right => {
                    self.focus = FocusTarget::Button(match b {
                        ButtonFocus::Back => ButtonFocus::Next,
                        ButtonFocus::Next => ButtonFocus::Cancel,
                        ButtonFocus::Cancel => ButtonFocus::Cancel,
                    })
                }
                KeyCode::Enter | KeyCode::Char(' ') => match b {
                    ButtonFocus::Back => {
                        if self.wizard.can_retreat() {
                            self.go_back();
                        }
                    }
                    ButtonFocus::Next => self.go_next(),
                    ButtonFocus::Cancel => {
                        self.modal = Some(Modal::ConfirmCancel {
                            confirm_selected: false,
                        })
                    }
                },
                _ => {}
            },
        }
    }

    fn handle_modal_key(&mut self, modal: Modal, code: KeyCode) {
        match modal {
            Modal::ConfirmCancel { confirm_selected } => match code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                    self.modal = Some(Modal::ConfirmCancel {
                        confirm_selected: !confirm_selected,
                    });
                }
                KeyCode::Enter => {
                    self.modal = None;
                    if confirm_selected {
                        info!("[PHASE: tui] [STEP: cancel] Signup cancelled by user");
                        self.quit = true;
                    }
                }
                KeyCode::Esc => self.modal = None,
                _ => {}
            },
            Modal::Message { .. } => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                    self.modal = None;
                }
            }
        }
    }
}

/// Run the interactive wizard. Returns the receipt when the user completed the signup.
pub fn run<S: SubmissionSink>(
    rules: RuleSet,
    sink: S,
    theme: &ThemeSettings,
) -> Result<Option<SubmissionReceipt>> {
    info!("[PHASE: tui] [STEP: start] Starting signup wizard");

    let mut terminal = setup_terminal()?;
    let mut app = App::new(rules, sink, theme);
    let result = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    result?;

    let receipt = app.wizard.receipt().cloned();
    match &receipt {
        Some(r) => info!(
            "[PHASE: tui] [STEP: exit] Exiting after submission {}",
            r.submission_id
        ),
        None => info!("[PHASE: tui] [STEP: exit] Exiting without submission"),
    }
    Ok(receipt)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop<S: SubmissionSink>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    while !app.quit {
        terminal.draw(|f| draw(f.size(), f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }
    }

    Ok(())
}

/// Non-interactive smoke mode: render a single frame of a seeded state and return its lines.
/// Targets: personal|errors|billing|legal|done
pub fn smoke<S: SubmissionSink>(
    target: &str,
    rules: RuleSet,
    sink: S,
    theme: &ThemeSettings,
) -> Result<Vec<String>> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let mut app = App::new(rules, sink, theme);
    seed_smoke_state(&mut app, target.trim().to_ascii_lowercase().as_str())?;

    // In-memory backend: no raw mode or alternate screen.
    let backend = TestBackend::new(WINDOW_WIDTH + 4, WINDOW_HEIGHT + 2);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &app))?;

    Ok(buffer_lines(terminal.backend()))
}

fn seed_smoke_state<S: SubmissionSink>(app: &mut App<S>, target: &str) -> Result<()> {
    let fill = |app: &mut App<S>, field: FieldName, value: &str| -> Result<()> {
        if let Some(input) = app.inputs.get_mut(&field) {
            input.set(value);
        }
        app.wizard.set_field(field, value)?;
        Ok(())
    };

    match target {
        "personal" | "welcome" => {}
        "errors" => fill(app, FieldName::Username, "ab")?,
        "billing" | "legal" | "done" => {
            fill(app, FieldName::Username, "member")?;
            app.wizard.advance()?;
            if target != "billing" {
                fill(app, FieldName::Address, "1 Main St")?;
                app.wizard.advance()?;
                app.wizard.set_field(FieldName::Toc, true)?;
                if target == "done" {
                    app.wizard.set_field(FieldName::Pp, true)?;
                    app.wizard.advance()?;
                }
            }
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unknown smoke target '{}' (expected personal|errors|billing|legal|done)",
                other
            ))
        }
    }
    app.focus = FocusTarget::Button(ButtonFocus::Next);
    Ok(())
}

fn buffer_lines(backend: &TestBackend) -> Vec<String> {
    let buffer = backend.buffer();
    let width = buffer.area.width.max(1) as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|c| c.symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

fn draw<S: SubmissionSink>(area: Rect, f: &mut ratatui::Frame<'_>, app: &App<S>) {
    let view = StageView::from_wizard(&app.wizard);
    let window = centered_rect(area, WINDOW_WIDTH, WINDOW_HEIGHT);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title("Club Signup")
        .border_style(Style::default().fg(app.theme.accent));
    f.render_widget(outer, window);

    let inner = window.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 2,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(inner);

    // Header
    let (before, club) = HEADLINE.split_at(HEADLINE.len() - "the Club".len());
    let header = Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled(before, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                club,
                Style::default()
                    .fg(app.theme.highlight)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(TAGLINE, Style::default().fg(app.theme.accent))),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(header, rows[0]);

    // Progress
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(app.theme.accent))
        .percent(view.progress_percent.min(100))
        .label(view.step_label.clone());
    f.render_widget(gauge, rows[1]);

    // Stage body
    let body_block = Block::default().borders(Borders::ALL).title(view.title);
    let body_text = match &view.done {
        Some(done) => Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                done.heading.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(done.body.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to exit.",
                Style::default().fg(app.theme.disabled),
            )),
        ]),
        None => stage_text(&view, app),
    };
    let body = Paragraph::new(body_text)
        .block(body_block)
        .wrap(Wrap { trim: false });
    f.render_widget(body, rows[2]);

    if view.done.is_none() {
        draw_buttons(f, rows[3], &view, app);
    }

    match &app.modal {
        Some(Modal::ConfirmCancel { confirm_selected }) => {
            draw_cancel_modal(f, window, *confirm_selected)
        }
        Some(Modal::Message { title, body }) => draw_message_modal(f, window, title, body),
        None => {}
    }
}

fn stage_text<S: SubmissionSink>(view: &StageView, app: &App<S>) -> Text<'static> {
    let mut lines = vec![Line::from("")];
    for (i, field) in view.fields.iter().enumerate() {
        let focused = app.focus == FocusTarget::Field(i);
        let marker = if focused { "> " } else { "  " };
        match field.kind {
            FieldKind::Text => {
                lines.push(Line::from(format!("{}{}", marker, field.label)));
                let shown = app
                    .inputs
                    .get(&field.name)
                    .map(|input| input.display(focused))
                    .unwrap_or_else(|| field.display_value.clone());
                let style = if focused {
                    Style::default().fg(app.theme.accent)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(format!("  [ {} ]", shown), style)));
            }
            FieldKind::Checkbox => {
                let mark = if field.checked { "[x]" } else { "[ ]" };
                let style = if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{} {}", mark, field.label), style),
                ]));
            }
        }
        if let Some(err) = &field.error {
            lines.push(Line::from(Span::styled(
                format!("  {}", err),
                Style::default().fg(app.theme.error),
            )));
        }
        lines.push(Line::from(""));
    }

    let hint = if view.fields.iter().any(|f| f.kind == FieldKind::Checkbox) {
        "Space toggles a checkbox. Tab moves focus. Esc cancels."
    } else {
        "Type to edit. Enter finishes the section. Esc cancels."
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(app.theme.disabled),
    )));
    Text::from(lines)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn draw_buttons<S: SubmissionSink>(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &StageView,
    app: &App<S>,
) {
    let focused = |b: ButtonFocus| app.focus == FocusTarget::Button(b);
    let line = Line::from(vec![
        button_text("Back", focused(ButtonFocus::Back), view.back_enabled, &app.theme),
        Span::raw(" "),
        button_text(
            view.next_label,
            focused(ButtonFocus::Next),
            view.next_enabled,
            &app.theme,
        ),
        Span::raw(" "),
        button_text("Cancel", focused(ButtonFocus::Cancel), true, &app.theme),
    ]);
    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn button_text(label: &str, focused: bool, enabled: bool, theme: &Theme) -> Span<'static> {
    let mut style = Style::default();
    if enabled {
        style = style.fg(theme.accent);
    } else {
        style = style.fg(theme.disabled);
    }
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn modal_area(window: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(window.width.saturating_sub(4)).max(20);
    let h = height.min(window.height.saturating_sub(2)).max(5);
    centered_rect(window, w, h)
}

fn draw_cancel_modal(f: &mut ratatui::Frame<'_>, window: Rect, confirm_selected: bool) {
    let area = modal_area(window, 52, 7);
    f.render_widget(Clear, area);

    let block = Block::default().borders(Borders::ALL).title("Cancel Signup?");
    let body = Paragraph::new(Text::from(vec![
        Line::from("Your entries will be discarded."),
        Line::from(""),
        Line::from(""),
    ]))
    .block(block)
    .wrap(Wrap { trim: false });
    f.render_widget(body, area);

    let buttons_area = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    };
    let styled = |selected: bool| {
        if selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        }
    };
    let line = Line::from(vec![
        Span::styled("[ Yes, cancel ]", styled(confirm_selected)),
        Span::raw(" "),
        Span::styled("[ No ]", styled(!confirm_selected)),
    ]);
    f.render_widget(
        Paragraph::new(Text::from(line)).alignment(Alignment::Right),
        buttons_area,
    );
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window: Rect, title: &str, body: &str) {
    let area = modal_area(window, 60, 8);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string());
    let p = Paragraph::new(Text::from(vec![
        Line::from(body.to_string()),
        Line::from(""),
        Line::from("Press Enter to continue."),
    ]))
    .block(block)
    .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::values::SignupValues;
    use crate::wizard::sink::MemorySink;
    use crate::wizard::Step;

    fn app() -> App<MemorySink> {
        App::new(
            RuleSet::default(),
            MemorySink::default(),
            &ThemeSettings::default(),
        )
    }

    fn press(app: &mut App<MemorySink>, code: KeyCode) {
        app.handle_key(code, KeyModifiers::NONE);
    }

    fn type_str(app: &mut App<MemorySink>, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_updates_wizard_values() {
        let mut app = app();
        type_str(&mut app, "ab");
        assert_eq!(app.wizard.values().username, "ab");
        assert!(app.wizard.visible_error(FieldName::Username).is_some());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.phase(), Phase::Step(Step::Personal));

        type_str(&mut app, "c");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.phase(), Phase::Step(Step::Billing));
        assert_eq!(app.focus, FocusTarget::Field(0));
    }

    #[test]
    fn enter_on_invalid_stage_reveals_errors() {
        let mut app = app();
        assert!(app.wizard.visible_error(FieldName::Username).is_none());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.state().current_step(), 0);
        assert!(app.wizard.visible_error(FieldName::Username).is_some());
    }

    #[test]
    fn enter_on_disabled_next_button_is_rejected_but_shows_errors() {
        let mut app = app();
        app.focus = FocusTarget::Button(ButtonFocus::Next);
        assert!(!app.wizard.can_advance());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.state().current_step(), 0);
        assert_eq!(app.wizard.values(), &SignupValues::default());
        assert!(app.wizard.visible_error(FieldName::Username).is_some());
        assert_eq!(app.focus, FocusTarget::Field(0));
        assert!(app.modal.is_none());
    }

    #[test]
    fn enter_on_disabled_back_button_is_ignored() {
        let mut app = app();
        app.focus = FocusTarget::Button(ButtonFocus::Back);
        assert!(!app.wizard.can_retreat());

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.state().current_step(), 0);
        assert_eq!(app.focus, FocusTarget::Button(ButtonFocus::Back));
        assert!(app.wizard.visible_error(FieldName::Username).is_none());
    }

    #[test]
    fn full_keyboard_run_submits_payload() {
        let mut app = app();
        type_str(&mut app, "abc");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "1 Main St");
        press(&mut app, KeyCode::Enter);

        // Legal stage: toggle both boxes, then finish from the last one.
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.wizard.phase(), Phase::Done);
        assert_eq!(
            app.wizard.sink().submissions,
            vec![SignupValues {
                username: "abc".to_string(),
                address: "1 Main St".to_string(),
                toc: true,
                pp: true,
            }]
        );

        press(&mut app, KeyCode::Char('x'));
        assert!(!app.quit);
        press(&mut app, KeyCode::Enter);
        assert!(app.quit);
    }

    #[test]
    fn back_button_keeps_typed_text() {
        let mut app = app();
        type_str(&mut app, "abc");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "Elm");

        app.focus = FocusTarget::Button(ButtonFocus::Back);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.phase(), Phase::Step(Step::Personal));
        assert_eq!(app.inputs[&FieldName::Username].value, "abc");
        assert_eq!(app.wizard.values().address, "Elm");
    }

    #[test]
    fn cancel_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.modal, Some(Modal::ConfirmCancel { .. })));
        press(&mut app, KeyCode::Enter);
        assert!(app.modal.is_none());
        assert!(!app.quit);

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        assert!(app.quit);
    }

    #[test]
    fn focus_ring_wraps() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, FocusTarget::Button(ButtonFocus::Back));
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, FocusTarget::Button(ButtonFocus::Cancel));
    }

    fn smoke_default(target: &str) -> Vec<String> {
        smoke(
            target,
            RuleSet::default(),
            MemorySink::default(),
            &ThemeSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn smoke_renders_stage_and_buttons() {
        let lines = smoke_default("personal");
        let screen = lines.join("\n");
        assert!(screen.contains("Club Signup"));
        assert!(screen.contains("Welcome to the Club"));
        assert!(screen.contains("Personal Information"));
        assert!(screen.contains("Step 1 of 3"));
        assert!(screen.contains("[ Next ]"));
    }

    #[test]
    fn smoke_shows_inline_error() {
        let lines = smoke_default("errors");
        assert!(lines.iter().any(|l| l.contains("Minimum length 3")));
    }

    #[test]
    fn smoke_uses_configured_min_length() {
        let lines = smoke(
            "errors",
            RuleSet::new(5),
            MemorySink::default(),
            &ThemeSettings::default(),
        )
        .unwrap();
        assert!(lines.iter().any(|l| l.contains("Minimum length 5")));
        assert!(!lines.iter().any(|l| l.contains("Minimum length 3")));
    }

    #[test]
    fn smoke_legal_uses_create_account() {
        let lines = smoke_default("legal");
        let screen = lines.join("\n");
        assert!(screen.contains("Legal Information"));
        assert!(screen.contains("[ Create Account ]"));
        assert!(screen.contains("[x] I accept the Terms and Conditions."));
        assert!(screen.contains("[ ] I accept the Privacy Policy."));
    }

    #[test]
    fn smoke_done_shows_thank_you() {
        let lines = smoke_default("done");
        let screen = lines.join("\n");
        assert!(screen.contains("Thank you for joining, member!"));
    }

    #[test]
    fn smoke_rejects_unknown_target() {
        assert!(smoke(
            "mapping",
            RuleSet::default(),
            MemorySink::default(),
            &ThemeSettings::default()
        )
        .is_err());
    }

    #[test]
    fn theme_colors_parse_with_fallback() {
        assert_eq!(parse_color("blue", Color::Green), Color::Blue);
        assert_eq!(parse_color("not-a-color", Color::Green), Color::Green);
    }
}
