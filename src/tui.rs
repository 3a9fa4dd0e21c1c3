use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::api::MatchService;
use crate::models::Candidate;
use crate::ranking::{self, Band, FilterState, ResultsView, SortSpec};
use crate::search::{NoticeKind, SearchController};

#[derive(PartialEq)]
enum InputMode {
    Normal,
    EditLocation,
    EditJobType,
    EditDescription,
}

struct AppState {
    controller: SearchController,
    filter: FilterState,
    sort: SortSpec,
    selected: usize,
    scroll_offset: u16,
    mode: InputMode,
    edit_buffer: String,
}

impl AppState {
    fn new(controller: SearchController) -> Self {
        Self {
            controller,
            filter: FilterState::default(),
            sort: SortSpec::default(),
            selected: 0,
            scroll_offset: 0,
            mode: InputMode::Normal,
            edit_buffer: String::new(),
        }
    }

    fn view(&self) -> ResultsView<'_> {
        ranking::build_view(self.controller.results(), &self.filter, self.sort)
    }

    fn row_count(&self) -> usize {
        self.view().rows().len()
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    fn next(&mut self) {
        let count = self.row_count();
        if count > 0 && self.selected < count - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn step_min_score(&mut self, delta: f64) {
        self.filter.min_score = (self.filter.min_score + delta).clamp(0.0, 1.0);
        // Avoid 0.30000000000000004-style filter values.
        self.filter.min_score = (self.filter.min_score * 10.0).round() / 10.0;
        self.clamp_selection();
    }

    fn step_max_rate(&mut self, delta: f64) {
        let next = self.filter.max_rate.unwrap_or(0.0) + delta;
        self.filter.max_rate = if next <= 0.0 { None } else { Some(next) };
        self.clamp_selection();
    }
}

/// Interactive results browser. The filter and sort state live as long as
/// this view and survive re-searches issued from inside it.
pub fn run_browse(controller: SearchController, service: &dyn MatchService) -> Result<()> {
    let mut state = AppState::new(controller);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, service);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    service: &dyn MatchService,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if state.mode != InputMode::Normal {
                match key.code {
                    KeyCode::Esc => {
                        state.mode = InputMode::Normal;
                        state.edit_buffer.clear();
                    }
                    KeyCode::Enter => {
                        let text = std::mem::take(&mut state.edit_buffer);
                        match state.mode {
                            InputMode::EditLocation => state.filter.location = text,
                            InputMode::EditJobType => state.filter.job_type = text,
                            InputMode::EditDescription => {
                                state.controller.description = text;
                                // Filters persist across consecutive searches.
                                state.controller.submit(service);
                            }
                            InputMode::Normal => {}
                        }
                        state.mode = InputMode::Normal;
                        state.clamp_selection();
                    }
                    KeyCode::Backspace => {
                        state.edit_buffer.pop();
                    }
                    KeyCode::Char(c) => state.edit_buffer.push(c),
                    _ => {}
                }
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('s') => {
                    state.sort.key = state.sort.key.cycle();
                }
                KeyCode::Char('o') => {
                    state.sort.order = state.sort.order.toggle();
                }
                KeyCode::Char('l') => {
                    state.mode = InputMode::EditLocation;
                    state.edit_buffer = state.filter.location.clone();
                }
                KeyCode::Char('t') => {
                    state.mode = InputMode::EditJobType;
                    state.edit_buffer = state.filter.job_type.clone();
                }
                KeyCode::Char('/') => {
                    state.mode = InputMode::EditDescription;
                    state.edit_buffer = state.controller.description.clone();
                }
                KeyCode::Char('+') | KeyCode::Char('=') => state.step_min_score(0.1),
                KeyCode::Char('-') => state.step_min_score(-0.1),
                KeyCode::Char(']') => state.step_max_rate(250.0),
                KeyCode::Char('[') => state.step_max_rate(-250.0),
                KeyCode::Char('x') => {
                    state.filter.exclude_rateless = !state.filter.exclude_rateless;
                    state.clamp_selection();
                }
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_summary(frame, state, outer[0]);

    let view = state.view();
    match &view {
        ResultsView::NoRecommendations => {
            let empty = Paragraph::new(
                "No recommendations yet. Press / to describe the role you're hiring for.",
            )
            .block(Block::default().borders(Borders::ALL).title(" Talent Matches "));
            frame.render_widget(empty, outer[1]);
        }
        ResultsView::NoFilterMatches => {
            let empty = Paragraph::new("No results match your current filters.")
                .block(Block::default().borders(Borders::ALL).title(" Talent Matches "));
            frame.render_widget(empty, outer[1]);
        }
        ResultsView::Ranked(rows) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(outer[1]);

            let items: Vec<ListItem> = rows
                .iter()
                .map(|row| {
                    let score = ranking::effective_score(row.candidate);
                    ListItem::new(format!(
                        "#{:<3} {:<24} {:>6.1}% {}",
                        row.rank,
                        truncate(&row.candidate.full_name(), 22),
                        score * 100.0,
                        Band::classify(score).label()
                    ))
                })
                .collect();

            let total = state.controller.results().len();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(format!(
                    " Candidates ({} of {}) | sort: {} {} ",
                    rows.len(),
                    total,
                    state.sort.key.label(),
                    state.sort.order.label()
                )))
                .highlight_style(
                    Style::default()
                        .bg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, chunks[0], list_state);

            let detail = rows
                .get(state.selected)
                .map(|row| build_detail(row.candidate))
                .unwrap_or_else(|| Text::raw("No candidate selected"));
            let detail_widget = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title(" Profile "))
                .wrap(Wrap { trim: false })
                .scroll((state.scroll_offset, 0));
            frame.render_widget(detail_widget, chunks[1]);
        }
    }

    draw_notice(frame, state, outer[2]);
    draw_footer(frame, state, outer[3]);
}

fn draw_summary(frame: &mut Frame, state: &AppState, area: Rect) {
    // Summary always reflects the full result set, not the filtered view.
    let mut line = match ranking::summarize(state.controller.results()) {
        Some(summary) => format!(
            " Matches: {}  Avg: {:.1}%  Excellent: {}  Good: {}  Fair: {}  Poor: {}",
            summary.total_matches,
            summary.average_score * 100.0,
            summary.excellent,
            summary.good,
            summary.fair,
            summary.poor
        ),
        None => " No matches yet".to_string(),
    };
    if state.filter.is_active() {
        line.push_str("  (filters active)");
    }
    frame.render_widget(
        Paragraph::new(line).style(Style::default().add_modifier(Modifier::BOLD)),
        area,
    );
}

fn draw_notice(frame: &mut Frame, state: &AppState, area: Rect) {
    if let Some(notice) = state.controller.notice() {
        let style = match notice.kind {
            NoticeKind::Success => Style::default().fg(Color::Green),
            NoticeKind::Error => Style::default().fg(Color::Red),
        };
        frame.render_widget(Paragraph::new(format!(" {}", notice.text)).style(style), area);
    }
}

fn draw_footer(frame: &mut Frame, state: &AppState, area: Rect) {
    let text = match state.mode {
        InputMode::EditLocation => format!(" location filter: {}_  (Enter apply, Esc cancel)", state.edit_buffer),
        InputMode::EditJobType => format!(" job type filter: {}_  (Enter apply, Esc cancel)", state.edit_buffer),
        InputMode::EditDescription => format!(" job description: {}_  (Enter search, Esc cancel)", state.edit_buffer),
        InputMode::Normal => {
            let rate = match state.filter.max_rate {
                Some(max) => format!("<=${}", max),
                None => "any".to_string(),
            };
            format!(
                " j/k:select J/K:scroll s:sort o:order /:search l:location t:type +/-:min score {:.1} [/]:rate {} x:rateless q:quit",
                state.filter.min_score, rate
            )
        }
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn build_detail(candidate: &Candidate) -> Text<'_> {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        candidate.full_name(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(candidate.display_location()));

    let score = ranking::effective_score(candidate);
    let band = Band::classify(score);
    let band_style = match band {
        Band::Excellent => Style::default().fg(Color::Green),
        Band::Good => Style::default().fg(Color::Blue),
        Band::Fair => Style::default().fg(Color::Yellow),
        Band::Poor => Style::default().fg(Color::Red),
    };
    lines.push(Line::from(Span::styled(
        format!("Match: {:.1}% ({})", score * 100.0, band.label()),
        band_style,
    )));

    lines.push(Line::from(candidate.display_rate()));
    let views = candidate.views_count();
    if views > 0.0 {
        lines.push(Line::from(format!("{} views by creators", views)));
    }
    lines.push(Line::from(""));

    if let Some(description) = candidate.profile_description.as_deref() {
        if !description.is_empty() {
            lines.push(Line::from(Span::styled(
                "Profile",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for line in textwrap::fill(description, 70).lines() {
                lines.push(Line::from(format!("  {}", line)));
            }
            lines.push(Line::from(""));
        }
    }

    let sections: [(&str, Vec<String>); 7] = [
        ("Job Types", candidate.job_types_list()),
        ("Skills", candidate.skills_list()),
        ("Software", candidate.software_list()),
        ("Content Verticals", candidate.content_verticals_list()),
        ("Creative Styles", candidate.creative_styles_list()),
        ("Platforms", candidate.platforms_list()),
        ("Past Creators", candidate.past_creators_list()),
    ];

    for (label, entries) in sections {
        if entries.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            label.to_string(),
            Style::default().fg(Color::Cyan),
        )));
        for line in textwrap::fill(&entries.join(", "), 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    Text::from(lines)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
