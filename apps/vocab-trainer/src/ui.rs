//! UI rendering for vocab trainer.

use crate::app::{App, MenuEntry, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};
use vocab_core::{Game, GameSession};

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.view {
        View::Menu => draw_menu(f, app),
        View::Quiz => draw_quiz(f, app),
        View::Flashcard => draw_flashcard(f, app),
        View::Stats => draw_stats(f, app),
        View::LoadError => draw_load_error(f, app),
    }

    if app.show_help {
        draw_help(f);
    }

    if let Some(msg) = &app.message {
        draw_message(f, msg);
    }
}

fn screen(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(area)
}

fn draw_header(f: &mut Frame, area: Rect, text: String) {
    let header = Paragraph::new(text)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_footer(f: &mut Frame, area: Rect, keys: &str) {
    let footer = Paragraph::new(keys.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_menu(f: &mut Frame, app: &App) {
    let chunks = screen(f.area());
    draw_header(f, chunks[0], "Vocab Trainer".to_string());

    let items: Vec<ListItem> = MenuEntry::ALL
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if i == app.selected_menu {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}. {}", i + 1, entry.label())).style(style)
        })
        .collect();

    let words = app.catalog.as_ref().map_or(0, |c| c.len());
    let title = format!(" {} words | streak {} ", words, app.stats.streak_days);
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, chunks[1]);

    draw_footer(f, chunks[2], "j/k:Navigate  Enter:Open  1-3:Jump  ?:Help  q:Quit");
}

fn draw_quiz(f: &mut Frame, app: &App) {
    let chunks = screen(f.area());
    let Some(game) = &app.game else {
        return;
    };
    let state = game.state();

    if state.is_complete() {
        draw_header(f, chunks[0], "Quiz complete".to_string());
        draw_summary(f, chunks[1], game, app.last_session.as_ref());
        draw_footer(f, chunks[2], "Enter/r:Play again  Esc:Menu");
        return;
    }

    draw_header(
        f,
        chunks[0],
        format!(
            "Question {} of {} | Score: {}",
            state.current_index() + 1,
            state.total_questions(),
            state.score()
        ),
    );

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(8), Constraint::Min(0)])
        .split(chunks[1]);

    let Some(question) = game.question() else {
        return;
    };
    let prompt = Paragraph::new(question.prompt())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Fill in the blank "));
    f.render_widget(prompt, body[0]);

    let feedback = game.feedback();
    let options: Vec<ListItem> = question
        .options()
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = match feedback {
                Some(fb) if *option == fb.correct_word => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                Some(fb) if *option == fb.selected => Style::default().fg(Color::Red),
                Some(_) => Style::default().fg(Color::DarkGray),
                None => Style::default(),
            };
            ListItem::new(format!("{}. {}", i + 1, option)).style(style)
        })
        .collect();
    f.render_widget(
        List::new(options).block(Block::default().borders(Borders::ALL).title(" Options ")),
        body[1],
    );

    if let Some(fb) = feedback {
        let (verdict, color) = if fb.is_correct {
            ("Correct!", Color::Green)
        } else {
            ("Not quite.", Color::Red)
        };
        let mut lines = vec![Line::from(Span::styled(
            verdict,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        if let Some(why) = &fb.incorrect_explanation {
            lines.push(Line::from(format!("{}: {}", fb.selected, why)));
        }
        lines.push(Line::from(format!("{}: {}", fb.correct_word, fb.correct_explanation)));
        let explanation = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Explanation "));
        f.render_widget(explanation, body[2]);
    }

    let keys = if game.is_answered() {
        "Enter:Next  p:Pronounce  f:Finish  r:Restart  Esc:Menu"
    } else {
        "1-9:Answer  f:Finish  r:Restart  Esc:Menu"
    };
    draw_footer(f, chunks[2], keys);
}

fn draw_flashcard(f: &mut Frame, app: &App) {
    let chunks = screen(f.area());
    let Some(game) = &app.game else {
        return;
    };
    let state = game.state();

    if state.is_complete() {
        draw_header(f, chunks[0], "Flashcards complete".to_string());
        draw_summary(f, chunks[1], game, app.last_session.as_ref());
        draw_footer(f, chunks[2], "Enter/r:Start over  Esc:Menu");
        return;
    }

    let progress = game.progress();
    draw_header(
        f,
        chunks[0],
        format!(
            "Card {} of {} | Known: {} of {} reviewed",
            state.current_index() + 1,
            state.total_questions(),
            progress.known(),
            progress.reviewed()
        ),
    );

    let item = game.current_item();
    let mut lines = vec![
        Line::from(Span::styled(
            item.word.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            item.pronunciation_guide.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(format!("{} | {}", item.difficulty.name(), item.category)),
    ];
    if game.is_flipped() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            item.translation.as_str(),
            Style::default().fg(Color::Green),
        )));
        lines.push(Line::from(item.definition.as_str()));
        if let Some(example) = &item.example {
            lines.push(Line::from(Span::styled(
                format!("\"{}\"", example),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
    }
    if let Some(record) = progress.get(&item.id) {
        let mark = if record.is_known { "known" } else { "still learning" };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Marked {} ({} reviews)", mark, record.review_count),
            Style::default().fg(Color::Yellow),
        )));
    }

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(if game.is_flipped() { " Back " } else { " Front " }));
    f.render_widget(card, chunks[1]);

    draw_footer(
        f,
        chunks[2],
        "Space:Flip  y:Know it  u:Still learning  Enter:Next  p:Pronounce  f:Finish  Esc:Menu",
    );
}

fn draw_summary(f: &mut Frame, area: Rect, game: &Game, session: Option<&GameSession>) {
    let state = game.state();
    let answered = state.answered_indices().len();
    let accuracy = if answered == 0 {
        0.0
    } else {
        state.correct_answers() as f64 / answered as f64 * 100.0
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Score: {}", state.score()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("Correct: {} of {} answered ({:.0}%)", state.correct_answers(), answered, accuracy)),
    ];
    if let Some(session) = session {
        lines.push(Line::from(format!("Time: {:.0}s", session.duration_secs())));
    }
    let summary = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(summary, area);
}

fn draw_stats(f: &mut Frame, app: &App) {
    let chunks = screen(f.area());
    draw_header(f, chunks[0], "Statistics".to_string());

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(0)])
        .split(chunks[1]);

    let stats = &app.stats;
    let rows = vec![
        Row::new(vec!["Games played".to_string(), stats.total_games_played.to_string()]),
        Row::new(vec!["Total score".to_string(), stats.total_score.to_string()]),
        Row::new(vec!["Average score".to_string(), format!("{:.1}", stats.average_score())]),
        Row::new(vec!["Quiz questions".to_string(), stats.quiz_stats.total_questions.to_string()]),
        Row::new(vec!["Quiz accuracy".to_string(), format!("{:.0}%", stats.quiz_stats.accuracy())]),
        Row::new(vec![
            "Time per question".to_string(),
            format!("{:.1}s", stats.quiz_stats.average_time_per_question),
        ]),
        Row::new(vec![
            "Cards known".to_string(),
            format!(
                "{} of {} ({:.0}%)",
                stats.flashcard_stats.known_cards,
                stats.flashcard_stats.total_cards,
                stats.flashcard_stats.mastery_percentage()
            ),
        ]),
        Row::new(vec!["Streak".to_string(), format!("{} days", stats.streak_days)]),
    ];
    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .block(Block::default().borders(Borders::ALL).title(" Totals "));
    f.render_widget(table, body[0]);

    let sessions: Vec<Row> = app
        .recent_sessions
        .iter()
        .map(|s| {
            Row::new(vec![
                s.end_time.format("%Y-%m-%d %H:%M").to_string(),
                s.game_type.name().to_string(),
                s.score.to_string(),
                format!("{}/{}", s.correct_answers, s.answered_questions),
            ])
        })
        .collect();
    let table = Table::new(
        sessions,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ],
    )
    .header(Row::new(vec!["Finished", "Game", "Score", "Correct"]).style(Style::default().add_modifier(Modifier::BOLD)))
    .block(Block::default().borders(Borders::ALL).title(" Recent sessions "));
    f.render_widget(table, body[1]);

    draw_footer(f, chunks[2], "q:Back  ?:Help");
}

fn draw_load_error(f: &mut Frame, app: &App) {
    let chunks = screen(f.area());
    draw_header(f, chunks[0], "Vocab Trainer".to_string());

    let reason = app.load_error.as_deref().unwrap_or("Unknown error");
    let lines = vec![
        Line::from(Span::styled(
            "Could not load the vocabulary catalog.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(reason.to_string()),
    ];
    let error = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(error, chunks[1]);

    draw_footer(f, chunks[2], "r:Retry  q:Quit");
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help = r#"
Vocab Trainer Keybindings

Menu:
  j/k, Up/Down    Navigate
  Enter, Space    Open
  1 / 2 / 3       Quiz / Flashcards / Statistics
  q               Quit

Quiz:
  1-9             Choose an option
  Enter, n        Next question
  p               Pronounce the word
  f               Finish session
  r               Restart

Flashcards:
  Space           Flip card
  y / u           Know it / Still learning
  Enter, n        Next card
  p               Pronounce the word

General:
  Esc             Back to menu
  ?               Show this help

Press any key to close
"#;

    let popup = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn draw_message(f: &mut Frame, msg: &str) {
    let area = Rect::new(
        f.area().x + 2,
        f.area().height.saturating_sub(5),
        f.area().width.saturating_sub(4),
        3,
    );
    f.render_widget(Clear, area);

    let message = Paragraph::new(msg)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};
    use vocab_core::{GameType, MemoryStorage, SilentSpeaker};

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    /// The shipped catalog, pinned so a catalog in the host's data directory is ignored.
    fn app() -> App {
        let mut config = Config::default();
        config.catalog.path = Some(concat!(env!("CARGO_MANIFEST_DIR"), "/data/vocabulary.json").into());
        App::with_storage(config, MemoryStorage::shared(), Box::new(SilentSpeaker))
    }

    #[test]
    fn test_menu_renders() {
        let mut app = app();
        let screen = render(&mut app);
        assert!(screen.contains("Sentence quiz"));
        assert!(screen.contains("Statistics"));
    }

    #[test]
    fn test_quiz_renders_progress() {
        let mut app = app();
        app.start_game(GameType::Quiz);
        let total = app.catalog.as_ref().unwrap().len();
        let screen = render(&mut app);
        assert!(screen.contains(&format!("Question 1 of {}", total)));
        assert!(screen.contains("Fill in the blank"));
    }

    #[test]
    fn test_flashcard_and_stats_render() {
        let mut app = app();
        app.start_game(GameType::Flashcard);
        let word = app.game.as_ref().unwrap().current_item().word.clone();
        assert!(render(&mut app).contains(&word));

        app.view = View::Stats;
        assert!(render(&mut app).contains("Games played"));
    }

    #[test]
    fn test_load_error_renders() {
        let mut app = app();
        app.view = View::LoadError;
        app.load_error = Some("Duplicate vocabulary id: v1".to_string());
        let screen = render(&mut app);
        assert!(screen.contains("Duplicate vocabulary id"));
        assert!(screen.contains("r:Retry"));
    }
}
