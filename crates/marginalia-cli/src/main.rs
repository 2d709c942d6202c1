use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use marginalia_config::Config;
use marginalia_engine::{
    BlockType, Cmd, CommentSink, CommentSubmission, Composer, Document, IssueId, Key, KeyPress,
    Point, Selection, block_controls, inline_controls, map_key,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block as TuiBlock, Borders, Paragraph},
};
use std::{env, io::stdout, process};

/// Queues submissions during the session; they are printed once the
/// terminal is restored.
#[derive(Default)]
struct QueueSink {
    submissions: Vec<CommentSubmission>,
}

impl CommentSink for QueueSink {
    fn submit(&mut self, submission: CommentSubmission) {
        self.submissions.push(submission);
    }
}

struct App {
    composer: Composer,
    placeholder: String,
    sink: QueueSink,
}

impl App {
    fn new(issue_id: IssueId, placeholder: String) -> Self {
        Self {
            composer: Composer::new(issue_id),
            placeholder,
            sink: QueueSink::default(),
        }
    }

    fn document(&self) -> &Document {
        self.composer.document()
    }

    fn apply(&mut self, cmd: Cmd) {
        // The selection only ever comes from the engine, so apply cannot
        // see a malformed one; ignore rather than crash the TUI.
        let _ = self.composer.apply(cmd);
    }

    fn select(&mut self, selection: Selection) {
        let _ = self.composer.select(selection);
    }

    fn submit(&mut self) {
        self.composer.submit(&mut self.sink);
    }

    fn move_caret_horizontal(&mut self, forward: bool) {
        let doc = self.document();
        let point = doc.selection().start();
        let block = &doc.blocks()[point.block];
        let text = block.text();
        let next = if forward {
            if point.offset < text.len() {
                let step = text[point.offset..]
                    .chars()
                    .next()
                    .map(|c| c.len_utf8())
                    .unwrap_or(0);
                Point::new(point.block, point.offset + step)
            } else if point.block + 1 < doc.blocks().len() {
                Point::new(point.block + 1, 0)
            } else {
                return;
            }
        } else if point.offset > 0 {
            let step = text[..point.offset]
                .chars()
                .last()
                .map(|c| c.len_utf8())
                .unwrap_or(0);
            Point::new(point.block, point.offset - step)
        } else if point.block > 0 {
            let prev_len = doc.blocks()[point.block - 1].len();
            Point::new(point.block - 1, prev_len)
        } else {
            return;
        };
        self.select(Selection::caret(next));
    }

    fn move_caret_vertical(&mut self, down: bool) {
        let doc = self.document();
        let point = doc.selection().start();
        let target = if down {
            if point.block + 1 >= doc.blocks().len() {
                return;
            }
            point.block + 1
        } else {
            if point.block == 0 {
                return;
            }
            point.block - 1
        };
        let text = doc.blocks()[target].text();
        let offset = clamp_to_char_boundary(&text, point.offset);
        self.select(Selection::caret(Point::new(target, offset)));
    }
}

fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn main() -> Result<()> {
    let issue_id = match resolve_issue_id()? {
        Some(id) => id,
        None => {
            eprintln!("Usage: marginalia-cli <issue-id>");
            eprintln!("(or set issue_id in {})", Config::config_path().display());
            process::exit(1);
        }
    };
    let placeholder = Config::load()?
        .map(|c| c.placeholder)
        .unwrap_or_else(|| Config::default().placeholder);

    let mut app = App::new(issue_id, placeholder);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    for submission in &app.sink.submissions {
        println!("[{}] {}", submission.issue_id, submission.comment);
    }

    result
}

fn resolve_issue_id() -> Result<Option<IssueId>> {
    if let Some(arg) = env::args().nth(1) {
        return Ok(Some(IssueId(arg)));
    }
    Ok(Config::load()?.and_then(|c| c.issue_id).map(IssueId))
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match (key.code, key.modifiers) {
                (KeyCode::Esc, _) => return Ok(()),
                (KeyCode::Char('s'), KeyModifiers::CONTROL) => app.submit(),
                (KeyCode::Left, _) => app.move_caret_horizontal(false),
                (KeyCode::Right, _) => app.move_caret_horizontal(true),
                (KeyCode::Up, _) => app.move_caret_vertical(false),
                (KeyCode::Down, _) => app.move_caret_vertical(true),
                (KeyCode::Char(c), KeyModifiers::ALT) => {
                    if let Some(kind) = block_type_for_key(c) {
                        app.apply(Cmd::ToggleBlockType(kind));
                    }
                }
                _ => {
                    if let Some(press) = to_key_press(key.code, key.modifiers)
                        && let Some(cmd) = map_key(press)
                    {
                        app.apply(cmd);
                    }
                }
            }
        }
    }
}

/// Alt-key toolbar bindings: 1-6 headings, q quote, u/o lists.
fn block_type_for_key(c: char) -> Option<BlockType> {
    match c {
        '1'..='6' => Some(BlockType::Heading {
            level: c as u8 - b'0',
        }),
        'q' => Some(BlockType::Quote),
        'u' => Some(BlockType::UnorderedItem),
        'o' => Some(BlockType::OrderedItem),
        _ => None,
    }
}

fn to_key_press(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyPress> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let key = match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            return Some(KeyPress {
                key: Key::Tab,
                ctrl,
                shift: true,
            });
        }
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        _ => return None,
    };
    Some(KeyPress { key, ctrl, shift })
}

fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // block controls
            Constraint::Length(1), // inline controls
            Constraint::Min(3),    // editor
            Constraint::Length(1), // status
        ])
        .split(frame.area());

    let doc = app.document();

    frame.render_widget(
        Paragraph::new(controls_line(&block_controls(doc))),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(controls_line(&inline_controls(doc))),
        chunks[1],
    );

    let editor = TuiBlock::default()
        .borders(Borders::ALL)
        .title(format!(" comment on {} ", app.composer.issue_id()));
    let inner = editor.inner(chunks[2]);
    frame.render_widget(editor, chunks[2]);

    if doc.has_text() || doc.blocks().len() > 1 {
        let lines: Vec<Line> = doc.blocks().iter().map(block_line).collect();
        frame.render_widget(Paragraph::new(lines), inner);
    } else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                app.placeholder.clone(),
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            )),
            inner,
        );
    }

    let caret = doc.selection().start();
    if let Some(block) = doc.block(caret.block) {
        let prefix_width = block_prefix(block.kind, block.depth).chars().count();
        let col = block.text()[..caret.offset].chars().count() + prefix_width;
        frame.set_cursor_position(Position::new(
            inner.x + col as u16,
            inner.y + caret.block as u16,
        ));
    }

    frame.render_widget(
        Paragraph::new(
            "Esc quit | Ctrl-S submit | Ctrl-B/I/U/J styles | Alt-1..6/q/u/o blocks | Tab indent",
        ),
        chunks[3],
    );
}

fn controls_line(states: &[marginalia_engine::ControlState]) -> Line<'static> {
    let mut spans = Vec::new();
    for state in states {
        let style = if state.active {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {} ", state.label), style));
    }
    Line::from(spans)
}

fn block_prefix(kind: BlockType, depth: u8) -> String {
    let indent = "  ".repeat(depth as usize);
    match kind {
        BlockType::Paragraph => String::new(),
        BlockType::Heading { level } => format!("{} ", "#".repeat(level as usize)),
        BlockType::Quote => "> ".to_string(),
        BlockType::UnorderedItem => format!("{indent}- "),
        BlockType::OrderedItem => format!("{indent}1. "),
    }
}

fn block_line(block: &marginalia_engine::Block) -> Line<'static> {
    let mut spans = vec![Span::raw(block_prefix(block.kind, block.depth))];
    for run in block.runs() {
        let mut style = Style::default();
        if run.styles.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if run.styles.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if run.styles.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if run.styles.code {
            style = style.add_modifier(Modifier::REVERSED);
        }
        spans.push(Span::styled(run.text.clone(), style));
    }
    Line::from(spans)
}
