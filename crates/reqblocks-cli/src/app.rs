use std::path::PathBuf;
use std::str::FromStr;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use reqblocks_engine::{
    BlockStyle, Category, Cmd, Dictionary, DropTarget, Editor, LayoutOracle, MonospaceLayout,
    StyleMap, StyleResolver,
};

/// What a key press asks the application to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Apply(Cmd),
    Copy,
    Paste,
    Save,
    Quit,
}

/// Translate a key press into an action; `pending` is the text being typed.
pub fn action_for_key(key: KeyEvent, pending: &str) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    let action = match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if control => Action::Copy,
        KeyCode::Char('v') if control => Action::Paste,
        KeyCode::Char('s') if control => Action::Save,
        KeyCode::Char(_) if control => return None,
        KeyCode::Char(' ') => Action::Apply(Cmd::Space),
        KeyCode::Char(c) => Action::Apply(Cmd::Input {
            text: format!("{pending}{c}"),
        }),
        KeyCode::Enter => Action::Apply(Cmd::Enter),
        KeyCode::Backspace => Action::Apply(Cmd::Backspace {
            modifier: key
                .modifiers
                .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT | KeyModifiers::CONTROL),
        }),
        KeyCode::Delete => Action::Apply(Cmd::DeleteSelection),
        KeyCode::Left => Action::Apply(Cmd::ArrowLeft),
        KeyCode::Right => Action::Apply(Cmd::ArrowRight),
        KeyCode::Up => Action::Apply(Cmd::ArrowUp),
        KeyCode::Down => Action::Apply(Cmd::ArrowDown),
        _ => return None,
    };
    Some(action)
}

/// One row of the prefab palette.
#[derive(Debug, Clone, PartialEq)]
enum PaletteRow {
    Heading(String),
    Item { content: String, category: Category },
}

fn palette_rows(dictionary: &Dictionary) -> Vec<PaletteRow> {
    dictionary
        .prefab_categories()
        .flat_map(|entry| {
            std::iter::once(PaletteRow::Heading(entry.name.clone())).chain(entry.items.iter().map(
                |item| PaletteRow::Item {
                    content: item.clone(),
                    category: entry.category,
                },
            ))
        })
        .collect()
}

/// Mouse button held down on the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    block: Option<u64>,
    shift: bool,
    moved: bool,
}

pub struct App {
    pub editor: Editor,
    styles: StyleMap,
    file: Option<PathBuf>,
    clipboard: String,
    pub layout: MonospaceLayout,
    /// Screen area the blocks are drawn in
    area: Rect,
    scroll: u16,
    press: Option<Press>,
    palette: Vec<PaletteRow>,
    palette_area: Rect,
    pub status: String,
}

impl App {
    pub fn new(editor: Editor, styles: StyleMap, file: Option<PathBuf>) -> Self {
        let palette = palette_rows(editor.dictionary());
        Self {
            editor,
            styles,
            file,
            clipboard: String::new(),
            layout: MonospaceLayout::default(),
            area: Rect::default(),
            scroll: 0,
            press: None,
            palette,
            palette_area: Rect::default(),
            status: String::new(),
        }
    }

    /// Returns `false` once the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let Some(action) = action_for_key(key, self.editor.pending()) else {
            return true;
        };

        match action {
            Action::Quit => return false,
            Action::Apply(cmd) => {
                self.editor.apply(cmd);
            }
            Action::Copy => {
                let text = self.editor.copy();
                if text.is_empty() {
                    self.status = "Nothing selected".to_string();
                } else {
                    self.status = format!("Copied {} blocks", self.editor.selection().len());
                    self.clipboard = text;
                }
            }
            Action::Paste => {
                let text = self.clipboard.clone();
                self.editor.apply(Cmd::Paste { text });
            }
            Action::Save => self.save(),
        }
        true
    }

    fn save(&mut self) {
        let Some(file) = &self.file else {
            self.status = "No file to save to".to_string();
            return;
        };
        self.status = match std::fs::write(file, self.editor.text()) {
            Ok(()) => format!("Saved {}", file.display()),
            Err(e) => {
                log::error!("saving {} failed: {e}", file.display());
                format!("Error saving {}: {e}", file.display())
            }
        };
    }

    /// Terminal cell to layout coordinates, `None` outside the editor area.
    fn to_layout(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        self.area.contains(Position::new(column, row)).then(|| {
            (
                f32::from(column - self.area.x),
                f32::from(row - self.area.y + self.scroll),
            )
        })
    }

    /// Identity of the block drawn under `(x, y)`.
    fn block_under(&self, x: f32, y: f32) -> Option<u64> {
        let line = self.layout.line_at(y)?;
        let position = self.layout.block_at(line, x, y)?;
        self.editor
            .lines()
            .get(line)
            .and_then(|blocks| blocks.get(position))
            .map(|block| block.index)
    }

    fn insert_prefab(&mut self, content: String, category: Category) {
        let name = self
            .editor
            .dictionary()
            .category_name(category)
            .unwrap_or(category.name());
        self.status = format!("Inserted {content} ({name})");
        self.editor.apply(Cmd::InsertBlock {
            content,
            category: Some(category),
        });
    }

    fn palette_item_at(&self, column: u16, row: u16) -> Option<(String, Category)> {
        if !self.palette_area.contains(Position::new(column, row)) {
            return None;
        }
        match self.palette.get(usize::from(row - self.palette_area.y))? {
            PaletteRow::Item { content, category } => Some((content.clone(), *category)),
            PaletteRow::Heading(_) => None,
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if event.kind == MouseEventKind::Down(MouseButton::Left)
            && let Some((content, category)) = self.palette_item_at(event.column, event.row)
        {
            self.insert_prefab(content, category);
            return;
        }

        let point = self.to_layout(event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.press = Some(Press {
                    block: point.and_then(|(x, y)| self.block_under(x, y)),
                    shift: event.modifiers.contains(KeyModifiers::SHIFT),
                    moved: false,
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(press) = self.press.as_mut() {
                    press.moved = true;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(press) = self.press.take() {
                    self.release(press, point);
                }
            }
            _ => {}
        }
    }

    fn release(&mut self, press: Press, point: Option<(f32, f32)>) {
        let line = point.and_then(|(_, y)| self.layout.line_at(y));

        let cmd = match (press.block, press.moved, point, line) {
            (Some(block), true, Some((x, y)), Some(line)) => {
                let target = match self.block_under(x, y) {
                    Some(target) => DropTarget::Block(target),
                    None => DropTarget::Line(line),
                };
                Cmd::DragMove { block, target }
            }
            (Some(_), true, _, _) => return,
            (Some(index), false, _, _) => Cmd::ClickBlock {
                index,
                shift: press.shift,
            },
            (None, _, Some((x, y)), Some(line)) => Cmd::ClickLine { line, x, y },
            (None, _, _, _) => Cmd::ClickOutside,
        };
        self.editor.apply(cmd);
    }

    /// Lay the document out for `area` and keep the input row in view.
    fn relayout(&mut self, area: Rect) {
        self.area = area;
        self.layout = MonospaceLayout::compute(
            &self.editor.lines(),
            usize::from(area.width),
            self.editor.caret(),
            self.editor.pending(),
        );

        if let Some(input) = self.layout.input_rect() {
            let top = input.top as u16;
            if top < self.scroll {
                self.scroll = top;
            } else if top >= self.scroll + area.height {
                self.scroll = top + 1 - area.height;
            }
        }
        let max_scroll = (self.layout.height() as u16).saturating_sub(area.height);
        self.scroll = self.scroll.min(max_scroll);
    }
}

fn to_color(value: &Option<String>) -> Option<Color> {
    value.as_deref().and_then(|value| Color::from_str(value).ok())
}

fn block_style(style: Option<&BlockStyle>, selected: bool) -> Style {
    let mut result = Style::default();
    if let Some(style) = style {
        if let Some(bg) = to_color(&style.background_color) {
            result = result.bg(bg);
        }
        if let Some(fg) = to_color(&style.color).or(to_color(&style.border_color)) {
            result = result.fg(fg);
        }
    }
    if selected {
        result = result.add_modifier(Modifier::REVERSED);
    }
    result
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let title = match &app.file {
        Some(file) => format!("reqblocks: {}", file.display()),
        None => "reqblocks".to_string(),
    };
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
        .split(chunks[0]);

    let border = Block::default().borders(Borders::ALL).title(title);
    let area = border.inner(panels[0]);
    f.render_widget(border, panels[0]);

    // Prefab palette
    let items: Vec<ListItem> = app
        .palette
        .iter()
        .map(|row| match row {
            PaletteRow::Heading(name) => ListItem::new(Line::from(Span::styled(
                name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))),
            PaletteRow::Item { content, category } => ListItem::new(Line::from(Span::styled(
                format!(" [{content}]"),
                block_style(app.styles.style(*category), false),
            ))),
        })
        .collect();
    let palette = Block::default().borders(Borders::ALL).title("Prefabs");
    app.palette_area = palette.inner(panels[1]);
    f.render_widget(List::new(items).block(palette), panels[1]);

    app.relayout(area);

    let lines = app.editor.lines();
    let selection = app.editor.selection();
    let scroll = f32::from(app.scroll);
    let bottom = f32::from(area.height);
    let buffer = f.buffer_mut();

    for (line, blocks) in lines.iter().enumerate() {
        let Some(rects) = app.layout.block_rects(line) else {
            continue;
        };
        for (block, rect) in blocks.iter().zip(rects) {
            let top = rect.top - scroll;
            if top < 0.0 || top >= bottom {
                continue;
            }
            let style = block_style(
                app.styles.style(block.category),
                selection.contains(block.index),
            );
            buffer.set_string(
                area.x + rect.left as u16,
                area.y + top as u16,
                format!("[{}]", block.content),
                style,
            );
        }
    }

    if let Some(input) = app.layout.input_rect() {
        let top = input.top - scroll;
        if (0.0..bottom).contains(&top) {
            let x = area.x + input.left as u16;
            let y = area.y + top as u16;
            let pending = app.editor.pending();
            buffer.set_string(x, y, pending, Style::default().add_modifier(Modifier::UNDERLINED));
            f.set_cursor_position((x + pending.chars().count() as u16, y));
        }
    }

    let help = Line::from(vec![
        Span::raw("Esc: Quit | "),
        Span::raw("Ctrl+S: Save | "),
        Span::raw("Ctrl+C/V: Copy/Paste | "),
        Span::raw("Shift+click: Select | "),
        Span::styled(app.status.clone(), Style::default().fg(Color::Yellow)),
    ]);
    f.render_widget(Paragraph::new(vec![help]), chunks[1]);
}
