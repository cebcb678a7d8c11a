use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::data::DisplayItem;
use crate::layout::Geometry;
use crate::render::{self, Surface};
use crate::scroll::ScrollCursor;
use crate::shortcuts::{self, ActionSink, ActivationMarks, Command, Dispatcher, ShortcutAlphabet};

pub struct Options {
    pub items: Vec<DisplayItem>,
    pub title: String,
    pub alphabet: ShortcutAlphabet,
    pub sink: Box<dyn ActionSink>,
}

/// All state of one browsing session. Geometry and the backing surface are
/// rebuilt on resize; the cursor and the visited marks live until quit.
pub struct Model {
    items: Vec<DisplayItem>,
    title: String,
    alphabet: ShortcutAlphabet,
    dispatcher: Dispatcher,
    geometry: Geometry,
    cursor: ScrollCursor,
    marks: ActivationMarks,
    surface: Surface,
    sink: Box<dyn ActionSink>,
    needs_redraw: bool,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let Options {
            items,
            title,
            alphabet,
            sink,
        } = options;

        if let Err(err) = alphabet.check_coverage(items.len()) {
            warn!("{err}");
        }

        let geometry = Geometry::compute(0, 0, items.len());
        let marks = ActivationMarks::new(items.len());
        let surface = Surface::draw(&items, &geometry, &alphabet, &marks);
        let dispatcher = Dispatcher::new(&alphabet, items.len());

        Self {
            items,
            title,
            alphabet,
            dispatcher,
            geometry,
            cursor: ScrollCursor::new(),
            marks,
            surface,
            sink,
            needs_redraw: true,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor.offset()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn marks(&self) -> &ActivationMarks {
        &self.marks
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let size = terminal.size()?;
        self.resize(size.width, size.height);

        loop {
            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            if self.handle_event(event::read()?) {
                break;
            }
        }

        Ok(())
    }

    /// Applies one terminal event. Returns `true` when the session should end.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
            Event::Resize(cols, rows) => {
                self.resize(cols, rows);
                false
            }
            _ => false,
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return key.code == KeyCode::Char('c');
        }
        self.handle_key(key.code)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let Some(command) = self.dispatcher.dispatch(code) else {
            return false;
        };

        let before = self.cursor;
        match command {
            Command::Quit => return true,
            Command::Step(direction) => self.cursor.step(direction, &self.geometry),
            Command::Page(direction) => self.cursor.page_jump(direction, &self.geometry),
            Command::Top => self.cursor.to_top(),
            Command::Bottom => self.cursor.to_bottom(&self.geometry),
            Command::Activate(index) => {
                if shortcuts::activate(&self.items, index, &mut self.marks, self.sink.as_ref()) {
                    debug!(index, "story activated");
                    self.surface.mark_visited(index, &self.alphabet);
                    self.needs_redraw = true;
                }
            }
        }
        if self.cursor != before {
            self.needs_redraw = true;
        }
        false
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.geometry = Geometry::compute(rows, cols, self.items.len());
        self.cursor.resize_clamp(self.geometry.max_scroll());
        self.surface = Surface::draw(&self.items, &self.geometry, &self.alphabet, &self.marks);
        self.needs_redraw = true;
        debug!(rows, cols, max_scroll = self.geometry.max_scroll(), "layout recomputed");
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        render::render(
            frame,
            &self.geometry,
            &self.surface,
            self.cursor.offset(),
            &self.title,
        );
    }
}
