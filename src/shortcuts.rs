use std::collections::{HashMap, HashSet};
use std::process::{Command as Process, Stdio};
use std::thread;

use anyhow::{bail, Context, Result};
use crossterm::event::KeyCode;
use tracing::{info, warn};

use crate::data::DisplayItem;
use crate::scroll::Direction;

// 'g', 'j', 'k' and 'q' are left out, they drive navigation
pub const DEFAULT_SHORTCUTS: &str = "abcdefhilmnoprstuvwxyz!\"$%^&*.";
pub const URL_PLACEHOLDER: &str = "%URL%";

const RESERVED_BINDINGS: [(KeyCode, Command); 14] = [
    (KeyCode::Char('q'), Command::Quit),
    (KeyCode::Esc, Command::Quit),
    (KeyCode::Char('j'), Command::Step(Direction::Down)),
    (KeyCode::Down, Command::Step(Direction::Down)),
    (KeyCode::Char('k'), Command::Step(Direction::Up)),
    (KeyCode::Up, Command::Step(Direction::Up)),
    (KeyCode::Char('}'), Command::Page(Direction::Down)),
    (KeyCode::PageDown, Command::Page(Direction::Down)),
    (KeyCode::Char('{'), Command::Page(Direction::Up)),
    (KeyCode::PageUp, Command::Page(Direction::Up)),
    (KeyCode::Char('g'), Command::Top),
    (KeyCode::Home, Command::Top),
    (KeyCode::Char('G'), Command::Bottom),
    (KeyCode::End, Command::Bottom),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AlphabetError {
    #[error("shortcut alphabet is empty")]
    Empty,
    #[error("shortcut {0:?} is listed more than once")]
    Duplicate(char),
    #[error("shortcut {0:?} is reserved for navigation")]
    Reserved(char),
    #[error("shortcut {0:?} is not a printable key")]
    Unprintable(char),
    #[error("stories {first}..{count} have no shortcut key ({available} available)")]
    Unreachable {
        first: usize,
        count: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutAlphabet {
    glyphs: Vec<char>,
}

impl ShortcutAlphabet {
    pub fn new(glyphs: &str) -> Result<Self, AlphabetError> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for glyph in glyphs.chars() {
            if glyph.is_whitespace() || glyph.is_control() {
                return Err(AlphabetError::Unprintable(glyph));
            }
            if is_reserved(glyph) {
                return Err(AlphabetError::Reserved(glyph));
            }
            if !seen.insert(glyph) {
                return Err(AlphabetError::Duplicate(glyph));
            }
            ordered.push(glyph);
        }
        if ordered.is_empty() {
            return Err(AlphabetError::Empty);
        }
        Ok(Self { glyphs: ordered })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, index: usize) -> Option<char> {
        self.glyphs.get(index).copied()
    }

    /// Fails when some of `item_count` items would be left without a key.
    pub fn check_coverage(&self, item_count: usize) -> Result<(), AlphabetError> {
        if item_count > self.glyphs.len() {
            return Err(AlphabetError::Unreachable {
                first: self.glyphs.len(),
                count: item_count,
                available: self.glyphs.len(),
            });
        }
        Ok(())
    }
}

impl Default for ShortcutAlphabet {
    fn default() -> Self {
        Self {
            glyphs: DEFAULT_SHORTCUTS.chars().collect(),
        }
    }
}

fn is_reserved(glyph: char) -> bool {
    RESERVED_BINDINGS
        .iter()
        .any(|(key, _)| *key == KeyCode::Char(glyph))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Step(Direction),
    Page(Direction),
    Top,
    Bottom,
    Activate(usize),
}

/// Key table for one session. Navigation keys always win over shortcuts;
/// shortcut keys are bound only for items that exist.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    bindings: HashMap<KeyCode, Command>,
}

impl Dispatcher {
    pub fn new(alphabet: &ShortcutAlphabet, item_count: usize) -> Self {
        let mut bindings = HashMap::new();
        for (index, glyph) in alphabet.glyphs.iter().take(item_count).enumerate() {
            bindings.insert(KeyCode::Char(*glyph), Command::Activate(index));
        }
        for (key, command) in RESERVED_BINDINGS {
            bindings.insert(key, command);
        }
        Self { bindings }
    }

    pub fn dispatch(&self, key: KeyCode) -> Option<Command> {
        self.bindings.get(&key).copied()
    }
}

/// Per-item "opened" flags. Only affects how the shortcut glyph is drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationMarks {
    opened: Vec<bool>,
}

impl ActivationMarks {
    pub fn new(item_count: usize) -> Self {
        Self {
            opened: vec![false; item_count],
        }
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.opened.get(index).copied().unwrap_or(false)
    }

    pub fn mark(&mut self, index: usize) {
        if let Some(flag) = self.opened.get_mut(index) {
            *flag = true;
        }
    }
}

pub trait ActionSink {
    /// Starts opening `target` and returns immediately. Whether the launch
    /// succeeds is never reported back.
    fn open(&self, target: &str);
}

/// Hands the target to the action sink and records the visit. Returns
/// `false` when `index` does not name an item.
pub fn activate(
    items: &[DisplayItem],
    index: usize,
    marks: &mut ActivationMarks,
    sink: &dyn ActionSink,
) -> bool {
    let Some(item) = items.get(index) else {
        return false;
    };
    sink.open(&item.target);
    marks.mark(index);
    true
}

/// Opens links in the system browser, or through a user supplied command
/// such as `["firefox", "--new-window", "%URL%"]`.
#[derive(Debug, Clone, Default)]
pub struct BrowserSink {
    command: Vec<String>,
}

impl BrowserSink {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ActionSink for BrowserSink {
    fn open(&self, target: &str) {
        let command = self.command.clone();
        let url = target.to_string();
        let spawned = thread::Builder::new()
            .name("open-link".into())
            .spawn(move || match launch(&command, &url) {
                Ok(()) => info!(%url, "opened link"),
                Err(err) => warn!(%url, "failed to open link: {err:#}"),
            });
        if let Err(err) = spawned {
            warn!("could not start link opener: {err}");
        }
    }
}

fn launch(command: &[String], url: &str) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        return webbrowser::open(url).with_context(|| format!("open {url} in default browser"));
    };
    let status = Process::new(program)
        .args(command_args(args, url))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("launch {program}"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}

fn command_args(args: &[String], url: &str) -> Vec<String> {
    let mut substituted = false;
    let mut out: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.contains(URL_PLACEHOLDER) {
                substituted = true;
                arg.replace(URL_PLACEHOLDER, url)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        out.push(url.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        opened: RefCell<Vec<String>>,
    }

    impl ActionSink for RecordingSink {
        fn open(&self, target: &str) {
            self.opened.borrow_mut().push(target.to_string());
        }
    }

    fn items(count: usize) -> Vec<DisplayItem> {
        (0..count)
            .map(|i| DisplayItem {
                headline: format!("Story {i}"),
                score: 100 - i as u64,
                target: format!("https://example.com/{i}"),
            })
            .collect()
    }

    #[test]
    fn default_alphabet_is_valid_and_covers_thirty_stories() {
        let alphabet = ShortcutAlphabet::default();
        assert_eq!(ShortcutAlphabet::new(DEFAULT_SHORTCUTS).unwrap(), alphabet);
        assert_eq!(alphabet.len(), 30);
        assert!(alphabet.check_coverage(30).is_ok());
    }

    #[test]
    fn one_story_too_many_is_flagged() {
        let alphabet = ShortcutAlphabet::default();
        let count = alphabet.len() + 1;
        assert_eq!(
            alphabet.check_coverage(count),
            Err(AlphabetError::Unreachable {
                first: 30,
                count: 31,
                available: 30,
            })
        );

        let dispatcher = Dispatcher::new(&alphabet, count);
        let reachable: HashSet<usize> = DEFAULT_SHORTCUTS
            .chars()
            .filter_map(|glyph| match dispatcher.dispatch(KeyCode::Char(glyph)) {
                Some(Command::Activate(index)) => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(reachable.len(), 30);
        assert!(!reachable.contains(&30));
    }

    #[test]
    fn alphabet_rejects_bad_glyphs() {
        assert_eq!(ShortcutAlphabet::new(""), Err(AlphabetError::Empty));
        assert_eq!(ShortcutAlphabet::new("abca"), Err(AlphabetError::Duplicate('a')));
        assert_eq!(ShortcutAlphabet::new("abj"), Err(AlphabetError::Reserved('j')));
        assert_eq!(ShortcutAlphabet::new("a b"), Err(AlphabetError::Unprintable(' ')));
    }

    #[test]
    fn reserved_keys_are_dispatched_first() {
        let dispatcher = Dispatcher::new(&ShortcutAlphabet::default(), 30);
        assert_eq!(dispatcher.dispatch(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(
            dispatcher.dispatch(KeyCode::Char('j')),
            Some(Command::Step(Direction::Down))
        );
        assert_eq!(
            dispatcher.dispatch(KeyCode::PageUp),
            Some(Command::Page(Direction::Up))
        );
        assert_eq!(dispatcher.dispatch(KeyCode::Char('a')), Some(Command::Activate(0)));
        assert_eq!(dispatcher.dispatch(KeyCode::Char('.')), Some(Command::Activate(29)));
    }

    #[test]
    fn shortcuts_beyond_item_count_are_unbound() {
        let dispatcher = Dispatcher::new(&ShortcutAlphabet::default(), 2);
        assert_eq!(dispatcher.dispatch(KeyCode::Char('b')), Some(Command::Activate(1)));
        assert_eq!(dispatcher.dispatch(KeyCode::Char('c')), None);
        assert_eq!(dispatcher.dispatch(KeyCode::Char('Z')), None);
        assert_eq!(dispatcher.dispatch(KeyCode::F(5)), None);
    }

    #[test]
    fn activation_opens_target_once_and_marks_item() {
        let items = items(3);
        let sink = RecordingSink::default();
        let mut marks = ActivationMarks::new(items.len());

        assert!(activate(&items, 1, &mut marks, &sink));
        assert_eq!(*sink.opened.borrow(), vec!["https://example.com/1".to_string()]);
        assert!(marks.is_marked(1));
        assert!(!marks.is_marked(0));
        assert!(!marks.is_marked(2));
    }

    #[test]
    fn activation_out_of_range_changes_nothing() {
        let items = items(3);
        let sink = RecordingSink::default();
        let mut marks = ActivationMarks::new(items.len());

        assert!(!activate(&items, 3, &mut marks, &sink));
        assert!(sink.opened.borrow().is_empty());
        assert_eq!(marks, ActivationMarks::new(3));
    }

    #[test]
    fn browser_command_substitutes_placeholder() {
        let args = vec!["--new-window".to_string(), "%URL%".to_string()];
        assert_eq!(
            command_args(&args, "https://example.com"),
            ["--new-window", "https://example.com"]
        );
        assert_eq!(command_args(&[], "https://example.com"), ["https://example.com"]);
    }
}
