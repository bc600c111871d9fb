use ripples_core::{Slice, State};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unknown filter {0}")]
pub struct UnknownFilter(pub u8);

/// Which todos the list shows. Persisted as its discriminant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Filter {
    #[default]
    All = 0,
    Active = 1,
    Completed = 2,
}

impl Filter {
    pub fn index(self) -> usize {
        self as usize
    }

    /// `#/active` and `#/completed` select their filters; anything else is All.
    pub fn from_hash(hash: &str) -> Self {
        match hash {
            "#/active" => Filter::Active,
            "#/completed" => Filter::Completed,
            _ => Filter::All,
        }
    }

    pub fn hash(self) -> &'static str {
        match self {
            Filter::All => "#/",
            Filter::Active => "#/active",
            Filter::Completed => "#/completed",
        }
    }

    pub fn accepts(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }
}

impl From<Filter> for u8 {
    fn from(f: Filter) -> u8 {
        f as u8
    }
}

impl TryFrom<u8> for Filter {
    type Error = UnknownFilter;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Filter::All),
            1 => Ok(Filter::Active),
            2 => Ok(Filter::Completed),
            n => Err(UnknownFilter(n)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Todos,
    Filter,
    Text,
}

impl Slice for Key {
    const ALL: &'static [Self] = &[Key::Todos, Key::Filter, Key::Text];

    fn key(self) -> &'static str {
        match self {
            Key::Todos => "todos",
            Key::Filter => "filter",
            Key::Text => "text",
        }
    }
}

pub enum Set {
    Todos(Vec<Todo>),
    Filter(Filter),
    /// Draft in the new-todo input.
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub filter: Filter,
    pub text: String,
}

impl State for TodoState {
    type Slice = Key;
    type Update = Set;

    fn apply(&mut self, update: Set) -> Key {
        match update {
            Set::Todos(todos) => {
                self.todos = todos;
                Key::Todos
            }
            Set::Filter(filter) => {
                self.filter = filter;
                Key::Filter
            }
            Set::Text(text) => {
                self.text = text;
                Key::Text
            }
        }
    }
}

impl TodoState {
    /// Todos shown under the current filter, with their index in `todos`.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &Todo)> {
        let filter = self.filter;
        self.todos
            .iter()
            .enumerate()
            .filter(move |(_, t)| filter.accepts(t))
    }

    /// Maps a position in the rendered list back to an index in `todos`.
    pub fn index_of_visible(&self, position: usize) -> Option<usize> {
        self.visible().nth(position).map(|(i, _)| i)
    }

    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn all_completed(&self) -> bool {
        self.todos.iter().all(|t| t.completed)
    }
}
