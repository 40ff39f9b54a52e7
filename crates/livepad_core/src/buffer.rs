//! Source buffers edited by the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a source buffer, one per pane of the playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    Html,
    Css,
    Js,
}

impl BufferKind {
    pub const ALL: [BufferKind; 3] = [Self::Html, Self::Css, Self::Js];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Conventional file name of the buffer when it is backed by a file on disk.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Html => "index.html",
            Self::Css => "style.css",
            Self::Js => "script.js",
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.file_name() == file_name)
    }

    /// Language mode of the editor widget for this buffer.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Css => "css",
            Self::Js => "javascript",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Html => 0,
            Self::Css => 1,
            Self::Js => 2,
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BufferKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            "js" => Ok(Self::Js),
            other => Err(format!("unknown buffer kind: {other}")),
        }
    }
}

/// A named text buffer, always holding its full current content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    kind: BufferKind,
    text: String,
}

impl SourceBuffer {
    pub fn new(kind: BufferKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// The three buffers of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffers {
    buffers: [SourceBuffer; 3],
}

impl Default for Buffers {
    fn default() -> Self {
        Self {
            buffers: BufferKind::ALL.map(SourceBuffer::new),
        }
    }
}

impl Buffers {
    pub fn get(&self, kind: BufferKind) -> &SourceBuffer {
        &self.buffers[kind.index()]
    }

    pub fn set(&mut self, kind: BufferKind, text: impl Into<String>) {
        self.buffers[kind.index()].set_text(text);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceBuffer> {
        self.buffers.iter()
    }
}
