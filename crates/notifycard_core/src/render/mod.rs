//! Card rendering.
//!
//! # Responsibility
//! - Define the renderer contract the card hands sanitized content to.
//! - Provide an HTML renderer producing themed card markup.
//!
//! # Invariants
//! - Renderers only receive sanitized fragments or plain error text.
//! - Error text is escaped before it reaches markup.

use crate::config::CardConfig;
use crate::model::fragment::Fragment;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod html;
pub mod styles;

/// Light or dark host theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

/// What the card asks a renderer to show.
#[derive(Debug, Clone, Copy)]
pub enum CardView<'a> {
    Notifications {
        theme: Theme,
        config: &'a CardConfig,
        items: &'a [Fragment],
    },
    Error {
        message: &'a str,
    },
}

/// Rendering target for card views.
pub trait Renderer {
    fn render(&mut self, view: &CardView<'_>) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError(pub String);

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "render failed: {}", self.0)
    }
}

impl Error for RenderError {}
