//! HTML card renderer.

use crate::config::CardConfig;
use crate::model::fragment::{escape_text, Fragment};
use crate::render::styles::card_styles;
use crate::render::{CardView, RenderError, Renderer, Theme};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Renders card markup for a list of sanitized notifications.
pub fn render_card(theme: Theme, config: &CardConfig, items: &[Fragment]) -> String {
    let mut bubbles = String::new();
    for item in items {
        bubbles.push_str("<div class=\"bubble\">");
        bubbles.push_str(&item.to_html());
        bubbles.push_str("</div>");
    }

    format!(
        "<style>{}</style>\
         <div class=\"notifications-container\">{}</div>\
         <div class=\"fullscreen-container\">\
         <img class=\"fullscreen-image\" src=\"\" alt=\"Fullscreen Image\">\
         </div>",
        card_styles(theme, config),
        bubbles
    )
}

/// Renders an escaped error message box.
pub fn render_error(message: &str) -> String {
    format!(
        "<div style=\"color: red; padding: 16px;\">{}</div>",
        escape_text(message)
    )
}

/// Renderer keeping the most recent markup.
///
/// Clones share output, so callers can keep a clone to inspect what a card
/// rendered.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    output: Rc<RefCell<Option<String>>>,
    renders: Rc<Cell<usize>>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered markup.
    pub fn output(&self) -> Option<String> {
        self.output.borrow().clone()
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> usize {
        self.renders.get()
    }
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, view: &CardView<'_>) -> Result<(), RenderError> {
        let markup = match view {
            CardView::Notifications {
                theme,
                config,
                items,
            } => render_card(*theme, config, items),
            CardView::Error { message } => render_error(message),
        };
        *self.output.borrow_mut() = Some(markup);
        self.renders.set(self.renders.get() + 1);
        Ok(())
    }
}
