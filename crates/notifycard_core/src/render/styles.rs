//! Card stylesheet generation.

use crate::config::CardConfig;
use crate::render::Theme;
use std::fmt::Write as _;

struct Palette {
    background: &'static str,
    text: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: "#f1f1f1",
            text: "#333",
        },
        Theme::Dark => Palette {
            background: "#444",
            text: "#fff",
        },
    }
}

/// Builds the card stylesheet for `theme` and `config`.
pub fn card_styles(theme: Theme, config: &CardConfig) -> String {
    let colors = palette(theme);
    let mut css = String::new();

    if config.media_width.is_some() || config.media_height.is_some() {
        css.push_str(":host {");
        if let Some(width) = &config.media_width {
            let _ = write!(css, " --media-width: {width};");
        }
        if let Some(height) = &config.media_height {
            let _ = write!(css, " --media-height: {height};");
        }
        css.push_str(" }\n");
    }

    let _ = write!(
        css,
        r#".notifications-container {{ padding: 10px; }}
.bubble {{
  background-color: {background};
  color: {text};
  font-size: {font_size};
  line-height: {line_height}px;
  border-radius: 25px;
  padding: 10px 15px;
  margin: 20px;
  width: 60%;
  word-wrap: break-word;
  word-break: break-word;
  opacity: 0;
  animation: fadeIn 0.3s forwards;
}}
.bubble video, .bubble img {{
  max-width: var(--media-width, 100%);
  height: var(--media-height, auto);
  border-radius: 15px;
  display: block;
  cursor: pointer;
  transition: transform 0.3s ease;
}}
.bubble img:hover {{ transform: scale(1.05); }}
.fullscreen-container {{
  display: none;
  position: fixed;
  top: 0; left: 0;
  width: 100%; height: 100%;
  background-color: rgba(0, 0, 0, 0.9);
  z-index: 1000;
  justify-content: center;
  align-items: center;
  cursor: pointer;
}}
.fullscreen-container.active {{ display: flex; }}
.fullscreen-image {{ max-width: 90%; max-height: 90%; object-fit: contain; }}
@keyframes fadeIn {{
  from {{ opacity: 0; transform: translateY(10px); }}
  to {{ opacity: 1; transform: translateY(0); }}
}}
@media (max-width: 768px) {{
  .bubble {{ width: auto; margin: 10px; }}
}}
@media (min-width: 1024px) {{
  .bubble {{ width: 77%; }}
  .bubble video, .bubble img {{ max-width: var(--media-width, 35%); }}
}}
"#,
        background = colors.background,
        text = colors.text,
        font_size = config.font_size,
        line_height = config.line_height_px(),
    );
    css
}

#[cfg(test)]
mod tests {
    use super::card_styles;
    use crate::config::CardConfig;
    use crate::model::identity::Identity;
    use crate::render::Theme;

    fn config() -> CardConfig {
        CardConfig::new(Identity::Person("alice".to_string()))
    }

    #[test]
    fn theme_selects_palette() {
        let light = card_styles(Theme::Light, &config());
        assert!(light.contains("background-color: #f1f1f1;"));
        assert!(light.contains("color: #333;"));

        let dark = card_styles(Theme::Dark, &config());
        assert!(dark.contains("background-color: #444;"));
        assert!(dark.contains("color: #fff;"));
    }

    #[test]
    fn font_and_line_height_follow_config() {
        let mut config = config();
        config.font_size = "20px".to_string();
        config.line_height = 1.5;
        let css = card_styles(Theme::Light, &config);
        assert!(css.contains("font-size: 20px;"));
        assert!(css.contains("line-height: 30px;"));
    }

    #[test]
    fn media_variables_only_when_configured() {
        assert!(!card_styles(Theme::Light, &config()).contains(":host"));

        let mut config = config();
        config.media_width = Some("50%".to_string());
        let css = card_styles(Theme::Light, &config);
        assert!(css.starts_with(":host { --media-width: 50%; }"));
    }
}
