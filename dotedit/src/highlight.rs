//! Syntax highlighting for the editor panel.
//!
//! Documents are highlighted whole with syntect and converted to owned
//! ratatui `Line`s, so the result can be cached in `AppState` and reused on
//! every frame until the content changes.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Dotfile names with no usable extension, mapped to a syntect token.
const NAME_HINTS: &[(&str, &str)] = &[
    ("bashrc", "bash"),
    ("zshrc", "bash"),
    ("profile", "bash"),
    ("bash_profile", "bash"),
    ("gitconfig", "ini"),
];

/// Picks a syntax for a document by its file name.
///
/// Tries the name itself (syntect lists dotfiles such as `.bashrc` verbatim),
/// then the text after the last dot, then [`NAME_HINTS`], then plain text.
pub fn syntax_for(name: &str) -> &'static SyntaxReference {
    let stem = name.rsplit('.').next().unwrap_or(name);
    PS.find_syntax_by_extension(name)
        .or_else(|| PS.find_syntax_by_extension(stem))
        .or_else(|| {
            NAME_HINTS
                .iter()
                .find(|(n, _)| *n == stem)
                .and_then(|(_, token)| PS.find_syntax_by_token(token))
        })
        .unwrap_or_else(|| PS.find_syntax_plain_text())
}

/// Highlights `content` line by line.
///
/// Always returns exactly one `Line` per `\n`-separated line so row indices
/// line up with the cursor. Tabs render as a single space to keep columns
/// one-to-one with characters.
pub fn highlight(name: &str, content: &str) -> Vec<Line<'static>> {
    let theme = TS.themes.get("base16-ocean.dark").or_else(|| TS.themes.values().next());
    let Some(theme) = theme else {
        return plain_lines(content);
    };
    let mut h = HighlightLines::new(syntax_for(name), theme);

    content
        .split('\n')
        .map(|raw| {
            // syntect's newline syntaxes expect the terminator on each line.
            let with_nl = format!("{raw}\n");
            match h.highlight_line(&with_nl, &PS) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(style, text)| syntect_to_span(style, text.trim_end_matches('\n')))
                        .filter(|s| !s.content.is_empty())
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::raw(detab(raw)),
            }
        })
        .collect()
}

fn plain_lines(content: &str) -> Vec<Line<'static>> {
    content.split('\n').map(|l| Line::raw(detab(l))).collect()
}

fn detab(s: &str) -> String {
    s.replace('\t', " ")
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
///
/// Background colors are dropped so the panel background shows through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    use syntect::highlighting::FontStyle;

    let fg = style.foreground;
    let mut ratatui_style = Style::default();
    if fg.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(detab(content), ratatui_style)
}
