//! Built-in caption templates.

/// Caption text used by a fresh session and by `reset`.
pub const DEFAULT_CAPTION: &str = "别吵\n我在给自己写钓鱼网站呢\n对，这年头\n咱们猫咪都能自己写代码了";

/// Selectable caption templates, addressed 1-based by the host.
pub const CAPTION_TEMPLATES: [&str; 4] = [
    DEFAULT_CAPTION,
    "今天天气真好\n适合出门散步\n享受阳光的温暖",
    "生活不止眼前的苟且\n还有诗和远方的田野",
    "努力不一定成功\n但放弃一定失败",
];

/// Look up a template by its 1-based number.
pub fn caption_template(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| CAPTION_TEMPLATES.get(i))
        .copied()
}

/// Line and character counts shown next to the caption editor.
///
/// Counts raw lines (blank ones included) and chars, unlike the filtered caption line list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStats {
    /// Number of `\n`-separated lines.
    pub lines: usize,
    /// Number of characters.
    pub chars: usize,
}

impl TextStats {
    /// Compute stats for `text`.
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.split('\n').count(),
            chars: text.chars().count(),
        }
    }
}
