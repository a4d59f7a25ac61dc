//! Caption wrapping and burn-in.
//!
//! Captions are rendered with FFmpeg's `drawtext` filter reading from a
//! text file, which keeps multi-line layout out of filter-string escaping.
//! Line breaks come from [`wrap_text`], so the wrap width has to match the
//! font size: wider fonts need narrower budgets.

use std::path::{Path, PathBuf};

use reel_models::encoding::{BOLD_WRAP_WIDTH, OVERLAY_WRAP_WIDTH};
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner, ProcessOutput};
use crate::error::{MediaError, MediaResult};

/// Visual parameters for a burned-in caption.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub font_file: PathBuf,
    pub font_size: u32,
    pub font_color: String,
    pub border_width: u32,
    pub border_color: String,
    pub line_spacing: u32,
    /// Maximum characters per line before wrapping.
    pub wrap_width: usize,
}

impl CaptionStyle {
    /// 36pt centered overlay used for generated videos.
    pub fn overlay(font_file: impl Into<PathBuf>) -> Self {
        Self {
            font_file: font_file.into(),
            font_size: 36,
            font_color: "white".to_string(),
            border_width: 3,
            border_color: "black".to_string(),
            line_spacing: 16,
            wrap_width: OVERLAY_WRAP_WIDTH,
        }
    }

    /// 48pt heavy-border caption used by the operator caption tool.
    pub fn bold(font_file: impl Into<PathBuf>) -> Self {
        Self {
            font_size: 48,
            border_width: 5,
            wrap_width: BOLD_WRAP_WIDTH,
            ..Self::overlay(font_file)
        }
    }

    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width;
        self
    }
}

/// Greedily wrap `text` into lines of at most `max_chars` characters.
///
/// Words are split on whitespace and joined with single spaces. A word
/// longer than the budget is placed alone on its own line, never split.
/// Lengths are counted in `char`s.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a value for use inside an FFmpeg filter option, then again for the
/// filtergraph parser that reads the `-vf` argument.
fn escape_filter_value(value: &str) -> String {
    let option = escape_chars(value, &['\\', ':', '\'']);
    escape_chars(&option, &['\\', '\'', '[', ']', ',', ';'])
}

/// Build the `drawtext` filter that centers the text file's contents.
pub fn drawtext_filter(text_file: &Path, style: &CaptionStyle) -> String {
    format!(
        "drawtext=textfile={}:fontfile={}:fontsize={}:fontcolor={}:x=(w-text_w)/2:y=(h-text_h)/2:borderw={}:bordercolor={}:text_align=center:line_spacing={}",
        escape_filter_value(&text_file.to_string_lossy()),
        escape_filter_value(&style.font_file.to_string_lossy()),
        style.font_size,
        style.font_color,
        style.border_width,
        style.border_color,
        style.line_spacing,
    )
}

/// Burn `text` into `input`, writing the result to `output`.
///
/// The wrapped text goes to a temporary file under `scratch_dir` that is
/// removed when this function returns, whatever the outcome. Audio is
/// copied without re-encoding.
pub async fn burn_caption(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    text: &str,
    style: &CaptionStyle,
    scratch_dir: impl AsRef<Path>,
) -> MediaResult<ProcessOutput> {
    if !style.font_file.exists() {
        return Err(MediaError::FontNotFound(style.font_file.clone()));
    }

    let lines = wrap_text(text, style.wrap_width);
    debug!(lines = lines.len(), wrap_width = style.wrap_width, "Wrapped caption text");

    let text_file = tempfile::Builder::new()
        .prefix("text_")
        .suffix(".txt")
        .tempfile_in(scratch_dir.as_ref())?;
    tokio::fs::write(text_file.path(), lines.join("\n")).await?;

    let cmd = FfmpegCommand::new(input, output)
        .video_filter(drawtext_filter(text_file.path(), style))
        .copy_audio();

    runner.run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_reference_scenario() {
        let lines = wrap_text("5 things I wish I knew before killing my plants", 20);
        assert_eq!(
            lines,
            vec!["5 things I wish I", "knew before killing", "my plants"]
        );
    }

    #[test]
    fn test_wrap_empty_input() {
        assert!(wrap_text("", 20).is_empty());
        assert!(wrap_text("   \n\t ", 20).is_empty());
    }

    #[test]
    fn test_wrap_lines_fit_and_rejoin() {
        let samples = [
            "the quick brown fox jumps over the lazy dog",
            "  leading and   irregular\twhitespace\nacross lines ",
            "one",
            "a b c d e f g h i j k l m n o p",
            "fun fact you're probably spending way too much time and money on watering your plants",
            "émojis ünïcödé wörds 🌱🌱🌱 count as chars",
        ];

        for text in samples {
            let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let longest = text
                .split_whitespace()
                .map(|w| w.chars().count())
                .max()
                .unwrap_or(0);

            for width in [longest, longest + 1, longest + 7, 35, 80] {
                if width < longest {
                    continue;
                }
                let lines = wrap_text(text, width);
                for line in &lines {
                    assert!(
                        line.chars().count() <= width,
                        "line {:?} exceeds width {} for {:?}",
                        line,
                        width,
                        text
                    );
                }
                assert_eq!(lines.join(" "), normalized);
            }
        }
    }

    #[test]
    fn test_wrap_long_word_stands_alone() {
        let lines = wrap_text("tiny supercalifragilisticexpialidocious end", 10);
        assert_eq!(
            lines,
            vec!["tiny", "supercalifragilisticexpialidocious", "end"]
        );

        let lines = wrap_text("unbreakablewordhere", 5);
        assert_eq!(lines, vec!["unbreakablewordhere"]);
    }

    #[test]
    fn test_wrap_is_greedy() {
        // "ab cd" fits exactly at 5; "ef" must start a new line.
        assert_eq!(wrap_text("ab cd ef", 5), vec!["ab cd", "ef"]);
    }

    #[test]
    fn test_drawtext_filter() {
        let style = CaptionStyle::overlay("/fonts/Display.ttf");
        let filter = drawtext_filter(Path::new("/tmp/text_1.txt"), &style);
        assert_eq!(
            filter,
            "drawtext=textfile=/tmp/text_1.txt:fontfile=/fonts/Display.ttf:fontsize=36:fontcolor=white:x=(w-text_w)/2:y=(h-text_h)/2:borderw=3:bordercolor=black:text_align=center:line_spacing=16"
        );
    }

    #[test]
    fn test_drawtext_escapes_paths() {
        let style = CaptionStyle::bold("C:\\fonts\\it's.ttf");
        let filter = drawtext_filter(Path::new("/tmp/a:b.txt"), &style);
        assert!(filter.contains(r"textfile=/tmp/a\\:b.txt"));
        assert!(filter.contains(r"fontfile=C\\:\\\\fonts\\\\it\\\'s.ttf"));
        assert!(filter.contains("fontsize=48"));
        assert!(filter.contains("borderw=5"));
    }

    #[test]
    fn test_drawtext_escapes_filtergraph_separators() {
        let style = CaptionStyle::overlay("/fonts/Display.ttf");
        let filter = drawtext_filter(Path::new("/tmp/x,y;[z].txt"), &style);
        assert!(filter.starts_with(r"drawtext=textfile=/tmp/x\,y\;\[z\].txt:fontfile="));
    }

    #[test]
    fn test_style_presets() {
        assert_eq!(CaptionStyle::overlay("f.ttf").wrap_width, 35);
        assert_eq!(CaptionStyle::bold("f.ttf").wrap_width, 20);
        assert_eq!(CaptionStyle::bold("f.ttf").with_wrap_width(12).wrap_width, 12);
    }

    #[tokio::test]
    async fn test_missing_font_is_rejected_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let style = CaptionStyle::overlay(dir.path().join("missing.ttf"));
        let runner = FfmpegRunner::new().with_program("/nonexistent/ffmpeg");

        let err = burn_caption(&runner, "in.mp4", "out.mp4", "hello", &style, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FontNotFound(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
