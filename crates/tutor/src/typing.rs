//! Chunked "typing" reveal of assistant replies.
//!
//! Purely cosmetic: the reply is split into groups of words and handed to a
//! sink one group at a time with a fixed pause in between. Whitespace is kept
//! with the word it follows, so the chunks always concatenate back to the
//! input text.

use std::time::Duration;

use cbc_tutor_config::TypingConfig;

/// Cursor drawn after a partial render.
pub const CURSOR: &str = "▌";

#[derive(Debug, Clone)]
pub struct TypingEffect {
    enabled: bool,
    words_per_chunk: usize,
    interval: Duration,
}

impl TypingEffect {
    pub fn new(words_per_chunk: usize, interval: Duration) -> Self {
        Self {
            enabled: true,
            words_per_chunk: words_per_chunk.max(1),
            interval,
        }
    }

    /// Emit the whole text at once.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            words_per_chunk: 1,
            interval: Duration::ZERO,
        }
    }

    pub fn from_config(config: &TypingConfig) -> Self {
        if config.enabled {
            Self::new(config.words_per_chunk, config.interval())
        } else {
            Self::disabled()
        }
    }

    /// Split `text` into reveal chunks.
    pub fn chunks(&self, text: &str) -> Vec<String> {
        if !self.enabled {
            return vec![text.to_string()];
        }
        words_with_trailing_space(text)
            .chunks(self.words_per_chunk)
            .map(|group| group.concat())
            .collect()
    }

    /// Progressive partial renders; every frame but the last ends with the cursor.
    pub fn frames(&self, text: &str) -> Vec<String> {
        let chunks = self.chunks(text);
        let last = chunks.len().saturating_sub(1);
        let mut shown = String::with_capacity(text.len());
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                shown.push_str(chunk);
                if i == last {
                    shown.clone()
                } else {
                    format!("{shown}{CURSOR}")
                }
            })
            .collect()
    }

    /// Feed chunks to `sink`, pausing between them.
    pub async fn play<F: FnMut(&str)>(&self, text: &str, mut sink: F) {
        for (i, chunk) in self.chunks(text).iter().enumerate() {
            if i > 0 && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
            sink(chunk);
        }
    }
}

impl Default for TypingEffect {
    fn default() -> Self {
        Self::from_config(&TypingConfig::default())
    }
}

/// Split into words, each carrying the whitespace that follows it.
/// Leading whitespace stays with the first word.
fn words_with_trailing_space(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    let mut seen_word = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if in_space && seen_word {
            pieces.push(&text[start..i]);
            start = i;
        }
        in_space = false;
        seen_word = true;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "Fractions show parts of a whole.\n\nFor example, half a chapati is 1/2.";

    #[test]
    fn chunks_group_five_words() {
        let effect = TypingEffect::new(5, Duration::from_millis(50));
        let chunks = effect.chunks("one two three four five six seven");
        assert_eq!(chunks, vec!["one two three four five ", "six seven"]);
    }

    #[test]
    fn chunks_reassemble_exactly() {
        let effect = TypingEffect::new(3, Duration::ZERO);
        assert_eq!(effect.chunks(REPLY).concat(), REPLY);
        assert_eq!(effect.chunks("  leading space").concat(), "  leading space");
    }

    #[test]
    fn empty_text_has_no_chunks() {
        let effect = TypingEffect::new(5, Duration::ZERO);
        assert!(effect.chunks("").is_empty());
        assert!(effect.frames("").is_empty());
    }

    #[test]
    fn frames_show_cursor_until_last() {
        let effect = TypingEffect::new(2, Duration::ZERO);
        let frames = effect.frames("a b c d e");
        assert_eq!(frames, vec!["a b ▌", "a b c d ▌", "a b c d e"]);
    }

    #[test]
    fn disabled_effect_emits_whole_text() {
        let effect = TypingEffect::from_config(&TypingConfig {
            enabled: false,
            ..TypingConfig::default()
        });
        assert_eq!(effect.chunks(REPLY), vec![REPLY.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn play_paces_chunks() {
        let effect = TypingEffect::new(5, Duration::from_millis(50));
        let text = "one two three four five six seven eight nine ten eleven";
        let start = tokio::time::Instant::now();

        let mut received = Vec::new();
        effect.play(text, |chunk| received.push(chunk.to_string())).await;

        assert_eq!(received.len(), 3);
        assert_eq!(received.concat(), text);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(150));
    }
}
