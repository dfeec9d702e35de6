use anyhow::{Context, Result};
use regex::Regex;

/// Reduces text to a canonical phonetic, symbol-free, lowercase form so that
/// recognition noise and authoritative-text formatting differences cancel out.
///
/// Applied identically to recognized segment text and authoritative lyric
/// lines; the comparison downstream only works because both sides go through
/// the same folding. Construct once and pass by reference.
pub struct TextNormalizer {
    fullwidth_symbols: Regex,
    ascii_symbols: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    /// Fails closed: a normalizer that silently skipped a step would corrupt
    /// every downstream comparison.
    pub fn new() -> Result<Self> {
        // Touch the reading dictionary once so the first real call is not
        // the one that pays for loading it.
        let _ = kakasi::convert("音");
        Ok(Self {
            fullwidth_symbols: Regex::new("[！-／：-＠［-｀｛-～、。・「」『』（）]")
                .context("compiling full-width symbol pattern")?,
            ascii_symbols: Regex::new(r"[!-/:-@\[-`{-~]")
                .context("compiling ASCII symbol pattern")?,
            whitespace: Regex::new(r"\s+").context("compiling whitespace pattern")?,
        })
    }

    /// Phonetic folding to hiragana, then symbol stripping (full-width and
    /// ASCII variants), then whitespace deletion, then lowercasing.
    pub fn normalize(&self, text: &str) -> String {
        let folded = kakasi::convert(text).hiragana;
        let folded = self.fullwidth_symbols.replace_all(&folded, "");
        let folded = self.ascii_symbols.replace_all(&folded, "");
        let folded = self.whitespace.replace_all(&folded, "");
        folded.to_lowercase()
    }
}
