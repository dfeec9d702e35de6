pub mod format;
pub mod normalize;

use anyhow::Result;

use crate::transcribe::result::{RecognizedSegment, WordTiming};
use format::LineBreaker;
use normalize::TextNormalizer;

/// How many segments past the cursor a line may skip over.
const MAX_SEGMENT_SKIP: usize = 5;
/// How many consecutive segments may combine into one lyric line.
const MAX_SEGMENTS_PER_LINE: usize = 4;
/// Candidates at or above this edit-distance ratio are ineligible.
const MAX_DISTANCE_RATIO: f64 = 0.5;

/// One authoritative lyric line with timing taken from the matched segments.
/// `text` is the trusted line (after display formatting), never the
/// recognizer's rendition of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedLine {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
    pub words: Vec<WordTiming>,
}

/// A line the aligner could not place confidently. Carried as a value, not an
/// error: one unplaceable line must not abort the rest of the song.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedLine {
    pub line_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Synced(SyncedLine),
    Unmatched(UnmatchedLine),
}

impl LineOutcome {
    pub fn as_synced(&self) -> Option<&SyncedLine> {
        match self {
            LineOutcome::Synced(line) => Some(line),
            LineOutcome::Unmatched(_) => None,
        }
    }

    pub fn as_unmatched(&self) -> Option<&UnmatchedLine> {
        match self {
            LineOutcome::Synced(_) => None,
            LineOutcome::Unmatched(line) => Some(line),
        }
    }
}

struct WindowMatch {
    distance: usize,
    idx_start: usize,
    idx_end: usize,
}

/// Align authoritative lyric lines to recognized segments.
///
/// Greedy, forward-only: a single cursor walks the segment sequence and never
/// rewinds, so one badly matched line can only affect lines after it. For each
/// line the search considers starting offsets `0..MAX_SEGMENT_SKIP` past the
/// cursor and runs of `1..=MAX_SEGMENTS_PER_LINE` segments, scoring the
/// Levenshtein distance between the normalized line and the normalized
/// concatenated run. The winner is the eligible candidate with the smallest
/// raw distance; ties go to the earliest window in scan order. On a miss the
/// cursor stays put, since the unmatched line's segments may belong to the
/// next line.
///
/// Lines that normalize to the empty string are omitted from the output
/// entirely. Every other line yields exactly one [`LineOutcome`], in input
/// order.
pub fn align_lines(
    normalizer: &TextNormalizer,
    lines: &[String],
    segments: &[RecognizedSegment],
) -> Result<Vec<LineOutcome>> {
    let breaker = LineBreaker::new()?;

    let normalized_lines: Vec<String> = lines.iter().map(|l| normalizer.normalize(l)).collect();
    let normalized_segments: Vec<String> = segments
        .iter()
        .map(|s| normalizer.normalize(&s.text))
        .collect();

    let mut outcomes = Vec::with_capacity(lines.len());
    let mut cursor = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let target = &normalized_lines[i];
        let target_len = target.chars().count();
        if target_len == 0 {
            continue;
        }

        let mut best: Option<WindowMatch> = None;

        for skip in 0..MAX_SEGMENT_SKIP {
            let window_start = cursor + skip;
            if window_start >= segments.len() {
                break;
            }

            let mut combined = String::new();
            let mut combined_len = 0usize;

            for extra in 0..MAX_SEGMENTS_PER_LINE {
                let idx = window_start + extra;
                if idx >= segments.len() {
                    break;
                }
                combined.push_str(&normalized_segments[idx]);
                combined_len += normalized_segments[idx].chars().count();

                if combined_len == 0 {
                    continue;
                }

                let distance = strsim::levenshtein(target, &combined);
                let ratio = distance as f64 / target_len.max(combined_len) as f64;

                // Strict comparisons on both: the ratio gate excludes the 0.5
                // boundary, and the distance tie-break keeps the earliest
                // window found.
                if ratio < MAX_DISTANCE_RATIO
                    && best.as_ref().is_none_or(|b| distance < b.distance)
                {
                    best = Some(WindowMatch {
                        distance,
                        idx_start: window_start,
                        idx_end: idx,
                    });
                }
            }
        }

        match best {
            Some(found) => {
                let mut words = Vec::new();
                for segment in &segments[found.idx_start..=found.idx_end] {
                    words.extend(segment.words.iter().cloned());
                }

                outcomes.push(LineOutcome::Synced(SyncedLine {
                    text: line.clone(),
                    start: segments[found.idx_start].start,
                    end: segments[found.idx_end].end,
                    confidence: 1.0 - found.distance as f64 / target_len as f64,
                    words,
                }));
                cursor = found.idx_end + 1;
            }
            None => {
                outcomes.push(LineOutcome::Unmatched(UnmatchedLine {
                    line_index: i,
                    text: line.clone(),
                }));
            }
        }
    }

    Ok(outcomes
        .into_iter()
        .map(|outcome| match outcome {
            LineOutcome::Synced(mut line) => {
                line.text = breaker.format(&line.text);
                LineOutcome::Synced(line)
            }
            unmatched => unmatched,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: usize, start: f64, end: f64, text: &str) -> RecognizedSegment {
        RecognizedSegment {
            id,
            start,
            end,
            text: text.to_string(),
            confidence: 0.9,
            words: vec![],
        }
    }

    fn word(word: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            word: word.to_string(),
            start,
            end,
            probability: 1.0,
        }
    }

    fn run(lines: &[&str], segments: &[RecognizedSegment]) -> Vec<LineOutcome> {
        let normalizer = TextNormalizer::new().unwrap();
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        align_lines(&normalizer, &lines, segments).unwrap()
    }

    #[test]
    fn clean_match_keeps_timing_and_full_confidence() {
        let outcomes = run(&["hello world"], &[seg(0, 1.0, 2.0, "hello world")]);
        assert_eq!(outcomes.len(), 1);
        let line = outcomes[0].as_synced().expect("should match");
        assert_eq!(line.text, "hello world");
        assert_eq!(line.start, 1.0);
        assert_eq!(line.end, 2.0);
        assert_eq!(line.confidence, 1.0);
        // A segment without word timings must not fabricate any.
        assert!(line.words.is_empty());
    }

    #[test]
    fn combines_consecutive_segments() {
        let outcomes = run(
            &["abcdefgh"],
            &[seg(0, 0.0, 1.0, "abcd"), seg(1, 1.0, 2.0, "efgh")],
        );
        let line = outcomes[0].as_synced().expect("should match");
        assert_eq!(line.start, 0.0);
        assert_eq!(line.end, 2.0);
        assert_eq!(line.confidence, 1.0);
    }

    #[test]
    fn miss_does_not_advance_the_cursor() {
        let outcomes = run(
            &["zzzzzz", "hello world"],
            &[seg(0, 1.0, 2.0, "hello world")],
        );
        assert_eq!(outcomes.len(), 2);
        let missed = outcomes[0].as_unmatched().expect("no segment fits");
        assert_eq!(missed.line_index, 0);
        assert_eq!(missed.text, "zzzzzz");

        // The segment the first line failed against is still available.
        let line = outcomes[1].as_synced().expect("should match from cursor 0");
        assert_eq!(line.start, 1.0);
        assert_eq!(line.end, 2.0);
    }

    #[test]
    fn consumed_segments_are_never_revisited() {
        let outcomes = run(
            &["aaaa", "bbbb", "cccc"],
            &[
                seg(0, 0.0, 1.0, "aaaa"),
                seg(1, 1.0, 2.0, "bbbb"),
                seg(2, 2.0, 3.0, "cccc"),
            ],
        );
        let starts: Vec<f64> = outcomes
            .iter()
            .map(|o| o.as_synced().expect("all lines match").start)
            .collect();
        assert_eq!(starts, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn skips_noise_segments_before_the_match() {
        let outcomes = run(
            &["hello world"],
            &[
                seg(0, 0.0, 0.5, "xxxxx"),
                seg(1, 0.5, 1.0, "yyyyy"),
                seg(2, 1.0, 2.0, "hello world"),
            ],
        );
        let line = outcomes[0].as_synced().expect("should match the real segment");
        assert_eq!(line.start, 1.0);
        assert_eq!(line.confidence, 1.0);
    }

    #[test]
    fn equal_distances_keep_the_earliest_window() {
        let outcomes = run(
            &["abab"],
            &[seg(0, 0.0, 1.0, "abab"), seg(1, 1.0, 2.0, "abab")],
        );
        let line = outcomes[0].as_synced().expect("should match");
        assert_eq!(line.start, 0.0);
        assert_eq!(line.end, 1.0);
    }

    #[test]
    fn ratio_boundary_is_exclusive() {
        // distance 1 over max length 2 is exactly 0.5: not eligible.
        let outcomes = run(&["ab"], &[seg(0, 0.0, 1.0, "a")]);
        assert!(outcomes[0].as_unmatched().is_some());
    }

    #[test]
    fn near_match_scores_partial_confidence() {
        let outcomes = run(&["abcd"], &[seg(0, 0.0, 1.0, "abcx")]);
        let line = outcomes[0].as_synced().expect("should match");
        assert_eq!(line.confidence, 0.75);
    }

    #[test]
    fn words_concatenate_in_segment_order() {
        let mut first = seg(0, 0.0, 1.0, "abcd");
        first.words = vec![word("ab", 0.0, 0.5), word("cd", 0.5, 1.0)];
        let second = seg(1, 1.0, 1.5, "ef");
        let mut third = seg(2, 1.5, 2.0, "gh");
        third.words = vec![word("gh", 1.5, 2.0)];

        let outcomes = run(&["abcdefgh"], &[first, second, third]);
        let line = outcomes[0].as_synced().expect("should match");
        let collected: Vec<&str> = line.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(collected, vec!["ab", "cd", "gh"]);
    }

    #[test]
    fn empty_normalizing_lines_are_omitted() {
        let outcomes = run(
            &["hello world", "!!!", "zzzzzz"],
            &[seg(0, 0.0, 1.0, "hello world")],
        );
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].as_synced().is_some());
        // The silently skipped line keeps indices stable for later lines.
        assert_eq!(outcomes[1].as_unmatched().unwrap().line_index, 2);
    }

    #[test]
    fn no_segments_means_every_line_warns() {
        let outcomes = run(&["first line", "second line"], &[]);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.as_unmatched().is_some()));
    }

    #[test]
    fn matched_text_gets_display_breaks() {
        let outcomes = run(
            &["hello wonderful brilliant world"],
            &[seg(0, 0.0, 3.0, "hello wonderful brilliant world")],
        );
        let line = outcomes[0].as_synced().expect("should match");
        assert_eq!(line.text, "hello\nwonderful\nbrilliant\nworld");
        assert_eq!(line.start, 0.0);
        assert_eq!(line.end, 3.0);
    }

    #[test]
    fn scripts_fold_before_matching() {
        // Authoritative kanji/katakana against a hiragana recognition.
        let outcomes = run(&["ラインの世界"], &[seg(0, 2.0, 4.0, "らいんのせかい")]);
        let line = outcomes[0].as_synced().expect("should match across scripts");
        assert_eq!(line.text, "ラインの世界");
        assert_eq!(line.confidence, 1.0);
    }
}
