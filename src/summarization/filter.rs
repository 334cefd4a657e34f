//! Joining policies for per-window model results.
//!
//! Transcription and summarization join their window results differently:
//! transcripts are plain space joins, summaries drop insignificant windows
//! and re-punctuate the seams.

use crate::inference::ChunkOutcome;

/// Join transcription window texts in reading order.
pub fn join_transcript(texts: &[String]) -> String {
    texts.join(" ").trim().to_string()
}

/// Drop insignificant windows and join the survivors into one summary.
///
/// Each surviving chunk loses any trailing periods before the join, so
/// seams between chunks carry exactly one `". "` separator. Returns the
/// joined summary and the surviving chunks in order.
pub fn join_summary(outcomes: &[ChunkOutcome]) -> (String, Vec<String>) {
    let chunks: Vec<String> = outcomes
        .iter()
        .filter_map(|outcome| outcome.significant_text().map(str::to_string))
        .collect();

    let summary = chunks
        .iter()
        .map(|chunk| chunk.trim_end_matches('.'))
        .collect::<Vec<_>>()
        .join(". ");

    (summary, chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(raw: &[&str]) -> Vec<ChunkOutcome> {
        raw.iter().map(|r| ChunkOutcome::from_model_output(r)).collect()
    }

    #[test]
    fn test_sentinel_windows_are_dropped() {
        let (summary, chunks) = join_summary(&outcomes(&["a", "0", "b"]));
        assert_eq!(summary, "a. b");
        assert_eq!(chunks, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_trailing_periods_collapse_at_seams() {
        let (summary, _) = join_summary(&outcomes(&[
            "The lecture opens with recursion.",
            "Tail calls are discussed.",
        ]));
        assert_eq!(summary, "The lecture opens with recursion. Tail calls are discussed");
    }

    #[test]
    fn test_all_windows_insignificant_yields_empty_summary() {
        let (summary, chunks) = join_summary(&outcomes(&["0", "0"]));
        assert!(summary.is_empty());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_surviving_chunks_keep_their_punctuation() {
        // Only the join strips trailing periods; the chunk list keeps the
        // model output as produced.
        let (_, chunks) = join_summary(&outcomes(&["First point.", "0", "Second point."]));
        assert_eq!(chunks, vec!["First point.".to_string(), "Second point.".to_string()]);
    }

    #[test]
    fn test_transcript_join_uses_spaces() {
        let texts = vec!["hello".to_string(), "world".to_string()];
        assert_eq!(join_transcript(&texts), "hello world");
    }

    #[test]
    fn test_transcript_join_trims_ends() {
        let texts = vec!["".to_string(), "only tail spoke".to_string()];
        assert_eq!(join_transcript(&texts), "only tail spoke");
    }
}
