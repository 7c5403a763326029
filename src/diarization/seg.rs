//! Segment-description parsing.
//!
//! The diarization binary emits whitespace-separated lines. The fields the
//! pipeline cares about: item id (0), start in hundredths of a second (2),
//! duration in hundredths of a second (3), gender code (4), speaker id (7).

use super::DiarizationTurn;

/// Parse a segment description into ordered speaker turns.
///
/// Lines belonging to other items, comments, and malformed records are
/// skipped. Turns are sorted by raw start offset; ordinals are the 1-based
/// positions in that order.
pub fn parse_seg(contents: &str, item_id: &str) -> Vec<DiarizationTurn> {
    let mut turns: Vec<DiarizationTurn> = Vec::new();

    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 || fields[0] != item_id {
            continue;
        }
        let (Ok(start_cs), Ok(duration_cs)) =
            (fields[2].parse::<u64>(), fields[3].parse::<u64>())
        else {
            continue;
        };
        if duration_cs == 0 {
            continue;
        }
        turns.push(DiarizationTurn {
            ordinal: 0,
            speaker: format!("{}-{}", fields[4], fields[7]),
            start_cs,
            end_cs: start_cs + duration_cs,
        });
    }

    turns.sort_by_key(|t| t.start_cs);
    for (index, turn) in turns.iter_mut().enumerate() {
        turn.ordinal = index + 1;
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
;; cluster S0
meeting 1 240 310 M S U S0
meeting 1 0 150 F S U S1
other-item 1 500 100 M S U S2
meeting 1 bad 150 F S U S1
meeting 1 700 0 M S U S0
";

    #[test]
    fn test_parses_and_sorts_by_start() {
        let turns = parse_seg(SAMPLE, "meeting");
        assert_eq!(turns.len(), 2);

        assert_eq!(turns[0].ordinal, 1);
        assert_eq!(turns[0].speaker, "F-S1");
        assert_eq!(turns[0].start_cs, 0);
        assert_eq!(turns[0].end_cs, 150);

        assert_eq!(turns[1].ordinal, 2);
        assert_eq!(turns[1].speaker, "M-S0");
        assert!((turns[1].start_seconds() - 2.4).abs() < 1e-9);
        assert!((turns[1].end_seconds() - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_filters_other_items_and_malformed_lines() {
        let turns = parse_seg(SAMPLE, "other-item");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].speaker, "M-S2");
    }

    #[test]
    fn test_gaps_are_allowed() {
        let contents = "x 1 0 100 M S U S0\nx 1 500 100 M S U S0\n";
        let turns = parse_seg(contents, "x");
        assert_eq!(turns.len(), 2);
        // Non-contiguous turns keep their raw offsets.
        assert_eq!(turns[0].end_cs, 100);
        assert_eq!(turns[1].start_cs, 500);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_seg("", "meeting").is_empty());
    }
}
