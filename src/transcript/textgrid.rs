//! TextGrid interval-tier rendering.
//!
//! Produces the textual annotation document: a fixed header, one
//! `IntervalTier` spanning `[0, duration]`, and one interval per turn. The
//! tier bounds always come from the item's measured duration, whether or
//! not the last turn reaches it.

use std::fmt::Write;

/// One labeled interval on the tier.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub xmin: f64,
    pub xmax: f64,
    pub text: String,
}

/// Render a single-tier TextGrid document.
pub fn render(duration: f64, intervals: &[Interval]) -> String {
    let mut out = String::new();

    out.push_str("File type = \"ooTextFile\"\n");
    out.push_str("Object class = \"TextGrid\"\n\n");
    let _ = writeln!(out, "xmin = 0.0\nxmax = {}", duration);
    out.push_str("tiers? <exists>\nsize = 1\nitem []:\n");
    out.push_str("    item[1]:\n        class = \"IntervalTier\"\n");
    out.push_str("        name = \"default\"\n");
    out.push_str("        xmin = 0.0\n");
    let _ = writeln!(out, "        xmax = {}", duration);
    let _ = writeln!(out, "        intervals: size = {}", intervals.len());

    for (index, interval) in intervals.iter().enumerate() {
        let _ = writeln!(out, "        intervals [{}]", index + 1);
        let _ = writeln!(out, "            xmin = {}", interval.xmin);
        let _ = writeln!(out, "            xmax = {}", interval.xmax);
        let _ = writeln!(
            out,
            "            text = \"{}\"",
            interval.text.replace('"', "\"\"")
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Interval> {
        vec![
            Interval {
                xmin: 0.0,
                xmax: 1.5,
                text: "hello there".into(),
            },
            Interval {
                xmin: 2.4,
                xmax: 5.5,
                text: String::new(),
            },
        ]
    }

    #[test]
    fn test_header_and_tier_bounds() {
        let doc = render(10.0, &sample());
        assert!(doc.starts_with("File type = \"ooTextFile\"\nObject class = \"TextGrid\"\n\n"));
        assert!(doc.contains("xmax = 10\n"));
        assert!(doc.contains("intervals: size = 2\n"));
    }

    #[test]
    fn test_tier_bound_is_item_duration_not_last_turn() {
        // The last turn ends at 5.5 but the tier spans the full recording.
        let doc = render(12.25, &sample());
        assert!(doc.contains("        xmax = 12.25\n"));
        assert!(doc.contains("            xmax = 5.5\n"));
    }

    #[test]
    fn test_intervals_carry_turn_times_and_text() {
        let doc = render(10.0, &sample());
        assert!(doc.contains("        intervals [1]\n            xmin = 0\n            xmax = 1.5\n            text = \"hello there\"\n"));
        assert!(doc.contains("        intervals [2]\n            xmin = 2.4\n            xmax = 5.5\n            text = \"\"\n"));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let intervals = vec![Interval {
            xmin: 0.0,
            xmax: 1.0,
            text: "he said \"hi\"".into(),
        }];
        let doc = render(1.0, &intervals);
        assert!(doc.contains("text = \"he said \"\"hi\"\"\""));
    }
}
