//! Output normalization: raw capture text to comparable payload lines.

/// Split `raw` on line boundaries, trim each line, and drop the first
/// `header_lines` lines (tool banner). Fewer lines than the header yields an
/// empty payload, which is a legitimate "no output" result.
pub fn normalize(raw: &str, header_lines: usize) -> Vec<String> {
    raw.lines()
        .skip(header_lines)
        .map(|line| line.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Capture text with a blank banner, for re-normalizing a payload.
    fn to_text(lines: &[String], header_lines: usize) -> String {
        let mut text = "\n".repeat(header_lines);
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    #[test]
    fn skips_banner_and_trims() {
        let raw = "====> PARSING FILE t1.decaf USING PARSER B\n====> TAC --> t1.tac\n  6  \n3.0\r\n";
        assert_eq!(normalize(raw, 2), strings(&["6", "3.0"]));
    }

    #[test]
    fn short_capture_is_empty_payload() {
        assert!(normalize("", 2).is_empty());
        assert!(normalize("only banner\n", 2).is_empty());
        assert!(normalize("banner\nbanner\n", 2).is_empty());
    }

    #[test]
    fn interior_blank_lines_are_kept() {
        assert_eq!(normalize("a\nb\n1\n\n2\n", 2), strings(&["1", "", "2"]));
    }

    #[test]
    fn renormalizing_is_stable() {
        let raw = "h1\nh2\n  100 \n\t0\n WARNING: Type mismatch in if statement. \n";
        let once = normalize(raw, 2);
        let twice = normalize(&to_text(&once, 2), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn zero_header_keeps_everything() {
        assert_eq!(normalize("x\ny", 0), strings(&["x", "y"]));
    }
}
