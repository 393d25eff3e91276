//! Handles all user-facing output for the CLI.
//!
//! Verdict reports, the got/expected diff for failures, the catalog listing
//! and the JSON report all live here so every command prints the same way.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::catalog::FixtureCatalog;
use crate::compare::{Outcome, Verdict};
use crate::suite::SuiteSummary;

/// Color choice for stdout: never when disabled or when stdout is not a terminal.
pub fn color_choice(no_color: bool) -> ColorChoice {
    if no_color || !atty::is(atty::Stream::Stdout) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

pub fn stdout(no_color: bool) -> StandardStream {
    StandardStream::stdout(color_choice(no_color))
}

// ============================================================================
// VERDICT REPORT
// ============================================================================

/// Print every verdict in order followed by the summary line.
pub fn print_report(writer: &mut impl WriteColor, verdicts: &[Verdict]) -> io::Result<()> {
    for verdict in verdicts {
        print_verdict(writer, verdict)?;
    }
    print_summary(writer, &SuiteSummary::from_verdicts(verdicts))
}

pub fn print_verdict(writer: &mut impl WriteColor, verdict: &Verdict) -> io::Result<()> {
    let (label, color) = match verdict.outcome {
        Outcome::Passed => ("PASS", Color::Green),
        Outcome::Failed => ("FAIL", Color::Red),
        Outcome::Errored => ("ERROR", Color::Magenta),
        Outcome::Skipped => ("SKIP", Color::Yellow),
    };
    writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(writer, "{}", label)?;
    writer.reset()?;

    match verdict.outcome {
        Outcome::Passed => writeln!(writer, ": {}", verdict.fixture_name),
        Outcome::Skipped => writeln!(writer, ": {} ({})", verdict.fixture_name, verdict.message),
        Outcome::Errored => {
            writeln!(writer, ": {}", verdict.fixture_name)?;
            writeln!(writer, "  {}", verdict.message)
        }
        Outcome::Failed => {
            writeln!(writer, ": {}", verdict.fixture_name)?;
            for line in verdict.message.lines() {
                writeln!(writer, "  {}", line)?;
            }
            writeln!(writer, "  Diff:")?;
            print_diff(writer, &verdict.expected, &verdict.actual)
        }
    }
}

/// Line diff of expected (`-`) against actual (`+`).
pub fn print_diff(
    writer: &mut impl WriteColor,
    expected: &[String],
    actual: &[String],
) -> io::Result<()> {
    let changeset = Changeset::new(&expected.join("\n"), &actual.join("\n"), "\n");
    for diff in &changeset.diffs {
        let (sign, color, text) = match diff {
            Difference::Same(x) => (' ', None, x),
            Difference::Add(x) => ('+', Some(Color::Green), x),
            Difference::Rem(x) => ('-', Some(Color::Red), x),
        };
        writer.set_color(ColorSpec::new().set_fg(color))?;
        for line in text.split('\n') {
            writeln!(writer, "  {}{}", sign, line)?;
        }
        writer.reset()?;
    }
    Ok(())
}

pub fn print_summary(writer: &mut impl WriteColor, summary: &SuiteSummary) -> io::Result<()> {
    writeln!(writer)?;
    write!(writer, "Test summary: total {}, ", summary.total())?;
    let parts = [
        ("passed", Color::Green, summary.passed),
        ("failed", Color::Red, summary.failed),
        ("errored", Color::Magenta, summary.errored),
        ("skipped", Color::Yellow, summary.skipped),
    ];
    for (i, (label, color, count)) in parts.iter().enumerate() {
        if i > 0 {
            write!(writer, ", ")?;
        }
        writer.set_color(ColorSpec::new().set_fg(Some(*color)))?;
        write!(writer, "{}", label)?;
        writer.reset()?;
        write!(writer, " {}", count)?;
    }
    writeln!(writer)
}

// ============================================================================
// OTHER OUTPUTS
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    verdicts: &'a [Verdict],
    summary: SuiteSummary,
}

pub fn json_report(verdicts: &[Verdict]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        verdicts,
        summary: SuiteSummary::from_verdicts(verdicts),
    })
}

pub fn print_catalog(writer: &mut impl Write, catalog: &FixtureCatalog) -> io::Result<()> {
    for entry in catalog.iter() {
        let fixture = &entry.fixture;
        write!(
            writer,
            "{:<8} {:<11} {} ({} expected lines)",
            fixture.name,
            fixture.category,
            fixture.stem,
            entry.expected.lines.len()
        )?;
        if entry.skip {
            write!(writer, " [skip]")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use termcolor::Buffer;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn render(verdicts: &[Verdict]) -> String {
        let mut buffer = Buffer::no_color();
        print_report(&mut buffer, verdicts).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn failure_prints_got_and_expected() {
        let verdict = compare("t2", &strings(&["25"]), &strings(&["24"]));
        let text = render(&[verdict]);
        assert!(text.contains("FAIL: t2"));
        assert!(text.contains("got:\t\t25"));
        assert!(text.contains("expected:\t24"));
        assert!(text.contains("  -24"));
        assert!(text.contains("  +25"));
        assert!(text.contains("failed 1"));
    }

    #[test]
    fn pass_and_skip_lines() {
        let pass = compare("t1", &strings(&["6"]), &strings(&["6"]));
        let skip = Verdict::skipped("t2", &strings(&["24"]), "Marked 'skip'".to_string());
        let text = render(&[pass, skip]);
        assert!(text.contains("PASS: t1"));
        assert!(text.contains("SKIP: t2 (Marked 'skip')"));
        assert!(text.contains("total 2, passed 1, failed 0, errored 0, skipped 1"));
    }

    #[test]
    fn json_report_carries_outcomes() {
        let pass = compare("t1", &strings(&["6"]), &strings(&["6"]));
        let json = json_report(&[pass]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["verdicts"][0]["outcome"], "passed");
        assert_eq!(value["summary"]["passed"], 1);
    }

    #[test]
    fn catalog_listing_is_in_order() {
        let mut out = Vec::new();
        print_catalog(&mut out, &FixtureCatalog::builtin()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("basic"));
        assert!(text.contains("warnings"));
    }
}
