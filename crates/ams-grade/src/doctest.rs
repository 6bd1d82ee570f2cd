//! Doctest transcripts: `>>>` prompts, `...` continuations and expected
//! output.

use ams_core::errors::{ErrorInfo, GradeError};
use serde::{Deserialize, Serialize};

/// One prompt of a transcript together with the output it must print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Statement source, continuation lines joined with `\n`.
    pub source: String,
    /// Expected output, possibly empty.
    pub expected: String,
    /// Comment prompts preceding the statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn doctest_error(code: &str, message: impl Into<String>, line: usize) -> GradeError {
    GradeError::Syntax(ErrorInfo::new(code, message).with_context("line", line.to_string()))
}

fn dedent(code: &str) -> Vec<&str> {
    let indent = code
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    code.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect()
}

fn prompt<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    if line == marker {
        return Some("");
    }
    line.strip_prefix(marker)?.strip_prefix(' ')
}

/// Splits a transcript into examples.
///
/// A prompt holding only a `#` comment contributes to the hint of the next
/// example. Expected output runs until a blank line or the next prompt.
pub fn parse(code: &str) -> Result<Vec<Example>, GradeError> {
    let mut examples: Vec<Example> = Vec::new();
    let mut hint: Vec<String> = Vec::new();
    // Whether the last example can still take continuation or output lines.
    let mut open = false;
    for (idx, raw) in dedent(code).into_iter().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        if let Some(source) = prompt(line, ">>>") {
            let trimmed = source.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                let text = trimmed.trim_start_matches('#').trim();
                if !text.is_empty() {
                    hint.push(text.to_string());
                }
                open = false;
                continue;
            }
            examples.push(Example {
                source: source.to_string(),
                expected: String::new(),
                hint: (!hint.is_empty()).then(|| hint.join("\n")),
            });
            hint.clear();
            open = true;
            continue;
        }
        if line.trim().is_empty() {
            open = false;
            continue;
        }
        let current = match examples.last_mut() {
            Some(example) if open => example,
            _ => {
                return Err(doctest_error(
                    "orphan-output",
                    format!("output line {line:?} does not follow a prompt"),
                    line_no,
                ))
            }
        };
        match prompt(line, "...") {
            Some(continuation) if current.expected.is_empty() => {
                current.source.push('\n');
                current.source.push_str(continuation);
            }
            _ => {
                if !current.expected.is_empty() {
                    current.expected.push('\n');
                }
                current.expected.push_str(raw);
            }
        }
    }
    if examples.is_empty() {
        return Err(GradeError::Syntax(ErrorInfo::new(
            "empty-case",
            "transcript contains no statements",
        )));
    }
    Ok(examples)
}

/// Trims trailing whitespace per line and drops blank leading and trailing
/// lines.
pub fn normalize_output(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|line| !line.is_empty());
    let end = lines.iter().rposition(|line| !line.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_prompts_become_hints() {
        let examples = parse(
            r"
            >>> # You haven't changed the value for 'p_est'
            >>> # from its initial state (of ...)
            >>> p_est is not ...
            True
            ",
        )
        .unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].source, "p_est is not ...");
        assert_eq!(examples[0].expected, "True");
        assert_eq!(
            examples[0].hint.as_deref(),
            Some("You haven't changed the value for 'p_est'\nfrom its initial state (of ...)")
        );
    }

    #[test]
    fn assignments_produce_no_output() {
        let examples = parse(">>> x = [1,\n...      2]\n>>> len(x)\n2\n").unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].source, "x = [1,\n     2]");
        assert!(examples[0].expected.is_empty());
        assert_eq!(examples[1].expected, "2");
    }

    #[test]
    fn output_without_prompt_is_rejected() {
        assert_eq!(parse("True\n").unwrap_err().code(), "orphan-output");
        assert_eq!(parse("   \n").unwrap_err().code(), "empty-case");
        assert_eq!(
            parse(">>> 1\n1\n\n2\n").unwrap_err().code(),
            "orphan-output"
        );
    }

    #[test]
    fn normalisation_trims_edges() {
        assert_eq!(normalize_output("\n  True   \n\n"), "  True");
        assert_eq!(normalize_output("a  \nb"), "a\nb");
        assert_eq!(normalize_output(" \n "), "");
    }
}
