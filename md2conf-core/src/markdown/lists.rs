//! Blank-line insertion in front of `*` bullet lists.
//!
//! Authors routinely start a bulleted list on the line right after a
//! paragraph. Some Markdown dialects then read the `*` markers as emphasis
//! instead of list items. This pass inserts a blank line in front of every
//! such list run before the text reaches the parser.

use regex::Regex;
use std::sync::OnceLock;

static LIST_ITEM_REGEX: OnceLock<Regex> = OnceLock::new();

fn list_item_regex() -> &'static Regex {
    // A single `*` marker followed by non-`*` content; `**bold**` never matches.
    LIST_ITEM_REGEX.get_or_init(|| Regex::new(r"^\s*\*[^*]*$").unwrap())
}

/// Whether a line (without its line terminator) looks like a `*` list item.
pub fn is_probable_list_item(line: &str) -> bool {
    list_item_regex().is_match(line)
}

/// Insert a blank line before each `*` list run that directly follows a
/// non-blank, non-list line.
///
/// Lines inside fenced or indented code are left alone. Applying the fix to
/// its own output changes nothing.
pub fn fix_list_continuations(source: &str) -> String {
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let code = code_lines(&lines);

    let mut reversed: Vec<&str> = Vec::with_capacity(lines.len() + 4);
    let mut next_is_list = false;
    let mut inserted = 0usize;

    for (idx, line) in lines.iter().enumerate().rev() {
        let content = strip_line_ending(line);
        let is_list = !code[idx] && is_probable_list_item(content);

        if next_is_list && !is_list && !code[idx] && !content.trim().is_empty() {
            // `line` has a successor, so it always carries a terminator.
            reversed.push(line_ending(line));
            inserted += 1;
        }

        reversed.push(line);
        next_is_list = is_list;
    }

    if inserted > 0 {
        tracing::debug!("Inserted {} blank line(s) before list runs", inserted);
    }

    reversed.reverse();
    reversed.concat()
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Mark lines belonging to fenced or indented code.
fn code_lines(lines: &[&str]) -> Vec<bool> {
    let mut mask = fenced_lines(lines);

    // An indented block starts after a blank line (it cannot interrupt a
    // paragraph) and runs until a non-blank line with less indentation.
    let mut previous_blank = true;
    let mut in_block = false;
    for (idx, line) in lines.iter().enumerate() {
        let content = strip_line_ending(line);
        if mask[idx] {
            previous_blank = false;
            in_block = false;
            continue;
        }
        if content.trim().is_empty() {
            previous_blank = true;
            continue;
        }

        in_block = indent_width(content) >= 4 && (in_block || previous_blank);
        mask[idx] = in_block;
        previous_blank = false;
    }

    mask
}

/// Leading indentation in columns, tabs advancing to the next multiple of 4.
fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// Mark lines belonging to fenced code regions, fences included.
fn fenced_lines(lines: &[&str]) -> Vec<bool> {
    let mut mask = Vec::with_capacity(lines.len());
    let mut open: Option<(char, usize)> = None;

    for line in lines {
        let trimmed = strip_line_ending(line).trim_start();
        let fence = fence_marker(trimmed);

        match (open, fence) {
            (None, Some(marker)) => {
                open = Some(marker);
                mask.push(true);
            }
            (Some((ch, len)), Some((fence_ch, fence_len)))
                if ch == fence_ch
                    && fence_len >= len
                    && trimmed[fence_len..].trim().is_empty() =>
            {
                open = None;
                mask.push(true);
            }
            (Some(_), _) => mask.push(true),
            (None, None) => mask.push(false),
        }
    }

    mask
}

/// Fence character and run length, if the line opens or closes a fence.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let ch = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_blank_line_before_list() {
        let input = "Shopping:\n* eggs\n* milk\n";
        assert_eq!(fix_list_continuations(input), "Shopping:\n\n* eggs\n* milk\n");
    }

    #[test]
    fn test_already_separated_list_unchanged() {
        let input = "Shopping:\n\n* eggs\n* milk\n\nDone.\n";
        assert_eq!(fix_list_continuations(input), input);
    }

    #[test]
    fn test_bold_is_not_a_list() {
        let input = "Intro\n**bold** text\n";
        assert_eq!(fix_list_continuations(input), input);
    }

    #[test]
    fn test_indented_items_count() {
        let input = "Text\n  * nested\n";
        assert_eq!(fix_list_continuations(input), "Text\n\n  * nested\n");
    }

    #[test]
    fn test_multiple_runs() {
        let input = "a\n* 1\nb\n* 2\n";
        assert_eq!(fix_list_continuations(input), "a\n\n* 1\nb\n\n* 2\n");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Shopping:\n* eggs\n* milk\n",
            "a\n* 1\nb\n* 2",
            "no lists here\n",
            "",
            "* only\n* list\n",
            "x\r\n* crlf\r\n",
        ];
        for input in inputs {
            let once = fix_list_continuations(input);
            assert_eq!(fix_list_continuations(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_preserves_crlf() {
        assert_eq!(fix_list_continuations("x\r\n* crlf\r\n"), "x\r\n\r\n* crlf\r\n");
    }

    #[test]
    fn test_missing_trailing_newline_preserved() {
        assert_eq!(fix_list_continuations("a\n* b"), "a\n\n* b");
    }

    #[test]
    fn test_fenced_code_untouched() {
        let input = "```\nlet x = a\n* b\n```\n";
        assert_eq!(fix_list_continuations(input), input);

        let tilde = "~~~~\ncode\n* not a list\n~~~\nstill code\n~~~~\n";
        assert_eq!(fix_list_continuations(tilde), tilde);
    }

    #[test]
    fn test_indented_code_untouched() {
        let input = "P\n\n    code\n    * x\n";
        assert_eq!(fix_list_continuations(input), input);

        let tabbed = "P\n\n\tlet a = b\n\t* c\n\nAfter\n* real item\n";
        assert_eq!(
            fix_list_continuations(tabbed),
            "P\n\n\tlet a = b\n\t* c\n\nAfter\n\n* real item\n"
        );
    }

    #[test]
    fn test_indented_paragraph_continuation_is_not_code() {
        let input = "Para\n    * item\n";
        let fixed = fix_list_continuations(input);
        assert_eq!(fixed, "Para\n\n    * item\n");
        assert_eq!(fix_list_continuations(&fixed), fixed);
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 4);
        assert_eq!(indent_width("  \tx"), 4);
        assert_eq!(indent_width("x"), 0);
    }

    #[test]
    fn test_is_probable_list_item() {
        assert!(is_probable_list_item("* item"));
        assert!(is_probable_list_item("   * item"));
        assert!(!is_probable_list_item("**bold**"));
        assert!(!is_probable_list_item("*emphasis*"));
        assert!(!is_probable_list_item("- dash"));
        assert!(!is_probable_list_item("plain"));
    }
}
