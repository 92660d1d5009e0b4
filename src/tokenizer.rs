/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Splits a source line into fields, keeping the column span of each one.

/// One field of a line: its text and the inclusive column range it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

fn is_delimiter(c: char) -> bool {
    c == ' ' || c == '\t' || c == ','
}

/// Breaks a line into its fields. Spaces, tabs and commas separate fields and
/// belong to none of them; the checker recovers comma counts from the gaps
/// between field spans. A quoted string literal is kept as a single field
/// running from the first `"` to the last `"` on the line. Never fails; an
/// empty line yields no fields.
pub fn tokenize(line: &str) -> Vec<Field> {
    let chars: Vec<char> = line.chars().collect();
    let mut fields = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        if is_delimiter(chars[index]) {
            index += 1;
            continue;
        }
        let start = index;
        let end = if chars[index] == '"' {
            match last_quote_after(&chars, index) {
                Some(last) => last,
                // unterminated literal, take the rest of the line
                None => chars.len() - 1,
            }
        } else {
            let mut stop = index;
            while stop < chars.len() && !is_delimiter(chars[stop]) {
                stop += 1;
            }
            stop - 1
        };
        fields.push(Field {
            text: chars[start..=end].iter().collect(),
            start,
            end,
        });
        index = end + 1;
    }
    fields
}

fn last_quote_after(chars: &[char], from: usize) -> Option<usize> {
    (from + 1..chars.len()).rev().find(|&i| chars[i] == '"')
}

/// A line with no alphabetic character carries nothing to assemble.
pub fn is_empty_line(line: &str) -> bool {
    !line.chars().any(|c| c.is_alphabetic())
}

/// The characters of the line between two columns, end exclusive.
pub fn between(line: &str, start: usize, end: usize) -> String {
    line.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty_line() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t ").is_empty());
    }

    #[test]
    fn test_tokenize_simple_fields() {
        let fields = tokenize("mov @r1, @r2");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].text, "mov");
        assert_eq!((fields[0].start, fields[0].end), (0, 2));
        assert_eq!(fields[1].text, "@r1");
        assert_eq!((fields[1].start, fields[1].end), (4, 6));
        assert_eq!(fields[2].text, "@r2");
        assert_eq!((fields[2].start, fields[2].end), (9, 11));
    }

    #[test]
    fn test_tokenize_commas_are_delimiters() {
        let fields = tokenize("a,,b");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].text, "a");
        assert_eq!(fields[1].text, "b");
        assert_eq!(fields[1].start, 3);
    }

    #[test]
    fn test_tokenize_string_literal_is_one_field() {
        let fields = tokenize(".string \"ab, cd ef\"");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].text, "\"ab, cd ef\"");
        assert_eq!((fields[1].start, fields[1].end), (8, 18));
    }

    #[test]
    fn test_tokenize_leading_whitespace() {
        let fields = tokenize("   stop");
        assert_eq!(fields.len(), 1);
        assert_eq!((fields[0].start, fields[0].end), (3, 6));
    }

    #[test]
    fn test_is_empty_line() {
        assert!(is_empty_line(""));
        assert!(is_empty_line(" \t,, 123 "));
        assert!(!is_empty_line("stop"));
    }

    #[test]
    fn test_between() {
        assert_eq!(between("mov, @r1", 3, 5), ", ");
        assert_eq!(between("ab", 2, 1), "");
    }
}
