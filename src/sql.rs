// colablint - Embedded SQL Literal Rewriting
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Finds `<var> = """..."""` in a cell, hands the literal body to the SQL
// formatter, and splices the result back. A narrow string transform:
// one assignment, one literal, no attempt to understand the surrounding code.

use regex::Regex;

/// Quoting style of the matched literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    TripleDouble,
    TripleSingle,
    Double,
    Single,
}

impl Quote {
    pub fn delimiter(self) -> &'static str {
        match self {
            Quote::TripleDouble => "\"\"\"",
            Quote::TripleSingle => "'''",
            Quote::Double => "\"",
            Quote::Single => "'",
        }
    }

    /// Multi-line bodies need a triple-quoted literal
    pub fn widened(self) -> Quote {
        match self {
            Quote::TripleDouble | Quote::Double => Quote::TripleDouble,
            Quote::TripleSingle | Quote::Single => Quote::TripleSingle,
        }
    }
}

/// One located assignment, borrowed from the cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlAssignment<'a> {
    pub prefix: &'a str,
    pub var_name: &'a str,
    /// String prefix letters such as `f` or `rb`
    pub string_prefix: &'a str,
    pub quote: Quote,
    pub body: &'a str,
    pub suffix: &'a str,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn assignment_pattern(var_name: &str) -> Option<Regex> {
    if !is_identifier(var_name) {
        return None;
    }
    let pattern = format!(
        r#"(?s)^(?P<prefix>.*?)\b{var}\s*=\s*(?P<sp>[rRbBfFuU]{{0,2}})(?:"""(?P<tdq>.*?)"""|'''(?P<tsq>.*?)'''|"(?P<dq>.*?)"|'(?P<sq>.*?)')(?P<suffix>.*)$"#,
        var = regex::escape(var_name)
    );
    Regex::new(&pattern).ok()
}

/// Locate the first string-literal assignment to `var_name`.
/// Returns None when the name is not an identifier or nothing matches.
pub fn find_assignment<'a>(cell: &'a str, var_name: &'a str) -> Option<SqlAssignment<'a>> {
    let re = assignment_pattern(var_name)?;
    let caps = re.captures(cell)?;

    let (quote, body) = [
        ("tdq", Quote::TripleDouble),
        ("tsq", Quote::TripleSingle),
        ("dq", Quote::Double),
        ("sq", Quote::Single),
    ]
    .into_iter()
    .find_map(|(group, quote)| caps.name(group).map(|m| (quote, m.as_str())))?;

    Some(SqlAssignment {
        prefix: caps.name("prefix").map_or("", |m| m.as_str()),
        var_name,
        string_prefix: caps.name("sp").map_or("", |m| m.as_str()),
        quote,
        body,
        suffix: caps.name("suffix").map_or("", |m| m.as_str()),
    })
}

impl SqlAssignment<'_> {
    /// Rebuild the cell with `formatted_sql` as the literal body
    pub fn reassemble(&self, formatted_sql: &str) -> String {
        let quote = self.quote.widened().delimiter();
        format!(
            "{}{} = {}{}\n{}\n{}{}",
            self.prefix,
            self.var_name,
            self.string_prefix,
            quote,
            formatted_sql.trim(),
            quote,
            self.suffix
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
