//! Parser for plain-text inventory uploads: one card per line, in the form
//! `<quantity> <name> (<edition>) <id>`.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line is empty")]
    Empty,
    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),
    #[error("missing card name")]
    MissingName,
    #[error("missing '(<edition>)' segment")]
    MissingEdition,
    #[error("missing collector id after edition")]
    MissingCollectorId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLine {
    pub quantity: i32,
    pub name: String,
    pub edition: String,
    pub collector_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineError {
    pub line: usize,
    pub reason: String,
}

/// A successfully parsed line, tagged with its 1-based position in the file
/// so later stages can report against the original upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub line: usize,
    pub entry: InventoryLine,
}

#[derive(Debug, Default)]
pub struct InventoryParse {
    pub lines: Vec<NumberedLine>,
    pub errors: Vec<LineError>,
}

/// Parses a single `<quantity> <name> (<edition>) <id>` line.
pub fn parse_line(raw: &str) -> Result<InventoryLine, ParseError> {
    let line = raw.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (first, rest) = match line.split_once(char::is_whitespace) {
        Some(parts) => parts,
        None => return Err(ParseError::MissingName),
    };
    let quantity: i32 = first
        .parse()
        .map_err(|_| ParseError::InvalidQuantity(first.to_string()))?;
    if quantity < 0 {
        return Err(ParseError::InvalidQuantity(first.to_string()));
    }

    // The name itself may contain parentheses; the edition is the last
    // parenthesised segment.
    let open = rest.rfind('(').ok_or(ParseError::MissingEdition)?;
    let close = rest[open..]
        .find(')')
        .map(|i| open + i)
        .ok_or(ParseError::MissingEdition)?;

    let name = rest[..open].trim();
    if name.is_empty() {
        return Err(ParseError::MissingName);
    }

    let edition = rest[open + 1..close].trim();
    if edition.is_empty() {
        return Err(ParseError::MissingEdition);
    }

    let collector_id = rest[close + 1..].trim();
    if collector_id.is_empty() || collector_id.contains(char::is_whitespace) {
        return Err(ParseError::MissingCollectorId);
    }

    Ok(InventoryLine {
        quantity,
        name: name.to_string(),
        edition: edition.to_string(),
        collector_id: collector_id.to_string(),
    })
}

/// Single pass over an uploaded file. Blank lines are skipped silently;
/// malformed lines are reported with their 1-based line number and do not
/// abort the rest of the file.
pub fn parse_inventory(text: &str) -> InventoryParse {
    let mut parse = InventoryParse::default();

    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        match parse_line(raw) {
            Ok(entry) => parse.lines.push(NumberedLine {
                line: index + 1,
                entry,
            }),
            Err(reason) => parse.errors.push(LineError {
                line: index + 1,
                reason: reason.to_string(),
            }),
        }
    }

    parse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_line() {
        let parsed = parse_line("4 Lightning Bolt (M10) 146").unwrap();
        assert_eq!(
            parsed,
            InventoryLine {
                quantity: 4,
                name: "Lightning Bolt".to_string(),
                edition: "M10".to_string(),
                collector_id: "146".to_string(),
            }
        );
    }

    #[test]
    fn name_may_contain_parentheses() {
        let parsed = parse_line("1 Borrowing 100,000 Arrows (reprint) (CHK) 60").unwrap();
        assert_eq!(parsed.name, "Borrowing 100,000 Arrows (reprint)");
        assert_eq!(parsed.edition, "CHK");
    }

    #[test]
    fn rejects_bad_quantity() {
        assert_eq!(
            parse_line("four Lightning Bolt (M10) 146"),
            Err(ParseError::InvalidQuantity("four".to_string()))
        );
        assert_eq!(
            parse_line("-1 Lightning Bolt (M10) 146"),
            Err(ParseError::InvalidQuantity("-1".to_string()))
        );
    }

    #[test]
    fn rejects_missing_edition() {
        assert_eq!(
            parse_line("4 Lightning Bolt 146"),
            Err(ParseError::MissingEdition)
        );
        assert_eq!(
            parse_line("4 Lightning Bolt () 146"),
            Err(ParseError::MissingEdition)
        );
    }

    #[test]
    fn rejects_missing_collector_id() {
        assert_eq!(
            parse_line("4 Lightning Bolt (M10)"),
            Err(ParseError::MissingCollectorId)
        );
        assert_eq!(
            parse_line("4 Lightning Bolt (M10) 146 extra"),
            Err(ParseError::MissingCollectorId)
        );
    }

    #[test]
    fn rejects_quantity_only_line() {
        assert_eq!(parse_line("4"), Err(ParseError::MissingName));
    }

    #[test]
    fn file_parse_collects_errors_with_line_numbers() {
        let text = "4 Lightning Bolt (M10) 146\n\nbroken line\n2 Counterspell (7ED) 67\n";
        let parse = parse_inventory(text);

        assert_eq!(parse.lines.len(), 2);
        assert_eq!(parse.lines[0].line, 1);
        assert_eq!(parse.lines[1].line, 4);
        assert_eq!(parse.lines[1].entry.name, "Counterspell");
        assert_eq!(parse.errors.len(), 1);
        assert_eq!(parse.errors[0].line, 3);
        assert!(parse.errors[0].reason.contains("quantity"));
    }
}
