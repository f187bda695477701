//! Text rendering of a changelog.

use super::model::Changelog;

const MIN_WIDTH: usize = 12;
const PADDING: usize = 3;

/// Render a changelog as one table per change
///
/// ```text
/// On: *
/// Field          | From    | To
/// Spec.Apps[x]   | <nil>   | {...}
/// ```
pub fn render(changelog: &Changelog) -> String {
    let mut out = String::new();

    for change in changelog {
        out.push_str(&format!("On: {}\n", change.context));

        let mut rows: Vec<[&str; 3]> = vec![["Field", "From", "To"]];
        rows.extend(
            change
                .diff
                .iter()
                .map(|d| [d.field.as_str(), d.from.as_str(), d.to.as_str()]),
        );

        let width = |col: usize| {
            rows.iter()
                .map(|r| r[col].chars().count() + 1)
                .max()
                .unwrap_or(0)
                .saturating_add(PADDING)
                .max(MIN_WIDTH)
        };
        let (w0, w1) = (width(0), width(1));

        for [field, from, to] in &rows {
            out.push_str(&format!(
                "{:<w0$}|{:<w1$}| {}\n",
                field,
                format!(" {}", from),
                to,
                w0 = w0,
                w1 = w1
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::{Change, Difference, Kind, Operation};

    #[test]
    fn test_empty_changelog_renders_nothing() {
        assert_eq!(render(&Changelog::default()), "");
    }

    #[test]
    fn test_rows_are_aligned() {
        let mut change = Change::new("*");
        change.push(Difference {
            field: "Spec.Apps[x]".to_string(),
            from: "<nil>".to_string(),
            to: "{...}".to_string(),
            kind: Kind::APP,
            name: "x".to_string(),
            operation: Operation::CREATE,
        });
        let text = render(&Changelog(vec![change]));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "On: *");
        assert!(lines[1].starts_with("Field"));
        assert!(lines[2].starts_with("Spec.Apps[x]"));
        assert_eq!(lines[1].find('|'), lines[2].find('|'));
        assert!(lines[2].ends_with("| {...}"));
    }
}
