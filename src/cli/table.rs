//! Plain-text rendering of record listings.

use clap::ValueEnum;

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Prints `rows` aligned under `headers`.
///
/// In quiet mode the headers are dropped and cells are tab-separated.
pub fn render_table(headers: &[&str], rows: &[Vec<String>], quiet: bool) {
    if quiet {
        for row in rows {
            println!("{}", row.join("\t"));
        }
        return;
    }

    let widths = column_widths(headers, rows);

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in rows {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect()
}

/// Prints `rows` as comma-separated values.
pub fn render_csv(headers: &[&str], rows: &[Vec<String>], quiet: bool) {
    if !quiet {
        let header_line = headers
            .iter()
            .map(|header| csv_escape(header))
            .collect::<Vec<_>>()
            .join(",");
        println!("{header_line}");
    }

    for row in rows {
        let values: Vec<_> = row.iter().map(|value| csv_escape(value)).collect();
        println!("{}", values.join(","));
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Truncates `value` to at most `max` characters, marking the cut.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("plain" => "plain"; "plain value")]
    #[test_case("a,b" => "\"a,b\""; "comma")]
    #[test_case("say \"hi\"" => "\"say \"\"hi\"\"\""; "quotes")]
    #[test_case("two\nlines" => "\"two\nlines\""; "newline")]
    fn escapes_csv(value: &str) -> String {
        csv_escape(value)
    }

    #[test]
    fn widths_fit_longest_cell() {
        let rows = vec![
            vec!["1".to_string(), "Trade Barrier Analysis".to_string()],
            vec!["22".to_string(), "Short".to_string()],
        ];
        assert_eq!(column_widths(&["ID", "Title"], &rows), [2, 22]);
    }

    #[test]
    fn truncates_long_values() {
        assert_eq!(truncate("Healthcare Accessibility Poll", 10), "Healthcar…");
        assert_eq!(truncate("Short", 10), "Short");
    }
}
