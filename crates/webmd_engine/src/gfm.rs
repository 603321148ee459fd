//! GitHub-flavoured extensions: tables, strikethrough and task list items.
//!
//! Cells and rows are tagged with control characters while the table's
//! children render; the `table` handler then lays them out as pipe rows
//! with a separator after the first one.

use crate::convert::{attr, block, translated, wrap_inline, Rule};

const CELL: char = '\u{1f}';
const ROW: char = '\u{1e}';

pub fn gfm_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "strikethrough",
            tags: &["del", "s", "strike"],
            handler: |handlers, element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(wrap_inline(&content, "~~")))
            },
        },
        Rule {
            name: "taskListItem",
            tags: &["input"],
            handler: |handlers, element| {
                let checkbox =
                    attr(&element, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
                if !checkbox {
                    return handlers.fallback(element);
                }
                let marker = if attr(&element, "checked").is_some() {
                    "[x] "
                } else {
                    "[ ] "
                };
                Some(translated(marker.to_string()))
            },
        },
        Rule {
            name: "tableCell",
            tags: &["th", "td"],
            handler: |handlers, element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(format!("{CELL}{}", cell_text(&content))))
            },
        },
        Rule {
            name: "tableRow",
            tags: &["tr"],
            handler: |handlers, element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(format!("{content}{ROW}")))
            },
        },
        Rule {
            name: "tableSection",
            tags: &["thead", "tbody", "tfoot"],
            handler: |handlers, element| {
                Some(translated(handlers.walk_children(element.node).content))
            },
        },
        Rule {
            name: "table",
            tags: &["table"],
            handler: |handlers, element| {
                let content = handlers.walk_children(element.node).content;
                Some(translated(layout_table(&content)))
            },
        },
        Rule {
            name: "tableCaption",
            tags: &["caption"],
            handler: |_, _| Some(translated(String::new())),
        },
    ]
}

/// Turns tagged rows into pipe rows; the first row is the header.
fn layout_table(tagged: &str) -> String {
    let rows: Vec<Vec<&str>> = tagged
        .split(ROW)
        .map(|row| row.split(CELL).skip(1).map(str::trim).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();
    let Some(header) = rows.first() else {
        return String::new();
    };
    let mut lines = vec![pipe_row(header)];
    lines.push(pipe_row(&vec!["---"; header.len()]));
    lines.extend(rows[1..].iter().map(|cells| pipe_row(cells)));
    block(&lines.join("\n"))
}

fn pipe_row(cells: &[&str]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn cell_text(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::{layout_table, CELL, ROW};

    #[test]
    fn first_row_gets_the_separator() {
        let tagged = format!("\n{CELL}Name{CELL}Value{ROW}\n{CELL}a{CELL}1{ROW}\n");
        assert_eq!(
            layout_table(&tagged),
            "\n\n| Name | Value |\n| --- | --- |\n| a | 1 |\n\n"
        );
    }

    #[test]
    fn tables_without_cells_render_nothing() {
        assert_eq!(layout_table(&format!("  {ROW} ")), "");
    }
}
