//! Just enough markdown for ingredient descriptions: bullets, headings and
//! `**bold**`.

/// Render `text` for the terminal, passing emphasized spans through
/// `emphasize`.
pub fn render(text: &str, emphasize: impl Fn(&str) -> String) -> String {
    text.trim_end()
        .lines()
        .skip_while(|line| line.trim().is_empty())
        .map(|line| render_line(line, &emphasize))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_line(line: &str, emphasize: &impl Fn(&str) -> String) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return format!("{indent}• {}", inline(item, emphasize));
    }

    let heading = trimmed.trim_start_matches('#');
    if heading.len() < trimmed.len() && heading.starts_with(' ') {
        return emphasize(heading.trim());
    }

    inline(line, emphasize)
}

/// Replace each `**span**` with its emphasized form. An unmatched `**` is
/// left as is.
fn inline(text: &str, emphasize: &impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&emphasize(&after[..end]));
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}
