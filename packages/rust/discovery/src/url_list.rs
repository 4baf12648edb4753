//! URL list files: a CSV with a `URL` column, one question per row.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info, warn};
use url::Url;

use qaharvest_shared::{HarvestError, Result};

/// Header of the column holding question URLs.
pub const URL_COLUMN: &str = "URL";

/// Read question URLs from a CSV file with a `URL` header column.
///
/// Other columns are ignored. Rows whose URL does not parse are logged and
/// skipped. Order is preserved; duplicates are kept (see [`dedup_urls`]).
pub fn read_url_list(path: &Path) -> Result<Vec<Url>> {
    let content = std::fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
    let urls = parse_url_list(&content)
        .map_err(|e| HarvestError::parse(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), count = urls.len(), "loaded URL list");
    Ok(urls)
}

/// Parse URL-list CSV content.
pub fn parse_url_list(content: &str) -> std::result::Result<Vec<Url>, String> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or("empty URL list")?;
    let column = split_csv_line(header.trim_start_matches('\u{feff}'))
        .iter()
        .position(|h| h.trim() == URL_COLUMN)
        .ok_or_else(|| format!("no {URL_COLUMN} column in header"))?;

    let mut urls = Vec::new();
    for (row, line) in lines.enumerate() {
        let fields = split_csv_line(line);
        let Some(raw) = fields.get(column).map(|f| f.trim()) else {
            warn!(row = row + 1, "row has no URL field, skipping");
            continue;
        };

        match Url::parse(raw) {
            Ok(url) => urls.push(url),
            Err(e) => warn!(row = row + 1, value = raw, error = %e, "invalid URL, skipping"),
        }
    }

    Ok(urls)
}

/// Write URLs as a single-column CSV with a `URL` header.
pub fn write_url_list(path: &Path, urls: &[Url]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))?;
    }

    let mut out = String::from(URL_COLUMN);
    out.push('\n');
    for url in urls {
        out.push_str(&escape_csv_field(url.as_str()));
        out.push('\n');
    }

    std::fs::write(path, out).map_err(|e| HarvestError::io(path, e))?;
    info!(path = %path.display(), count = urls.len(), "URL list saved");
    Ok(())
}

/// Drop repeated URLs, keeping the first occurrence of each.
pub fn dedup_urls(urls: impl IntoIterator<Item = Url>) -> Vec<Url> {
    let mut seen = HashSet::new();
    let deduped: Vec<Url> = urls
        .into_iter()
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect();
    debug!(unique = deduped.len(), "deduplicated URLs");
    deduped
}

/// Split one CSV line into fields, honouring double-quoted fields.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', _) => in_quotes = !in_quotes,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn escape_csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_column() {
        let csv = "URL\nhttps://stackoverflow.com/questions/1/a\nhttps://stackoverflow.com/questions/2/b\n";
        let urls = parse_url_list(csv).unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1].path(), "/questions/2/b");
    }

    #[test]
    fn picks_url_column_among_others() {
        let csv = "title,URL,score\n\"Hello, world\",https://stackoverflow.com/questions/3/c,5\n";
        let urls = parse_url_list(csv).unwrap();
        assert_eq!(urls, vec![Url::parse("https://stackoverflow.com/questions/3/c").unwrap()]);
    }

    #[test]
    fn invalid_rows_are_skipped() {
        let csv = "URL\nnot a url\n\nhttps://stackoverflow.com/questions/4/d\n";
        let urls = parse_url_list(csv).unwrap();
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn missing_header_is_error() {
        assert!(parse_url_list("").is_err());
        assert!(parse_url_list("link\nhttps://x.com\n").is_err());
    }

    #[test]
    fn split_handles_quotes() {
        assert_eq!(split_csv_line(r#"a,"b,c","d""e""#), vec!["a", "b,c", "d\"e"]);
        assert_eq!(split_csv_line("single"), vec!["single"]);
        assert_eq!(split_csv_line("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists").join("urls.csv");
        let urls = vec![
            Url::parse("https://stackoverflow.com/questions/1/a").unwrap(),
            Url::parse("https://stackoverflow.com/questions/2/b?x=1,2").unwrap(),
        ];

        write_url_list(&path, &urls).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("URL\n"));

        assert_eq!(read_url_list(&path).unwrap(), urls);
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let a = Url::parse("https://stackoverflow.com/questions/1/a").unwrap();
        let b = Url::parse("https://stackoverflow.com/questions/2/b").unwrap();
        let out = dedup_urls(vec![a.clone(), b.clone(), a.clone(), b.clone()]);
        assert_eq!(out, vec![a, b]);
    }
}
