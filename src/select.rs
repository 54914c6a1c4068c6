//! Picking, filtering and ordering rows and columns from user input.

use regex::Regex;

use crate::{
    error::{Error, Result},
    rich::Rich,
    row::{Column, Header, Row},
};

/// Field keys and the names they are shown (and selected) by.
#[derive(Debug, Clone, Copy)]
pub struct Alias {
    pairs: &'static [(&'static str, &'static str)],
}

impl Alias {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Alias { pairs }
    }

    pub fn name<'a>(&self, key: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map_or(key, |(_, name)| *name)
    }

    /// Key for a user-supplied name; either the display name or the key, any case.
    pub fn key(&self, name: &str) -> Result<&'static str> {
        self.pairs
            .iter()
            .find(|(key, alias)| alias.eq_ignore_ascii_case(name) || key.eq_ignore_ascii_case(name))
            .map(|(key, _)| *key)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Header row for `columns`, aligned like the data below it.
    pub fn header(&self, columns: &[Column]) -> Header {
        let mut header = Header::new();
        for column in columns {
            header.insert(
                column.key.clone(),
                Rich::string(self.name(&column.key)).with_align(column.align),
            );
        }
        header
    }
}

/// Keep rows whose `key` field starts with a match of any of `patterns`, and mark
/// that field with `color`.
pub fn filter_rows(
    rows: Vec<Row>,
    key: &str,
    patterns: &[String],
    color: &str,
) -> Result<Vec<Row>> {
    if patterns.is_empty() {
        return Ok(rows);
    }
    let patterns = patterns
        .iter()
        .map(|pattern| Regex::new(&format!("^(?:{pattern})")))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .filter(|row| {
            let text = row.text(key);
            patterns.iter().any(|pattern| pattern.is_match(&text))
        })
        .map(|mut row| {
            if let Some(value) = row.get_mut(key) {
                value.color = color.to_string();
            }
            row
        })
        .collect())
}

/// Stable sort on one field; rows without it compare as empty text.
pub fn sort_rows(rows: &mut [Row], key: &str, reverse: bool) {
    let blank = Rich::string("");
    rows.sort_by(|a, b| {
        let a = a.get(key).unwrap_or(&blank);
        let b = b.get(key).unwrap_or(&blank);
        if reverse {
            b.compare(a)
        } else {
            a.compare(b)
        }
    });
}

/// Columns named in `output` (or the default ones), followed by those in `extra`.
///
/// The result keeps the order of `columns`.
pub fn choose_columns(
    columns: &[Column],
    output: &[String],
    extra: &[String],
    alias: &Alias,
) -> Result<Vec<Column>> {
    let output = output
        .iter()
        .map(|name| alias.key(name))
        .collect::<Result<Vec<_>>>()?;
    let extra = extra
        .iter()
        .map(|name| alias.key(name))
        .collect::<Result<Vec<_>>>()?;

    let mut chosen: Vec<Column> = columns
        .iter()
        .filter(|column| {
            if output.is_empty() {
                column.default_visible
            } else {
                output.iter().any(|key| *key == column.key)
            }
        })
        .cloned()
        .collect();
    for column in columns {
        let wanted = extra.iter().any(|key| *key == column.key);
        if wanted && !chosen.iter().any(|c| c.key == column.key) {
            chosen.push(column.clone());
        }
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich::Align;

    const ALIAS: Alias = Alias::new(&[
        ("JOBID", "JobID"),
        ("USER", "User"),
        ("WORK_DIR", "WorkDir"),
    ]);

    fn columns() -> Vec<Column> {
        vec![
            Column::new("JOBID", 7, Align::Right, true),
            Column::new("USER", 7, Align::Left, true),
            Column::new("WORK_DIR", 7, Align::Left, false).hidden(),
        ]
    }

    #[test]
    fn alias_lookup() {
        assert_eq!(ALIAS.key("jobid").unwrap(), "JOBID");
        assert_eq!(ALIAS.key("workdir").unwrap(), "WORK_DIR");
        assert_eq!(ALIAS.key("WORK_DIR").unwrap(), "WORK_DIR");
        assert!(matches!(ALIAS.key("nope"), Err(Error::UnknownField(_))));
        assert_eq!(ALIAS.name("USER"), "User");
        assert_eq!(ALIAS.name("OTHER"), "OTHER");

        let header = ALIAS.header(&columns());
        let jobid = header.name("JOBID");
        assert_eq!(jobid.to_string(), "JobID");
        assert_eq!(jobid.align, Align::Right);
    }

    #[test]
    fn filter_is_anchored_and_highlights() {
        let rows = vec![
            Row::new().with("USER", "alice"),
            Row::new().with("USER", "malice"),
            Row::new().with("USER", "bob"),
        ];
        let patterns = ["al".to_string(), "b.b".to_string()];
        let rows = filter_rows(rows, "USER", &patterns, "1;32").unwrap();
        let users: Vec<String> = rows.iter().map(|row| row.text("USER")).collect();
        assert_eq!(users, ["alice", "bob"]);
        assert!(rows.iter().all(|row| row.get("USER").unwrap().color == "1;32"));
    }

    #[test]
    fn bad_pattern() {
        let rows = vec![Row::new().with("USER", "alice")];
        let result = filter_rows(rows, "USER", &["(".to_string()], "");
        assert!(matches!(result, Err(Error::Pattern(_))));
    }

    fn order(rows: &[Row]) -> Vec<String> {
        rows.iter()
            .map(|row| format!("{}{}", row.text("N"), row.text("TAG")))
            .collect()
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn sort_is_stable_both_ways() {
        let mut rows = vec![
            Row::new().with("N", Rich::integer(2)).with("TAG", "first"),
            Row::new().with("N", Rich::integer("-")).with("TAG", "blank"),
            Row::new().with("N", Rich::integer(1)),
            Row::new().with("N", Rich::integer(2)).with("TAG", "second"),
        ];
        sort_rows(&mut rows, "N", false);
        assert_eq!(order(&rows), ["-blank", "1", "2first", "2second"]);

        sort_rows(&mut rows, "N", true);
        assert_eq!(order(&rows), ["2first", "2second", "1", "-blank"]);
    }

    #[test]
    fn choose() {
        let keys = |chosen: Vec<Column>| chosen.into_iter().map(|c| c.key).collect::<Vec<_>>();

        assert_eq!(keys(choose_columns(&columns(), &[], &[], &ALIAS).unwrap()), ["JOBID", "USER"]);
        assert_eq!(
            keys(choose_columns(&columns(), &names(&["user", "jobid"]), &[], &ALIAS).unwrap()),
            ["JOBID", "USER"]
        );
        assert_eq!(
            keys(choose_columns(&columns(), &[], &names(&["workdir", "user"]), &ALIAS).unwrap()),
            ["JOBID", "USER", "WORK_DIR"]
        );
        assert!(choose_columns(&columns(), &["bogus".to_string()], &[], &ALIAS).is_err());
    }
}
