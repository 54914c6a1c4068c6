//! The job queue: typed rows from `squeue -o "%all"`.

use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

use itertools::Itertools;

use crate::{
    rich::{Align, Rich},
    row::{Column, Row},
    select::Alias,
    source::RawRow,
    theme::Theme,
};

pub const ALIAS: Alias = Alias::new(&[
    ("JOBID", "JobID"),
    ("USER", "User"),
    ("ACCOUNT", "Account"),
    ("NAME", "Name"),
    ("START_TIME", "Tstart"),
    ("TIME_LEFT", "Tleft"),
    ("NODES", "#node"),
    ("CPUS", "#CPU"),
    ("CPUS_R", "#CPU(R)"),
    ("CPUS_PD", "#CPU(PD)"),
    ("MIN_MEMORY", "MEM"),
    ("ST", "ST"),
    ("NODELIST(REASON)", "Host"),
    ("PARTITION", "Partition"),
    ("DEPENDENCY", "Dependency"),
    ("WORK_DIR", "WorkDir"),
]);

const INTEGERS: [&str; 3] = ["JOBID", "NODES", "CPUS"];
const DURATIONS: [&str; 3] = ["TIME_LEFT", "TIME_LIMIT", "TIME"];
const MEMORY: [&str; 1] = ["MIN_MEMORY"];

pub fn columns() -> Vec<Column> {
    vec![
        Column::new("JOBID", 7, Align::Right, true),
        Column::new("USER", 7, Align::Left, true),
        Column::new("ACCOUNT", 7, Align::Left, true),
        Column::new("NAME", 11, Align::Left, false),
        Column::new("START_TIME", 6, Align::Right, true),
        Column::new("TIME_LEFT", 5, Align::Right, true),
        Column::new("NODES", 5, Align::Right, true),
        Column::new("CPUS", 4, Align::Right, true),
        Column::new("MIN_MEMORY", 3, Align::Right, true),
        Column::new("ST", 2, Align::Left, true),
        Column::new("PARTITION", 9, Align::Left, false),
        Column::new("NODELIST(REASON)", 5, Align::Left, false),
        Column::new("DEPENDENCY", 5, Align::Left, false).hidden(),
        Column::new("WORK_DIR", 7, Align::Left, false).hidden(),
    ]
}

pub fn summary_columns() -> Vec<Column> {
    vec![
        Column::new("USER", 7, Align::Left, true),
        Column::new("ACCOUNT", 7, Align::Left, false),
        Column::new("CPUS", 4, Align::Right, true),
        Column::new("CPUS_R", 6, Align::Right, true),
        Column::new("CPUS_PD", 6, Align::Right, true),
        Column::new("PARTITION", 9, Align::Left, false),
    ]
}

pub fn interpret(raw: Vec<RawRow>, theme: &Theme) -> Vec<Row> {
    raw.into_iter()
        .map(|fields| {
            let mut row = Row::from_raw(fields);
            for key in INTEGERS {
                row.convert(key, Rich::integer);
            }
            for key in DURATIONS {
                row.convert(key, Rich::duration);
            }
            for key in MEMORY {
                row.convert(key, Rich::memory);
            }

            let state = row.text("ST");
            let cpus = row.get("CPUS").cloned().unwrap_or_else(|| Rich::integer(0));
            let running = if state == "R" { cpus.clone() } else { Rich::integer(0) };
            let pending = if state == "PD" { cpus } else { Rich::integer(0) };
            row.insert("CPUS_R", running);
            row.insert("CPUS_PD", pending);

            if state == "PD" {
                row.paint(&theme.queued);
            }
            row
        })
        .collect()
}

/// How `WORK_DIR` is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathStyle {
    Absolute,
    Relative,
    /// Relative when the directory is at most one level up from `cwd`, absolute otherwise.
    #[default]
    Nearby,
}

/// Rewrite every `WORK_DIR` as seen from `cwd`, which must be absolute.
pub fn show_workdirs(rows: &mut [Row], style: PathStyle, cwd: &Path) {
    let cwd = normalize(cwd);
    for row in rows {
        let Some(value) = row.get_mut("WORK_DIR") else {
            continue;
        };
        let text = value.to_string();
        if text.is_empty() {
            continue;
        }
        let absolute = normalize(&cwd.join(&text));
        let relative = relative_to(&absolute, &cwd);
        let shown = match style {
            PathStyle::Absolute => absolute,
            PathStyle::Relative => relative,
            PathStyle::Nearby => {
                if relative.to_string_lossy().matches("../").count() < 2 {
                    relative
                } else {
                    absolute
                }
            }
        };
        *value = Rich::string(shown.display()).with_color(value.color.clone());
    }
}

// drop `.` and resolve `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }
    normal
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path: Vec<Component> = path.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component);
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// One row per user: the CPUs claimed in total, running and pending.
pub fn summarize(rows: &[Row]) -> Vec<Row> {
    let mut users: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        users.entry(row.text("USER")).or_default().push(row);
    }

    users
        .into_iter()
        .map(|(user, jobs)| {
            let joined = |key: &str| {
                jobs.iter()
                    .map(|job| job.text(key))
                    .sorted()
                    .dedup()
                    .join(",")
            };
            let total = |key: &str| -> i64 {
                jobs.iter()
                    .filter_map(|job| job.get(key))
                    .map(Rich::to_int)
                    .sum()
            };
            let nonzero = |count: i64| {
                if count == 0 {
                    Rich::integer("-")
                } else {
                    Rich::integer(count)
                }
            };

            Row::new()
                .with("USER", Rich::string(user))
                .with("ACCOUNT", Rich::string(joined("ACCOUNT")))
                .with("CPUS", Rich::integer(total("CPUS")))
                .with("CPUS_R", nonzero(total("CPUS_R")))
                .with("CPUS_PD", nonzero(total("CPUS_PD")))
                .with("PARTITION", Rich::string(joined("PARTITION")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parse_table;

    const LISTING: &str = "\
JOBID|USER|ACCOUNT|NAME|START_TIME|TIME_LEFT|NODES|CPUS|MIN_MEMORY|ST|PARTITION|NODELIST(REASON)
101|alice|phys|relax|2024-01-02T10:00:00|1-00:00:00|1|16|4G|R|batch|node001
102|bob|chem|md|N/A|2:00:00|2|32|500M|PD|long|(Priority)
103|alice|phys|relax2|2024-01-02T11:00:00|UNLIMITED|1|8|4G|PD|long|(Resources)
";

    #[test]
    fn fields_are_typed() {
        let rows = interpret(parse_table(LISTING), &Theme::none());
        assert_eq!(rows.len(), 3);

        let first = &rows[0];
        assert!(first.get("JOBID").unwrap().is_numeric());
        assert_eq!(first.get("TIME_LEFT").unwrap().to_int(), 86400);
        assert_eq!(first.text("TIME_LEFT"), "1.0d");
        assert_eq!(first.get("MIN_MEMORY").unwrap().to_int(), 4_000_000_000);
        assert_eq!(first.get("CPUS_R").unwrap().to_int(), 16);
        assert_eq!(first.get("CPUS_PD").unwrap().to_int(), 0);

        let unlimited = rows[2].get("TIME_LEFT").unwrap();
        assert!(!unlimited.is_numeric());
        assert_eq!(unlimited.to_string(), "UNLIMITED");
        assert_eq!(rows[2].get("CPUS_PD").unwrap().to_int(), 8);
    }

    #[test]
    fn pending_jobs_are_colored() {
        let theme = Theme::dark();
        let rows = interpret(parse_table(LISTING), &theme);
        assert!(rows[0].iter().all(|(_, value)| value.color.is_empty()));
        assert!(rows[1].iter().all(|(_, value)| value.color == theme.queued));
    }

    #[test]
    fn summary_per_user() {
        let rows = interpret(parse_table(LISTING), &Theme::none());
        let summary = summarize(&rows);
        assert_eq!(summary.len(), 2);

        let alice = &summary[0];
        assert_eq!(alice.text("USER"), "alice");
        assert_eq!(alice.text("CPUS"), "24");
        assert_eq!(alice.text("CPUS_R"), "16");
        assert_eq!(alice.text("CPUS_PD"), "8");
        assert_eq!(alice.text("PARTITION"), "batch,long");
        assert_eq!(alice.text("ACCOUNT"), "phys");

        let bob = &summary[1];
        assert_eq!(bob.text("CPUS_R"), "-");
        assert!(!bob.get("CPUS_R").unwrap().is_numeric());
    }

    fn workdirs(style: PathStyle) -> Vec<String> {
        let dirs = [
            "/home/alice/relax",
            "/home/bob/md",
            "/scratch/x/y",
            "/home/alice",
            "sub/./dir",
        ];
        let mut rows: Vec<Row> = dirs
            .into_iter()
            .map(|dir| Row::new().with("WORK_DIR", dir))
            .collect();
        rows.push(Row::new().with("JOBID", Rich::integer(1)));
        show_workdirs(&mut rows, style, Path::new("/home/alice"));
        rows.iter().map(|row| row.text("WORK_DIR")).collect()
    }

    #[test]
    fn workdir_styles() {
        assert_eq!(
            workdirs(PathStyle::Absolute),
            [
                "/home/alice/relax",
                "/home/bob/md",
                "/scratch/x/y",
                "/home/alice",
                "/home/alice/sub/dir",
                "",
            ]
        );
        assert_eq!(
            workdirs(PathStyle::Relative),
            ["relax", "../bob/md", "../../scratch/x/y", ".", "sub/dir", ""]
        );
        // two or more levels up is shown in full
        assert_eq!(
            workdirs(PathStyle::Nearby),
            ["relax", "../bob/md", "/scratch/x/y", ".", "sub/dir", ""]
        );
    }

    #[test]
    fn workdir_keeps_color() {
        let dir = Rich::string("/tmp/a").with_color("0;37");
        let mut rows = vec![Row::new().with("WORK_DIR", dir)];
        show_workdirs(&mut rows, PathStyle::Relative, Path::new("/tmp"));
        assert_eq!(rows[0].text("WORK_DIR"), "a");
        assert_eq!(rows[0].get("WORK_DIR").unwrap().color, "0;37");
    }
}
