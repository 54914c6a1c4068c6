//! Compute nodes: typed rows from `sinfo -o "%all"`, with load scores.
//!
//! Two scores are derived per node:
//!
//! * `CPU_RELJOB`, the CPU load relative to the number of allocated CPUs. It should
//!   be close to 1; anything else usually means jobs use more or fewer cores than
//!   they claimed.
//! * `MEM_RELJOB`, the used memory per allocated CPU relative to the memory per
//!   CPU of the node.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    memory::MEGA,
    rich::{Align, Rich},
    row::{Column, Row},
    select::Alias,
    source::RawRow,
    theme::Theme,
};

pub const ALIAS: Alias = Alias::new(&[
    ("HOSTNAMES", "Host"),
    ("CPUS_T", "CPUs"),
    ("CPUS_I", "Cfree"),
    ("CPUS_D", "Cdown"),
    ("CPUS_O", "Con"),
    ("CPU_RELJOB", "CPU%"),
    ("PARTITION", "Partition"),
    ("MEMORY", "Mem"),
    ("FREE_MEM", "Mfree"),
    ("MEM_RELJOB", "Mem%"),
    ("TIMELIMIT", "Tlim"),
    ("STATE", "State"),
]);

const UNAVAILABLE: [&str; 3] = ["down", "maint", "drain"];

pub fn columns() -> Vec<Column> {
    vec![
        Column::new("HOSTNAMES", 4, Align::Left, true),
        Column::new("CPUS_T", 4, Align::Right, true),
        Column::new("CPUS_I", 5, Align::Right, true),
        Column::new("CPU_RELJOB", 4, Align::Right, true),
        Column::new("MEMORY", 3, Align::Right, true),
        Column::new("FREE_MEM", 5, Align::Right, true),
        Column::new("MEM_RELJOB", 4, Align::Right, true),
        Column::new("PARTITION", 9, Align::Left, true),
        Column::new("TIMELIMIT", 4, Align::Right, false),
        Column::new("STATE", 5, Align::Left, false),
    ]
}

pub fn summary_columns() -> Vec<Column> {
    vec![
        Column::new("PARTITION", 9, Align::Left, true),
        Column::new("CPUS_T", 4, Align::Right, true),
        Column::new("CPUS_O", 5, Align::Right, true),
        Column::new("CPUS_D", 5, Align::Right, true),
        Column::new("CPUS_I", 5, Align::Right, true),
        Column::new("CPU_RELJOB", 4, Align::Right, true),
        Column::new("MEM_RELJOB", 4, Align::Right, true),
    ]
}

fn field(row: &Row, key: &str) -> Rich {
    row.get(key).cloned().unwrap_or_else(|| Rich::string(""))
}

fn cpu_score(row: &Row) -> Rich {
    let load = field(row, "CPU_LOAD");
    let allocated = field(row, "CPUS_A");
    if !load.is_numeric() || allocated.to_int() <= 0 {
        return Rich::float("");
    }
    Rich::float(load.to_float() / allocated.to_float()).with_precision(2)
}

fn mem_score(row: &Row) -> Rich {
    let memory = field(row, "MEMORY");
    let free = field(row, "FREE_MEM");
    let allocated = field(row, "CPUS_A");
    let total = field(row, "CPUS_T");
    if !free.is_numeric()
        || !total.is_numeric()
        || memory.to_int() <= 0
        || allocated.to_int() <= 0
    {
        return Rich::float("");
    }
    let used = memory.to_float() - free.to_float();
    let score = used / memory.to_float() * total.to_float() / allocated.to_float();
    Rich::float(score).with_precision(2)
}

pub fn interpret(raw: Vec<RawRow>, theme: &Theme) -> Vec<Row> {
    raw.into_iter()
        .map(|fields| interpret_node(Row::from_raw(fields), theme))
        .collect()
}

fn interpret_node(mut row: Row, theme: &Theme) -> Row {
    row.convert("CPU_LOAD", Rich::float);
    row.convert("TIMELIMIT", Rich::duration);
    for key in ["MEMORY", "FREE_MEM"] {
        row.convert(key, |text| Rich::memory_in(text, MEGA));
    }

    // allocated/idle/other/total
    let cpus = row.text("CPUS(A/I/O/T)");
    let mut counts = cpus.split('/');
    for key in ["CPUS_A", "CPUS_I", "CPUS_O", "CPUS_T"] {
        row.insert(key, Rich::integer(counts.next().unwrap_or_default()));
    }

    row.insert("CPU_RELJOB", cpu_score(&row));
    row.insert("MEM_RELJOB", mem_score(&row));

    let total = row.text("CPUS_T");
    row.insert("CPUS_D", Rich::integer(0));
    row.insert("CPUS_O", Rich::integer(total.as_str()));

    let state = row.text("STATE");
    if UNAVAILABLE.iter().any(|prefix| state.starts_with(prefix)) {
        row.insert("CPUS_I", Rich::integer(0));
        row.insert("CPUS_D", Rich::integer(total.as_str()));
        row.insert("CPUS_O", Rich::integer(0));
        row.paint(&theme.error);
    }

    highlight_load(&mut row, theme);
    highlight(&mut row, "MEM_RELJOB", &theme.warning, |value| value.to_float() > 0.9);
    row
}

// free CPUs, and a CPU load away from what was allocated
fn highlight_load(row: &mut Row, theme: &Theme) {
    highlight(row, "CPUS_I", &theme.free, |value| value.to_int() > 0);
    highlight(row, "CPU_RELJOB", &theme.warning, |value| value.to_float() > 1.05);
    highlight(row, "CPU_RELJOB", &theme.low, |value| value.to_float() < 0.95);
}

fn highlight(row: &mut Row, key: &str, color: &str, when: impl Fn(&Rich) -> bool) {
    if let Some(value) = row.get_mut(key) {
        if when(value) {
            value.color = color.to_string();
        }
    }
}

/// One row per partition: CPU counts summed, scores averaged over the nodes that have one.
pub fn summarize(rows: &[Row], theme: &Theme) -> Vec<Row> {
    let mut partitions: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        partitions.entry(row.text("PARTITION")).or_default().push(row);
    }

    partitions
        .into_iter()
        .map(|(partition, nodes)| {
            let total = |key: &str| -> i64 {
                nodes
                    .iter()
                    .filter_map(|node| node.get(key))
                    .map(Rich::to_int)
                    .sum()
            };
            let mean = |key: &str| {
                let scores = nodes
                    .iter()
                    .filter_map(|node| node.get(key))
                    .filter(|value| value.is_numeric())
                    .map(Rich::to_float)
                    .collect_vec();
                if scores.is_empty() {
                    Rich::float("")
                } else {
                    Rich::float(scores.iter().sum::<f64>() / scores.len() as f64)
                }
            };

            let mut row = Row::new()
                .with("PARTITION", Rich::string(partition))
                .with("CPUS_T", Rich::integer(total("CPUS_T")))
                .with("CPUS_O", Rich::integer(total("CPUS_O")))
                .with("CPUS_D", Rich::integer(total("CPUS_D")))
                .with("CPUS_I", Rich::integer(total("CPUS_I")))
                .with("CPU_RELJOB", mean("CPU_RELJOB"))
                .with("MEM_RELJOB", mean("MEM_RELJOB"));
            highlight_load(&mut row, theme);
            row
        })
        .collect()
}

/// Every host in a compressed node list, e.g. `g[01-03],f7` to `g01 g02 g03 f7`.
pub fn expand_nodelist(text: &str) -> Vec<String> {
    let mut hosts = Vec::new();
    for item in split_top_level(text) {
        let Some((prefix, rest)) = item.split_once('[') else {
            if !item.is_empty() {
                hosts.push(item.to_string());
            }
            continue;
        };
        let (ranges, suffix) = rest.split_once(']').unwrap_or((rest, ""));
        for range in ranges.split(',') {
            match range.split_once('-') {
                Some((start, end)) => {
                    let width = start.len();
                    match (start.parse::<u64>(), end.parse::<u64>()) {
                        (Ok(first), Ok(last)) => hosts.extend((first..=last).map(|number| {
                            format!("{prefix}{number:0width$}{suffix}")
                        })),
                        _ => hosts.push(format!("{prefix}{range}{suffix}")),
                    }
                }
                None => hosts.push(format!("{prefix}{range}{suffix}")),
            }
        }
    }
    hosts
}

// split on commas that are not inside brackets
fn split_top_level(text: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(text[start..].trim());
    items
}
