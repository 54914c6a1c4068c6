use std::{collections::HashSet, path::PathBuf};
use clap::Parser;
use squint::{
    output, select, sinfo, source, squeue, table, RenderOptions, Result, Theme, ThemeName,
};

/// Summarize the compute nodes (a wrapper around `sinfo`).
///
/// Per node two scores are shown: CPU%, the CPU load relative to the allocated
/// CPUs (should be close to 1), and Mem%, the used memory per allocated CPU
/// relative to the node's memory per CPU.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Limit output to nodes running jobs of the current user.
    #[arg(short = 'U')]
    me: bool,
    /// Limit output to nodes running jobs of user(s) (regex).
    #[arg(short, long)]
    user: Vec<String>,
    /// Limit output to nodes running job-id(s) (regex).
    #[arg(short, long)]
    jobid: Vec<String>,
    /// Limit output to host(s) (regex).
    #[arg(short = 'H', long)]
    host: Vec<String>,
    /// Limit output to a number of free CPUs (regex).
    #[arg(short = 'f', long)]
    cfree: Vec<String>,
    /// Limit output to partition(s) (regex).
    #[arg(short, long)]
    partition: Vec<String>,
    /// Sort by field.
    #[arg(short, long)]
    sort: Vec<String>,
    /// Reverse sort.
    #[arg(short, long)]
    reverse: bool,
    /// Select output columns.
    #[arg(short, long)]
    output: Vec<String>,
    /// Print only a summary per partition.
    #[arg(short = 'S', long)]
    summary: bool,
    /// Suppress the header.
    #[arg(long)]
    no_header: bool,
    /// Print full columns, do not truncate to the line width.
    #[arg(long)]
    no_truncate: bool,
    /// Line width (default: terminal width).
    #[arg(long)]
    width: Option<usize>,
    /// Color scheme.
    #[arg(long, value_enum, default_value_t = ThemeName::Dark)]
    colors: ThemeName,
    /// Print the selected column as a list.
    #[arg(short, long)]
    list: bool,
    /// Column separator.
    #[arg(long, default_value = " ")]
    sep: String,
    /// Print every field of every node, one per line.
    #[arg(long)]
    long: bool,
    /// Read the output of `sinfo -o "%all"` from a file.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Read the output of `squeue -o "%all"` from a file (with --user/--jobid).
    #[arg(long)]
    jobs_input: Option<PathBuf>,
}

fn main() {
    squint::init_logging();
    let args = Args::parse();
    if let Err(error) = run(args) {
        squint::exit_with(error);
    }
}

fn run(mut args: Args) -> Result<()> {
    let theme = args.colors.theme();

    let text = match &args.input {
        Some(path) => source::read_file(path)?,
        None => source::sinfo_all()?,
    };
    let mut rows = sinfo::interpret(source::parse_table(&text), &theme);

    let columns = sinfo::columns();
    let mut header = sinfo::ALIAS.header(&columns);
    for (key, patterns) in [
        ("HOSTNAMES", &args.host),
        ("PARTITION", &args.partition),
        ("CPUS_I", &args.cfree),
    ] {
        if patterns.is_empty() {
            continue;
        }
        rows = select::filter_rows(rows, key, patterns, &theme.selection)?;
        header.paint(key, &theme.selection);
    }

    if args.me {
        match squint::current_user() {
            Some(user) => args.user.push(user),
            None => eprintln!("could not determine the current user"),
        }
    }
    if !args.user.is_empty() || !args.jobid.is_empty() {
        let hosts = busy_hosts(&args)?;
        rows.retain(|row| hosts.contains(&row.text("HOSTNAMES")));
        for row in &mut rows {
            if let Some(host) = row.get_mut("HOSTNAMES") {
                host.color = theme.selection.clone();
            }
        }
        header.paint("HOSTNAMES", &theme.selection);
    }

    select::sort_rows(&mut rows, "HOSTNAMES", false);
    select::sort_rows(&mut rows, "PARTITION", false);
    for name in &args.sort {
        select::sort_rows(&mut rows, sinfo::ALIAS.key(name)?, args.reverse);
    }

    let options = RenderOptions {
        no_truncate: args.no_truncate,
        width: args.width,
        sep: args.sep.clone(),
        header: !args.no_header,
    };

    if args.summary {
        let mut partitions = sinfo::summarize(&rows, &theme);
        select::sort_rows(&mut partitions, "PARTITION", args.reverse);
        let columns = sinfo::summary_columns();
        for name in &args.sort {
            // fields absent from the summary are ignored here
            if let Ok(key) = sinfo::ALIAS.key(name) {
                if columns.iter().any(|column| column.key == key) {
                    select::sort_rows(&mut partitions, key, args.reverse);
                }
            }
        }
        let header = sinfo::ALIAS.header(&columns);
        let text = table::render_columns(&partitions, &columns, &header, &options);
        return output::display(&text);
    }

    let columns = select::choose_columns(&columns, &args.output, &[], &sinfo::ALIAS)?;

    let text = if args.long {
        table::render_long(&rows)
    } else if args.list {
        table::render_list(&rows, &columns, &args.sep)?
    } else {
        table::render_columns(&rows, &columns, &header, &options)
    };
    output::display(&text)
}

// hosts of the running jobs selected by --user / --jobid
fn busy_hosts(args: &Args) -> Result<HashSet<String>> {
    let text = match &args.jobs_input {
        Some(path) => source::read_file(path)?,
        None => source::squeue_all()?,
    };
    let mut jobs = squeue::interpret(source::parse_table(&text), &Theme::none());
    jobs.retain(|job| job.text("ST") == "R");
    jobs = select::filter_rows(jobs, "USER", &args.user, "")?;
    jobs = select::filter_rows(jobs, "JOBID", &args.jobid, "")?;

    Ok(jobs
        .iter()
        .flat_map(|job| sinfo::expand_nodelist(&job.text("NODELIST")))
        .collect())
}
