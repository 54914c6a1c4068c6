use std::{env, path::PathBuf};
use clap::Parser;
use squint::{
    output, select, source,
    squeue::{self, PathStyle},
    table, RenderOptions, Result, ThemeName,
};

/// Summarize the job queue (a wrapper around `squeue`).
///
/// Columns are selected and sorted by their header name: JobID, User, Account,
/// Name, Tstart, Tleft, #node, #CPU, MEM, ST, Partition, Host, Dependency, WorkDir.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Limit output to the current user.
    #[arg(short = 'U')]
    me: bool,
    /// Limit output to user(s) (regex).
    #[arg(short, long)]
    user: Vec<String>,
    /// Limit output to job-id(s) (regex).
    #[arg(short, long)]
    jobid: Vec<String>,
    /// Limit output to host(s) (regex).
    #[arg(short = 'H', long)]
    host: Vec<String>,
    /// Limit output to account(s) (regex).
    #[arg(short, long)]
    account: Vec<String>,
    /// Limit output to job name(s) (regex).
    #[arg(short, long)]
    name: Vec<String>,
    /// Limit output to working directories (regex).
    #[arg(short, long)]
    workdir: Vec<String>,
    /// Limit output to status (regex).
    #[arg(long)]
    status: Vec<String>,
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
    /// Add columns.
    #[arg(short, long)]
    extra: Vec<String>,
    /// Print only a summary per user.
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
    /// Print the selected job-ids as a list (short for `-o jobid -l`).
    #[arg(short = 'J', long)]
    joblist: bool,
    /// Column separator.
    #[arg(long, default_value = " ")]
    sep: String,
    /// Print every field of every job, one per line.
    #[arg(long)]
    long: bool,
    /// Show working directories as absolute paths.
    #[arg(long, conflicts_with = "relpath")]
    abspath: bool,
    /// Show working directories relative to the current directory.
    ///
    /// Without either flag, directories more than one level up are shown in full.
    #[arg(long)]
    relpath: bool,
    /// Read the output of `squeue -o "%all"` from a file.
    #[arg(long)]
    input: Option<PathBuf>,
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
        None => source::squeue_all()?,
    };
    let mut rows = squeue::interpret(source::parse_table(&text), &theme);

    let style = if args.abspath {
        PathStyle::Absolute
    } else if args.relpath {
        PathStyle::Relative
    } else {
        PathStyle::Nearby
    };
    squeue::show_workdirs(&mut rows, style, &env::current_dir()?);

    if args.me {
        match squint::current_user() {
            Some(user) => args.user.push(user),
            None => eprintln!("could not determine the current user"),
        }
    }
    if args.joblist {
        args.output = vec!["JobID".to_string()];
        args.list = true;
    }

    let columns = squeue::columns();
    let mut header = squeue::ALIAS.header(&columns);
    let filters = [
        ("USER", &args.user),
        ("ACCOUNT", &args.account),
        ("NAME", &args.name),
        ("JOBID", &args.jobid),
        ("ST", &args.status),
        ("NODELIST(REASON)", &args.host),
        ("PARTITION", &args.partition),
        ("WORK_DIR", &args.workdir),
    ];
    for (key, patterns) in filters {
        if patterns.is_empty() {
            continue;
        }
        rows = select::filter_rows(rows, key, patterns, &theme.selection)?;
        header.paint(key, &theme.selection);
    }

    let options = RenderOptions {
        no_truncate: args.no_truncate,
        width: args.width,
        sep: args.sep.clone(),
        header: !args.no_header,
    };

    if args.summary {
        let mut users = squeue::summarize(&rows);
        select::sort_rows(&mut users, "USER", args.reverse);
        let columns = squeue::summary_columns();
        for name in &args.sort {
            // fields absent from the summary are ignored here
            if let Ok(key) = squeue::ALIAS.key(name) {
                if columns.iter().any(|column| column.key == key) {
                    select::sort_rows(&mut users, key, args.reverse);
                }
            }
        }
        let header = squeue::ALIAS.header(&columns);
        return output::display(&table::render_columns(&users, &columns, &header, &options));
    }

    select::sort_rows(&mut rows, "START_TIME", !args.reverse);
    for name in &args.sort {
        select::sort_rows(&mut rows, squeue::ALIAS.key(name)?, args.reverse);
    }

    let columns = select::choose_columns(&columns, &args.output, &args.extra, &squeue::ALIAS)?;

    let text = if args.long {
        table::render_long(&rows)
    } else if args.list {
        table::render_list(&rows, &columns, &args.sep)?
    } else {
        table::render_columns(&rows, &columns, &header, &options)
    };
    output::display(&text)
}
