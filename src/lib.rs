use std::{env, io, process::exit};

use sysinfo::{get_current_pid, System, Users};
use tracing_subscriber::EnvFilter;

pub mod duration;
pub mod error;
pub mod memory;
pub mod output;
pub mod rich;
pub mod row;
pub mod select;
pub mod sinfo;
pub mod source;
pub mod squeue;
pub mod table;
pub mod theme;

pub use error::{Error, Result};
pub use rich::{Align, Rich, Scalar};
pub use row::{Column, Header, Row};
pub use table::RenderOptions;
pub use theme::{Theme, ThemeName};

/// Log to stderr, filtered by `RUST_LOG`; quiet unless asked.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

pub fn exit_with(error: Error) -> ! {
    eprintln!("error: {error}");
    exit(1)
}

/// Name of the user running this process.
pub fn current_user() -> Option<String> {
    let from_process = get_current_pid().ok().and_then(|pid| {
        let mut sys = System::new();
        sys.refresh_process(pid);
        let uid = sys.process(pid)?.user_id()?.clone();
        let users = Users::new_with_refreshed_list();
        users.get_user_by_id(&uid).map(|user| user.name().to_string())
    });
    from_process.or_else(|| env::var("USER").ok())
}
