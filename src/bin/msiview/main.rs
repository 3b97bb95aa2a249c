use anyhow::Result;
use clap::Parser;

mod cli;
mod cmd_cat;
mod cmd_check;
mod cmd_extract;
mod cmd_list;
mod util;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Check { path } => cmd_check::exec(path),

        cli::Cmd::List { path, no_summary } => cmd_list::exec(path, no_summary),

        cli::Cmd::Extract {
            path,
            out,
            no_summary,
        } => cmd_extract::exec(path, out, no_summary),

        cli::Cmd::Cat { path, name } => cmd_cat::exec(path, name),
    }
}
