// fatresize/src/main.rs

use clap::{CommandFactory, Parser};
use std::process;

use fatresize::bridge::{Bridge, BridgeMode};
use fatresize::cli::{Cli, Options};
use fatresize::log_normal;
use fatresize::utils::set_verbosity;
use fatresize::{app, backend};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version exit clean; anything else is a usage error.
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    let opts = match Options::from_cli(&cli) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{err}");
            let _ = Cli::command().print_help();
            process::exit(1);
        }
    };

    set_verbosity(opts.verbosity);
    log_normal!("fatresize {}", env!("CARGO_PKG_VERSION"));

    if opts.size.is_none() && !opts.info {
        eprintln!("You must specify new size.");
        process::exit(1);
    }

    let (mut access, mut engine) = backend::stack();
    let mode = if opts.force_yes {
        BridgeMode::Automatic
    } else {
        BridgeMode::Interactive
    };
    let handler = Bridge::new(mode, opts.verbosity).shared();

    if let Err(err) = app::run(&opts, &mut access, &mut engine, handler) {
        eprintln!("fatresize: {err:#}");
        process::exit(1);
    }
}
