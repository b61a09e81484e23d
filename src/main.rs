use bmatch::cli::Cli;
use clap::Parser;

fn main() {
    env_logger::init();
    if let Err(err) = Cli::parse().run() {
        eprintln!("Error! {:#}", err);
        std::process::exit(1);
    }
}
