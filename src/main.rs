use angora::cli::{self, Cli, Commands};
use angora::output::Printer;
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    angora::logging::init(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Load(args) => cli::load::run(args, &printer)?,
        Commands::Get(args) => cli::get::run(args, &printer)?,
        Commands::Validate(args) => cli::validate::run(args, &printer)?,
        Commands::Watch(args) => cli::watch::run(args, &printer)?,
        Commands::Sample(args) => cli::sample::run(args, &printer)?,
        Commands::Init(args) => cli::init::run(args, &printer)?,
        Commands::Contract => cli::contract::run()?,
        Commands::Completions(args) => cli::completions::run(args)?,
    }

    Ok(())
}
