mod cli;
mod config;
mod editor;
mod names;
mod resolve;
mod sandbox;
mod shell;
mod toolchain;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, NewArgs};
use config::{Config, Overrides};
use names::{NameGenerator, NameGeneratorConfig};

fn new(args: NewArgs) -> Result<()> {
    let config = Config::load()?.apply(Overrides {
        root: args.root,
        max_name_attempts: args.max_attempts,
        open_editor: args.edit,
    });
    let path = sandbox::new_sandbox(
        &config,
        sandbox::NewOptions {
            name: args.name,
            copy: args.copy,
            libraries: args.libs,
            no_init: args.no_init,
            seed: args.seed,
        },
    )?;
    // stdout: path for shell wrapper to cd into
    println!("{}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::New(NewArgs::default())) {
        Commands::New(args) => new(args),
        Commands::Name {
            seed,
            count,
            separator,
            capitalize,
            no_numbers,
        } => {
            let generator = NameGenerator::new(NameGeneratorConfig {
                seed,
                separator,
                capitalize,
                add_numbers: !no_numbers,
            });
            for name in generator.take(count) {
                println!("{name}");
            }
            Ok(())
        }
        Commands::List { root } => {
            let config = Config::load()?.apply(Overrides {
                root,
                ..Default::default()
            });
            let root = config.root_dir()?;
            let entries = sandbox::list_sandboxes(&root)?;
            sandbox::print_list(&root, &entries);
            Ok(())
        }
        Commands::ShellSetup { fish } => {
            let shell = if fish {
                shell::Shell::Fish
            } else {
                shell::Shell::Posix
            };
            shell::print_shell_setup(shell);
            Ok(())
        }
        Commands::Version => {
            use owo_colors::OwoColorize;
            println!(
                "{} {}",
                "sandpit".bold().cyan(),
                env!("CARGO_PKG_VERSION").bright_white()
            );
            Ok(())
        }
    }
}
