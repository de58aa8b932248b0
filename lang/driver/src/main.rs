use clap::{Parser, Subcommand};
use glas_driver::Loader;
use glas_runtime::{eval, LogWriter, Program};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a module and print its compiled artifact
    Load {
        /// Module name to resolve on GLAS_PATH
        module: String,
    },
    /// Load a module and evaluate it as a program on an empty stack
    Run {
        /// Module name to resolve on GLAS_PATH
        module: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    // the built-in g0 belongs to the embedder; plain pipelines still work
    let mut loader = Loader::without_g0(glas_driver::env_search_path());
    let mut sink = LogWriter::new();
    match cli.command {
        | Commands::Load { module } => {
            let Some(artifact) = loader.load_module(&module, &mut sink) else {
                eprintln!("failed to load `{}`", module);
                std::process::exit(1);
            };
            println!("{}", artifact);
        }
        | Commands::Run { module } => {
            let Some(artifact) = loader.load_module(&module, &mut sink) else {
                eprintln!("failed to load `{}`", module);
                std::process::exit(1);
            };
            let Some(prog) = Program::from_value(&artifact) else {
                eprintln!("`{}` is not a program", module);
                std::process::exit(1);
            };
            match eval(&prog, &mut sink, im::Vector::new()) {
                | Some(stack) => {
                    for v in stack {
                        println!("{}", v);
                    }
                }
                | None => {
                    eprintln!("program failed");
                    std::process::exit(1);
                }
            }
        }
    }
}
