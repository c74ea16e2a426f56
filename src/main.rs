use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use jackc_rust::compiler::{ArrayAssignment, CompilerOptions, StringConstruction};
use jackc_rust::driver::compile_path;
use jackc_rust::lexer::tokenize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::EnvFilter;

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(about = "Compile Jack classes to stack VM code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize the input file and print tokens
    Lex {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Compile a .jack file, or every .jack file in a directory, to .vm
    Compile {
        /// Input file or directory
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output file path (single file input only; defaults to <input>.vm)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Print the generated code to stdout as well
        #[arg(short, long)]
        print: bool,

        #[command(flatten)]
        codegen: CodegenArgs,
    },
}

#[derive(clap::Args)]
struct CodegenArgs {
    /// How `let a[i] = v;` is compiled
    #[arg(long, value_enum, default_value_t = ArrayAssignment::Legacy)]
    array_assignment: ArrayAssignment,

    /// Accept `a + b + c` without parentheses (folded left to right)
    #[arg(long)]
    operator_chains: bool,

    /// How string literals are built at runtime
    #[arg(long, value_enum, default_value_t = StringConstruction::AppendPriming)]
    string_construction: StringConstruction,

    /// Use indirect array stores, operator chains and `String.new` together
    #[arg(long, conflicts_with_all = ["array_assignment", "operator_chains", "string_construction"])]
    corrected: bool,
}

impl From<CodegenArgs> for CompilerOptions {
    fn from(args: CodegenArgs) -> Self {
        if args.corrected {
            return CompilerOptions::corrected();
        }
        CompilerOptions {
            array_assignment: args.array_assignment,
            operator_chains: args.operator_chains,
            string_construction: args.string_construction,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lex { file } => lex_file(&file)?,
        Commands::Compile {
            path,
            output,
            print,
            codegen,
        } => compile(&path, output.as_deref(), print, codegen.into())?,
    }

    Ok(())
}

fn lex_file(path: &Path) -> Result<()> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read file '{}'", path.display()))?;

    let tokenized = tokenize(&input);

    println!("Tokens:");
    println!("-------");
    for token in &tokenized.tokens {
        println!(
            "{}:{}:{} {} {}",
            path.display(),
            token.pos.line,
            token.pos.column,
            token.kind,
            token
        );
    }

    println!("\nTotal tokens: {}", tokenized.tokens.len());
    for warning in &tokenized.warnings {
        println!("warning: {warning}");
    }

    Ok(())
}

fn compile(path: &Path, output: Option<&Path>, print: bool, options: CompilerOptions) -> Result<()> {
    let units = compile_path(path, output, options)
        .with_context(|| format!("failed to compile '{}'", path.display()))?;

    for unit in &units {
        if print {
            print!("{}", unit.code);
        } else {
            println!("VM code written to: {}", unit.output.display());
        }
    }

    Ok(())
}
