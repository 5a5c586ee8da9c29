//! Compiscript Compiler CLI
//!
//! Command-line interface for compiling `.cps` programs to MIPS assembly
//! and inspecting the intermediate TAC.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use cpsc::CompilerConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "cpsc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiscript compiler - compile .cps programs to MIPS assembly", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .cps file to a MIPS .s listing
    Build {
        /// Input .cps source file
        input: PathBuf,

        /// Output assembly path (defaults to the input with a .s extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the intermediate TAC next to the output (.tac)
        #[arg(long)]
        keep_tac: bool,

        /// Path to a TOML compiler configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run parse and semantic checks without generating code
    Check {
        /// Input .cps source file
        input: PathBuf,
    },

    /// Print the generated TAC to stdout
    Tac {
        /// Input .cps source file
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build {
            input,
            output,
            keep_tac,
            config,
        } => run_build(&input, output.as_deref(), keep_tac, config.as_deref()),
        Commands::Check { input } => run_check(&input),
        Commands::Tac { input } => run_tac(&input),
        Commands::Completions { shell } => {
            run_completions(shell);
            Ok(())
        }
    };

    if let Err(message) = result {
        eprintln!("{}", message);
        process::exit(1);
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "cpsc", &mut io::stdout());
}

fn read_source(input: &Path) -> Result<String, String> {
    fs::read_to_string(input)
        .map_err(|e| format!("Failed to read source file '{}': {}", input.display(), e))
}

fn load_config(path: Option<&Path>) -> Result<CompilerConfig, String> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
            CompilerConfig::from_toml(&text)
        }
        None => Ok(CompilerConfig::default()),
    }
}

/// Default output path: the input filename with a `.s` extension
fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("s")
}

fn run_build(
    input: &Path,
    output: Option<&Path>,
    keep_tac: bool,
    config: Option<&Path>,
) -> Result<(), String> {
    let source = read_source(input)?;
    let config = load_config(config)?;
    let result = cpsc::compile(&source, &config);
    println!("{}", result.messages);
    if result.has_errors() {
        return Err("compilation failed".to_string());
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    fs::write(&output, &result.asm_text)
        .map_err(|e| format!("Failed to write '{}': {}", output.display(), e))?;
    if keep_tac {
        let tac_path = output.with_extension("tac");
        fs::write(&tac_path, &result.tac_text)
            .map_err(|e| format!("Failed to write '{}': {}", tac_path.display(), e))?;
    }
    Ok(())
}

fn run_check(input: &Path) -> Result<(), String> {
    let source = read_source(input)?;
    let result = cpsc::compile(&source, &CompilerConfig::default());
    println!("{}", result.messages);
    if result.has_errors() {
        return Err("check failed".to_string());
    }
    Ok(())
}

fn run_tac(input: &Path) -> Result<(), String> {
    let source = read_source(input)?;
    let result = cpsc::compile(&source, &CompilerConfig::default());
    if result.has_errors() {
        println!("{}", result.messages);
        return Err("compilation failed".to_string());
    }
    println!("{}", result.tac_text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("demo/programa.cps")),
            PathBuf::from("demo/programa.s")
        );
    }

    #[test]
    fn test_build_writes_asm_and_tac() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("hola.cps");
        fs::write(&src, "let x: integer = 1 + 2; print(x);").unwrap();

        run_build(&src, None, true, None).unwrap();

        let asm = fs::read_to_string(dir.path().join("hola.s")).unwrap();
        assert!(asm.contains(".globl main"));
        let tac = fs::read_to_string(dir.path().join("hola.tac")).unwrap();
        assert!(tac.contains("BeginFunc main 0"));
    }

    #[test]
    fn test_build_fails_on_semantic_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("mal.cps");
        fs::write(&src, "let x: integer = y;").unwrap();
        assert!(run_build(&src, None, false, None).is_err());
        assert!(!dir.path().join("mal.s").exists());
    }

    #[test]
    fn test_config_file_changes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("p.cps");
        fs::write(&src, "print(1);").unwrap();
        let cfg = dir.path().join("cpsc.toml");
        fs::write(&cfg, "entry = \"start\"\n").unwrap();

        run_build(&src, None, true, Some(cfg.as_path())).unwrap();
        let tac = fs::read_to_string(dir.path().join("p.tac")).unwrap();
        assert!(tac.contains("BeginFunc start 0"));
    }
}
