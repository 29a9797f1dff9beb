use clap::{Parser, ValueEnum};
use introduce::parser::types::MAX_PARSER_DEPTH;
use introduce::{Expression, ParserOptions};
use std::io::Read;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Re-render the template from the parsed tree
    Text,
    /// Rust debug view of the tree
    Debug,
    Json,
    Yaml,
}

#[derive(Parser)]
#[command(name = "introduce")]
#[command(about = "Parse shell-style variable expansion templates")]
#[command(version)]
struct Cli {
    /// Parse the template from command line argument
    #[arg(short = 'c')]
    template: Option<String>,

    /// Output format for the parsed tree
    #[arg(long = "format", value_enum, default_value_t = Format::Debug)]
    format: Format,

    /// Print referenced variable names, one per line, instead of the tree
    #[arg(long = "variables")]
    variables: bool,

    /// Deepest nesting of ${...} accepted inside defaults and messages
    #[arg(long = "max-depth", default_value_t = MAX_PARSER_DEPTH)]
    max_depth: usize,

    /// Template file to parse
    #[arg()]
    template_file: Option<String>,
}

fn render(expr: &Expression, format: Format) -> Result<String, String> {
    match format {
        Format::Text => Ok(expr.to_string()),
        Format::Debug => Ok(format!("{:#?}\n", expr)),
        Format::Json => serde_json::to_string_pretty(expr)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::to_string(expr).map_err(|e| e.to_string()),
    }
}

fn main() {
    let cli = Cli::parse();

    // Determine template source: -c, file, or stdin
    let template = if let Some(s) = cli.template {
        s
    } else if let Some(ref file) = cli.template_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: Cannot read template file: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("Error: No template provided. Use -c 'template', provide a template file, or pipe via stdin.");
            std::process::exit(1);
        }
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("Error: Cannot read stdin: {}", e);
            std::process::exit(1);
        }
        buf
    };

    let options = ParserOptions {
        max_depth: cli.max_depth,
        ..ParserOptions::default()
    };
    let expr = match introduce::Parser::with_options(&template, options).parse() {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if cli.variables {
        for name in expr.variables() {
            println!("{}", name);
        }
        return;
    }

    match render(&expr, cli.format) {
        Ok(out) => print!("{}", out),
        Err(e) => {
            eprintln!("Error: Cannot serialize tree: {}", e);
            std::process::exit(1);
        }
    }
}
