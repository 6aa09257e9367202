use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use calq::{parse_assignment, report_json, CliError, Options, ParserConfig, Session};

#[derive(Debug, Parser)]
#[command(
    name = "calq",
    version,
    about = "Evaluate arithmetic and logical expressions",
    long_about = "calq parses an expression, folds its constants, collapses single-variable\n\
        polynomials and evaluates it. Small typos such as a missing operator or\n\
        closing parenthesis are repaired with a single-token correction.\n\n\
        EXAMPLES:\n\
        \n  calq eval '3*x^2 + x - 6' --set x=2     Evaluate with x = 2\n\
        \n  calq eval '3 2'                          Repaired to 3 * 2\n\
        \n  calq check 'max(1, 2'                    Show the normalized tree"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate an expression and print its value
    Eval(EvalArgs),

    /// Parse an expression and print its normalized form
    Check(ParseArgs),
}

#[derive(Debug, Args, Clone)]
struct ParseArgs {
    /// The expression text
    #[arg(value_name = "EXPR", allow_hyphen_values = true)]
    expression: String,

    /// Accept only these variable names (repeatable)
    #[arg(long = "allow", value_name = "NAME")]
    allow: Vec<String>,

    /// Reject every variable not named by --allow
    #[arg(long)]
    strict: bool,

    /// Report syntax errors instead of repairing them
    #[arg(long = "no-correct")]
    no_correct: bool,
}

#[derive(Debug, Args, Clone)]
struct EvalArgs {
    #[command(flatten)]
    parse: ParseArgs,

    /// Set a variable before evaluating (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Print the value, normalized form and tree as JSON
    #[arg(long)]
    json: bool,
}

impl ParseArgs {
    fn options(&self, assignments: Vec<(String, f64)>) -> Options {
        Options {
            assignments,
            allow: self.allow.clone(),
            strict: self.strict,
            config: ParserConfig {
                correct_errors: !self.no_correct,
                ..ParserConfig::default()
            },
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run_eval(args: &EvalArgs) -> Result<(), CliError> {
    let assignments = args
        .set
        .iter()
        .map(|text| parse_assignment(text))
        .collect::<Result<Vec<_>, _>>()?;
    let session = Session::new(args.parse.options(assignments));
    let text = &args.parse.expression;
    let (report, value) = session.evaluate(text)?;

    if args.json {
        println!("{}", report_json(text, &report, value)?);
        return Ok(());
    }
    if let Some(correction) = &report.correction {
        eprintln!("note: {correction}");
    }
    println!("{value}");
    Ok(())
}

fn run_check(args: &ParseArgs) -> Result<(), CliError> {
    let session = Session::new(args.options(Vec::new()));
    let report = session.parse(&args.expression)?;
    if let Some(correction) = &report.correction {
        eprintln!("note: {correction}");
    }
    println!("{}", report.expression);
    Ok(())
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Eval(args) => run_eval(args),
        Command::Check(args) => run_check(args),
    };
    match result {
        Ok(()) => 0,
        Err(err) => {
            match &err {
                CliError::Syntax { rendered, .. } => eprintln!("{rendered}"),
                other => eprintln!("error: {other}"),
            }
            err.exit_code()
        }
    }
}

fn main() {
    std::process::exit(run_cli());
}
