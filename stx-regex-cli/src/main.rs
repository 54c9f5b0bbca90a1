mod logger;

use std::fmt::Display;

use clap::{Parser, Subcommand};
use colored::Colorize;
use stx_regex::{Regex, RegexBuilder, RegexFlags, translate, translate_debug};

use crate::logger::Logger;

#[derive(Parser)]
#[command(name = "stx-regex")]
#[command(about = "Translate and run XML Schema / XPath regular expressions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a pattern into Rust regex syntax
    Translate {
        /// The pattern to translate
        pattern: String,
        /// Accept only XML Schema syntax, without the XPath extensions
        #[arg(long)]
        schema: bool,
        /// XPath flags such as "ix"
        #[arg(short, long, default_value = "")]
        flags: String,
        /// Show a translation report
        #[arg(short, long)]
        debug: bool,
    },
    /// Test a pattern against input and show the first match
    Test {
        /// The pattern
        pattern: String,
        /// The input string
        input: String,
        /// XPath flags such as "ix"
        #[arg(short, long, default_value = "")]
        flags: String,
        /// Accept only XML Schema syntax
        #[arg(long)]
        schema: bool,
    },
    /// Replace every match, as fn:replace does
    Replace {
        /// The pattern
        pattern: String,
        /// The input string
        input: String,
        /// The replacement string ($N refers to a group)
        replacement: String,
        /// XPath flags such as "ix"
        #[arg(short, long, default_value = "")]
        flags: String,
    },
    /// Split input at every match, as fn:tokenize does
    Tokenize {
        /// The pattern
        pattern: String,
        /// The input string
        input: String,
        /// XPath flags such as "ix"
        #[arg(short, long, default_value = "")]
        flags: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = Logger::init(cli.verbose) {
        fail(e);
    }

    match cli.command {
        Commands::Translate {
            pattern,
            schema,
            flags,
            debug,
        } => cmd_translate(&pattern, !schema, &flags, debug),
        Commands::Test {
            pattern,
            input,
            flags,
            schema,
        } => cmd_test(&pattern, &input, &flags, !schema),
        Commands::Replace {
            pattern,
            input,
            replacement,
            flags,
        } => cmd_replace(&pattern, &input, &replacement, &flags),
        Commands::Tokenize {
            pattern,
            input,
            flags,
        } => cmd_tokenize(&pattern, &input, &flags),
    }
}

fn fail(error: impl Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(1);
}

fn compile(pattern: &str, flags: &str, xpath: bool) -> Regex {
    let mut builder = RegexBuilder::new(pattern);
    builder.xpath(xpath);
    if let Err(e) = builder.flags(flags) {
        fail(e);
    }
    builder.build().unwrap_or_else(|e| fail(e))
}

fn cmd_translate(pattern: &str, xpath: bool, flags: &str, debug: bool) {
    let options = match RegexFlags::parse(flags) {
        Ok(flags) => flags.translate_options(xpath),
        Err(e) => fail(e),
    };

    if debug {
        match translate_debug(pattern, options) {
            Ok(result) => result.report(),
            Err(e) => fail(e),
        }
    } else {
        match translate(pattern, options) {
            Ok(result) => println!("{}", result),
            Err(e) => fail(e),
        }
    }
}

fn cmd_test(pattern: &str, input: &str, flags: &str, xpath: bool) {
    let regex = compile(pattern, flags, xpath);
    println!("{}", "Testing pattern...".bold());
    println!("  Pattern:    {}", pattern.cyan());
    println!("  Translated: {}", regex.as_str().cyan());
    if !flags.is_empty() {
        println!("  Flags:      {}", regex.flags().to_string().cyan());
    }
    println!("  Input:      {}", input.yellow());
    println!();

    match regex.find(input) {
        Ok(Some(m)) => {
            println!("{}", "✓ Match found!".green().bold());
            println!("  Position: {}..{}", m.start, m.end);
            println!("  Match:    {}", m.as_str(input).green());

            if m.groups.len() > 1 {
                println!();
                println!("{}", "Capture groups:".bold());
                for idx in 1..m.groups.len() {
                    match (m.group(idx), m.group_str(input, idx)) {
                        (Some(span), Some(text)) => println!(
                            "  Group {}: {}..{} = {}",
                            idx,
                            span.start,
                            span.end,
                            text.green()
                        ),
                        _ => println!("  Group {}: {}", idx, "unset".dimmed()),
                    }
                }
            }
        }
        Ok(None) => println!("{}", "✗ No match".red()),
        Err(e) => fail(e),
    }
}

fn cmd_replace(pattern: &str, input: &str, replacement: &str, flags: &str) {
    let regex = compile(pattern, flags, true);
    match regex.replace_all(input, replacement) {
        Ok(result) => println!("{}", result),
        Err(e) => fail(e),
    }
}

fn cmd_tokenize(pattern: &str, input: &str, flags: &str) {
    let regex = compile(pattern, flags, true);
    match regex.tokenize(input) {
        Ok(tokens) => {
            for (i, token) in tokens.iter().enumerate() {
                println!("  [{}] {:?}", i + 1, token);
            }
        }
        Err(e) => fail(e),
    }
}
