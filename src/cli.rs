// File: ./src/cli.rs
//! Command-line arguments and help text.
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub help: bool,
    pub verbose: bool,
    pub root: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Parses the arguments after the binary name. Unknown flags are an error.
pub fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => parsed.help = true,
            "-v" | "--verbose" => parsed.verbose = true,
            "-r" | "--root" => {
                let value = iter.next().ok_or("--root requires a directory")?;
                parsed.root = Some(PathBuf::from(value));
            }
            "-o" | "--output" => {
                let value = iter.next().ok_or("--output requires a file path")?;
                parsed.output = Some(PathBuf::from(value));
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

pub fn print_help(binary_name: &str) {
    println!(
        "Plancal v{} - Converts a published course planning into an iCalendar feed",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] [--output <file.ics>] [--verbose]", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config, cache and data.");
    println!("    -o, --output <file>   Write the calendar here instead of the data directory.");
    println!("    -v, --verbose         Log every parsed event.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("FILES:");
    println!("    config.toml           Planning URL, year, instructors, calendar name...");
    println!("    cancelled_dates.txt   One D/M or D/M/YYYY per line, '#' starts a comment.");
    println!();
    println!("Struck-through cells of the sheet cancel the whole day; struck-through");
    println!("text inside a cell cancels only the matching course.");
}
