// File: ./src/cli.rs
//! Help text and the line commands understood by the stdin presenter.
use crate::coordinator::Command;
use crate::model::DisplayPart;
use std::path::PathBuf;
use strum::IntoEnumIterator;

pub fn print_help(binary_name: &str) {
    println!(
        "TodayWhat v{} - today's school meals and timetable",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>]", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and logs.");
    println!("    -h, --help            Show this help message.");
    println!();
    print_commands();
}

pub fn print_commands() {
    println!("COMMANDS (one per line on stdin):");
    for (i, part) in DisplayPart::iter().enumerate() {
        println!("    {:<22} Show {}", i + 1, part);
    }
    println!("    s <school name>        Set school");
    println!("    g <grade> <class>      Set grade and class");
    println!("    w                      Toggle weekend skip");
    println!("    r                      Refresh now");
    println!("    h                      Show commands");
    println!("    q                      Quit");
}

/// Value of `-r/--root`, if given.
pub fn parse_root(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "-r" || a == "--root")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Parses one stdin line. `None` for blank, unknown or malformed input.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    match head {
        "1" | "2" | "3" | "4" => {
            let index = head.parse::<usize>().ok()?;
            DisplayPart::iter().nth(index - 1).map(Command::SelectPart)
        }
        "r" => Some(Command::Refresh),
        "w" => Some(Command::ToggleSkipWeekend),
        "q" => Some(Command::Quit),
        "s" if !rest.is_empty() => Some(Command::SetSchool(rest.to_string())),
        "g" => {
            let mut nums = rest.split_whitespace().map(str::parse::<u32>);
            match (nums.next(), nums.next(), nums.next()) {
                (Some(Ok(grade)), Some(Ok(class_number)), None) => Some(Command::SetClassGrade {
                    grade,
                    class_number,
                }),
                _ => None,
            }
        }
        _ => None,
    }
}
