use crate::report::Section;
use std::io::{self, BufRead, Write};

const ENTRIES: [&str; 8] = [
    "Platform",
    "Boot Time",
    "CPU",
    "Memory",
    "Disk",
    "Network",
    "All",
    "Quit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Show(Vec<Section>),
    Quit,
}

impl MenuChoice {
    /// Accepts the entry number or its name, case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let idx = match input.parse::<usize>() {
            Ok(n) if (1..=ENTRIES.len()).contains(&n) => n - 1,
            Ok(_) => return None,
            Err(_) => ENTRIES.iter().position(|e| e.eq_ignore_ascii_case(input))?,
        };
        Some(match idx {
            0..=5 => MenuChoice::Show(vec![Section::ALL[idx]]),
            6 => MenuChoice::Show(Section::ALL.to_vec()),
            _ => MenuChoice::Quit,
        })
    }
}

pub fn prompt() -> String {
    let mut out = String::from("Please select one of the following:\n");
    for (i, entry) in ENTRIES.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, entry));
    }
    out
}

/// Reads choices until `Quit` or end of input; `render` produces the text for
/// each chosen set of sections.
pub fn run<R, W, F>(input: R, mut output: W, mut render: F) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&[Section]) -> String,
{
    let mut lines = input.lines();
    loop {
        write!(output, "\n{}", prompt())?;
        output.flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        match MenuChoice::parse(&line) {
            Some(MenuChoice::Quit) => return Ok(()),
            Some(MenuChoice::Show(sections)) => write!(output, "{}", render(&sections))?,
            None => writeln!(output, "'{}' is not a valid choice.", line.trim())?,
        }
    }
}
