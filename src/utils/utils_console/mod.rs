use std::sync::atomic::{AtomicU8, Ordering};
use colored::{Color, Colorize};
use serde::{Serialize, Deserialize};

static PRINT_VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Prints the given string with the given color if `verbosity` is currently enabled.
///
/// ## Example
/// ```
/// use optima_cio::utils::utils_console::{optima_print, PrintMode, PrintColor, PrintVerbosity};
/// optima_print("test", PrintMode::Print, PrintColor::Blue, false, PrintVerbosity::Info);
/// ```
pub fn optima_print(s: &str, mode: PrintMode, color: PrintColor, bolded: bool, verbosity: PrintVerbosity) {
    if !verbosity.is_enabled() { return; }

    let mut string = match color.get_color() {
        None => { s.normal() }
        Some(c) => { s.color(c) }
    };
    if bolded { string = string.bold(); }
    match mode {
        PrintMode::Println => { println!("{}", string); }
        PrintMode::Print => { print!("{}", string); }
    }
}

/// Sets the process-wide console verbosity.  Messages with a level above this one are dropped.
pub fn set_print_verbosity(verbosity: PrintVerbosity) {
    PRINT_VERBOSITY.store(verbosity as u8, Ordering::Relaxed);
}

pub fn print_verbosity() -> PrintVerbosity {
    PrintVerbosity::from_u8(PRINT_VERBOSITY.load(Ordering::Relaxed))
}

/// Enum that is used in optima_print function.
/// Println will cause a new line after each line, while Print will not.
#[derive(Clone, Debug)]
pub enum PrintMode {
    Println,
    Print
}

/// Defines color for an optima print command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintColor {
    None,
    Blue,
    Green,
    Red,
    Yellow,
    Cyan,
    Magenta
}
impl PrintColor {
    pub fn get_color(&self) -> Option<Color> {
        match self {
            PrintColor::None => { None }
            PrintColor::Blue => { Some(Color::Blue) }
            PrintColor::Green => { Some(Color::Green) }
            PrintColor::Red => { Some(Color::Red) }
            PrintColor::Yellow => { Some(Color::Yellow) }
            PrintColor::Cyan => { Some(Color::Cyan) }
            PrintColor::Magenta => { Some(Color::Magenta) }
        }
    }
}

/// Ordered from least to most chatty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrintVerbosity {
    Silent = 0,
    Info = 1,
    Debug = 2
}
impl PrintVerbosity {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => { PrintVerbosity::Silent }
            1 => { PrintVerbosity::Info }
            _ => { PrintVerbosity::Debug }
        }
    }
    pub fn is_enabled(&self) -> bool {
        *self != PrintVerbosity::Silent && *self <= print_verbosity()
    }
}
impl Default for PrintVerbosity {
    fn default() -> Self { PrintVerbosity::Info }
}
