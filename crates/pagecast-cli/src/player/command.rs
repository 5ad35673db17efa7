//! Reader keyboard commands.

/// Volume change per `+` / `-`.
pub const VOLUME_STEP: f32 = 0.1;

/// A parsed reader command.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    Next,
    Previous,
    /// Jump to a percentage of the document.
    Seek(f64),
    GoToPage(u32),
    /// Play a segment by id (typed 1-based, stored 0-based).
    Jump(usize),
    Voice(String),
    VolumeUp,
    VolumeDown,
    Status,
    Help,
    /// Back to the library.
    Quit,
}

pub const HELP: &str = "\
  space / p    play or pause
  n / b        next / previous paragraph
  s <pct>      seek to a percentage (s 50)
  g <page>     go to page (g 12)
  j <n>        jump to paragraph n
  v <voice>    change voice (v kore)
  + / -        volume up / down
  i            where am I
  h / ?        this help
  q            back to the library";

/// Parse one input line.
///
/// A blank line (including a lone space) toggles playback, so hitting
/// space then Enter behaves like a play button.
pub fn parse_command(line: &str) -> Result<PlayerCommand, String> {
    let line = line.trim();
    let (head, arg) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "" | "p" | "play" | "pause" => PlayerCommand::TogglePlay,
        "n" | "next" => PlayerCommand::Next,
        "b" | "back" | "prev" => PlayerCommand::Previous,
        "s" | "seek" => {
            let pct = arg
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())
                .ok_or_else(|| format!("seek needs a percentage, got '{arg}'"))?;
            PlayerCommand::Seek(pct)
        }
        "g" | "page" => PlayerCommand::GoToPage(
            arg.parse()
                .map_err(|_| format!("go to page needs a page number, got '{arg}'"))?,
        ),
        "j" | "jump" => PlayerCommand::Jump(
            arg.parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| format!("jump needs a paragraph number, got '{arg}'"))?,
        ),
        "v" | "voice" => {
            if arg.is_empty() {
                return Err("voice needs a name (see 'h')".to_string());
            }
            PlayerCommand::Voice(arg.to_string())
        }
        "+" | "=" => PlayerCommand::VolumeUp,
        "-" | "_" => PlayerCommand::VolumeDown,
        "i" | "info" | "status" => PlayerCommand::Status,
        "h" | "?" | "help" => PlayerCommand::Help,
        "q" | "quit" | "exit" => PlayerCommand::Quit,
        other => return Err(format!("unknown command '{other}' (h for help)")),
    };

    Ok(command)
}

/// Apply one volume step, staying within `[0, 1]`.
pub fn step_volume(current: f32, command: &PlayerCommand) -> f32 {
    let next = match command {
        PlayerCommand::VolumeUp => current + VOLUME_STEP,
        PlayerCommand::VolumeDown => current - VOLUME_STEP,
        _ => current,
    };
    // Round to one decimal so repeated steps don't drift.
    ((next * 10.0).round() / 10.0).clamp(0.0, 1.0)
}
