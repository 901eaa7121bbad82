/// Browse-mode commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "search",
    aliases: &["/", "s", "find"],
    usage: "/TERM",
    description: "Filter by free text (empty clears)",
  },
  Command {
    name: "toggle",
    aliases: &["+", "t", "keyword"],
    usage: "+KEYWORD",
    description: "Select or unselect a keyword",
  },
  Command {
    name: "keywords",
    aliases: &["k", "tags"],
    usage: "keywords",
    description: "List keywords by usage",
  },
  Command {
    name: "show",
    aliases: &["o", "open"],
    usage: "show N",
    description: "Show recipe N of the current list",
  },
  Command {
    name: "delete",
    aliases: &["d", "rm"],
    usage: "delete N",
    description: "Delete recipe N of the current list",
  },
  Command {
    name: "reload",
    aliases: &["r", "refresh"],
    usage: "reload",
    description: "Reload all recipes from the server",
  },
  Command {
    name: "clear",
    aliases: &["c", "reset"],
    usage: "clear",
    description: "Clear keyword selection and search",
  },
  Command {
    name: "help",
    aliases: &["h", "?"],
    usage: "help",
    description: "Show this help",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Leave browse mode",
  },
];

/// A parsed browse-mode input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
  Search(String),
  Toggle(String),
  Keywords,
  Show(usize),
  Delete(usize),
  Reload,
  Clear,
  Help,
  Quit,
  /// Blank line: redraw
  Redraw,
  /// Anything unrecognized, with the best suggestion if there is one
  Unknown {
    input: String,
    suggestion: Option<&'static str>,
  },
}

impl BrowseCommand {
  /// Parse one line of input.
  ///
  /// `/term` and `+keyword` are shorthands; everything else is a command
  /// name or alias followed by an optional argument.
  pub fn parse(line: &str) -> Self {
    let line = line.trim();
    if line.is_empty() {
      return BrowseCommand::Redraw;
    }
    if let Some(term) = line.strip_prefix('/') {
      return BrowseCommand::Search(term.trim().to_string());
    }
    if let Some(keyword) = line.strip_prefix('+') {
      return Self::with_arg(line, "toggle", keyword.trim());
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
      Some((word, rest)) => (word, rest.trim()),
      None => (line, ""),
    };

    // A bare number opens that recipe
    if let Ok(n) = word.parse::<usize>() {
      if arg.is_empty() {
        return BrowseCommand::Show(n);
      }
    }

    match resolve(word) {
      Some(name) => Self::with_arg(line, name, arg),
      None => BrowseCommand::Unknown {
        input: line.to_string(),
        suggestion: get_suggestions(word).first().map(|c| c.name),
      },
    }
  }

  fn with_arg(line: &str, name: &'static str, arg: &str) -> Self {
    let unknown = || BrowseCommand::Unknown {
      input: line.to_string(),
      suggestion: Some(name),
    };

    match name {
      "search" => BrowseCommand::Search(arg.to_string()),
      "toggle" if !arg.is_empty() => BrowseCommand::Toggle(arg.to_string()),
      "show" => arg.parse().map(BrowseCommand::Show).unwrap_or_else(|_| unknown()),
      "delete" => arg.parse().map(BrowseCommand::Delete).unwrap_or_else(|_| unknown()),
      "keywords" => BrowseCommand::Keywords,
      "reload" => BrowseCommand::Reload,
      "clear" => BrowseCommand::Clear,
      "help" => BrowseCommand::Help,
      "quit" => BrowseCommand::Quit,
      _ => unknown(),
    }
  }
}

/// Exact name or alias lookup
fn resolve(word: &str) -> Option<&'static str> {
  let word = word.to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == word || cmd.aliases.contains(&word.as_str()))
    .map(|cmd| cmd.name)
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Help text listing every command
pub fn help_text() -> String {
  COMMANDS
    .iter()
    .map(|c| format!("  {:<12} {}", c.usage, c.description))
    .collect::<Vec<_>>()
    .join("\n")
}
