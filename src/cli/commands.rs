use crate::command::Command;

/// Print every meeting command with its aliases and who may use it.
pub fn handle_commands_command() {
    println!("{:<16} {:<10} {:<8} Description", "Command", "Aliases", "Chair");
    for command in Command::all() {
        println!("{}", command_row(command));
    }
}

fn command_row(command: &Command) -> String {
    format!(
        "{:<16} {:<10} {:<8} {}",
        format!("#{}", command.name()),
        command.aliases().join(","),
        if command.requires_chair() { "yes" } else { "" },
        command.description()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_row() {
        let row = command_row(&Command::Subtopic);
        assert!(row.starts_with("#subtopic        progress   yes"));
        assert!(row.ends_with("Record a subtopic under the current topic"));
    }
}
