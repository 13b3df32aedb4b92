pub const COMMAND_PREFIX: &str = "!curator";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CuratorCommand {
    Usage,
    Help,
    Add,
    Delete { message_id: Option<String> },
}

// 非命令消息返回 None，调用方直接忽略
pub fn parse_command(body: &str) -> Option<CuratorCommand> {
    let mut words = body.split_whitespace();
    if words.next()? != COMMAND_PREFIX {
        return None;
    }
    let cmd = match words.next() {
        None => CuratorCommand::Usage,
        Some("help") => CuratorCommand::Help,
        Some("add") => CuratorCommand::Add,
        Some("delete") => CuratorCommand::Delete {
            message_id: words.next().map(str::to_string),
        },
        // 未知子命令与裸 !curator 一样回退到用法提示
        Some(_) => CuratorCommand::Usage,
    };
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_prefix_is_usage() {
        assert_eq!(parse_command("!curator"), Some(CuratorCommand::Usage));
        assert_eq!(parse_command("  !curator  "), Some(CuratorCommand::Usage));
    }

    #[test]
    fn known_subcommands() {
        assert_eq!(parse_command("!curator help"), Some(CuratorCommand::Help));
        assert_eq!(parse_command("!curator add"), Some(CuratorCommand::Add));
    }

    #[test]
    fn delete_with_and_without_id() {
        assert_eq!(
            parse_command("!curator delete $abc123:example.org"),
            Some(CuratorCommand::Delete {
                message_id: Some("$abc123:example.org".to_string())
            })
        );
        assert_eq!(
            parse_command("!curator delete"),
            Some(CuratorCommand::Delete { message_id: None })
        );
    }

    #[test]
    fn unknown_subcommand_falls_back_to_usage() {
        assert_eq!(parse_command("!curator frobnicate"), Some(CuratorCommand::Usage));
    }

    #[test]
    fn non_command_text_is_ignored() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("curator add"), None);
    }
}
