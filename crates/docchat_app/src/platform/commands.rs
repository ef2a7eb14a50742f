//! Prompt-line parsing for the terminal front-end.

use std::path::PathBuf;

use docchat_core::{AppViewModel, FileScope, MessageId, Msg, SpeechSource, UploadFile};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Upload(Vec<PathBuf>),
    Files,
    Select(FileScope),
    Type(String),
    Pick(usize),
    Send,
    Translate { index: usize, lang: Option<String> },
    Speak { index: usize, source: SpeechSource },
    Dismiss(String),
    WhoAmI,
    Help,
    Quit,
}

/// What the loop should do with a parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Dispatch(Vec<Msg>),
    ShowFiles,
    WhoAmI,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command /{0}; try /help")]
    Unknown(String),
    #[error("/{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{0:?} is not a positive number")]
    InvalidNumber(String),
    #[error("there is no message #{0}")]
    NoSuchMessage(usize),
}

/// Parses one prompt line; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Ask(line.to_string())));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "upload" => {
            let paths: Vec<PathBuf> = args.split_whitespace().map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(missing("upload", "at least one file path"));
            }
            Command::Upload(paths)
        }
        "files" => Command::Files,
        "select" => match args {
            "" => return Err(missing("select", "a file name or `all`")),
            "all" => Command::Select(FileScope::AllFiles),
            name => Command::Select(FileScope::Document(name.to_string())),
        },
        "type" => Command::Type(args.to_string()),
        "pick" => Command::Pick(parse_index(args, "pick")?),
        "send" => Command::Send,
        "translate" => {
            let mut parts = args.split_whitespace();
            let index = parse_index(parts.next().unwrap_or_default(), "translate")?;
            Command::Translate {
                index,
                lang: parts.next().map(ToOwned::to_owned),
            }
        }
        "speak" => {
            let mut parts = args.split_whitespace();
            let index = parse_index(parts.next().unwrap_or_default(), "speak")?;
            let source = match parts.next() {
                Some("translated" | "translation") => SpeechSource::Translation,
                _ => SpeechSource::Original,
            };
            Command::Speak { index, source }
        }
        "dismiss" => {
            if args.is_empty() {
                return Err(missing("dismiss", "a file name"));
            }
            Command::Dismiss(args.to_string())
        }
        "whoami" => Command::WhoAmI,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Turns a command into messages, resolving 1-based positions against the
/// current view.
pub fn resolve(command: Command, view: &AppViewModel) -> Result<Action, CommandError> {
    let action = match command {
        Command::Ask(question) => {
            Action::Dispatch(vec![Msg::InputChanged(question), Msg::QuerySubmitted])
        }
        Command::Upload(paths) => Action::Dispatch(vec![Msg::UploadRequested(
            paths.into_iter().map(UploadFile::from_path).collect(),
        )]),
        Command::Files => Action::ShowFiles,
        Command::Select(scope) => Action::Dispatch(vec![Msg::FileSelected(scope)]),
        Command::Type(text) => Action::Dispatch(vec![Msg::InputChanged(text)]),
        Command::Pick(index) => Action::Dispatch(vec![Msg::SuggestionPicked(index - 1)]),
        Command::Send => Action::Dispatch(vec![Msg::QuerySubmitted]),
        Command::Translate { index, lang } => Action::Dispatch(vec![Msg::TranslateRequested {
            message_id: message_at(view, index)?,
            target_lang: lang,
        }]),
        Command::Speak { index, source } => Action::Dispatch(vec![Msg::SpeakRequested {
            message_id: message_at(view, index)?,
            source,
        }]),
        Command::Dismiss(file_name) => Action::Dispatch(vec![Msg::UploadDismissed { file_name }]),
        Command::WhoAmI => Action::WhoAmI,
        Command::Help => Action::Help,
        Command::Quit => Action::Quit,
    };
    Ok(action)
}

fn message_at(view: &AppViewModel, index: usize) -> Result<MessageId, CommandError> {
    view.messages
        .get(index - 1)
        .map(|message| message.id)
        .ok_or(CommandError::NoSuchMessage(index))
}

fn parse_index(raw: &str, command: &'static str) -> Result<usize, CommandError> {
    if raw.is_empty() {
        return Err(missing(command, "a number"));
    }
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::InvalidNumber(raw.to_string())),
    }
}

fn missing(command: &'static str, argument: &'static str) -> CommandError {
    CommandError::MissingArgument { command, argument }
}

#[cfg(test)]
mod tests {
    use docchat_core::{MessageStatus, MessageView, Sender};
    use pretty_assertions::assert_eq;

    use super::*;

    fn view_with_messages(ids: &[MessageId]) -> AppViewModel {
        AppViewModel {
            messages: ids
                .iter()
                .map(|&id| MessageView {
                    id,
                    sender: Sender::Agent,
                    status: MessageStatus::Final,
                    text: format!("message {id}"),
                    translation: None,
                    agent_type: None,
                    translating: false,
                    speaking: false,
                })
                .collect(),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse_line("  what is in the report?  "),
            Ok(Some(Command::Ask("what is in the report?".to_string())))
        );
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn slash_commands_parse_their_arguments() {
        assert_eq!(
            parse_line("/upload a.pdf docs/b.docx"),
            Ok(Some(Command::Upload(vec![
                PathBuf::from("a.pdf"),
                PathBuf::from("docs/b.docx")
            ])))
        );
        assert_eq!(
            parse_line("/select all"),
            Ok(Some(Command::Select(FileScope::AllFiles)))
        );
        assert_eq!(
            parse_line("/select annual report.pdf"),
            Ok(Some(Command::Select(FileScope::Document(
                "annual report.pdf".to_string()
            ))))
        );
        assert_eq!(
            parse_line("/translate 2 hi"),
            Ok(Some(Command::Translate {
                index: 2,
                lang: Some("hi".to_string())
            }))
        );
        assert_eq!(
            parse_line("/speak 3 translated"),
            Ok(Some(Command::Speak {
                index: 3,
                source: SpeechSource::Translation
            }))
        );
        assert_eq!(
            parse_line("/type give me a sum"),
            Ok(Some(Command::Type("give me a sum".to_string())))
        );
        assert_eq!(parse_line("/quit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn bad_commands_are_reported() {
        assert_eq!(
            parse_line("/frobnicate"),
            Err(CommandError::Unknown("frobnicate".to_string()))
        );
        assert_eq!(parse_line("/pick 0"), Err(CommandError::InvalidNumber("0".to_string())));
        assert_eq!(parse_line("/pick x"), Err(CommandError::InvalidNumber("x".to_string())));
        assert!(matches!(
            parse_line("/upload"),
            Err(CommandError::MissingArgument { command: "upload", .. })
        ));
        assert!(matches!(
            parse_line("/translate"),
            Err(CommandError::MissingArgument { command: "translate", .. })
        ));
    }

    #[test]
    fn positions_resolve_to_message_ids() {
        let view = view_with_messages(&[10, 11, 12]);

        assert_eq!(
            resolve(Command::Speak { index: 2, source: SpeechSource::Original }, &view),
            Ok(Action::Dispatch(vec![Msg::SpeakRequested {
                message_id: 11,
                source: SpeechSource::Original
            }]))
        );
        assert_eq!(
            resolve(Command::Translate { index: 4, lang: None }, &view),
            Err(CommandError::NoSuchMessage(4))
        );
    }

    #[test]
    fn question_sets_draft_then_submits() {
        let action = resolve(Command::Ask("hi".to_string()), &AppViewModel::default());
        assert_eq!(
            action,
            Ok(Action::Dispatch(vec![
                Msg::InputChanged("hi".to_string()),
                Msg::QuerySubmitted
            ]))
        );
        assert_eq!(
            resolve(Command::Pick(1), &AppViewModel::default()),
            Ok(Action::Dispatch(vec![Msg::SuggestionPicked(0)]))
        );
    }
}
