use docchat_core::{
    AppViewModel, FileScope, MessageStatus, MessageView, Notice, NoticeLevel, Sender,
    UploadRowView,
};

use super::constants::{PROGRESS_BAR_WIDTH, RULE};

/// Full-screen text for the current view.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let user = match (&view.user, view.signed_in) {
        (Some(name), true) => format!("signed in as {name}"),
        _ => "not signed in".to_string(),
    };
    lines.push(format!("docchat | {user}"));
    lines.push(format!(
        "Scope: {} | Documents: {} | History: {}",
        scope_label(&view.scope),
        view.known_files.len(),
        view.history_len
    ));
    lines.push(RULE.to_string());

    if view.messages.is_empty() {
        lines.push("Ask a question about your documents to get started.".to_string());
    }
    for (position, message) in view.messages.iter().enumerate() {
        render_message(&mut lines, position + 1, message);
    }

    if !view.uploads.is_empty() {
        lines.push(RULE.to_string());
        lines.push("Uploads:".to_string());
        lines.extend(view.uploads.iter().map(upload_row));
    }

    lines.push(RULE.to_string());
    if !view.suggestions.is_empty() {
        let numbered: Vec<String> = view
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, word)| format!("{}) {word}", i + 1))
            .collect();
        lines.push(format!("Suggestions: {}", numbered.join("  ")));
    }
    if !view.input.is_empty() {
        lines.push(format!("Draft: {}", view.input));
    }
    if view.answer_pending {
        lines.push("Waiting for the answer...".to_string());
    }
    lines
}

fn render_message(lines: &mut Vec<String>, position: usize, message: &MessageView) {
    let who = match (message.sender, &message.agent_type) {
        (Sender::User, _) => "You".to_string(),
        (Sender::Agent, Some(agent)) if !agent.is_empty() => format!("Agent ({agent})"),
        (Sender::Agent, _) => "Agent".to_string(),
    };
    let marker = match message.status {
        MessageStatus::Failed => " [failed]",
        MessageStatus::Final | MessageStatus::Pending => "",
    };
    lines.push(format!("[{position}] {who}{marker}: {}", message.text));

    if let Some(translation) = &message.translation {
        lines.push(format!("      translated: {translation}"));
    }
    if message.translating {
        lines.push("      (translating...)".to_string());
    }
    if message.speaking {
        lines.push("      (speaking...)".to_string());
    }
}

fn upload_row(row: &UploadRowView) -> String {
    let filled = usize::from(row.progress.min(100)) * PROGRESS_BAR_WIDTH / 100;
    format!(
        "  {} [{}{}] {:>3}% {}",
        row.file_name,
        "#".repeat(filled),
        ".".repeat(PROGRESS_BAR_WIDTH - filled),
        row.progress,
        row.label
    )
}

fn scope_label(scope: &FileScope) -> &str {
    match scope {
        FileScope::AllFiles => "all files",
        FileScope::Document(name) => name,
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}: {}", notice.title, notice.body)
}

pub fn render_files(view: &AppViewModel) -> Vec<String> {
    if view.known_files.is_empty() {
        return vec!["No documents uploaded yet.".to_string()];
    }
    view.known_files
        .iter()
        .map(|name| {
            let selected = matches!(&view.scope, FileScope::Document(current) if current == name);
            format!("{} {name}", if selected { "*" } else { "-" })
        })
        .collect()
}
