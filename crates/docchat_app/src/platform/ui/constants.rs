pub const PROMPT: &str = "> ";
pub const PROGRESS_BAR_WIDTH: usize = 20;
pub const RULE: &str = "----------------------------------------";
/// Clear screen and home the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub const HELP_LINES: &[&str] = &[
    "Type a question and press Enter to ask it.",
    "/upload <path>...        upload files as one batch",
    "/files                   list uploaded documents",
    "/select <name>|all       restrict questions to one document",
    "/type <text>             edit the draft and fetch word suggestions",
    "/pick <n>                complete the draft with suggestion n",
    "/send                    submit the draft",
    "/translate <n> [lang]    translate message n",
    "/speak <n> [translated]  read message n aloud",
    "/dismiss <file>          close an upload row",
    "/whoami                  show the signed-in user",
    "/quit                    leave",
];
