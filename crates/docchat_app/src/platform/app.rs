use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use chrono::Local;
use docchat_core::{update, AppState, AuthState, Msg};
use docchat_engine::{EngineHandle, EngineServices};
use docchat_logging::{chat_debug, chat_info};

use super::commands::{parse_line, resolve, Action};
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::constants::{CLEAR_SCREEN, HELP_LINES, PROMPT};
use super::ui::render::{render, render_files, render_notice};

/// Notices stay on screen across redraws until this many newer ones arrive.
const VISIBLE_NOTICES: usize = 5;

pub enum AppEvent {
    Engine(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let services = EngineServices::reqwest(
        config.backend_settings(),
        config.audio_dir.clone(),
        config.audio_player.clone(),
    )?;
    let (engine, events) = EngineHandle::start(services)?;

    let (app_tx, app_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(engine, events, app_tx.clone());
    spawn_input_reader(app_tx);

    let mut app = App {
        state: AppState::with_settings(config.core_settings()),
        runner,
        notices: VecDeque::new(),
        out: io::stdout(),
    };
    chat_info!("docchat started against {}", config.backend_url);

    app.dispatch(Msg::SessionChanged(config.auth_state()));
    app.dispatch(Msg::Started);
    app.redraw()?;

    while let Ok(event) = app_rx.recv() {
        let keep_running = match event {
            AppEvent::Engine(msg) => {
                app.dispatch(msg);
                true
            }
            AppEvent::Line(line) => app.handle_line(&line)?,
            AppEvent::InputClosed => false,
        };
        if !keep_running {
            break;
        }
        app.flush()?;
    }

    chat_info!("docchat exiting");
    Ok(())
}

fn spawn_input_reader(app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if app_tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = app_tx.send(AppEvent::InputClosed);
    });
}

struct App {
    state: AppState,
    runner: EffectRunner,
    notices: VecDeque<String>,
    out: io::Stdout,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    /// Returns `false` when the user asked to leave.
    fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        let command = match parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(err) => {
                self.push_notice(format!("[error] {err}"));
                return self.redraw().map(|()| true);
            }
        };
        chat_debug!("Command {:?}", command);

        match resolve(command, &self.state.view()) {
            Ok(Action::Dispatch(msgs)) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Ok(Action::ShowFiles) => {
                let view = self.state.view();
                self.print_block("Documents:", &render_files(&view))?;
            }
            Ok(Action::WhoAmI) => {
                let who = match self.state.auth() {
                    AuthState::SignedIn(session) => format!(
                        "{} <{}>",
                        session.name.as_deref().unwrap_or("(no name)"),
                        session.email.as_deref().unwrap_or("no email")
                    ),
                    AuthState::Loading => "Session loading".to_string(),
                    AuthState::SignedOut => "Not signed in".to_string(),
                };
                self.print_block("Session:", &[who])?;
            }
            Ok(Action::Help) => {
                let lines: Vec<String> = HELP_LINES.iter().map(|l| l.to_string()).collect();
                self.print_block("Commands:", &lines)?;
            }
            Ok(Action::Quit) => return Ok(false),
            Err(err) => {
                self.push_notice(format!("[error] {err}"));
                self.redraw()?;
            }
        }
        Ok(true)
    }

    /// Collects notices and redraws when the state changed. Queued notices
    /// always mark the state dirty.
    fn flush(&mut self) -> io::Result<()> {
        for notice in self.state.take_notices() {
            self.push_notice(render_notice(&notice));
        }
        if self.state.consume_dirty() {
            self.redraw()?;
        }
        Ok(())
    }

    fn push_notice(&mut self, text: String) {
        let stamp = Local::now().format("%H:%M:%S");
        self.notices.push_back(format!("{stamp} {text}"));
        while self.notices.len() > VISIBLE_NOTICES {
            self.notices.pop_front();
        }
    }

    fn redraw(&mut self) -> io::Result<()> {
        let view = self.state.view();
        let mut out = self.out.lock();
        write!(out, "{CLEAR_SCREEN}")?;
        for line in render(&view) {
            writeln!(out, "{line}")?;
        }
        for notice in &self.notices {
            writeln!(out, "{notice}")?;
        }
        write!(out, "{PROMPT}")?;
        out.flush()
    }

    fn print_block(&mut self, title: &str, lines: &[String]) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out)?;
        writeln!(out, "{title}")?;
        for line in lines {
            writeln!(out, "  {line}")?;
        }
        write!(out, "{PROMPT}")?;
        out.flush()
    }
}
