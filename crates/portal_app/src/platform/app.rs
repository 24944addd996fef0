use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use portal_core::{update, AppState, AppViewModel, Msg};
use portal_engine::EngineSession;
use portal_logging::{portal_debug, portal_info};

use super::effects::EffectRunner;
use super::ui::commands::Command;
use super::ui::{constants, layout, render};

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    /// A line typed by the user.
    Input(Command),
    /// Standard input reached end of file.
    InputClosed,
    /// An engine result translated into a message.
    Engine(Msg),
}

/// Owns the state machine and runs the effects it asks for.
pub struct Controller {
    state: AppState,
    runner: EffectRunner,
    /// Engine commands whose result message has not been dispatched yet.
    pending: usize,
}

impl Controller {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            pending: 0,
        }
    }

    /// Applies one message; returns a fresh view when anything visible changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.pending += effects.len();
        self.runner.enqueue(effects);
        was_dirty.then_some(view)
    }

    /// Dispatches a message that answers an earlier engine command.
    pub fn complete(&mut self, msg: Msg) -> Option<AppViewModel> {
        self.pending = self.pending.saturating_sub(1);
        self.dispatch(msg)
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// True while any engine command has not reported back.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }
}

/// Runs the interactive portal until `quit` or end of input.
///
/// After end of input the loop keeps draining engine results so piped
/// command scripts see their submissions through.
pub fn run_app(session: EngineSession) -> io::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let mut controller = Controller::new(EffectRunner::new(session, event_tx.clone()));
    spawn_input_reader(event_tx);

    let mut out = io::stdout();
    print_lines(&mut out, &layout::banner())?;
    let initial = controller
        .dispatch(Msg::PageLoaded)
        .unwrap_or_else(|| controller.view());
    print_lines(&mut out, &render::render(&initial))?;
    prompt(&mut out)?;

    let mut input_open = true;
    while input_open || controller.is_busy() {
        let Ok(event) = event_rx.recv() else {
            break;
        };
        match event {
            AppEvent::Input(Command::Quit) => break,
            AppEvent::InputClosed => {
                portal_debug!("Input closed");
                input_open = false;
            }
            AppEvent::Input(Command::Help) => {
                print_lines(&mut out, &layout::help(&controller.view()))?;
                prompt(&mut out)?;
            }
            AppEvent::Input(Command::Unknown(word)) => {
                print_lines(
                    &mut out,
                    &[format!("Unknown command `{word}`; type `help`.")],
                )?;
                prompt(&mut out)?;
            }
            AppEvent::Input(command) => {
                let mut changed = None;
                for msg in command.messages() {
                    if let Some(view) = controller.dispatch(msg) {
                        changed = Some(view);
                    }
                }
                if let Some(view) = changed {
                    print_lines(&mut out, &render::render(&view))?;
                }
                prompt(&mut out)?;
            }
            AppEvent::Engine(msg) => {
                if let Some(view) = controller.complete(msg) {
                    print_lines(&mut out, &render::render(&view))?;
                    prompt(&mut out)?;
                }
            }
        }
    }
    portal_info!("Portal closed");
    Ok(())
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if event_tx
                .send(AppEvent::Input(Command::parse(&line)))
                .is_err()
            {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

fn print_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    writeln!(out)?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}", constants::PROMPT)?;
    out.flush()
}
