//! Terminal driver.
//!
//! Owns a [`Session`] and executes the actions it produces: bot timers become
//! tokio tasks that feed `BotTimerFired` back through a channel, and display
//! actions become lines of output. Input lines and timer fires are handled in
//! one `select!` loop, so the session only ever sees one event at a time.

use std::{collections::HashMap, path::PathBuf};

use euclid_client::{BotTimerKey, ClientAction, ClientError, ClientEvent, Session, SessionConfig};
use euclid_core::{Difficulty, Environment, GameMode, StateSnapshot};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    CliError, Command,
    command::HELP,
    render,
};

/// What the driver plays and where it saves.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Vs bot or local two player.
    pub mode: GameMode,
    /// Bot tier.
    pub difficulty: Difficulty,
    /// Session settings.
    pub session: SessionConfig,
    /// Default path for `save` and for saving on quit.
    pub save_path: Option<PathBuf>,
}

/// Event loop around one session.
pub struct Driver<E: Environment> {
    config: DriverConfig,
    session: Session<E>,
    timers: HashMap<BotTimerKey, JoinHandle<()>>,
    timer_tx: mpsc::UnboundedSender<BotTimerKey>,
    timer_rx: mpsc::UnboundedReceiver<BotTimerKey>,
}

impl<E: Environment> Driver<E> {
    /// Create a driver with an idle session.
    pub fn new(env: E, config: DriverConfig) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let session = Session::new(env, config.session.clone());
        Self { config, session, timers: HashMap::new(), timer_tx, timer_rx }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    /// Number of bot timers currently armed.
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    /// Start a new game, or resume the snapshot at `load` if given.
    pub async fn start<W>(&mut self, load: Option<PathBuf>, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        match load {
            Some(path) => self.load(Some(path), out).await,
            None => self.new_game(out).await,
        }
    }

    /// Run until `quit` or end of input. Saves to the default path on exit.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match Command::parse(line.trim()) {
                        Ok(Some(Command::Quit)) => break,
                        Ok(Some(command)) => self.command(command, out).await?,
                        Ok(None) => {},
                        Err(e) => Self::report(&e, out).await?,
                    }
                },
                Some(key) = self.timer_rx.recv() => {
                    self.timers.remove(&key);
                    self.dispatch(ClientEvent::BotTimerFired(key), out).await?;
                },
            }
        }

        if self.config.save_path.is_some() && self.session.save().is_some() {
            self.save(None, out).await?;
        }
        self.shutdown();
        Ok(())
    }

    /// Wait for the next bot timer and feed it to the session.
    ///
    /// Returns `false` if no timer is armed.
    pub async fn fire_next_timer<W>(&mut self, out: &mut W) -> Result<bool, CliError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.timers.is_empty() {
            return Ok(false);
        }
        let Some(key) = self.timer_rx.recv().await else {
            return Ok(false);
        };
        self.timers.remove(&key);
        self.dispatch(ClientEvent::BotTimerFired(key), out).await?;
        Ok(true)
    }

    /// Apply one parsed command.
    pub async fn command<W>(&mut self, command: Command, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        match command {
            Command::Pick(n) => self.dispatch(ClientEvent::Select(n), out).await,
            Command::Move(a, b) => self.dispatch(ClientEvent::Propose { a, b }, out).await,
            Command::New => self.new_game(out).await,
            Command::Board => self.show_board(out).await,
            Command::History => {
                let text = self
                    .session
                    .engine()
                    .map_or_else(|| "no game\n".to_string(), |e| render::history(e.move_history()));
                write(out, &text).await
            },
            Command::Save(path) => self.save(path, out).await,
            Command::Load(path) => self.load(path, out).await,
            Command::Help => write(out, &format!("{HELP}\n")).await,
            Command::Quit => Ok(()),
        }
    }

    async fn new_game<W>(&mut self, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        let event = ClientEvent::NewGame { mode: self.config.mode, difficulty: self.config.difficulty };
        self.dispatch(event, out).await?;
        self.show_board(out).await
    }

    async fn save<W>(&mut self, path: Option<PathBuf>, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        match self.write_snapshot(path).await {
            Ok(path) => write(out, &format!("saved to {}\n", path.display())).await,
            Err(e) => Self::report(&e, out).await,
        }
    }

    async fn write_snapshot(&self, path: Option<PathBuf>) -> Result<PathBuf, CliError> {
        let path = path.or_else(|| self.config.save_path.clone()).ok_or(CliError::NoSavePath)?;
        let snapshot = self.session.save().ok_or(ClientError::NoActiveGame)?;
        let bytes =
            snapshot.to_bytes().map_err(|source| CliError::Snapshot { path: path.clone(), source })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| CliError::SaveFile { path: path.clone(), source })?;
        info!(path = %path.display(), "game saved");
        Ok(path)
    }

    async fn load<W>(&mut self, path: Option<PathBuf>, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        match self.read_snapshot(path).await {
            Ok(snapshot) => {
                self.dispatch(ClientEvent::Load(snapshot), out).await?;
                self.show_board(out).await
            },
            Err(e) => Self::report(&e, out).await,
        }
    }

    async fn read_snapshot(&self, path: Option<PathBuf>) -> Result<StateSnapshot, CliError> {
        let path = path.or_else(|| self.config.save_path.clone()).ok_or(CliError::NoSavePath)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| CliError::SaveFile { path: path.clone(), source })?;
        StateSnapshot::from_bytes(&bytes).map_err(|source| CliError::Snapshot { path, source })
    }

    /// Feed an event to the session and execute the resulting actions.
    ///
    /// Non-fatal session errors are printed; fatal ones are returned.
    async fn dispatch<W>(&mut self, event: ClientEvent, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        match self.session.handle(event) {
            Ok(actions) => self.execute(actions, out).await,
            Err(e) => {
                let error = CliError::from(e);
                if error.is_fatal() {
                    return Err(error);
                }
                Self::report(&error, out).await
            },
        }
    }

    async fn execute<W>(&mut self, actions: Vec<ClientAction>, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut moved = false;
        for action in actions {
            match action {
                ClientAction::ScheduleBotMove { key, delay } => {
                    let env = self.session.env().clone();
                    let tx = self.timer_tx.clone();
                    let handle = tokio::spawn(async move {
                        env.sleep(delay).await;
                        if tx.send(key).is_err() {
                            debug!(?key, "driver gone, bot timer dropped");
                        }
                    });
                    if let Some(stale) = self.timers.insert(key, handle) {
                        stale.abort();
                    }
                    write(out, "the bot is thinking...\n").await?;
                },
                ClientAction::CancelBotMove { key } => {
                    if let Some(handle) = self.timers.remove(&key) {
                        handle.abort();
                        debug!(?key, "bot timer cancelled");
                    }
                },
                ClientAction::MoveApplied(record) => {
                    moved = true;
                    write(out, &format!("{record}\n")).await?;
                },
                ClientAction::MoveRejected(error) => {
                    write(out, &format!("not allowed: {error}\n")).await?;
                },
                ClientAction::SelectionChanged(selected) if !selected.is_empty() => {
                    write(out, &format!("selected: {selected:?}\n")).await?;
                },
                ClientAction::GameOver { winner } => {
                    if let Some(engine) = self.session.engine() {
                        write(out, &format!("game over: {}\n", render::outcome(engine, winner)))
                            .await?;
                    }
                },
                ClientAction::SessionEnded { reason } => {
                    write(out, &format!("session ended: {reason}\n")).await?;
                },
                ClientAction::Send(message) => {
                    warn!(action = message.action(), "no peer connected, message dropped");
                },
                other => debug!(?other, "action ignored"),
            }
        }
        if moved {
            self.show_board(out).await?;
        }
        Ok(())
    }

    async fn show_board<W>(&self, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        let text = self.session.engine().map_or_else(|| "no game\n".to_string(), render::board);
        write(out, &text).await
    }

    async fn report<W>(error: &CliError, out: &mut W) -> Result<(), CliError>
    where
        W: AsyncWrite + Unpin,
    {
        debug!(%error, "command refused");
        write(out, &format!("error: {error}\n")).await
    }

    fn shutdown(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

impl<E: Environment> Drop for Driver<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn write<W>(out: &mut W, text: &str) -> Result<(), CliError>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}
