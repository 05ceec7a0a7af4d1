//! Test harness: fake collaborators and a [`Runner`] that pushes chat messages through the
//! real router, queue and dispatcher, returning whatever the bot said.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::dispatch::{CommandReceiver, Dispatcher, command_queue};
use crate::application::router::CommandRouter;
use crate::application::store::InMemoryStringMap;
use crate::application::vote::VoteBook;
use crate::domain::traits::{ChatProvider, Clock, Gist, StringMap, Timer};
use crate::domain::types::{ChannelId, Command, UserId};
use crate::interface::commands::{FeatureDeps, build_registry};

pub const MAIN_CHANNEL: &str = "!main:example.org";
pub const OTHER_CHANNEL: &str = "!other:example.org";
pub const ALICE: &str = "@alice:example.org";
pub const BOB: &str = "@bob:example.org";
pub const CAROL: &str = "@carol:example.org";

/// Records outbound messages; display names default to the raw user id.
#[derive(Default)]
pub struct FakeChat {
    sent: Mutex<Vec<(ChannelId, String)>>,
    names: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&self, user: &str, name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert(user.to_string(), name.to_string());
    }

    pub fn fail_name(&self, user: &str) {
        self.failing.lock().unwrap().insert(user.to_string());
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_since(&self, start: usize) -> Vec<String> {
        self.sent.lock().unwrap()[start..]
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatProvider for FakeChat {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel.clone(), content.to_string()));
        Ok(format!("$event{}", sent.len()))
    }

    async fn display_name(&self, _channel: &ChannelId, user: &UserId) -> Result<String, String> {
        if self.failing.lock().unwrap().contains(user.as_str()) {
            return Err(format!("no such user {user}"));
        }
        Ok(self
            .names
            .lock()
            .unwrap()
            .get(user.as_str())
            .cloned()
            .unwrap_or_else(|| user.to_string()))
    }
}

pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Holds scheduled commands until the test fires them.
#[derive(Default)]
pub struct ManualTimer {
    scheduled: Mutex<Vec<(Duration, Command)>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    pub fn pending_delays(&self) -> Vec<Duration> {
        self.scheduled.lock().unwrap().iter().map(|(d, _)| *d).collect()
    }

    pub fn take(&self) -> Vec<Command> {
        std::mem::take(&mut *self.scheduled.lock().unwrap())
            .into_iter()
            .map(|(_, c)| c)
            .collect()
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, after: Duration, command: Command) {
        self.scheduled.lock().unwrap().push((after, command));
    }
}

pub struct FakeGist {
    result: Result<String, String>,
    uploads: Mutex<Vec<String>>,
}

impl FakeGist {
    pub fn new(result: Result<String, String>) -> Self {
        Self {
            result,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gist for FakeGist {
    async fn upload(&self, _description: &str, content: &str) -> Result<String, String> {
        self.uploads.lock().unwrap().push(content.to_string());
        self.result.clone()
    }
}

#[derive(Default)]
pub struct RunnerBuilder {
    gist: Option<Arc<dyn Gist>>,
    rick_list: Vec<UserId>,
}

impl RunnerBuilder {
    pub fn gist(mut self, gist: Arc<dyn Gist>) -> Self {
        self.gist = Some(gist);
        self
    }

    pub fn rick_list(mut self, users: &[&str]) -> Self {
        self.rick_list = users.iter().map(|u| UserId::new(*u)).collect();
        self
    }

    pub fn build(self) -> Runner {
        let chat = Arc::new(FakeChat::new());
        let clock = Arc::new(FakeClock::new());
        let timer = Arc::new(ManualTimer::new());
        let commands = Arc::new(InMemoryStringMap::new());
        let commands_dyn: Arc<dyn StringMap> = commands.clone();

        let registry = Arc::new(
            build_registry(FeatureDeps {
                commands: commands_dyn.clone(),
                votes: Arc::new(VoteBook::new(5)),
                gist: self.gist,
                clock: clock.clone(),
                timer: timer.clone(),
                vote_duration: Duration::from_secs(300),
                rick_list: self.rick_list,
            })
            .unwrap(),
        );

        let (tx, rx) = command_queue(64);
        let router = CommandRouter::new(registry.clone(), commands_dyn, tx, Vec::new());
        let dispatcher = Dispatcher::new(registry, chat.clone(), Duration::from_secs(5));

        Runner {
            chat,
            clock,
            timer,
            commands,
            router,
            dispatcher,
            queue: rx,
        }
    }
}

pub struct Runner {
    pub chat: Arc<FakeChat>,
    pub clock: Arc<FakeClock>,
    pub timer: Arc<ManualTimer>,
    pub commands: Arc<InMemoryStringMap>,
    router: CommandRouter,
    dispatcher: Dispatcher,
    queue: CommandReceiver,
}

impl Runner {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::default()
    }

    /// Sends `content` to the main channel and returns everything the bot replied.
    pub async fn send(&mut self, author: &str, content: &str) -> Vec<String> {
        self.send_in(MAIN_CHANNEL, author, content).await
    }

    pub async fn send_in(&mut self, channel: &str, author: &str, content: &str) -> Vec<String> {
        let start = self.chat.sent_count();
        self.router
            .route(&ChannelId::new(channel), content, &UserId::new(author))
            .await
            .unwrap();
        self.drain().await;
        self.chat.sent_since(start)
    }

    /// Runs every scheduled timer command through the dispatcher, in scheduling order.
    pub async fn fire_timers(&mut self) -> Vec<String> {
        let start = self.chat.sent_count();
        for command in self.timer.take() {
            let _ = self.dispatcher.dispatch(command).await;
        }
        self.chat.sent_since(start)
    }

    pub async fn assert_reply(&mut self, author: &str, content: &str, expected: &str) {
        let replies = self.send(author, content).await;
        assert_eq!(replies, vec![expected.to_string()], "input {content:?}");
    }

    pub async fn assert_silent(&mut self, author: &str, content: &str) {
        let replies = self.send(author, content).await;
        assert!(replies.is_empty(), "input {content:?} got {replies:?}");
    }

    async fn drain(&mut self) {
        while let Ok(command) = self.queue.try_recv() {
            // Failures are logged and swallowed by the real loop too.
            let _ = self.dispatcher.dispatch(command).await;
        }
    }
}
