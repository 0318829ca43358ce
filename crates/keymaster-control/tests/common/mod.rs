//! Common test infrastructure for keymaster-control tests
//!
//! - `ScriptedSource`: replays a fixed sequence of fetch results
//! - `EventBridge`: records bridge calls in order

#![allow(dead_code)]

use async_trait::async_trait;
use keymaster_core::{Error, Notice, Result, TextSource, UiBridge};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Text source answering from a script, then repeating the last answer
pub struct ScriptedSource {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    last: Mutex<Option<std::result::Result<String, String>>>,
    pub fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn tokens(tokens: &[&str]) -> Self {
        let source = Self::new();
        for token in tokens {
            source.push_ok(token);
        }
        source
    }

    pub fn push_ok(&self, body: &str) {
        self.script.lock().unwrap().push_back(Ok(body.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextSource for ScriptedSource {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let answer = match next {
            Some(answer) => {
                *self.last.lock().unwrap() = Some(answer.clone());
                answer
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("script exhausted".to_string())),
        };
        answer.map_err(Error::network)
    }
}

/// Bridge call, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Enabled(bool),
    Notice(Notice),
    Terminated,
    Status(String),
}

#[derive(Default)]
pub struct EventBridge {
    events: Mutex<Vec<Event>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl UiBridge for EventBridge {
    fn display_status(&self, text: &str) {
        self.push(Event::Status(text.to_string()));
    }

    fn set_enabled(&self, enabled: bool) {
        self.push(Event::Enabled(enabled));
    }

    async fn prompt_consent(&self, _question: &str) -> bool {
        false
    }

    async fn show_notice(&self, notice: Notice) {
        self.push(Event::Notice(notice));
    }

    fn terminate_application(&self) {
        self.push(Event::Terminated);
    }
}
