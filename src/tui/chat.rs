//! Chat assistant widget.
//!
//! Holds the session transcript, the message input and the one-shot
//! suggested prompts. User messages go into the transcript as soon as they
//! are sent and are never taken back; a failed call simply produces no reply.

use chrono::{DateTime, Local};
use tracing::{debug, error};

use crate::error::RemoteResult;
use crate::remote::{ChatRequest, ChatService};
use crate::tui::input::InputField;

/// Prompts offered before the first message of a session.
pub const SUGGESTED_PROMPTS: [&str; 3] = [
    "What is SCRUM?",
    "What is Kanban?",
    "What is the difference between SCRUM and Kanban?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn display_name(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "ChatBot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Local>,
}

/// Append-only message history.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    fn push(&mut self, sender: Sender, text: String) {
        self.entries.push(TranscriptEntry {
            sender,
            text,
            sent_at: Local::now(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(sender, text)` pairs in display order.
    pub fn messages(&self) -> Vec<(Sender, &str)> {
        self.entries
            .iter()
            .map(|e| (e.sender, e.text.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPanel {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    panel: ChatPanel,
    phase: ChatPhase,
    transcript: Transcript,
    input: InputField,
    interacted: bool,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWidget {
    pub fn new() -> Self {
        Self {
            panel: ChatPanel::Closed,
            phase: ChatPhase::Idle,
            transcript: Transcript::default(),
            input: InputField::new(),
            interacted: false,
        }
    }

    pub fn panel(&self) -> ChatPanel {
        self.panel
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.panel == ChatPanel::Open
    }

    /// Whether the "typing" indicator should show.
    pub fn is_loading(&self) -> bool {
        self.phase == ChatPhase::AwaitingReply
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    /// Suggested prompts, empty once anything has been sent this session.
    pub fn suggestions(&self) -> &'static [&'static str] {
        if self.interacted {
            &[]
        } else {
            &SUGGESTED_PROMPTS
        }
    }

    pub fn toggle(&mut self) {
        self.panel = match self.panel {
            ChatPanel::Closed => ChatPanel::Open,
            ChatPanel::Open => ChatPanel::Closed,
        };
    }

    pub fn open(&mut self) {
        self.panel = ChatPanel::Open;
    }

    /// Hide the panel. A pending reply still lands in the transcript.
    pub fn close(&mut self) {
        self.panel = ChatPanel::Closed;
    }

    /// Send whatever is in the input box.
    pub fn send(&mut self) -> Option<ChatRequest> {
        let text = self.input.value.clone();
        self.send_text(&text)
    }

    /// Send `text` as a user message.
    ///
    /// Blank text is a no-op. Otherwise the message is appended to the
    /// transcript, the input is cleared, the suggestions are retired and the
    /// widget waits for a reply. Also refused while the panel is closed or a
    /// reply is still outstanding.
    pub fn send_text(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() {
            return None;
        }
        if self.panel == ChatPanel::Closed || self.phase == ChatPhase::AwaitingReply {
            debug!(panel = ?self.panel, phase = ?self.phase, "chat message refused");
            return None;
        }
        self.transcript.push(Sender::User, text.to_string());
        self.input.clear();
        self.interacted = true;
        self.phase = ChatPhase::AwaitingReply;
        Some(ChatRequest {
            message: text.to_string(),
        })
    }

    /// Send one of the suggested prompts by index.
    pub fn choose_suggestion(&mut self, index: usize) -> Option<ChatRequest> {
        let text = *self.suggestions().get(index)?;
        self.input.set(text);
        self.send_text(text)
    }

    /// Apply the assistant's answer to the outstanding message.
    pub fn receive(&mut self, outcome: RemoteResult<String>) {
        if self.phase != ChatPhase::AwaitingReply {
            debug!("chat reply with no message outstanding, ignoring");
            return;
        }
        self.phase = ChatPhase::Idle;
        match outcome {
            Ok(reply) => self.transcript.push(Sender::Bot, reply),
            Err(e) => error!(error = %e, "error sending message"),
        }
    }

    /// Send `text` and wait for the answer.
    ///
    /// `None` means the message was refused and nothing was sent. Otherwise
    /// the outcome is applied to the transcript and also returned.
    pub async fn send_with(
        &mut self,
        service: &dyn ChatService,
        text: &str,
    ) -> Option<RemoteResult<String>> {
        let request = self.send_text(text)?;
        let outcome = service.send_message(&request).await;
        self.receive(outcome.clone());
        Some(outcome)
    }
}
