/// A chat message as seen by plugins, after the host has stripped bot-addressing syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub channel_id: String,
    pub user_id: String,
    pub text: String,
    pub normalized_text: String,
    /// Slack `ts`: fractional seconds since epoch as a decimal string. Stable across edits.
    pub timestamp: String,
    pub thread_timestamp: Option<String>,
    /// Direct message channel.
    pub direct: bool,
    /// Direct message or bot mention; routed to commands instead of hear actions.
    pub addressed: bool,
}

impl IncomingMessage {
    pub fn ambient(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            normalized_text: text.clone(),
            text,
            timestamp: timestamp.into(),
            thread_timestamp: None,
            direct: false,
            addressed: false,
        }
    }

    pub fn addressed(mut self) -> Self {
        self.addressed = true;
        self
    }

    pub fn direct(mut self) -> Self {
        self.direct = true;
        self.addressed = true;
        self
    }

    pub fn in_thread(mut self, thread_timestamp: impl Into<String>) -> Self {
        self.thread_timestamp = Some(thread_timestamp.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnswerOption {
    /// Reply in a thread; ignored for direct messages.
    InThread,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), options: Vec::new() }
    }

    pub fn with_options(mut self, options: &[AnswerOption]) -> Self {
        self.options.extend_from_slice(options);
        self
    }

    pub fn in_thread(&self) -> bool {
        self.options.contains(&AnswerOption::InThread)
    }
}
