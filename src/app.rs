use tokio::task::JoinHandle;

use crate::client::{AgentClient, ApiStatus, ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Contents of the response region. Each dispatch overwrites the previous
/// state; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    Loading,
    Answer(String),
    Error(String),
}

/// Reachability of the agent backend, probed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Reachable(String),
    Unreachable,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Prompt input state
    pub prompt_input: String,
    pub prompt_cursor: usize, // cursor position in prompt_input, in chars

    // Display region state
    pub display: DisplayState,
    pub display_scroll: u16,
    pub display_height: u16, // set during render, for scroll clamping
    pub total_display_lines: u16,

    // Modal notice (shown for empty prompts, any key dismisses)
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // In-flight request
    pub request_task: Option<JoinHandle<Result<String, ClientError>>>,

    // Startup status probe
    pub status_task: Option<JoinHandle<Result<ApiStatus, ClientError>>>,
    pub backend: BackendStatus,

    // Agent API client
    pub client: AgentClient,
}

impl App {
    pub fn new(client: AgentClient) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            prompt_input: String::new(),
            prompt_cursor: 0,

            display: DisplayState::Idle,
            display_scroll: 0,
            display_height: 0,
            total_display_lines: 0,

            notice: None,

            animation_frame: 0,

            request_task: None,

            status_task: None,
            backend: BackendStatus::Unknown,

            client,
        }
    }

    /// Dispatch the current prompt, returning whether a request went out.
    /// Empty input raises the notice instead; while a request is in flight,
    /// further dispatches are ignored.
    pub fn submit_prompt(&mut self) -> bool {
        if self.request_task.is_some() {
            return false;
        }

        let prompt = self.prompt_input.trim().to_string();
        if prompt.is_empty() {
            self.notice = Some("Type a prompt first".to_string());
            return false;
        }

        self.prompt_input.clear();
        self.prompt_cursor = 0;
        self.display = DisplayState::Loading;
        self.display_scroll = 0;

        let client = self.client.clone();
        self.request_task = Some(tokio::spawn(async move { client.ask(&prompt).await }));
        true
    }

    /// Collect the in-flight request once it has finished.
    pub async fn poll_request(&mut self) {
        let finished = self
            .request_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.request_task.take() {
            match task.await {
                Ok(result) => self.finish_request(result),
                Err(err) => {
                    self.display = DisplayState::Error(err.to_string());
                    self.display_scroll = 0;
                }
            }
        }
    }

    pub fn finish_request(&mut self, result: Result<String, ClientError>) {
        self.display = match result {
            Ok(answer) => DisplayState::Answer(answer),
            Err(err) => DisplayState::Error(err.to_string()),
        };
        self.display_scroll = 0;
    }

    /// Final text of the display region, exactly as rendered.
    pub fn display_text(&self) -> Option<String> {
        match &self.display {
            DisplayState::Answer(text) => Some(text.clone()),
            DisplayState::Error(message) => Some(format!("Error: {}", message)),
            DisplayState::Idle | DisplayState::Loading => None,
        }
    }

    pub fn check_status(&mut self) {
        let client = self.client.clone();
        self.status_task = Some(tokio::spawn(async move { client.status().await }));
    }

    pub async fn poll_status(&mut self) {
        let finished = self
            .status_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.status_task.take() {
            self.backend = match task.await {
                Ok(Ok(status)) => BackendStatus::Reachable(status.provider),
                _ => BackendStatus::Unreachable,
            };
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.display == DisplayState::Loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Display scrolling
    pub fn scroll_down(&mut self) {
        if self.display_scroll < self.total_display_lines.saturating_sub(self.display_height) {
            self.display_scroll = self.display_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.display_scroll = self.display_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::time::Duration;

    fn test_app() -> App {
        // Nothing listens on this port; requests fail fast with a
        // connection error when a test lets one run to completion.
        let client =
            AgentClient::new("http://127.0.0.1:9", Duration::from_secs(1)).expect("client");
        App::new(client)
    }

    async fn drain_request(app: &mut App) {
        while app.request_task.is_some() {
            app.poll_request().await;
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_raises_notice_and_sends_nothing() {
        let mut app = test_app();
        app.prompt_input = "   \t ".to_string();

        assert!(!app.submit_prompt());

        assert!(app.notice.is_some());
        assert!(app.request_task.is_none());
        assert_eq!(app.display, DisplayState::Idle);
    }

    #[tokio::test]
    async fn test_dispatch_enters_loading_and_clears_input() {
        let mut app = test_app();
        app.prompt_input = "  hello agent  ".to_string();
        app.prompt_cursor = 15;

        assert!(app.submit_prompt());

        assert_eq!(app.display, DisplayState::Loading);
        assert!(app.request_task.is_some());
        assert!(app.prompt_input.is_empty());
        assert_eq!(app.prompt_cursor, 0);

        drain_request(&mut app).await;
        let text = app.display_text().expect("final text");
        assert!(text.starts_with("Error: "), "got {:?}", text);
    }

    #[tokio::test]
    async fn test_dispatch_is_ignored_while_request_in_flight() {
        let mut app = test_app();
        app.request_task = Some(tokio::spawn(async { Ok("first".to_string()) }));

        app.prompt_input = "second".to_string();
        assert!(!app.submit_prompt());

        // The second prompt was not consumed
        assert_eq!(app.prompt_input, "second");

        drain_request(&mut app).await;
        assert_eq!(app.display_text().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_error_results_render_with_prefix() {
        let mut app = test_app();

        app.finish_request(Err(ClientError::RequestFailed(
            StatusCode::INTERNAL_SERVER_ERROR,
        )));

        assert_eq!(
            app.display_text().as_deref(),
            Some("Error: 500 Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_repeat_success_overwrites_with_same_text() {
        let mut app = test_app();

        for _ in 0..2 {
            app.finish_request(Ok("42".to_string()));
        }

        assert_eq!(app.display_text().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_animation_only_advances_while_loading() {
        let mut app = test_app();

        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        app.display = DisplayState::Loading;
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 2);
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
