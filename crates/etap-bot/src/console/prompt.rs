use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};
use std::borrow::Cow;

static PROMPT_INDICATOR: &str = "〉";
static MULTILINE_INDICATOR: &str = "::: ";

/// Bare prompt for the answer console: no left or right segment, a fixed
/// indicator independent of the edit mode.
#[derive(Clone, Default)]
pub struct AnswerPrompt;

impl Prompt for AnswerPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::from("")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::from("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed(PROMPT_INDICATOR)
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(MULTILINE_INDICATOR)
    }

    fn render_prompt_history_search_indicator(&self, history_search: PromptHistorySearch) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}reverse-search) \"{}\": ", prefix, history_search.term))
    }
}
